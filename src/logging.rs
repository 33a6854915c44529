//! tracing 구독자 초기화. 바이너리마다 시작 시 한 번 호출한다.

use tracing_subscriber::EnvFilter;

/// stderr로 로그를 내보낸다. `RUST_LOG`가 있으면 그것을, 없으면 `default_level`을 쓴다.
///
/// 이미 초기화되어 있으면 조용히 넘어간다.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
