use std::cell::Cell;
use std::io::Write;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tig_hardness_predictor::model::{
    acquire, AcquireProgress, ArtifactError, ArtifactFetcher, FetchError, ModelLoadError,
    ModelSource,
};

const BUNDLED_MODEL: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/models/tig_random_forest_pipeline.json"
);

fn bundled_bytes() -> Vec<u8> {
    std::fs::read(BUNDLED_MODEL).expect("bundled model")
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// 고정 바이트를 두 조각으로 나눠 내려주는 가짜 다운로더.
struct FakeFetcher {
    body: Vec<u8>,
    calls: Cell<usize>,
}

impl FakeFetcher {
    fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            calls: Cell::new(0),
        }
    }
}

impl ArtifactFetcher for FakeFetcher {
    fn fetch(
        &self,
        _url: &str,
        _timeout: Duration,
        out: &mut dyn Write,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<u64, FetchError> {
        self.calls.set(self.calls.get() + 1);
        let total = self.body.len() as u64;
        let (head, tail) = self.body.split_at(self.body.len() / 2);
        out.write_all(head)?;
        progress(head.len() as u64, Some(total));
        out.write_all(tail)?;
        progress(total, Some(total));
        Ok(total)
    }
}

struct FailingFetcher;

impl ArtifactFetcher for FailingFetcher {
    fn fetch(
        &self,
        url: &str,
        _timeout: Duration,
        _out: &mut dyn Write,
        _progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<u64, FetchError> {
        Err(FetchError::Status {
            status: 404,
            url: url.to_string(),
        })
    }
}

#[test]
fn local_file_is_loaded_without_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, bundled_bytes()).unwrap();
    let fetcher = FakeFetcher::new(Vec::new());

    let mut stages = Vec::new();
    let model = acquire(&ModelSource::local(&path), &fetcher, |s: AcquireProgress<'_>| {
        stages.push(format!("{s:?}"))
    })
    .unwrap();
    assert_eq!(model.tree_count(), 3);
    assert_eq!(fetcher.calls.get(), 0);
    assert!(stages.first().unwrap().starts_with("CheckingLocal"));
    assert!(stages.last().unwrap().starts_with("Ready"));
}

#[test]
fn missing_file_without_url_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let source = ModelSource::local(dir.path().join("absent.json"));
    let err = acquire(&source, &FakeFetcher::new(Vec::new()), |_: AcquireProgress<'_>| {}).unwrap_err();
    assert!(matches!(err, ModelLoadError::NotFound { .. }));
}

#[test]
fn download_caches_then_reuses_local_copy() {
    let dir = tempfile::tempdir().unwrap();
    let body = bundled_bytes();
    let source = ModelSource {
        url: Some("https://example.invalid/model.json".into()),
        sha256: Some(sha256_hex(&body)),
        ..ModelSource::local(dir.path().join("cache").join("model.json"))
    };
    let fetcher = FakeFetcher::new(body.clone());

    let mut received = Vec::new();
    let model = acquire(&source, &fetcher, |s: AcquireProgress<'_>| {
        if let AcquireProgress::Downloading { received: r, .. } = s {
            received.push(r);
        }
    })
    .unwrap();
    assert_eq!(model.tree_count(), 3);
    assert_eq!(fetcher.calls.get(), 1);
    assert_eq!(received.last().copied(), Some(body.len() as u64));
    assert_eq!(std::fs::read(&source.path).unwrap(), body);
    assert!(!source.path.with_extension("part").exists());

    // 두 번째 실행은 캐시를 쓴다
    acquire(&source, &fetcher, |_: AcquireProgress<'_>| {}).unwrap();
    assert_eq!(fetcher.calls.get(), 1);
}

#[test]
fn fetch_failure_is_reported_and_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = ModelSource {
        url: Some("https://example.invalid/missing.json".into()),
        ..ModelSource::local(dir.path().join("model.json"))
    };
    let err = acquire(&source, &FailingFetcher, |_: AcquireProgress<'_>| {}).unwrap_err();
    assert!(matches!(
        err,
        ModelLoadError::Fetch {
            source: FetchError::Status { status: 404, .. },
            ..
        }
    ));
    assert!(!source.path.exists());
    assert!(!source.path.with_extension("part").exists());
}

#[test]
fn downloaded_checksum_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = ModelSource {
        url: Some("https://example.invalid/model.json".into()),
        sha256: Some("0".repeat(64)),
        ..ModelSource::local(dir.path().join("model.json"))
    };
    let err = acquire(&source, &FakeFetcher::new(bundled_bytes()), |_: AcquireProgress<'_>| {})
        .unwrap_err();
    assert!(matches!(err, ModelLoadError::ChecksumMismatch { .. }));
    assert!(!source.path.exists());
}

#[test]
fn local_checksum_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, bundled_bytes()).unwrap();
    let source = ModelSource {
        sha256: Some(sha256_hex(b"something else")),
        ..ModelSource::local(&path)
    };
    let err = acquire(&source, &FailingFetcher, |_: AcquireProgress<'_>| {}).unwrap_err();
    assert!(matches!(err, ModelLoadError::ChecksumMismatch { .. }));
}

#[test]
fn corrupt_artifact_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, b"{ not json").unwrap();
    let err = acquire(&ModelSource::local(&path), &FailingFetcher, |_: AcquireProgress<'_>| {})
        .unwrap_err();
    assert!(matches!(err, ModelLoadError::Invalid(ArtifactError::Parse(_))));
}
