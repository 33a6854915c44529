//! 모델 아티팩트 확보: 로컬 확인 → (없으면) 다운로드 → 체크섬 → 메모리 로드.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use super::forest::{ArtifactError, RandomForestModel};

const DOWNLOAD_CHUNK: usize = 64 * 1024;

/// 모델을 어디서 가져올지에 대한 설정.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSource {
    /// 로컬 캐시 경로
    pub path: PathBuf,
    /// 로컬에 없을 때 받아올 고정 URL
    pub url: Option<String>,
    /// 기대 SHA-256 (16진수)
    pub sha256: Option<String>,
    pub timeout: Duration,
}

impl ModelSource {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            url: None,
            sha256: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// 진행 상황 통지. 화면에 단계와 다운로드 바이트 수를 보여주는 데 쓴다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AcquireProgress<'a> {
    CheckingLocal(&'a Path),
    Downloading { received: u64, total: Option<u64> },
    Verifying,
    Loading(&'a Path),
    Ready { trees: usize },
}

/// 다운로드 단계의 오류.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} 응답: {url}")]
    Status { status: u16, url: String },
    #[error("네트워크 오류: {0}")]
    Transport(String),
    #[error("다운로드 쓰기 오류: {0}")]
    Io(#[from] io::Error),
}

/// 모델 확보 실패. 어떤 경우에도 프로세스를 강제 종료하지 않고 호출자에게 보고한다.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("모델 파일이 없고 다운로드 URL도 설정되지 않았습니다: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("모델 다운로드 실패 ({url}): {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("모델 파일 입출력 오류 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("체크섬 불일치: 기대 {expected}, 실제 {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("모델 아티팩트가 손상되었거나 호환되지 않습니다: {0}")]
    Invalid(#[from] ArtifactError),
}

/// URL의 내용을 `out`으로 스트리밍하는 다운로드 경계.
pub trait ArtifactFetcher {
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        out: &mut dyn Write,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<u64, FetchError>;
}

/// `ureq` 기반 블로킹 HTTP 다운로드.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl ArtifactFetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        out: &mut dyn Write,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<u64, FetchError> {
        let response = match ureq::get(url).timeout(timeout).call() {
            Ok(r) => r,
            Err(ureq::Error::Status(status, _)) => {
                return Err(FetchError::Status {
                    status,
                    url: url.to_string(),
                })
            }
            Err(e) => return Err(FetchError::Transport(e.to_string())),
        };
        let total = response
            .header("Content-Length")
            .and_then(|v| v.parse::<u64>().ok());
        let mut reader = response.into_reader();
        copy_with_progress(&mut reader, out, total, progress)
    }
}

fn copy_with_progress(
    reader: &mut dyn Read,
    out: &mut dyn Write,
    total: Option<u64>,
    progress: &mut dyn FnMut(u64, Option<u64>),
) -> Result<u64, FetchError> {
    let mut buf = vec![0u8; DOWNLOAD_CHUNK];
    let mut received = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
        received += n as u64;
        progress(received, total);
    }
    out.flush()?;
    Ok(received)
}

/// 쓰는 동안 SHA-256을 함께 계산한다.
struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn check_digest(expected: &str, actual: String) -> Result<(), ModelLoadError> {
    if expected.trim().eq_ignore_ascii_case(&actual) {
        Ok(())
    } else {
        Err(ModelLoadError::ChecksumMismatch {
            expected: expected.trim().to_lowercase(),
            actual,
        })
    }
}

/// `.part` 파일로 받은 뒤 검증이 끝나면 이름을 바꿔 캐시에 넣는다.
fn download(
    source: &ModelSource,
    url: &str,
    fetcher: &dyn ArtifactFetcher,
    progress: &mut dyn FnMut(AcquireProgress<'_>),
) -> Result<(), ModelLoadError> {
    let io_err = |e: io::Error| ModelLoadError::Io {
        path: source.path.clone(),
        source: e,
    };
    if let Some(parent) = source.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let part = source.path.with_extension("part");
    info!(url, path = %part.display(), "downloading model artifact");

    let file = File::create(&part).map_err(io_err)?;
    let mut writer = HashingWriter {
        inner: file,
        hasher: Sha256::new(),
    };
    let fetched = fetcher.fetch(url, source.timeout, &mut writer, &mut |received: u64, total: Option<u64>| {
        progress(AcquireProgress::Downloading { received, total })
    });
    let bytes = match fetched {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&part);
            return Err(ModelLoadError::Fetch {
                url: url.to_string(),
                source: e,
            });
        }
    };
    let HashingWriter { inner, hasher } = writer;
    drop(inner);

    if let Some(expected) = &source.sha256 {
        progress(AcquireProgress::Verifying);
        if let Err(e) = check_digest(expected, hex::encode(hasher.finalize())) {
            let _ = fs::remove_file(&part);
            return Err(e);
        }
    }
    fs::rename(&part, &source.path).map_err(io_err)?;
    info!(bytes, path = %source.path.display(), "model artifact cached");
    Ok(())
}

/// 로컬 캐시를 확인하고, 없으면 받아온 뒤, 메모리에 로드한다.
pub fn acquire(
    source: &ModelSource,
    fetcher: &dyn ArtifactFetcher,
    mut progress: impl FnMut(AcquireProgress<'_>),
) -> Result<RandomForestModel, ModelLoadError> {
    progress(AcquireProgress::CheckingLocal(&source.path));
    let mut downloaded = false;
    if !source.path.exists() {
        let Some(url) = source.url.as_deref() else {
            warn!(path = %source.path.display(), "model artifact missing and no url configured");
            return Err(ModelLoadError::NotFound {
                path: source.path.clone(),
            });
        };
        download(source, url, fetcher, &mut progress)?;
        downloaded = true;
    }

    progress(AcquireProgress::Loading(&source.path));
    let bytes = fs::read(&source.path).map_err(|e| ModelLoadError::Io {
        path: source.path.clone(),
        source: e,
    })?;
    if let (Some(expected), false) = (&source.sha256, downloaded) {
        progress(AcquireProgress::Verifying);
        check_digest(expected, hex::encode(Sha256::digest(&bytes)))?;
    }
    let model = RandomForestModel::from_json(&bytes)?;
    info!(
        name = model.name(),
        trees = model.tree_count(),
        "model artifact loaded"
    );
    progress(AcquireProgress::Ready {
        trees: model.tree_count(),
    });
    Ok(model)
}
