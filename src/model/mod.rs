//! 경도 예측 모델 경계: 예측기 트레이트, 랜덤 포레스트 아티팩트, 모델 확보(로컬/다운로드).

pub mod forest;
pub mod predictor;
pub mod source;

pub use forest::{ArtifactError, RandomForestModel};
pub use predictor::{HardnessPredictor, ModelError, ModelInfo, SharedPredictor};
pub use source::{
    acquire, AcquireProgress, ArtifactFetcher, FetchError, HttpFetcher, ModelLoadError,
    ModelSource,
};
