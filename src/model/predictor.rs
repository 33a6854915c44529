use std::sync::Arc;

use thiserror::Error;

use crate::welding::FeatureRecord;

/// 예측 실행 중 모델 쪽에서 발생한 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("'{feature}' 항목에 학습되지 않은 범주 '{value}'")]
    UnknownCategory { feature: String, value: String },
    #[error("'{feature}' 항목의 값 종류(수치/범주)가 모델과 다릅니다")]
    KindMismatch { feature: String },
    #[error("모델 입력 '{feature}'이(가) 레코드에 없습니다")]
    MissingFeature { feature: String },
    #[error("모델 출력이 유한한 값이 아닙니다")]
    NonFinite,
}

/// 화면 하단 모델 설명에 쓰는 메타데이터.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub algorithm: &'static str,
    pub target: String,
    pub inputs: Vec<String>,
    pub estimators: usize,
}

/// `predict(FeatureRecord) -> f64` 계약을 제공하는 학습된 회귀 모델.
///
/// 로드 후에는 읽기 전용이므로 세션 간에 잠금 없이 공유한다.
pub trait HardnessPredictor: Send + Sync {
    /// 학습 당시 입력 이름 목록(순서 포함).
    fn feature_names(&self) -> &[String];

    /// 경도 [HRC]를 예측한다.
    fn predict(&self, record: &FeatureRecord) -> Result<f64, ModelError>;

    fn info(&self) -> ModelInfo;
}

/// 프로세스 시작 시 한 번 로드해 호출자가 들고 다니는 예측기 핸들.
pub type SharedPredictor = Arc<dyn HardnessPredictor>;
