//! 입력 → 검증 → 입열량 → 레코드 구성 → 예측 → 결과.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{HardnessPredictor, ModelError, ModelInfo, SharedPredictor};
use crate::units::{heat_input_from_j_per_mm, HeatInputUnit};
use crate::welding::{assemble, FeatureSchema, SchemaMismatch, ValidationError, WeldingParameters};

/// 예측 1회의 결과. 표시 후 버린다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    /// 예측 경도 [HRC]
    pub predicted_hardness_hrc: f64,
    /// 계산 입열량 [J/mm]
    pub heat_input_j_per_mm: f64,
}

impl PredictionResult {
    /// 표시 단위로 환산한 입열량.
    pub fn heat_input_in(&self, unit: HeatInputUnit) -> f64 {
        heat_input_from_j_per_mm(self.heat_input_j_per_mm, unit)
    }
}

/// 예측 요청 실패. 모두 대화형 경계에서 복구 가능하다.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("입력값 오류: {0}")]
    Validation(#[from] ValidationError),
    #[error("스키마 불일치: {0}")]
    Schema(#[from] SchemaMismatch),
    #[error("예측 실패: {0}")]
    Predictor(#[from] ModelError),
}

/// 용접 조건으로 경도를 예측한다.
///
/// 레코드 이름 목록이 예측기의 학습 입력과 다르면 예측기를 호출하지 않는다.
pub fn predict(
    predictor: &dyn HardnessPredictor,
    schema: FeatureSchema,
    params: &WeldingParameters,
) -> Result<PredictionResult, PredictionError> {
    let valid = params.validate()?;
    let record = assemble(schema, &valid)?;
    record.check_against(predictor.feature_names())?;
    let hardness = predictor.predict(&record)?;
    info!(
        schema = schema.id(),
        hardness_hrc = hardness,
        heat_input_j_per_mm = valid.heat_input_j_per_mm(),
        "prediction complete"
    );
    Ok(PredictionResult {
        predicted_hardness_hrc: hardness,
        heat_input_j_per_mm: valid.heat_input_j_per_mm(),
    })
}

/// 시작 시 설정된 스키마가 로드된 모델 입력과 같은지 확인한다.
pub fn check_schema_compat(
    predictor: &dyn HardnessPredictor,
    schema: FeatureSchema,
) -> Result<(), SchemaMismatch> {
    let expected = predictor.feature_names();
    let actual = schema.names();
    if actual.len() == expected.len() && actual.iter().zip(expected).all(|(a, b)| *a == b.as_str())
    {
        Ok(())
    } else {
        Err(SchemaMismatch::KeyMismatch {
            expected: expected.to_vec(),
            actual: actual.into_iter().map(String::from).collect(),
        })
    }
}

/// 대화형 세션 상태. 마지막 입력과 마지막 성공 결과를 유지하고,
/// 실패 시에는 오류만 갱신해 이전 결과 화면을 그대로 둔다.
pub struct PredictionSession {
    predictor: SharedPredictor,
    schema: FeatureSchema,
    inputs: WeldingParameters,
    last_result: Option<PredictionResult>,
    last_error: Option<PredictionError>,
}

impl PredictionSession {
    pub fn new(predictor: SharedPredictor, schema: FeatureSchema, initial: WeldingParameters) -> Self {
        Self {
            predictor,
            schema,
            inputs: initial,
            last_result: None,
            last_error: None,
        }
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    /// 마지막으로 제출한 입력. 오류 후 재시도 시 폼 초기값으로 쓴다.
    pub fn inputs(&self) -> &WeldingParameters {
        &self.inputs
    }

    pub fn last_result(&self) -> Option<&PredictionResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&PredictionError> {
        self.last_error.as_ref()
    }

    pub fn model_info(&self) -> ModelInfo {
        self.predictor.info()
    }

    /// 입력을 제출해 예측한다.
    pub fn submit(&mut self, params: WeldingParameters) -> Result<PredictionResult, PredictionError> {
        self.inputs = params;
        match predict(self.predictor.as_ref(), self.schema, &self.inputs) {
            Ok(result) => {
                self.last_result = Some(result);
                self.last_error = None;
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "prediction request failed");
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::welding::FeatureRecord;
    use std::sync::Arc;

    /// 입열량에 비례하는 가짜 모델.
    struct Linear {
        names: Vec<String>,
    }

    impl HardnessPredictor for Linear {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict(&self, record: &FeatureRecord) -> Result<f64, ModelError> {
            match record.get("heat_input_J_per_mm") {
                Some(crate::welding::FeatureValue::Number(q)) => Ok(30.0 + q / 100_000.0),
                _ => Err(ModelError::MissingFeature {
                    feature: "heat_input_J_per_mm".into(),
                }),
            }
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                name: "linear".into(),
                algorithm: "test",
                target: "HRC".into(),
                inputs: self.names.clone(),
                estimators: 1,
            }
        }
    }

    fn linear() -> SharedPredictor {
        Arc::new(Linear {
            names: FeatureSchema::TigRfV1
                .names()
                .into_iter()
                .map(String::from)
                .collect(),
        })
    }

    #[test]
    fn predicts_with_heat_input() {
        let result = predict(linear().as_ref(), FeatureSchema::TigRfV1, &WeldingParameters::default())
            .unwrap();
        assert_eq!(result.heat_input_j_per_mm, 300_000.0);
        assert!((result.predicted_hardness_hrc - 33.0).abs() < 1e-9);
        assert!((result.heat_input_in(HeatInputUnit::KilojoulePerMillimeter) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn schema_compat_check() {
        let p = linear();
        assert!(check_schema_compat(p.as_ref(), FeatureSchema::TigRfV1).is_ok());
        assert!(check_schema_compat(p.as_ref(), FeatureSchema::TigExtendedV1).is_err());
    }

    #[test]
    fn extended_schema_against_v1_model_is_mismatch() {
        let params = WeldingParameters {
            method: Some(crate::welding::WeldMethod::Tig),
            groove_depth_mm: Some(1.0),
            filler_diameter_mm: Some(2.4),
            ..Default::default()
        };
        let err = predict(linear().as_ref(), FeatureSchema::TigExtendedV1, &params).unwrap_err();
        assert!(matches!(err, PredictionError::Schema(SchemaMismatch::KeyMismatch { .. })));
    }
}
