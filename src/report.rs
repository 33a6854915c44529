//! 예측 결과와 모델 정보를 화면용 문자열로 만든다. CLI와 GUI가 함께 쓴다.

use crate::i18n::{keys, Translator};
use crate::model::ModelInfo;
use crate::prediction::PredictionResult;
use crate::units::HeatInputUnit;
use crate::welding::FeatureSchema;

/// 경도 한 줄.
pub fn hardness_line(tr: &Translator, result: &PredictionResult) -> String {
    format!(
        "{} {:.2} HRC",
        tr.t(keys::RESULT_HARDNESS),
        result.predicted_hardness_hrc
    )
}

/// 입열량 한 줄 (표시 단위 적용).
pub fn heat_input_line(tr: &Translator, result: &PredictionResult, unit: HeatInputUnit) -> String {
    format!(
        "{} {:.2} {}",
        tr.t(keys::RESULT_HEAT_INPUT),
        result.heat_input_in(unit),
        unit.symbol()
    )
}

/// 결과 블록 전체.
pub fn result_lines(tr: &Translator, result: &PredictionResult, unit: HeatInputUnit) -> Vec<String> {
    vec![
        hardness_line(tr, result),
        heat_input_line(tr, result, unit),
        tr.t(keys::RESULT_NOTE).into_owned(),
    ]
}

/// 모델 정보 블록.
pub fn model_info_lines(tr: &Translator, info: &ModelInfo, schema: FeatureSchema) -> Vec<String> {
    vec![
        format!("{} {}", tr.t(keys::MODEL_NAME), info.name),
        format!("{} {}", tr.t(keys::MODEL_ALGORITHM), info.algorithm),
        format!("{} {}", tr.t(keys::MODEL_ESTIMATORS), info.estimators),
        format!("{} {}", tr.t(keys::MODEL_INPUTS), info.inputs.join(", ")),
        format!("{} {}", tr.t(keys::MODEL_TARGET), info.target),
        tr.t(keys::MODEL_DERIVED).into_owned(),
        format!("{} {}", tr.t(keys::MODEL_SCHEMA), schema.id()),
    ]
}
