use std::sync::Arc;

use tig_hardness_predictor::{
    model::{HardnessPredictor, ModelError, RandomForestModel, SharedPredictor},
    prediction::{check_schema_compat, predict, PredictionError, PredictionSession},
    welding::{
        assemble, FeatureSchema, FeatureValue, GrooveType, SchemaMismatch, ValidationError,
        WeldType, WeldingParameters,
    },
};

const BUNDLED_MODEL: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/models/tig_random_forest_pipeline.json"
);

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "actual={actual} expected={expected}"
    );
}

fn bundled() -> RandomForestModel {
    let bytes = std::fs::read(BUNDLED_MODEL).expect("bundled model");
    RandomForestModel::from_json(&bytes).expect("valid artifact")
}

fn shared() -> SharedPredictor {
    Arc::new(bundled())
}

fn tic_groove() -> WeldingParameters {
    WeldingParameters {
        voltage_v: 12.0,
        current_a: 120.0,
        travel_speed_mm_s: 2.0,
        bead_width_mm: 6.0,
        weld_type: Some(WeldType::TicPowdered),
        groove: Some(GrooveType::Groove),
        ..Default::default()
    }
}

#[test]
fn bundled_model_matches_default_schema() {
    let model = bundled();
    assert!(check_schema_compat(&model, FeatureSchema::TigRfV1).is_ok());
    assert_eq!(model.info().estimators, 3);
    assert_eq!(model.info().target, "Hardness (HRC)");
}

#[test]
fn record_is_ordered_and_deterministic() {
    let valid = tic_groove().validate().unwrap();
    let a = assemble(FeatureSchema::TigRfV1, &valid).unwrap();
    let b = assemble(FeatureSchema::TigRfV1, &valid).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        a.names().collect::<Vec<_>>(),
        FeatureSchema::TigRfV1.names()
    );
    assert_eq!(a.get("Type"), Some(FeatureValue::Category("TiC Powdered")));
    assert_eq!(a.get("heat_input_J_per_mm"), Some(FeatureValue::Number(43_200.0)));
}

#[test]
fn predicts_mean_of_trees() {
    let model = bundled();
    // 43 200 J/mm, 120 A → 36.5 / Groove → 46.0 / 폭 6 mm, 12 V → 38.0
    let result = predict(&model, FeatureSchema::TigRfV1, &tic_groove()).unwrap();
    assert_close(result.predicted_hardness_hrc, (36.5 + 46.0 + 38.0) / 3.0);
    assert_close(result.heat_input_j_per_mm, 43_200.0);

    let low_heat = WeldingParameters {
        voltage_v: 10.0,
        current_a: 100.0,
        travel_speed_mm_s: 3.0,
        bead_width_mm: 3.0,
        groove: Some(GrooveType::NoGroove),
        ..tic_groove()
    };
    let result = predict(&model, FeatureSchema::TigRfV1, &low_heat).unwrap();
    assert_close(result.heat_input_j_per_mm, 20_000.0);
    assert_close(result.predicted_hardness_hrc, 44.0);
}

#[test]
fn same_inputs_same_prediction() {
    let model = bundled();
    let first = predict(&model, FeatureSchema::TigRfV1, &tic_groove()).unwrap();
    for _ in 0..5 {
        assert_eq!(predict(&model, FeatureSchema::TigRfV1, &tic_groove()).unwrap(), first);
    }
}

#[test]
fn missing_category_is_schema_error_not_default() {
    let params = WeldingParameters {
        groove: None,
        ..tic_groove()
    };
    let err = predict(&bundled(), FeatureSchema::TigRfV1, &params).unwrap_err();
    assert_eq!(
        err,
        PredictionError::Schema(SchemaMismatch::MissingField {
            schema: "tig-rf-v1",
            feature: "Groove",
        })
    );
}

#[test]
fn extended_schema_needs_method_and_geometry() {
    let valid = tic_groove().validate().unwrap();
    assert!(matches!(
        assemble(FeatureSchema::TigExtendedV1, &valid),
        Err(SchemaMismatch::MissingField { feature: "Method", .. })
    ));
}

#[test]
fn invalid_input_never_reaches_model() {
    let params = WeldingParameters {
        bead_width_mm: 0.0,
        ..tic_groove()
    };
    assert!(matches!(
        predict(&bundled(), FeatureSchema::TigRfV1, &params),
        Err(PredictionError::Validation(ValidationError::NotPositive { field: "bead_width", .. }))
    ));
}

#[test]
fn session_failure_keeps_previous_result() {
    let mut session = PredictionSession::new(shared(), FeatureSchema::TigRfV1, tic_groove());
    let ok = session.submit(tic_groove()).unwrap();
    assert_eq!(session.last_result(), Some(&ok));
    assert!(session.last_error().is_none());

    let bad = WeldingParameters {
        travel_speed_mm_s: 0.0,
        ..tic_groove()
    };
    assert!(session.submit(bad.clone()).is_err());
    assert_eq!(session.last_result(), Some(&ok));
    assert!(session.last_error().is_some());
    // 재시도 폼은 방금 제출한 값으로 채워진다
    assert_eq!(session.inputs(), &bad);

    session.submit(tic_groove()).unwrap();
    assert!(session.last_error().is_none());
}

#[test]
fn unknown_category_from_model_is_reported() {
    // 범주 이름이 다르게 학습된 모델은 TiC Powdered를 모른다
    let json = std::fs::read_to_string(BUNDLED_MODEL)
        .unwrap()
        .replace(r#""TiC Powdered""#, r#""TiC""#);
    let model = RandomForestModel::from_json(json.as_bytes()).unwrap();
    assert!(matches!(
        predict(&model, FeatureSchema::TigRfV1, &tic_groove()),
        Err(PredictionError::Predictor(ModelError::UnknownCategory { .. }))
    ));
}

#[test]
fn session_keeps_result_when_model_rejects_input() {
    let json = std::fs::read_to_string(BUNDLED_MODEL)
        .unwrap()
        .replace(r#""TiC Powdered""#, r#""TiC""#);
    let model: SharedPredictor = Arc::new(RandomForestModel::from_json(json.as_bytes()).unwrap());
    let normal = WeldingParameters {
        weld_type: Some(WeldType::Normal),
        ..tic_groove()
    };
    let mut session = PredictionSession::new(model, FeatureSchema::TigRfV1, normal.clone());
    let ok = session.submit(normal).unwrap();

    let err = session.submit(tic_groove()).unwrap_err();
    assert!(matches!(
        err,
        PredictionError::Predictor(ModelError::UnknownCategory { .. })
    ));
    assert_eq!(session.last_result(), Some(&ok));
    assert!(matches!(
        session.last_error(),
        Some(PredictionError::Predictor(_))
    ));
    assert_eq!(session.inputs(), &tic_groove());
}
