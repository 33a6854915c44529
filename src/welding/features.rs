//! 모델 입력 레코드(FeatureRecord) 구성.
//!
//! 스키마마다 (특성 이름, 추출 규칙) 목록을 정적으로 한 번만 정의하고,
//! 레코드는 항상 그 목록 순서대로 만든다. 모델은 이름과 순서가 학습 당시와
//! 정확히 같아야 하므로 호출마다 목록을 다시 조립하지 않는다.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::params::{ValidParameters, WeldingParameters};

/// 레코드 한 칸의 값.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Category(&'static str),
}

/// 입력 조건에서 특성 값을 꺼내는 규칙.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    WeldType,
    Groove,
    Method,
    Voltage,
    Current,
    TravelSpeed,
    BeadWidth,
    GrooveDepth,
    FillerDiameter,
    HeatInput,
}

/// 스키마의 한 항목.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub rule: Extract,
}

const fn field(name: &'static str, rule: Extract) -> FeatureSpec {
    FeatureSpec { name, rule }
}

static TIG_RF_V1: [FeatureSpec; 7] = [
    field("Type", Extract::WeldType),
    field("Groove", Extract::Groove),
    field("Voltage (V)", Extract::Voltage),
    field("Current (A)", Extract::Current),
    field("Travel_Speed (mm/s)", Extract::TravelSpeed),
    field("Bead_Width (mm)", Extract::BeadWidth),
    field("heat_input_J_per_mm", Extract::HeatInput),
];

static TIG_EXTENDED_V1: [FeatureSpec; 10] = [
    field("Method", Extract::Method),
    field("Type", Extract::WeldType),
    field("Groove", Extract::Groove),
    field("Voltage (V)", Extract::Voltage),
    field("Current (A)", Extract::Current),
    field("Travel_Speed (mm/s)", Extract::TravelSpeed),
    field("Bead_Width (mm)", Extract::BeadWidth),
    field("Groove_Depth (mm)", Extract::GrooveDepth),
    field("Filler_Diameter (mm)", Extract::FillerDiameter),
    field("heat_input_J_per_mm", Extract::HeatInput),
];

/// 모델 아티팩트가 학습된 입력 스키마.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureSchema {
    /// 랜덤 포레스트 파이프라인 기본 스키마 (입열량 J/mm)
    #[default]
    #[serde(rename = "tig-rf-v1")]
    TigRfV1,
    /// 공법/개선 깊이/용가재 지름을 포함한 확장 스키마
    #[serde(rename = "tig-extended-v1")]
    TigExtendedV1,
}

impl FeatureSchema {
    pub const ALL: [FeatureSchema; 2] = [FeatureSchema::TigRfV1, FeatureSchema::TigExtendedV1];

    pub fn id(&self) -> &'static str {
        match self {
            FeatureSchema::TigRfV1 => "tig-rf-v1",
            FeatureSchema::TigExtendedV1 => "tig-extended-v1",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id.trim())
    }

    /// 순서가 고정된 특성 목록.
    pub fn fields(&self) -> &'static [FeatureSpec] {
        match self {
            FeatureSchema::TigRfV1 => &TIG_RF_V1,
            FeatureSchema::TigExtendedV1 => &TIG_EXTENDED_V1,
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.fields().iter().map(|f| f.name).collect()
    }

    /// 이 스키마가 요구하는 추출 규칙인지 확인한다. 폼에서 선택 입력칸 노출 여부에 쓴다.
    pub fn requires(&self, rule: Extract) -> bool {
        self.fields().iter().any(|f| f.rule == rule)
    }
}

/// 레코드 구성 또는 모델 입력 검사 시의 스키마 불일치.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    #[error("스키마 {schema}에 필요한 항목 '{feature}'이(가) 입력되지 않았습니다")]
    MissingField {
        schema: &'static str,
        feature: &'static str,
    },
    #[error("모델 입력 항목 불일치: 모델={expected:?}, 레코드={actual:?}")]
    KeyMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

/// 모델에 넘길 순서 있는 (이름, 값) 목록.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    schema: FeatureSchema,
    entries: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRecord {
    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, FeatureValue)> + '_ {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 레코드의 이름 목록이 모델이 기대하는 목록과 순서까지 같은지 검사한다.
    pub fn check_against(&self, expected: &[String]) -> Result<(), SchemaMismatch> {
        let same = self.entries.len() == expected.len()
            && self.names().zip(expected).all(|(a, b)| a == b.as_str());
        if same {
            Ok(())
        } else {
            Err(SchemaMismatch::KeyMismatch {
                expected: expected.to_vec(),
                actual: self.names().map(str::to_string).collect(),
            })
        }
    }
}

fn extract(rule: Extract, p: &WeldingParameters, heat_input: f64) -> Option<FeatureValue> {
    use FeatureValue::*;
    match rule {
        Extract::WeldType => p.weld_type.map(|t| Category(t.label())),
        Extract::Groove => p.groove.map(|g| Category(g.label())),
        Extract::Method => p.method.map(|m| Category(m.label())),
        Extract::Voltage => Some(Number(p.voltage_v)),
        Extract::Current => Some(Number(p.current_a)),
        Extract::TravelSpeed => Some(Number(p.travel_speed_mm_s)),
        Extract::BeadWidth => Some(Number(p.bead_width_mm)),
        Extract::GrooveDepth => p.groove_depth_mm.map(Number),
        Extract::FillerDiameter => p.filler_diameter_mm.map(Number),
        Extract::HeatInput => Some(Number(heat_input)),
    }
}

/// 검증된 입력 조건을 스키마 순서대로 레코드로 만든다.
///
/// 스키마가 요구하는 값이 비어 있으면 기본값으로 채우지 않고 [`SchemaMismatch::MissingField`]를 반환한다.
pub fn assemble(
    schema: FeatureSchema,
    params: &ValidParameters,
) -> Result<FeatureRecord, SchemaMismatch> {
    let p = params.get();
    let heat_input = params.heat_input_j_per_mm();
    let entries = schema
        .fields()
        .iter()
        .map(|f| {
            extract(f.rule, p, heat_input)
                .map(|v| (f.name, v))
                .ok_or(SchemaMismatch::MissingField {
                    schema: schema.id(),
                    feature: f.name,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(schema = schema.id(), fields = entries.len(), "feature record assembled");
    Ok(FeatureRecord { schema, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::welding::params::{GrooveType, WeldMethod, WeldType};

    #[test]
    fn rf_v1_order_is_fixed() {
        let valid = WeldingParameters::default().validate().unwrap();
        let record = assemble(FeatureSchema::TigRfV1, &valid).unwrap();
        let names: Vec<_> = record.names().collect();
        assert_eq!(
            names,
            [
                "Type",
                "Groove",
                "Voltage (V)",
                "Current (A)",
                "Travel_Speed (mm/s)",
                "Bead_Width (mm)",
                "heat_input_J_per_mm",
            ]
        );
        assert_eq!(record.schema(), FeatureSchema::TigRfV1);
        assert_eq!(record.len(), 7);
        assert!(!record.is_empty());
        assert_eq!(record.get("Type"), Some(FeatureValue::Category("Normal")));
        assert_eq!(
            record.get("heat_input_J_per_mm"),
            Some(FeatureValue::Number(300_000.0))
        );
    }

    #[test]
    fn extended_schema_needs_method() {
        let params = WeldingParameters {
            groove_depth_mm: Some(1.0),
            filler_diameter_mm: Some(2.4),
            ..Default::default()
        };
        let valid = params.validate().unwrap();
        assert_eq!(
            assemble(FeatureSchema::TigExtendedV1, &valid),
            Err(SchemaMismatch::MissingField {
                schema: "tig-extended-v1",
                feature: "Method"
            })
        );
    }

    #[test]
    fn extended_schema_complete() {
        let params = WeldingParameters {
            weld_type: Some(WeldType::TicPowdered),
            groove: Some(GrooveType::Groove),
            method: Some(WeldMethod::TigPulse),
            groove_depth_mm: Some(1.5),
            filler_diameter_mm: Some(2.4),
            ..Default::default()
        };
        let record = assemble(FeatureSchema::TigExtendedV1, &params.validate().unwrap()).unwrap();
        assert_eq!(record.len(), 10);
        assert_eq!(record.get("Method"), Some(FeatureValue::Category("TIG-Pulse")));
    }

    #[test]
    fn key_check_detects_reordering() {
        let valid = WeldingParameters::default().validate().unwrap();
        let record = assemble(FeatureSchema::TigRfV1, &valid).unwrap();
        let mut expected: Vec<String> =
            FeatureSchema::TigRfV1.names().into_iter().map(String::from).collect();
        assert!(record.check_against(&expected).is_ok());
        expected.swap(0, 1);
        assert!(matches!(
            record.check_against(&expected),
            Err(SchemaMismatch::KeyMismatch { .. })
        ));
    }

    #[test]
    fn schema_ids_round_trip() {
        for schema in FeatureSchema::ALL {
            assert_eq!(FeatureSchema::from_id(schema.id()), Some(schema));
        }
        assert_eq!(FeatureSchema::from_id("nope"), None);
    }
}
