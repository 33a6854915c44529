use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::heat_input::heat_input_j_per_mm;

/// 용접 종류. 모델 학습 시 사용한 범주 라벨과 1:1로 대응한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeldType {
    Normal,
    TicPowdered,
}

impl WeldType {
    pub const ALL: [WeldType; 2] = [WeldType::Normal, WeldType::TicPowdered];

    /// 모델이 기대하는 범주 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            WeldType::Normal => "Normal",
            WeldType::TicPowdered => "TiC Powdered",
        }
    }
}

/// 개선(그루브) 여부.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrooveType {
    NoGroove,
    Groove,
}

impl GrooveType {
    pub const ALL: [GrooveType; 2] = [GrooveType::NoGroove, GrooveType::Groove];

    pub fn label(&self) -> &'static str {
        match self {
            GrooveType::NoGroove => "No Groove",
            GrooveType::Groove => "Groove",
        }
    }
}

/// 용접 공법.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeldMethod {
    Tig,
    TigPulse,
    Mig,
    Other,
}

impl WeldMethod {
    pub const ALL: [WeldMethod; 4] = [
        WeldMethod::Tig,
        WeldMethod::TigPulse,
        WeldMethod::Mig,
        WeldMethod::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WeldMethod::Tig => "TIG",
            WeldMethod::TigPulse => "TIG-Pulse",
            WeldMethod::Mig => "MIG",
            WeldMethod::Other => "Other",
        }
    }
}

fn parse_label<T: Copy>(s: &str, all: &[T], label: fn(&T) -> &'static str) -> Result<T, String> {
    let wanted: String = s.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_lowercase();
    all.iter()
        .copied()
        .find(|v| {
            let l: String = label(v).chars().filter(|c| c.is_alphanumeric()).collect();
            l.to_lowercase() == wanted
        })
        .ok_or_else(|| {
            let names: Vec<_> = all.iter().map(label).collect();
            format!("'{s}' 은(는) 허용 값이 아닙니다 ({})", names.join(", "))
        })
}

impl FromStr for WeldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, &Self::ALL, Self::label)
    }
}

impl FromStr for GrooveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, &Self::ALL, Self::label)
    }
}

impl FromStr for WeldMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, &Self::ALL, Self::label)
    }
}

/// 사용자가 입력한 용접 조건. 예측 1회마다 새로 만들어진다.
///
/// 수치 단위는 항상 내부 기준(V, A, mm/s, mm)이다. 다른 단위 입력은
/// 폼 단계에서 [`crate::units`]로 환산한 뒤 채운다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeldingParameters {
    /// 아크 전압 [V]
    pub voltage_v: f64,
    /// 용접 전류 [A]
    pub current_a: f64,
    /// 이송 속도 [mm/s]
    pub travel_speed_mm_s: f64,
    /// 비드 폭 [mm]
    pub bead_width_mm: f64,
    /// 개선 깊이 [mm]
    pub groove_depth_mm: Option<f64>,
    /// 용가재 지름 [mm]
    pub filler_diameter_mm: Option<f64>,
    pub weld_type: Option<WeldType>,
    pub groove: Option<GrooveType>,
    pub method: Option<WeldMethod>,
}

impl Default for WeldingParameters {
    fn default() -> Self {
        Self {
            voltage_v: 100.0,
            current_a: 100.0,
            travel_speed_mm_s: 2.0,
            bead_width_mm: 2.5,
            groove_depth_mm: None,
            filler_diameter_mm: None,
            weld_type: Some(WeldType::Normal),
            groove: Some(GrooveType::NoGroove),
            method: None,
        }
    }
}

/// 입력 범위 검증 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} 값이 숫자가 아닙니다")]
    NotFinite { field: &'static str },
    #[error("{field} 값은 0보다 커야 합니다 (입력: {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} 값은 음수일 수 없습니다 (입력: {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} 값은 {min} 이상이어야 합니다 (입력: {value})")]
    BelowMinimum {
        field: &'static str,
        min: f64,
        value: f64,
    },
}

/// 이송 속도 하한 [mm/s]. 입력 폼의 최소값과 같다.
pub const MIN_TRAVEL_SPEED_MM_S: f64 = 0.1;
/// 비드 폭 하한 [mm].
pub const MIN_BEAD_WIDTH_MM: f64 = 0.1;

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(value)
}

pub(crate) fn require_at_least(
    field: &'static str,
    value: f64,
    min: f64,
) -> Result<f64, ValidationError> {
    let value = require_positive(field, value)?;
    if value < min {
        return Err(ValidationError::BelowMinimum { field, min, value });
    }
    Ok(value)
}

fn require_non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}

/// 범위 검증을 통과한 용접 조건과 그로부터 계산한 입열량. 생성 이후 변경되지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidParameters {
    params: WeldingParameters,
    heat_input_j_per_mm: f64,
}

impl ValidParameters {
    pub fn get(&self) -> &WeldingParameters {
        &self.params
    }

    /// 입열량 [J/mm]
    pub fn heat_input_j_per_mm(&self) -> f64 {
        self.heat_input_j_per_mm
    }
}

impl WeldingParameters {
    /// 수치 입력 범위를 검사한다. 범주형 필드의 누락은 여기서 보지 않고
    /// 스키마별 레코드 구성 단계에서 판정한다.
    pub fn validate(&self) -> Result<ValidParameters, ValidationError> {
        require_positive("voltage", self.voltage_v)?;
        require_positive("current", self.current_a)?;
        require_at_least("travel_speed", self.travel_speed_mm_s, MIN_TRAVEL_SPEED_MM_S)?;
        require_at_least("bead_width", self.bead_width_mm, MIN_BEAD_WIDTH_MM)?;
        if let Some(depth) = self.groove_depth_mm {
            require_non_negative("groove_depth", depth)?;
        }
        if let Some(dia) = self.filler_diameter_mm {
            require_non_negative("filler_diameter", dia)?;
        }
        let heat_input_j_per_mm =
            heat_input_j_per_mm(self.voltage_v, self.current_a, self.travel_speed_mm_s)?;
        Ok(ValidParameters {
            params: self.clone(),
            heat_input_j_per_mm,
        })
    }
}
