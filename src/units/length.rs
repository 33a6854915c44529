use serde::{Deserialize, Serialize};

/// 길이 단위. 내부 기준은 밀리미터이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    Millimeter,
    Centimeter,
    Inch,
}

fn to_mm(value: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Millimeter => value,
        LengthUnit::Centimeter => value * 10.0,
        LengthUnit::Inch => value * 25.4,
    }
}

fn from_mm(value_mm: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Millimeter => value_mm,
        LengthUnit::Centimeter => value_mm / 10.0,
        LengthUnit::Inch => value_mm / 25.4,
    }
}

/// 길이를 다른 단위로 변환한다.
pub fn convert_length(value: f64, from: LengthUnit, to: LengthUnit) -> f64 {
    let mm = to_mm(value, from);
    from_mm(mm, to)
}

/// 입력 길이를 내부 기준(mm)으로 환산한다.
pub fn length_to_mm(value: f64, unit: LengthUnit) -> f64 {
    to_mm(value, unit)
}
