use serde::{Deserialize, Serialize};

/// 용접 이송 속도 단위. 내부 기준은 mm/s이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VelocityUnit {
    MillimeterPerSecond,
    MillimeterPerMinute,
    CentimeterPerMinute,
    InchPerMinute,
}

fn to_mm_per_s(value: f64, unit: VelocityUnit) -> f64 {
    match unit {
        VelocityUnit::MillimeterPerSecond => value,
        VelocityUnit::MillimeterPerMinute => value / 60.0,
        VelocityUnit::CentimeterPerMinute => value * 10.0 / 60.0,
        VelocityUnit::InchPerMinute => value * 25.4 / 60.0,
    }
}

fn from_mm_per_s(value: f64, unit: VelocityUnit) -> f64 {
    match unit {
        VelocityUnit::MillimeterPerSecond => value,
        VelocityUnit::MillimeterPerMinute => value * 60.0,
        VelocityUnit::CentimeterPerMinute => value * 60.0 / 10.0,
        VelocityUnit::InchPerMinute => value * 60.0 / 25.4,
    }
}

/// 속도를 변환한다.
pub fn convert_velocity(value: f64, from: VelocityUnit, to: VelocityUnit) -> f64 {
    let base = to_mm_per_s(value, from);
    from_mm_per_s(base, to)
}

/// 입력 속도를 내부 기준(mm/s)으로 환산한다.
pub fn velocity_to_mm_per_s(value: f64, unit: VelocityUnit) -> f64 {
    to_mm_per_s(value, unit)
}
