use super::params::{require_positive, ValidationError};

/// 분(min) 기준 보정 계수. 학습 데이터의 입열량 열이 이 계수로 산출되었다.
const SECONDS_PER_MINUTE: f64 = 60.0;

/// 입열량 [J/mm]을 계산한다.
///
/// Q = V × I × 60 / S. 이송 속도가 0 이하이면 계산하지 않고 검증 오류를 반환한다.
/// 0 나눗셈을 피하려고 분모에 작은 값을 더하지 않는다. 폼 하한
/// ([`super::params::MIN_TRAVEL_SPEED_MM_S`])은 [`super::WeldingParameters::validate`]에서 본다.
pub fn heat_input_j_per_mm(
    voltage_v: f64,
    current_a: f64,
    travel_speed_mm_s: f64,
) -> Result<f64, ValidationError> {
    let v = require_positive("voltage", voltage_v)?;
    let i = require_positive("current", current_a)?;
    let s = require_positive("travel_speed", travel_speed_mm_s)?;
    let q = v * i * SECONDS_PER_MINUTE / s;
    if !q.is_finite() {
        return Err(ValidationError::NotFinite { field: "heat_input" });
    }
    Ok(q)
}
