use thiserror::Error;

use crate::quantity::QuantityKind;
use crate::units::*;

/// 단위 변환 시 발생 가능한 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// 알 수 없는 단위 문자열
    #[error("알 수 없는 단위: {0}")]
    UnknownUnit(String),
}

/// 문자열로 전달된 단위명을 enum으로 변환한 뒤 지정된 단위로 환산한다.
///
/// 단위 문자열 예시는 `mm/s`, `mm/min`, `ipm`, `in`, `kJ/mm` 등을 사용할 수 있다.
pub fn convert(
    kind: QuantityKind,
    value: f64,
    from_unit_str: &str,
    to_unit_str: &str,
) -> Result<f64, ConversionError> {
    match kind {
        QuantityKind::TravelSpeed => {
            let from = parse_velocity_unit(from_unit_str)?;
            let to = parse_velocity_unit(to_unit_str)?;
            Ok(convert_velocity(value, from, to))
        }
        QuantityKind::Length => {
            let from = parse_length_unit(from_unit_str)?;
            let to = parse_length_unit(to_unit_str)?;
            Ok(convert_length(value, from, to))
        }
        QuantityKind::HeatInput => {
            let from = parse_heat_input_unit(from_unit_str)?;
            let to = parse_heat_input_unit(to_unit_str)?;
            Ok(convert_heat_input(value, from, to))
        }
    }
}

/// 이송 속도 단위 문자열을 해석한다.
pub fn parse_velocity_unit(s: &str) -> Result<VelocityUnit, ConversionError> {
    match s.trim().to_lowercase().as_str() {
        "mm/s" | "mmps" => Ok(VelocityUnit::MillimeterPerSecond),
        "mm/min" | "mmpm" => Ok(VelocityUnit::MillimeterPerMinute),
        "cm/min" | "cpm" => Ok(VelocityUnit::CentimeterPerMinute),
        "in/min" | "ipm" => Ok(VelocityUnit::InchPerMinute),
        other => Err(ConversionError::UnknownUnit(other.to_string())),
    }
}

/// 길이 단위 문자열을 해석한다.
pub fn parse_length_unit(s: &str) -> Result<LengthUnit, ConversionError> {
    match s.trim().to_lowercase().as_str() {
        "mm" => Ok(LengthUnit::Millimeter),
        "cm" => Ok(LengthUnit::Centimeter),
        "in" | "inch" | "\"" => Ok(LengthUnit::Inch),
        other => Err(ConversionError::UnknownUnit(other.to_string())),
    }
}

/// 입열량 단위 문자열을 해석한다.
pub fn parse_heat_input_unit(s: &str) -> Result<HeatInputUnit, ConversionError> {
    match s.trim().to_lowercase().as_str() {
        "j/mm" => Ok(HeatInputUnit::JoulePerMillimeter),
        "kj/mm" => Ok(HeatInputUnit::KilojoulePerMillimeter),
        "j/in" => Ok(HeatInputUnit::JoulePerInch),
        "kj/in" => Ok(HeatInputUnit::KilojoulePerInch),
        other => Err(ConversionError::UnknownUnit(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_speed_mm_per_min_to_mm_per_s() {
        let v = convert(QuantityKind::TravelSpeed, 120.0, "mm/min", "mm/s").unwrap();
        assert!((v - 2.0).abs() < 1e-12);
    }

    #[test]
    fn unit_strings_are_case_insensitive() {
        assert_eq!(parse_heat_input_unit("KJ/MM"), Ok(HeatInputUnit::KilojoulePerMillimeter));
        assert_eq!(parse_length_unit(" In "), Ok(LengthUnit::Inch));
    }

    #[test]
    fn unknown_unit_is_reported() {
        let err = convert(QuantityKind::Length, 1.0, "furlong", "mm").unwrap_err();
        assert_eq!(err, ConversionError::UnknownUnit("furlong".into()));
    }
}
