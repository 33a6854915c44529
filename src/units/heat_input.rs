use serde::{Deserialize, Serialize};

/// 입열량(선 에너지) 표시 단위. 내부 기준은 J/mm이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeatInputUnit {
    JoulePerMillimeter,
    KilojoulePerMillimeter,
    JoulePerInch,
    KilojoulePerInch,
}

impl HeatInputUnit {
    /// 화면 표시용 단위 기호.
    pub fn symbol(&self) -> &'static str {
        match self {
            HeatInputUnit::JoulePerMillimeter => "J/mm",
            HeatInputUnit::KilojoulePerMillimeter => "kJ/mm",
            HeatInputUnit::JoulePerInch => "J/in",
            HeatInputUnit::KilojoulePerInch => "kJ/in",
        }
    }
}

fn to_j_per_mm(value: f64, unit: HeatInputUnit) -> f64 {
    match unit {
        HeatInputUnit::JoulePerMillimeter => value,
        HeatInputUnit::KilojoulePerMillimeter => value * 1000.0,
        HeatInputUnit::JoulePerInch => value / 25.4,
        HeatInputUnit::KilojoulePerInch => value * 1000.0 / 25.4,
    }
}

fn from_j_per_mm(value: f64, unit: HeatInputUnit) -> f64 {
    match unit {
        HeatInputUnit::JoulePerMillimeter => value,
        HeatInputUnit::KilojoulePerMillimeter => value / 1000.0,
        HeatInputUnit::JoulePerInch => value * 25.4,
        HeatInputUnit::KilojoulePerInch => value * 25.4 / 1000.0,
    }
}

/// 입열량을 변환한다.
pub fn convert_heat_input(value: f64, from: HeatInputUnit, to: HeatInputUnit) -> f64 {
    let base = to_j_per_mm(value, from);
    from_j_per_mm(base, to)
}

/// 내부 기준(J/mm) 값을 표시 단위로 바꾼다.
pub fn heat_input_from_j_per_mm(value_j_per_mm: f64, unit: HeatInputUnit) -> f64 {
    from_j_per_mm(value_j_per_mm, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kj_per_mm_is_thousandth() {
        let v = heat_input_from_j_per_mm(21_600.0, HeatInputUnit::KilojoulePerMillimeter);
        assert!((v - 21.6).abs() < 1e-9);
    }

    #[test]
    fn inch_conversion_back_and_forth() {
        let per_in = convert_heat_input(
            100.0,
            HeatInputUnit::JoulePerMillimeter,
            HeatInputUnit::JoulePerInch,
        );
        assert!((per_in - 2540.0).abs() < 1e-9);
    }
}
