use std::io::{self, Write};

use crate::app::AppError;
use crate::config::Config;
use crate::conversion;
use crate::i18n::{keys, Translator};
use crate::prediction::PredictionSession;
use crate::report;
use crate::units::{
    convert_length, convert_velocity, length_to_mm, velocity_to_mm_per_s, LengthUnit,
    VelocityUnit,
};
use crate::welding::{Extract, GrooveType, WeldMethod, WeldType, WeldingParameters};

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Predict,
    ModelInfo,
    Settings,
    Exit,
}

/// 메인 메뉴를 표시하고 선택값을 반환한다. 입력이 닫히면 종료로 본다.
pub fn main_menu(tr: &Translator) -> Result<MenuChoice, AppError> {
    println!("{}", tr.t(keys::MAIN_MENU_TITLE));
    println!("{}", tr.t(keys::MAIN_MENU_PREDICT));
    println!("{}", tr.t(keys::MAIN_MENU_MODEL_INFO));
    println!("{}", tr.t(keys::MAIN_MENU_SETTINGS));
    println!("{}", tr.t(keys::MAIN_MENU_EXIT));
    loop {
        let sel = match read_line(&tr.t(keys::PROMPT_MENU_SELECT)) {
            Err(AppError::InputClosed) => return Ok(MenuChoice::Exit),
            other => other?,
        };
        match sel.trim() {
            "1" => return Ok(MenuChoice::Predict),
            "2" => return Ok(MenuChoice::ModelInfo),
            "3" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("{}", tr.t(keys::INVALID_SELECTION_RETRY)),
        }
    }
}

/// 입력 폼을 받아 예측하고 결과를 출력한다. 예측 실패는 화면에 알리고 세션을 이어간다.
pub fn handle_predict(
    tr: &Translator,
    cfg: &Config,
    session: &mut PredictionSession,
) -> Result<(), AppError> {
    println!("{}", tr.t(keys::FORM_HEADING));
    println!("{}", tr.t(keys::FORM_KEEP_HINT));
    let params = read_form(tr, cfg, session)?;
    match session.submit(params) {
        Ok(result) => {
            println!();
            for line in report::result_lines(tr, &result, cfg.display.heat_input) {
                println!("{line}");
            }
        }
        Err(e) => {
            println!("{}: {e}", tr.t(keys::ERROR_PREFIX));
            if session.last_result().is_some() {
                println!("{}", tr.t(keys::RESULT_KEPT_PREVIOUS));
            }
        }
    }
    Ok(())
}

fn read_form(
    tr: &Translator,
    cfg: &Config,
    session: &PredictionSession,
) -> Result<WeldingParameters, AppError> {
    let prev = session.inputs().clone();
    let schema = session.schema();
    let speed_unit = cfg.display.travel_speed;
    let len_unit = cfg.display.length;

    let weld_type = read_choice(
        &tr.t(keys::LABEL_WELD_TYPE),
        &WeldType::ALL,
        WeldType::label,
        prev.weld_type,
    )?;
    let groove = read_choice(
        &tr.t(keys::LABEL_GROOVE),
        &GrooveType::ALL,
        GrooveType::label,
        prev.groove,
    )?;
    let method = if schema.requires(Extract::Method) {
        read_choice(
            &tr.t(keys::LABEL_METHOD),
            &WeldMethod::ALL,
            WeldMethod::label,
            prev.method,
        )?
    } else {
        prev.method
    };

    let voltage_v = read_f64_or(tr, &tr.t(keys::LABEL_VOLTAGE), prev.voltage_v)?;
    let current_a = read_f64_or(tr, &tr.t(keys::LABEL_CURRENT), prev.current_a)?;
    let speed_label = format!("{} [{}]", tr.t(keys::LABEL_TRAVEL_SPEED), velocity_symbol(speed_unit));
    let speed_prev = convert_velocity(
        prev.travel_speed_mm_s,
        VelocityUnit::MillimeterPerSecond,
        speed_unit,
    );
    let travel_speed_mm_s = velocity_to_mm_per_s(read_f64_or(tr, &speed_label, speed_prev)?, speed_unit);
    let bead_width_mm = read_length(tr, keys::LABEL_BEAD_WIDTH, len_unit, Some(prev.bead_width_mm))?
        .unwrap_or(prev.bead_width_mm);

    let groove_depth_mm = if schema.requires(Extract::GrooveDepth) {
        read_length(tr, keys::LABEL_GROOVE_DEPTH, len_unit, prev.groove_depth_mm)?
    } else {
        prev.groove_depth_mm
    };
    let filler_diameter_mm = if schema.requires(Extract::FillerDiameter) {
        read_length(tr, keys::LABEL_FILLER_DIAMETER, len_unit, prev.filler_diameter_mm)?
    } else {
        prev.filler_diameter_mm
    };

    Ok(WeldingParameters {
        voltage_v,
        current_a,
        travel_speed_mm_s,
        bead_width_mm,
        groove_depth_mm,
        filler_diameter_mm,
        weld_type,
        groove,
        method,
    })
}

/// 모델 정보를 출력한다.
pub fn show_model_info(tr: &Translator, session: &PredictionSession) {
    println!("\n-- {} --", tr.t(keys::MODEL_DETAILS_HEADING));
    for line in report::model_info_lines(tr, &session.model_info(), session.schema()) {
        println!("- {line}");
    }
}

/// 설정 메뉴를 처리한다. 입력/표시 단위를 바꾼다.
pub fn handle_settings(tr: &Translator, cfg: &mut Config) -> Result<(), AppError> {
    println!("{}", tr.t(keys::SETTINGS_HEADING));

    println!("{}: {}", tr.t(keys::SETTINGS_HEAT_UNIT), cfg.display.heat_input.symbol());
    if let Some(s) = read_optional(&tr.t(keys::SETTINGS_PROMPT_CHANGE))? {
        match conversion::parse_heat_input_unit(&s) {
            Ok(u) => cfg.display.heat_input = u,
            Err(_) => println!("{}", tr.t(keys::SETTINGS_INVALID)),
        }
    }

    println!(
        "{}: {}",
        tr.t(keys::SETTINGS_SPEED_UNIT),
        velocity_symbol(cfg.display.travel_speed)
    );
    if let Some(s) = read_optional(&tr.t(keys::SETTINGS_PROMPT_CHANGE))? {
        match conversion::parse_velocity_unit(&s) {
            Ok(u) => cfg.display.travel_speed = u,
            Err(_) => println!("{}", tr.t(keys::SETTINGS_INVALID)),
        }
    }

    println!("{}: {}", tr.t(keys::SETTINGS_LENGTH_UNIT), length_symbol(cfg.display.length));
    if let Some(s) = read_optional(&tr.t(keys::SETTINGS_PROMPT_CHANGE))? {
        match conversion::parse_length_unit(&s) {
            Ok(u) => cfg.display.length = u,
            Err(_) => println!("{}", tr.t(keys::SETTINGS_INVALID)),
        }
    }
    Ok(())
}

pub fn velocity_symbol(unit: VelocityUnit) -> &'static str {
    match unit {
        VelocityUnit::MillimeterPerSecond => "mm/s",
        VelocityUnit::MillimeterPerMinute => "mm/min",
        VelocityUnit::CentimeterPerMinute => "cm/min",
        VelocityUnit::InchPerMinute => "in/min",
    }
}

pub fn length_symbol(unit: LengthUnit) -> &'static str {
    match unit {
        LengthUnit::Millimeter => "mm",
        LengthUnit::Centimeter => "cm",
        LengthUnit::Inch => "in",
    }
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    if io::stdin().read_line(&mut buf)? == 0 {
        return Err(AppError::InputClosed);
    }
    Ok(buf)
}

fn read_optional(prompt: &str) -> Result<Option<String>, AppError> {
    let s = read_line(prompt)?;
    let s = s.trim();
    Ok((!s.is_empty()).then(|| s.to_string()))
}

/// 숫자를 읽는다. 빈 입력이면 이전 값을 유지한다.
fn read_f64_or(tr: &Translator, label: &str, prev: f64) -> Result<f64, AppError> {
    loop {
        match read_optional(&format!("{label} [{prev}]: "))? {
            None => return Ok(prev),
            Some(s) => match s.parse::<f64>() {
                Ok(v) => return Ok(v),
                Err(_) => println!("{}", tr.t(keys::ERROR_INVALID_NUMBER)),
            },
        }
    }
}

/// 길이 입력을 설정 단위로 받아 mm로 환산한다. 이전 값이 없고 빈 입력이면 `None`.
fn read_length(
    tr: &Translator,
    key: &str,
    unit: LengthUnit,
    prev_mm: Option<f64>,
) -> Result<Option<f64>, AppError> {
    let label = format!("{} [{}]", tr.t(key), length_symbol(unit));
    let prev = prev_mm.map(|mm| convert_length(mm, LengthUnit::Millimeter, unit));
    loop {
        let shown = prev.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
        match read_optional(&format!("{label} [{shown}]: "))? {
            None => return Ok(prev_mm),
            Some(s) => match s.parse::<f64>() {
                Ok(v) => return Ok(Some(length_to_mm(v, unit))),
                Err(_) => println!("{}", tr.t(keys::ERROR_INVALID_NUMBER)),
            },
        }
    }
}

/// 번호 목록에서 하나를 고른다. 빈 입력이면 이전 선택을 유지한다.
fn read_choice<T: Copy + PartialEq>(
    label: &str,
    options: &[T],
    name: fn(&T) -> &'static str,
    prev: Option<T>,
) -> Result<Option<T>, AppError> {
    let list: Vec<String> = options
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{}={}", i + 1, name(o)))
        .collect();
    let shown = prev.as_ref().map(name).unwrap_or("-");
    loop {
        match read_optional(&format!("{label} ({}) [{shown}]: ", list.join(" ")))? {
            None => return Ok(prev),
            Some(s) => {
                if let Some(v) = s
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| options.get(i))
                {
                    return Ok(Some(*v));
                }
                if let Some(v) = options.iter().find(|o| name(o).eq_ignore_ascii_case(&s)) {
                    return Ok(Some(*v));
                }
            }
        }
    }
}
