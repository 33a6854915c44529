use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tig_hardness_predictor::{
    app::{self, AppError},
    config,
    conversion::{self, ConversionError},
    i18n, logging, prediction,
    quantity::QuantityKind,
    report,
    welding::{GrooveType, WeldMethod, WeldType, WeldingParameters},
};

/// TIG 용접 조건으로 경도(HRC)를 예측하는 터미널 도구.
#[derive(Debug, Parser)]
#[command(name = "tig_hardness_predictor_cli", version, about)]
struct Cli {
    /// 설정 파일 경로
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// 표시 언어 (auto/ko/en)
    #[arg(short = 'L', long, default_value = "auto")]
    lang: String,
    /// 설정의 모델 경로 대신 사용할 파일
    #[arg(long)]
    model: Option<PathBuf>,
    /// 디버그 로그 출력
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 대화형 메뉴 없이 한 번 예측하고 끝낸다
    Predict(PredictArgs),
}

#[derive(Debug, Args)]
struct PredictArgs {
    #[arg(long)]
    voltage: f64,
    #[arg(long)]
    current: f64,
    /// 이송 속도 (`--speed-unit` 단위)
    #[arg(long)]
    travel_speed: f64,
    /// 비드 폭 (`--length-unit` 단위)
    #[arg(long)]
    bead_width: f64,
    /// 이송 속도 단위 (mm/s, mm/min, cm/min, in/min)
    #[arg(long, default_value = "mm/s")]
    speed_unit: String,
    /// 길이 단위 (mm, cm, in)
    #[arg(long, default_value = "mm")]
    length_unit: String,
    #[arg(long)]
    weld_type: Option<WeldType>,
    #[arg(long)]
    groove: Option<GrooveType>,
    #[arg(long)]
    method: Option<WeldMethod>,
    #[arg(long)]
    groove_depth: Option<f64>,
    #[arg(long)]
    filler_diameter: Option<f64>,
    /// 결과를 JSON으로 출력
    #[arg(long)]
    json: bool,
}

impl PredictArgs {
    /// 입력 단위를 내부 기준(mm/s, mm)으로 환산해 용접 조건을 만든다.
    fn to_params(&self) -> Result<WeldingParameters, ConversionError> {
        let base = QuantityKind::Length.base_symbol();
        let to_mm = |v: f64| conversion::convert(QuantityKind::Length, v, &self.length_unit, base);
        Ok(WeldingParameters {
            voltage_v: self.voltage,
            current_a: self.current,
            travel_speed_mm_s: conversion::convert(
                QuantityKind::TravelSpeed,
                self.travel_speed,
                &self.speed_unit,
                QuantityKind::TravelSpeed.base_symbol(),
            )?,
            bead_width_mm: to_mm(self.bead_width)?,
            groove_depth_mm: self.groove_depth.map(to_mm).transpose()?,
            filler_diameter_mm: self.filler_diameter.map(to_mm).transpose()?,
            weld_type: self.weld_type,
            groove: self.groove,
            method: self.method,
        })
    }
}

/// 프로그램의 엔트리 포인트. 설정과 모델을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("오류: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_run(cli: Cli) -> Result<ExitCode, AppError> {
    let (mut cfg, cfg_err) = config::load_or_fallback(&cli.config);
    logging::init(if cli.verbose { "debug" } else { cfg.log_level.as_str() });
    if let Some(e) = cfg_err {
        warn!(path = %cli.config.display(), error = %e, "config unavailable, using defaults");
    }
    if let Some(path) = cli.model {
        cfg.model.path = path;
    }
    let lang = i18n::resolve_language(&cli.lang, Some(cfg.language.as_str()));
    let tr = i18n::Translator::new_with_pack(&lang, cfg.language_pack_dir.as_deref());

    let predictor = match app::load_predictor(&cfg, app::print_progress(&tr)) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}: {e}", tr.t(i18n::keys::MODEL_LOAD_FAILED));
            return Ok(ExitCode::FAILURE);
        }
    };

    match cli.command {
        None => {
            app::run(&mut cfg, &tr, predictor)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Predict(args)) => {
            // 단위 오류도 입력 오류로 취급한다.
            let params = match args.to_params() {
                Ok(params) => params,
                Err(e) => {
                    eprintln!("{}: {e}", tr.t(i18n::keys::ERROR_PREFIX));
                    return Ok(ExitCode::from(2));
                }
            };
            match prediction::predict(predictor.as_ref(), cfg.model.schema, &params) {
                Ok(result) if args.json => {
                    let out = serde_json::to_string_pretty(&result)
                        .map_err(|e| AppError::Io(e.into()))?;
                    println!("{out}");
                    Ok(ExitCode::SUCCESS)
                }
                Ok(result) => {
                    for line in report::result_lines(&tr, &result, cfg.display.heat_input) {
                        println!("{line}");
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{}: {e}", tr.t(i18n::keys::ERROR_PREFIX));
                    Ok(ExitCode::from(2))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predict_args(extra: &[&str]) -> PredictArgs {
        let mut argv = vec![
            "tig_hardness_predictor_cli",
            "predict",
            "--voltage",
            "12",
            "--current",
            "150",
            "--travel-speed",
            "120",
            "--bead-width",
            "8",
        ];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Command::Predict(args)) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn one_shot_units_convert_to_base() {
        let params = predict_args(&["--speed-unit", "mm/min", "--length-unit", "cm"])
            .to_params()
            .unwrap();
        assert!((params.travel_speed_mm_s - 2.0).abs() < 1e-9);
        assert!((params.bead_width_mm - 80.0).abs() < 1e-9);
        assert_eq!(params.groove, None);
    }

    #[test]
    fn unknown_one_shot_unit_is_conversion_error() {
        let err = predict_args(&["--speed-unit", "furlong/h"]).to_params().unwrap_err();
        assert!(matches!(err, ConversionError::UnknownUnit(_)));
        let err = predict_args(&["--length-unit", "yd"]).to_params().unwrap_err();
        assert!(matches!(err, ConversionError::UnknownUnit(_)));
    }
}
