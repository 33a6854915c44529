use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::model::ModelSource;
use crate::units::*;
use crate::welding::{FeatureSchema, GrooveType, WeldType, WeldingParameters};

/// 기본 설정 파일 이름.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 모델 아티팩트 위치와 입력 스키마 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// 로컬 캐시 경로
    pub path: PathBuf,
    /// 로컬에 없을 때 받아올 URL
    pub url: Option<String>,
    /// 기대 SHA-256
    pub sha256: Option<String>,
    pub timeout_secs: u64,
    /// 모델이 학습된 입력 스키마
    pub schema: FeatureSchema,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/tig_random_forest_pipeline.json"),
            url: None,
            sha256: None,
            timeout_secs: 60,
            schema: FeatureSchema::TigRfV1,
        }
    }
}

impl ModelConfig {
    pub fn source(&self) -> ModelSource {
        ModelSource {
            path: self.path.clone(),
            url: self.url.clone().filter(|u| !u.trim().is_empty()),
            sha256: self.sha256.clone().filter(|s| !s.trim().is_empty()),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        }
    }
}

/// 입력/표시 단위 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayUnits {
    pub heat_input: HeatInputUnit,
    pub travel_speed: VelocityUnit,
    pub length: LengthUnit,
}

impl Default for DisplayUnits {
    fn default() -> Self {
        Self {
            heat_input: HeatInputUnit::JoulePerMillimeter,
            travel_speed: VelocityUnit::MillimeterPerSecond,
            length: LengthUnit::Millimeter,
        }
    }
}

/// 폼 초기값. 값은 내부 기준 단위(V, A, mm/s, mm)이다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub voltage_v: f64,
    pub current_a: f64,
    pub travel_speed_mm_s: f64,
    pub bead_width_mm: f64,
    pub weld_type: WeldType,
    pub groove: GrooveType,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            voltage_v: 100.0,
            current_a: 100.0,
            travel_speed_mm_s: 2.0,
            bead_width_mm: 2.5,
            weld_type: WeldType::Normal,
            groove: GrooveType::NoGroove,
        }
    }
}

impl FormDefaults {
    pub fn to_parameters(&self) -> WeldingParameters {
        WeldingParameters {
            voltage_v: self.voltage_v,
            current_a: self.current_a,
            travel_speed_mm_s: self.travel_speed_mm_s,
            bead_width_mm: self.bead_width_mm,
            weld_type: Some(self.weld_type),
            groove: Some(self.groove),
            ..WeldingParameters::default()
        }
    }
}

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 언어 코드 (auto/ko/en-us)
    pub language: String,
    /// 외부 언어팩 디렉터리
    pub language_pack_dir: Option<String>,
    /// tracing 필터 기본값 (RUST_LOG가 우선)
    pub log_level: String,
    pub model: ModelConfig,
    pub display: DisplayUnits,
    pub defaults: FormDefaults,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            language_pack_dir: None,
            log_level: "info".into(),
            model: ModelConfig::default(),
            display: DisplayUnits::default(),
            defaults: FormDefaults::default(),
            path: None,
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 파싱 오류: {0}")]
    Serde(#[from] toml::de::Error),
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 설정을 로드하되 읽기/생성에 실패하면 기본 설정으로 계속한다.
///
/// 돌려받은 설정의 저장 위치는 `path`로 남아 있어 이후 `save()`가 같은 곳을 다시 시도한다.
/// 오류는 호출자가 알린다.
pub fn load_or_fallback(path: &Path) -> (Config, Option<ConfigError>) {
    match load_or_create(path) {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            let cfg = Config {
                path: Some(path.to_path_buf()),
                ..Config::default()
            };
            (cfg, Some(e))
        }
    }
}

/// 지정한 경로의 설정을 로드하고, 없으면 기본 설정을 그 경로에 만든다.
pub fn load_or_create(path: &Path) -> Result<Config, ConfigError> {
    let mut cfg = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str::<Config>(&content)?
    } else {
        let cfg = Config::default();
        save_config(&cfg, path)?;
        cfg
    };
    cfg.path = Some(path.to_path_buf());
    Ok(cfg)
}

fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

impl Config {
    /// 설정을 로드한 위치(없으면 config.toml)에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        save_config(self, &path)
    }
}
