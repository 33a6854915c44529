use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";
    pub const APP_TITLE: &str = "general.app_title";
    pub const APP_INTRO: &str = "general.app_intro";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_PREDICT: &str = "main_menu.predict";
    pub const MAIN_MENU_MODEL_INFO: &str = "main_menu.model_info";
    pub const MAIN_MENU_SETTINGS: &str = "main_menu.settings";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";
    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";

    pub const FORM_HEADING: &str = "form.heading";
    pub const FORM_KEEP_HINT: &str = "form.keep_hint";
    pub const LABEL_WELD_TYPE: &str = "form.weld_type";
    pub const LABEL_GROOVE: &str = "form.groove";
    pub const LABEL_METHOD: &str = "form.method";
    pub const LABEL_VOLTAGE: &str = "form.voltage";
    pub const LABEL_CURRENT: &str = "form.current";
    pub const LABEL_TRAVEL_SPEED: &str = "form.travel_speed";
    pub const LABEL_BEAD_WIDTH: &str = "form.bead_width";
    pub const LABEL_GROOVE_DEPTH: &str = "form.groove_depth";
    pub const LABEL_FILLER_DIAMETER: &str = "form.filler_diameter";
    pub const BUTTON_PREDICT: &str = "form.predict";

    pub const RESULT_HARDNESS: &str = "result.hardness";
    pub const RESULT_HEAT_INPUT: &str = "result.heat_input";
    pub const RESULT_NOTE: &str = "result.note";
    pub const RESULT_KEPT_PREVIOUS: &str = "result.kept_previous";

    pub const MODEL_DETAILS_HEADING: &str = "model.heading";
    pub const MODEL_NAME: &str = "model.name";
    pub const MODEL_ALGORITHM: &str = "model.algorithm";
    pub const MODEL_INPUTS: &str = "model.inputs";
    pub const MODEL_TARGET: &str = "model.target";
    pub const MODEL_DERIVED: &str = "model.derived";
    pub const MODEL_ESTIMATORS: &str = "model.estimators";
    pub const MODEL_SCHEMA: &str = "model.schema";

    pub const PROGRESS_CHECKING: &str = "progress.checking";
    pub const PROGRESS_DOWNLOADING: &str = "progress.downloading";
    pub const PROGRESS_VERIFYING: &str = "progress.verifying";
    pub const PROGRESS_LOADING: &str = "progress.loading";
    pub const PROGRESS_READY: &str = "progress.ready";
    pub const MODEL_LOAD_FAILED: &str = "error.model_load_failed";

    pub const SETTINGS_HEADING: &str = "settings.heading";
    pub const SETTINGS_HEAT_UNIT: &str = "settings.heat_unit";
    pub const SETTINGS_SPEED_UNIT: &str = "settings.speed_unit";
    pub const SETTINGS_LENGTH_UNIT: &str = "settings.length_unit";
    pub const SETTINGS_PROMPT_CHANGE: &str = "settings.prompt_change";
    pub const SETTINGS_INVALID: &str = "settings.invalid";
    pub const SETTINGS_SAVED: &str = "settings.saved";

    pub const ERROR_INVALID_NUMBER: &str = "error.invalid_number";

    pub const GUI_SETTINGS: &str = "gui.settings.title";
    pub const GUI_LANGUAGE: &str = "gui.settings.language";
    pub const GUI_LANGUAGE_AUTO: &str = "gui.settings.language_auto";
    pub const GUI_FONT: &str = "gui.settings.font";
    pub const GUI_FONT_BROWSE: &str = "gui.settings.font_browse";
    pub const GUI_SAVE: &str = "gui.settings.save";
    pub const GUI_RESULT_HEADING: &str = "gui.result.heading";
    pub const GUI_NO_RESULT: &str = "gui.result.empty";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    Ko,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("ko") {
            Language::Ko
        } else {
            Language::En
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드(ko/en)에 따라 번역기를 생성한다. 알 수 없는 코드는 en으로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리(locales/ 등)를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code));
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    /// 번역을 가져온다. 언어팩 값이 우선이고, 영어 번역이 없으면 한국어 문자열을 폴백한다.
    pub fn t(&self, key: &str) -> Cow<'static, str> {
        if let Some(v) = self.overrides.as_ref().and_then(|m| m.get(key)) {
            return Cow::Owned(v.clone());
        }
        Cow::Borrowed(match self.lang {
            Language::En => en(key).unwrap_or_else(|| ko(key)),
            Language::Ko => ko(key),
        })
    }
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        other if other.starts_with("ko") => Some("ko".into()),
        other if other.starts_with("en") => Some("en".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        "ko" => Some("ko".into()),
        "en" => Some("en".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(lang) = get_locale().as_deref().and_then(normalize_locale_string) {
        return Some(lang);
    }
    ["LANG", "LC_ALL"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|v| normalize_locale_string(&v))
}

/// TOML 기반 언어팩을 로드한다. 형식: key = "value" 또는 [section] 아래 key = "value".
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| {
        let path = Path::new(dir).join(format!("{code}.toml"));
        fs::read_to_string(path)
            .ok()
            .and_then(|src| parse_toml_to_map(&src))
    };
    try_load(lang).or_else(|| {
        lang.split_once(['-', '_'])
            .and_then(|(base, _)| try_load(base))
    })
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn ko(key: &str) -> &'static str {
    use keys::*;
    match key {
        ERROR_PREFIX => "오류",
        APP_EXIT => "프로그램을 종료합니다.",
        APP_TITLE => "TIG 용접 경도 및 입열량 예측기",
        APP_INTRO => "공정 조건으로 TIG 용접 알루미늄 합금 시편의 경도(HRC)를 예측하고 입열량(J/mm)을 계산합니다.",
        MAIN_MENU_TITLE => "\n=== TIG Hardness Predictor ===",
        MAIN_MENU_PREDICT => "1) 경도 예측",
        MAIN_MENU_MODEL_INFO => "2) 모델 정보",
        MAIN_MENU_SETTINGS => "3) 설정",
        MAIN_MENU_EXIT => "0) 종료",
        PROMPT_MENU_SELECT => "메뉴 선택: ",
        INVALID_SELECTION_RETRY => "잘못된 입력입니다. 다시 선택하세요.",
        FORM_HEADING => "\n-- 용접 조건 입력 --",
        FORM_KEEP_HINT => "(엔터: 이전 값 유지)",
        LABEL_WELD_TYPE => "용접 종류",
        LABEL_GROOVE => "개선 형상",
        LABEL_METHOD => "용접 공법",
        LABEL_VOLTAGE => "전압 (V)",
        LABEL_CURRENT => "전류 (A)",
        LABEL_TRAVEL_SPEED => "이송 속도",
        LABEL_BEAD_WIDTH => "비드 폭",
        LABEL_GROOVE_DEPTH => "개선 깊이",
        LABEL_FILLER_DIAMETER => "용가재 지름",
        BUTTON_PREDICT => "경도 예측",
        RESULT_HARDNESS => "예측 경도:",
        RESULT_HEAT_INPUT => "계산 입열량:",
        RESULT_NOTE => "참고: 입열량은 모델이 예측한 값이 아니라 계산한 값입니다.",
        RESULT_KEPT_PREVIOUS => "이전 결과를 그대로 유지합니다. 입력을 수정한 뒤 다시 시도하세요.",
        MODEL_DETAILS_HEADING => "모델 정보",
        MODEL_NAME => "모델:",
        MODEL_ALGORITHM => "알고리즘:",
        MODEL_INPUTS => "입력 특성:",
        MODEL_TARGET => "예측 대상:",
        MODEL_DERIVED => "파생값: 입열량 (J/mm)",
        MODEL_ESTIMATORS => "트리 수:",
        MODEL_SCHEMA => "입력 스키마:",
        PROGRESS_CHECKING => "로컬 모델 확인 중:",
        PROGRESS_DOWNLOADING => "모델 다운로드 중:",
        PROGRESS_VERIFYING => "체크섬 확인 중...",
        PROGRESS_LOADING => "모델 로드 중:",
        PROGRESS_READY => "모델 준비 완료. 트리 수:",
        MODEL_LOAD_FAILED => "모델을 불러오지 못했습니다",
        SETTINGS_HEADING => "\n-- 설정 --",
        SETTINGS_HEAT_UNIT => "입열량 표시 단위 (J/mm, kJ/mm, J/in, kJ/in)",
        SETTINGS_SPEED_UNIT => "이송 속도 입력 단위 (mm/s, mm/min, cm/min, in/min)",
        SETTINGS_LENGTH_UNIT => "길이 입력 단위 (mm, cm, in)",
        SETTINGS_PROMPT_CHANGE => "변경할 단위(엔터: 유지): ",
        SETTINGS_INVALID => "알 수 없는 단위이므로 변경하지 않습니다.",
        SETTINGS_SAVED => "설정을 저장했습니다.",
        ERROR_INVALID_NUMBER => "숫자를 입력하세요.",
        GUI_SETTINGS => "설정",
        GUI_LANGUAGE => "언어",
        GUI_LANGUAGE_AUTO => "시스템",
        GUI_FONT => "사용자 폰트 (.ttf/.ttc)",
        GUI_FONT_BROWSE => "찾아보기",
        GUI_SAVE => "설정 저장",
        GUI_RESULT_HEADING => "예측 결과",
        GUI_NO_RESULT => "아직 예측한 결과가 없습니다.",
        _ => "",
    }
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Error",
        APP_EXIT => "Exiting.",
        APP_TITLE => "TIG Welding Hardness & Heat Predictor",
        APP_INTRO => "Predicts hardness (HRC) and calculates heat input (J/mm) for TIG welded aluminium alloy specimens from process parameters.",
        MAIN_MENU_TITLE => "\n=== TIG Hardness Predictor ===",
        MAIN_MENU_PREDICT => "1) Predict hardness",
        MAIN_MENU_MODEL_INFO => "2) Model details",
        MAIN_MENU_SETTINGS => "3) Settings",
        MAIN_MENU_EXIT => "0) Exit",
        PROMPT_MENU_SELECT => "Select menu: ",
        INVALID_SELECTION_RETRY => "Invalid input. Please choose again.",
        FORM_HEADING => "\n-- Welding parameters --",
        FORM_KEEP_HINT => "(Enter keeps previous value)",
        LABEL_WELD_TYPE => "Weld type",
        LABEL_GROOVE => "Groove type",
        LABEL_METHOD => "Welding method",
        LABEL_VOLTAGE => "Voltage (V)",
        LABEL_CURRENT => "Current (A)",
        LABEL_TRAVEL_SPEED => "Travel speed",
        LABEL_BEAD_WIDTH => "Bead width",
        LABEL_GROOVE_DEPTH => "Groove depth",
        LABEL_FILLER_DIAMETER => "Filler diameter",
        BUTTON_PREDICT => "Predict hardness",
        RESULT_HARDNESS => "Predicted hardness:",
        RESULT_HEAT_INPUT => "Calculated heat input:",
        RESULT_NOTE => "Note: heat input is a calculated parameter, not predicted by the model.",
        RESULT_KEPT_PREVIOUS => "Previous result kept. Adjust the inputs and try again.",
        MODEL_DETAILS_HEADING => "Model details",
        MODEL_NAME => "Model:",
        MODEL_ALGORITHM => "Algorithm:",
        MODEL_INPUTS => "Input features:",
        MODEL_TARGET => "Target:",
        MODEL_DERIVED => "Derived: heat input (J/mm)",
        MODEL_ESTIMATORS => "Trees:",
        MODEL_SCHEMA => "Input schema:",
        PROGRESS_CHECKING => "Checking local model:",
        PROGRESS_DOWNLOADING => "Downloading model:",
        PROGRESS_VERIFYING => "Verifying checksum...",
        PROGRESS_LOADING => "Loading model:",
        PROGRESS_READY => "Model ready. Trees:",
        MODEL_LOAD_FAILED => "Could not load the model",
        SETTINGS_HEADING => "\n-- Settings --",
        SETTINGS_HEAT_UNIT => "Heat input display unit (J/mm, kJ/mm, J/in, kJ/in)",
        SETTINGS_SPEED_UNIT => "Travel speed input unit (mm/s, mm/min, cm/min, in/min)",
        SETTINGS_LENGTH_UNIT => "Length input unit (mm, cm, in)",
        SETTINGS_PROMPT_CHANGE => "New unit (Enter keeps current): ",
        SETTINGS_INVALID => "Unknown unit; left unchanged.",
        SETTINGS_SAVED => "Settings saved.",
        ERROR_INVALID_NUMBER => "Please enter a number.",
        GUI_SETTINGS => "Settings",
        GUI_LANGUAGE => "Language",
        GUI_LANGUAGE_AUTO => "System",
        GUI_FONT => "Custom font (.ttf/.ttc)",
        GUI_FONT_BROWSE => "Browse",
        GUI_SAVE => "Save settings",
        GUI_RESULT_HEADING => "Prediction",
        GUI_NO_RESULT => "No prediction yet.",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_wins_over_config() {
        assert_eq!(resolve_language("ko-KR", Some("en")), "ko");
        assert_eq!(resolve_language("auto", Some("en-us")), "en");
    }

    #[test]
    fn every_key_has_korean_and_english_text() {
        use keys::*;
        for key in [
            ERROR_PREFIX,
            APP_EXIT,
            APP_TITLE,
            APP_INTRO,
            MAIN_MENU_TITLE,
            MAIN_MENU_PREDICT,
            MAIN_MENU_MODEL_INFO,
            MAIN_MENU_SETTINGS,
            MAIN_MENU_EXIT,
            PROMPT_MENU_SELECT,
            INVALID_SELECTION_RETRY,
            FORM_HEADING,
            FORM_KEEP_HINT,
            LABEL_WELD_TYPE,
            LABEL_GROOVE,
            LABEL_METHOD,
            LABEL_VOLTAGE,
            LABEL_CURRENT,
            LABEL_TRAVEL_SPEED,
            LABEL_BEAD_WIDTH,
            LABEL_GROOVE_DEPTH,
            LABEL_FILLER_DIAMETER,
            BUTTON_PREDICT,
            RESULT_HARDNESS,
            RESULT_HEAT_INPUT,
            RESULT_NOTE,
            RESULT_KEPT_PREVIOUS,
            MODEL_DETAILS_HEADING,
            MODEL_NAME,
            MODEL_ALGORITHM,
            MODEL_INPUTS,
            MODEL_TARGET,
            MODEL_DERIVED,
            MODEL_ESTIMATORS,
            MODEL_SCHEMA,
            PROGRESS_CHECKING,
            PROGRESS_DOWNLOADING,
            PROGRESS_VERIFYING,
            PROGRESS_LOADING,
            PROGRESS_READY,
            MODEL_LOAD_FAILED,
            SETTINGS_HEADING,
            SETTINGS_HEAT_UNIT,
            SETTINGS_SPEED_UNIT,
            SETTINGS_LENGTH_UNIT,
            SETTINGS_PROMPT_CHANGE,
            SETTINGS_INVALID,
            SETTINGS_SAVED,
            ERROR_INVALID_NUMBER,
            GUI_SETTINGS,
            GUI_LANGUAGE,
            GUI_LANGUAGE_AUTO,
            GUI_FONT,
            GUI_FONT_BROWSE,
            GUI_SAVE,
            GUI_RESULT_HEADING,
            GUI_NO_RESULT,
        ] {
            assert!(!ko(key).is_empty(), "{key}");
            assert!(en(key).is_some_and(|v| !v.is_empty()), "{key}");
        }
    }

    #[test]
    fn pack_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("en.toml"),
            "[result]\nhardness = \"Hardness estimate:\"\n",
        )
        .unwrap();
        let tr = Translator::new_with_pack("en-us", dir.path().to_str());
        assert_eq!(tr.t(keys::RESULT_HARDNESS), "Hardness estimate:");
        assert_eq!(tr.t(keys::RESULT_HEAT_INPUT), "Calculated heat input:");
    }
}
