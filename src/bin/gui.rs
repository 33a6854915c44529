#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use eframe::{egui, App, Frame};
use image::GenericImageView;
use rfd::{FileDialog, MessageDialog, MessageLevel};
use std::{env, fs, path::Path, process::ExitCode};
use tig_hardness_predictor::{
    app, config,
    i18n::{self, keys},
    model::{AcquireProgress, SharedPredictor},
    prediction::PredictionSession,
    report,
    units::{
        convert_length, convert_velocity, length_to_mm, velocity_to_mm_per_s, HeatInputUnit,
        LengthUnit, VelocityUnit,
    },
    ui_cli::{length_symbol, velocity_symbol},
    welding::{
        params::{MIN_BEAD_WIDTH_MM, MIN_TRAVEL_SPEED_MM_S},
        Extract, GrooveType, WeldMethod, WeldType,
    },
};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    // CLI 언어 옵션 처리: --lang xx 또는 --lang=xx (xx: auto/ko/en)
    let mut cli_lang: Option<String> = None;
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        let a = &args[i];
        if let Some(val) = a.strip_prefix("--lang=") {
            cli_lang = Some(val.to_string());
        } else if (a == "--lang" || a == "-L") && i + 1 < args.len() {
            cli_lang = Some(args[i + 1].clone());
            i += 1;
        }
        i += 1;
    }

    let (app_cfg, cfg_err) = config::load_or_fallback(Path::new(config::DEFAULT_CONFIG_PATH));
    tig_hardness_predictor::logging::init(&app_cfg.log_level);
    if let Some(e) = cfg_err {
        warn!(error = %e, "config unavailable, using defaults");
    }
    let lang = i18n::resolve_language(
        cli_lang.as_deref().unwrap_or("auto"),
        Some(app_cfg.language.as_str()),
    );
    let tr = i18n::Translator::new_with_pack(&lang, app_cfg.language_pack_dir.as_deref());

    // 창을 띄우기 전에 모델을 확보한다. 실패하면 대화상자로 알리고 끝낸다.
    let predictor = match app::load_predictor(&app_cfg, log_progress) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "model unavailable");
            MessageDialog::new()
                .set_level(MessageLevel::Error)
                .set_title(&*tr.t(keys::APP_TITLE))
                .set_description(&format!("{}: {e}", tr.t(keys::MODEL_LOAD_FAILED).into_owned()))
                .show();
            return ExitCode::FAILURE;
        }
    };

    let mut viewport = egui::ViewportBuilder::default().with_inner_size(egui::vec2(720.0, 560.0));
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let title = tr.t(keys::APP_TITLE).into_owned();
    let result = eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            if let Err(e) = setup_fonts(&cc.egui_ctx) {
                info!("{e}");
            }
            Box::new(GuiApp::new(app_cfg, tr, predictor))
        }),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "gui terminated");
            ExitCode::FAILURE
        }
    }
}

/// 모델 확보 단계를 로그로 남긴다. GUI는 창을 띄우기 전이라 터미널 출력 대신 tracing을 쓴다.
fn log_progress(stage: AcquireProgress<'_>) {
    match stage {
        AcquireProgress::CheckingLocal(path) => info!(path = %path.display(), "checking local model"),
        AcquireProgress::Downloading { received, total } => {
            info!(received, total = ?total, "downloading model")
        }
        AcquireProgress::Verifying => info!("verifying checksum"),
        AcquireProgress::Loading(path) => info!(path = %path.display(), "loading model"),
        AcquireProgress::Ready { trees } => info!(trees, "model ready"),
    }
}

fn load_app_icon() -> Option<egui::IconData> {
    let search = ["icon.png", "assets/icon.png", "../assets/icon.png"];
    let path = search.iter().find(|p| Path::new(*p).exists())?;
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let rgba = img.to_rgba8();
    let (w, h) = img.dimensions();
    Some(egui::IconData {
        rgba: rgba.into_raw(),
        width: w,
        height: h,
    })
}

fn label_with_tip(ui: &mut egui::Ui, text: &str, tip: &str) -> egui::Response {
    ui.label(text).on_hover_text(tip)
}

/// 공통: 바이너리 폰트 바이트를 egui에 등록.
fn apply_font_bytes(ctx: &egui::Context, bytes: Vec<u8>, name: &str) {
    let mut fonts = egui::FontDefinitions::default();
    let font_name = name.to_string();
    fonts
        .font_data
        .insert(font_name.clone(), egui::FontData::from_owned(bytes));
    fonts
        .families
        .entry(egui::FontFamily::Proportional)
        .or_default()
        .insert(0, font_name.clone());
    fonts
        .families
        .entry(egui::FontFamily::Monospace)
        .or_default()
        .insert(0, font_name);
    ctx.set_fonts(fonts);
}

/// 한글 표시용 폰트를 찾는다.
/// 1) assets/fonts/ 아래 프로젝트 폰트
/// 2) 시스템 폰트 (Windows 맑은 고딕, 리눅스 Noto CJK/나눔)
/// 3) 모두 실패 시 Err를 반환해 사용자 지정 폰트 로드를 유도한다.
fn setup_fonts(ctx: &egui::Context) -> Result<(), String> {
    let mut candidates: Vec<std::path::PathBuf> = vec![
        "assets/fonts/malgun.ttf".into(),
        "assets/fonts/NanumGothic.ttf".into(),
    ];
    if let Some(windir) = env::var_os("WINDIR") {
        let fonts = Path::new(&windir).join("Fonts");
        candidates.extend(["malgun.ttf", "gulim.ttc"].iter().map(|f| fonts.join(f)));
    }
    candidates.extend(
        [
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
            "/System/Library/Fonts/AppleSDGothicNeo.ttc",
        ]
        .iter()
        .map(std::path::PathBuf::from),
    );
    for p in candidates {
        if p.exists() {
            let bytes = fs::read(&p)
                .map_err(|e| format!("Failed to read font ({}): {e}", p.display()))?;
            apply_font_bytes(ctx, bytes, "korean_font");
            return Ok(());
        }
    }
    Err("Font not found. Please set a user font (.ttf/.ttc) in settings.".into())
}

/// 폼 값은 화면 단위로 들고 있다가 제출할 때 내부 단위로 바꾼다.
struct FormState {
    weld_type: Option<WeldType>,
    groove: Option<GrooveType>,
    method: Option<WeldMethod>,
    voltage_v: f64,
    current_a: f64,
    travel_speed: f64,
    bead_width: f64,
    groove_depth: f64,
    filler_diameter: f64,
}

struct GuiApp {
    config: config::Config,
    tr: i18n::Translator,
    session: PredictionSession,
    form: FormState,
    speed_unit: VelocityUnit,
    length_unit: LengthUnit,
    // 설정
    show_settings_modal: bool,
    lang_input: String,
    settings_status: Option<String>,
    custom_font_path: String,
    font_load_error: Option<String>,
}

impl GuiApp {
    fn new(config: config::Config, tr: i18n::Translator, predictor: SharedPredictor) -> Self {
        let initial = config.defaults.to_parameters();
        let speed_unit = config.display.travel_speed;
        let length_unit = config.display.length;
        let form = FormState {
            weld_type: initial.weld_type,
            groove: initial.groove,
            method: initial.method,
            voltage_v: initial.voltage_v,
            current_a: initial.current_a,
            travel_speed: convert_velocity(
                initial.travel_speed_mm_s,
                VelocityUnit::MillimeterPerSecond,
                speed_unit,
            ),
            bead_width: convert_length(initial.bead_width_mm, LengthUnit::Millimeter, length_unit),
            groove_depth: 0.0,
            filler_diameter: 0.0,
        };
        let session = PredictionSession::new(predictor, config.model.schema, initial);
        Self {
            lang_input: config.language.clone(),
            config,
            tr,
            session,
            form,
            speed_unit,
            length_unit,
            show_settings_modal: false,
            settings_status: None,
            custom_font_path: String::new(),
            font_load_error: None,
        }
    }

    fn submit(&mut self) {
        let schema = self.session.schema();
        let mut params = self.session.inputs().clone();
        params.weld_type = self.form.weld_type;
        params.groove = self.form.groove;
        params.voltage_v = self.form.voltage_v;
        params.current_a = self.form.current_a;
        params.travel_speed_mm_s = velocity_to_mm_per_s(self.form.travel_speed, self.speed_unit);
        params.bead_width_mm = length_to_mm(self.form.bead_width, self.length_unit);
        if schema.requires(Extract::Method) {
            params.method = self.form.method;
        }
        if schema.requires(Extract::GrooveDepth) {
            params.groove_depth_mm = Some(length_to_mm(self.form.groove_depth, self.length_unit));
        }
        if schema.requires(Extract::FillerDiameter) {
            params.filler_diameter_mm =
                Some(length_to_mm(self.form.filler_diameter, self.length_unit));
        }
        // 실패는 session.last_error()로 화면에 남고 이전 결과는 그대로 둔다.
        let _ = self.session.submit(params);
    }

    /// 표시 단위가 바뀌면 폼 값을 새 단위로 옮긴다.
    fn apply_units(&mut self) {
        let speed = self.config.display.travel_speed;
        if speed != self.speed_unit {
            self.form.travel_speed = convert_velocity(self.form.travel_speed, self.speed_unit, speed);
            self.speed_unit = speed;
        }
        let length = self.config.display.length;
        if length != self.length_unit {
            for v in [
                &mut self.form.bead_width,
                &mut self.form.groove_depth,
                &mut self.form.filler_diameter,
            ] {
                *v = convert_length(*v, self.length_unit, length);
            }
            self.length_unit = length;
        }
    }

    fn ui_form(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        let schema = self.session.schema();
        let speed_tip = speed_floor_tip(self.speed_unit);
        let width_tip = length_floor_tip(self.length_unit);
        egui::Grid::new("weld_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label(tr.t(keys::LABEL_WELD_TYPE).into_owned());
                choice_combo(ui, "weld_type", &mut self.form.weld_type, &WeldType::ALL, WeldType::label);
                ui.end_row();

                ui.label(tr.t(keys::LABEL_GROOVE).into_owned());
                choice_combo(ui, "groove", &mut self.form.groove, &GrooveType::ALL, GrooveType::label);
                ui.end_row();

                if schema.requires(Extract::Method) {
                    ui.label(tr.t(keys::LABEL_METHOD).into_owned());
                    choice_combo(ui, "method", &mut self.form.method, &WeldMethod::ALL, WeldMethod::label);
                    ui.end_row();
                }

                label_with_tip(ui, &tr.t(keys::LABEL_VOLTAGE).into_owned(), "> 0");
                ui.add(egui::DragValue::new(&mut self.form.voltage_v).speed(1.0).suffix(" V"));
                ui.end_row();

                label_with_tip(ui, &tr.t(keys::LABEL_CURRENT).into_owned(), "> 0");
                ui.add(egui::DragValue::new(&mut self.form.current_a).speed(1.0).suffix(" A"));
                ui.end_row();

                label_with_tip(ui, &tr.t(keys::LABEL_TRAVEL_SPEED).into_owned(), &speed_tip);
                ui.add(
                    egui::DragValue::new(&mut self.form.travel_speed)
                        .speed(0.1)
                        .suffix(format!(" {}", velocity_symbol(self.speed_unit))),
                );
                ui.end_row();

                let len_suffix = format!(" {}", length_symbol(self.length_unit));
                label_with_tip(ui, &tr.t(keys::LABEL_BEAD_WIDTH).into_owned(), &width_tip);
                ui.add(
                    egui::DragValue::new(&mut self.form.bead_width)
                        .speed(0.1)
                        .suffix(len_suffix.clone()),
                );
                ui.end_row();

                if schema.requires(Extract::GrooveDepth) {
                    ui.label(tr.t(keys::LABEL_GROOVE_DEPTH).into_owned());
                    ui.add(
                        egui::DragValue::new(&mut self.form.groove_depth)
                            .speed(0.1)
                            .suffix(len_suffix.clone()),
                    );
                    ui.end_row();
                }
                if schema.requires(Extract::FillerDiameter) {
                    ui.label(tr.t(keys::LABEL_FILLER_DIAMETER).into_owned());
                    ui.add(
                        egui::DragValue::new(&mut self.form.filler_diameter)
                            .speed(0.1)
                            .suffix(len_suffix),
                    );
                    ui.end_row();
                }
            });
        ui.add_space(8.0);
        if ui.button(tr.t(keys::BUTTON_PREDICT).into_owned()).clicked() {
            self.submit();
        }
    }

    fn ui_result(&self, ui: &mut egui::Ui) {
        let tr = &self.tr;
        ui.heading(tr.t(keys::GUI_RESULT_HEADING).into_owned());
        if let Some(err) = self.session.last_error() {
            ui.colored_label(
                ui.visuals().error_fg_color,
                format!("{}: {err}", tr.t(keys::ERROR_PREFIX).into_owned()),
            );
            if self.session.last_result().is_some() {
                ui.label(egui::RichText::new(tr.t(keys::RESULT_KEPT_PREVIOUS).into_owned()).small());
            }
        }
        match self.session.last_result() {
            Some(result) => {
                ui.label(egui::RichText::new(report::hardness_line(tr, result)).strong().size(20.0));
                ui.label(report::heat_input_line(tr, result, self.config.display.heat_input));
                ui.label(egui::RichText::new(tr.t(keys::RESULT_NOTE).into_owned()).small().italics());
            }
            None => {
                ui.label(tr.t(keys::GUI_NO_RESULT).into_owned());
            }
        }
    }

    fn ui_model_info(&self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new(self.tr.t(keys::MODEL_DETAILS_HEADING).into_owned())
            .default_open(false)
            .show(ui, |ui| {
                for line in
                    report::model_info_lines(&self.tr, &self.session.model_info(), self.session.schema())
                {
                    ui.label(line);
                }
            });
    }

    fn ui_settings(&mut self, ctx: &egui::Context) {
        let tr = self.tr.clone();
        let mut open = self.show_settings_modal;
        egui::Window::new(tr.t(keys::GUI_SETTINGS).into_owned())
            .collapsible(false)
            .resizable(true)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(tr.t(keys::SETTINGS_HEAT_UNIT).into_owned());
                egui::ComboBox::from_id_source("heat_unit")
                    .selected_text(self.config.display.heat_input.symbol())
                    .show_ui(ui, |ui| {
                        for u in [
                            HeatInputUnit::JoulePerMillimeter,
                            HeatInputUnit::KilojoulePerMillimeter,
                            HeatInputUnit::JoulePerInch,
                            HeatInputUnit::KilojoulePerInch,
                        ] {
                            ui.selectable_value(&mut self.config.display.heat_input, u, u.symbol());
                        }
                    });
                ui.label(tr.t(keys::SETTINGS_SPEED_UNIT).into_owned());
                egui::ComboBox::from_id_source("speed_unit")
                    .selected_text(velocity_symbol(self.config.display.travel_speed))
                    .show_ui(ui, |ui| {
                        for u in [
                            VelocityUnit::MillimeterPerSecond,
                            VelocityUnit::MillimeterPerMinute,
                            VelocityUnit::CentimeterPerMinute,
                            VelocityUnit::InchPerMinute,
                        ] {
                            ui.selectable_value(&mut self.config.display.travel_speed, u, velocity_symbol(u));
                        }
                    });
                ui.label(tr.t(keys::SETTINGS_LENGTH_UNIT).into_owned());
                egui::ComboBox::from_id_source("length_unit")
                    .selected_text(length_symbol(self.config.display.length))
                    .show_ui(ui, |ui| {
                        for u in [LengthUnit::Millimeter, LengthUnit::Centimeter, LengthUnit::Inch] {
                            ui.selectable_value(&mut self.config.display.length, u, length_symbol(u));
                        }
                    });

                ui.separator();
                ui.label(tr.t(keys::GUI_LANGUAGE).into_owned());
                egui::ComboBox::from_id_source("lang_choice")
                    .selected_text(&self.lang_input)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.lang_input, "auto".into(), tr.t(keys::GUI_LANGUAGE_AUTO).into_owned());
                        ui.selectable_value(&mut self.lang_input, "ko".into(), "한국어");
                        ui.selectable_value(&mut self.lang_input, "en".into(), "English");
                    });

                ui.separator();
                ui.label(tr.t(keys::GUI_FONT).into_owned());
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut self.custom_font_path);
                    if ui.button(tr.t(keys::GUI_FONT_BROWSE).into_owned()).clicked() {
                        if let Some(path) = FileDialog::new().add_filter("font", &["ttf", "ttc", "otf"]).pick_file() {
                            self.custom_font_path = path.display().to_string();
                        }
                    }
                });
                if !self.custom_font_path.is_empty() && ui.button("Apply").clicked() {
                    match fs::read(&self.custom_font_path) {
                        Ok(bytes) => {
                            apply_font_bytes(ctx, bytes, "user_font");
                            self.font_load_error = None;
                        }
                        Err(e) => self.font_load_error = Some(e.to_string()),
                    }
                }
                if let Some(e) = &self.font_load_error {
                    ui.colored_label(ui.visuals().error_fg_color, e.as_str());
                }

                ui.separator();
                if ui.button(tr.t(keys::GUI_SAVE).into_owned()).clicked() {
                    self.config.language = self.lang_input.clone();
                    // 즉시 번역기 반영
                    let resolved = i18n::resolve_language(&self.config.language, None);
                    self.tr = i18n::Translator::new_with_pack(
                        &resolved,
                        self.config.language_pack_dir.as_deref(),
                    );
                    self.settings_status = Some(match self.config.save() {
                        Ok(()) => self.tr.t(keys::SETTINGS_SAVED).into_owned(),
                        Err(e) => format!("{}: {e}", self.tr.t(keys::ERROR_PREFIX).into_owned()),
                    });
                }
                if let Some(msg) = &self.settings_status {
                    ui.label(msg);
                }
            });
        self.show_settings_modal = open;
        self.apply_units();
    }
}

/// 하한값을 소수 셋째 자리까지, 끝의 0 없이 표시한다.
fn trim_number(v: f64) -> String {
    let s = format!("{v:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// 이송 속도 하한을 현재 입력 단위로 표시한다.
fn speed_floor_tip(unit: VelocityUnit) -> String {
    let min = convert_velocity(MIN_TRAVEL_SPEED_MM_S, VelocityUnit::MillimeterPerSecond, unit);
    format!("≥ {} {}", trim_number(min), velocity_symbol(unit))
}

fn length_floor_tip(unit: LengthUnit) -> String {
    let min = convert_length(MIN_BEAD_WIDTH_MM, LengthUnit::Millimeter, unit);
    format!("≥ {} {}", trim_number(min), length_symbol(unit))
}

/// 선택 전 상태(None)를 허용하는 콤보 박스.
fn choice_combo<T: Copy + PartialEq>(
    ui: &mut egui::Ui,
    id: &str,
    value: &mut Option<T>,
    options: &[T],
    name: fn(&T) -> &'static str,
) {
    egui::ComboBox::from_id_source(id)
        .selected_text(value.as_ref().map(name).unwrap_or("-"))
        .show_ui(ui, |ui| {
            for o in options {
                ui.selectable_value(value, Some(*o), name(o));
            }
        });
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let tr = self.tr.clone();

        // 상단 바
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(tr.t(keys::APP_TITLE).into_owned());
                ui.separator();
                if ui.button(tr.t(keys::GUI_SETTINGS).into_owned()).clicked() {
                    self.show_settings_modal = true;
                }
            });
        });

        if self.show_settings_modal {
            self.ui_settings(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.label(egui::RichText::new(tr.t(keys::APP_INTRO).into_owned()).small());
                ui.add_space(8.0);
                ui.columns(2, |cols| {
                    self.ui_form(&mut cols[0]);
                    self.ui_result(&mut cols[1]);
                });
                ui.separator();
                self.ui_model_info(ui);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_tips_follow_input_unit() {
        assert_eq!(speed_floor_tip(VelocityUnit::MillimeterPerSecond), "≥ 0.1 mm/s");
        assert_eq!(speed_floor_tip(VelocityUnit::MillimeterPerMinute), "≥ 6 mm/min");
        assert_eq!(speed_floor_tip(VelocityUnit::InchPerMinute), "≥ 0.236 in/min");
        assert_eq!(length_floor_tip(LengthUnit::Millimeter), "≥ 0.1 mm");
        assert_eq!(length_floor_tip(LengthUnit::Centimeter), "≥ 0.01 cm");
        assert_eq!(length_floor_tip(LengthUnit::Inch), "≥ 0.004 in");
    }
}
