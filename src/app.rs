use std::io::Write;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::conversion;
use crate::i18n::{self, Translator};
use crate::model::{self, AcquireProgress, HttpFetcher, ModelLoadError, SharedPredictor};
use crate::prediction::{self, PredictionSession};
use crate::ui_cli;
use crate::ui_cli::MenuChoice;
use crate::welding::SchemaMismatch;

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 오류: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("단위 변환 오류: {0}")]
    Conversion(#[from] conversion::ConversionError),
    #[error("모델 로드 오류: {0}")]
    ModelLoad(#[from] ModelLoadError),
    /// 설정한 스키마가 로드한 모델과 맞지 않는 경우 (시작 시 점검)
    #[error("모델 스키마 오류: {0}")]
    Schema(#[from] SchemaMismatch),
    /// 표준 입력이 닫힘
    #[error("입력이 종료되었습니다")]
    InputClosed,
}

/// 설정된 위치에서 모델을 확보하고 설정 스키마와의 호환을 확인한다.
///
/// 프로세스 시작 시 한 번 호출하며, 실패하면 호출자가 즉시 종료 처리를 한다.
pub fn load_predictor(
    config: &Config,
    progress: impl FnMut(AcquireProgress<'_>),
) -> Result<SharedPredictor, AppError> {
    let source = config.model.source();
    let model = model::acquire(&source, &HttpFetcher, progress)?;
    prediction::check_schema_compat(&model, config.model.schema)?;
    Ok(Arc::new(model))
}

/// 터미널(stderr)에 모델 확보 단계를 출력하는 진행 표시기.
pub fn print_progress(tr: &Translator) -> impl FnMut(AcquireProgress<'_>) + '_ {
    move |stage: AcquireProgress<'_>| match stage {
        AcquireProgress::CheckingLocal(path) => {
            eprintln!("{} {}", tr.t(i18n::keys::PROGRESS_CHECKING), path.display())
        }
        AcquireProgress::Downloading { received, total } => {
            let total = total.map(|t| format!(" / {t}")).unwrap_or_default();
            eprint!("\r{} {received}{total} bytes", tr.t(i18n::keys::PROGRESS_DOWNLOADING));
            let _ = std::io::stderr().flush();
        }
        AcquireProgress::Verifying => eprintln!("\n{}", tr.t(i18n::keys::PROGRESS_VERIFYING)),
        AcquireProgress::Loading(path) => {
            eprintln!("{} {}", tr.t(i18n::keys::PROGRESS_LOADING), path.display())
        }
        AcquireProgress::Ready { trees } => {
            eprintln!("{} {trees}", tr.t(i18n::keys::PROGRESS_READY))
        }
    }
}

/// CLI 애플리케이션의 메인 루프를 실행한다.
pub fn run(config: &mut Config, tr: &Translator, predictor: SharedPredictor) -> Result<(), AppError> {
    let mut session = PredictionSession::new(
        predictor,
        config.model.schema,
        config.defaults.to_parameters(),
    );
    println!("{}", tr.t(i18n::keys::APP_TITLE));
    println!("{}", tr.t(i18n::keys::APP_INTRO));
    loop {
        let step = match ui_cli::main_menu(tr)? {
            MenuChoice::Predict => ui_cli::handle_predict(tr, config, &mut session),
            MenuChoice::ModelInfo => {
                ui_cli::show_model_info(tr, &session);
                Ok(())
            }
            MenuChoice::Settings => ui_cli::handle_settings(tr, config).and_then(|_| {
                config.save()?;
                println!("{}", tr.t(i18n::keys::SETTINGS_SAVED));
                Ok(())
            }),
            MenuChoice::Exit => break,
        };
        match step {
            Ok(()) => {}
            Err(AppError::InputClosed) => break,
            Err(e @ (AppError::Conversion(_) | AppError::Config(_))) => {
                warn!(error = %e, "cli step failed, continuing");
                println!("{}: {e}", tr.t(i18n::keys::ERROR_PREFIX));
            }
            Err(e) => {
                error!(error = %e, "cli step failed");
                return Err(e);
            }
        }
    }
    if let Err(e) = config.save() {
        warn!(error = %e, "config not saved on exit");
        println!("{}: {e}", tr.t(i18n::keys::ERROR_PREFIX));
    }
    info!("session closed");
    println!("{}", tr.t(i18n::keys::APP_EXIT));
    Ok(())
}
