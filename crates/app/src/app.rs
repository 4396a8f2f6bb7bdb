use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application infrastructure context.
///
/// Holds version info, the log directory and the logging guard. Every binary
/// in the workspace builds one of these before doing anything else.
pub struct AppContext {
    app_id: &'static str,
    version: &'static str,
    logs_dir: PathBuf,
    log_file: PathBuf,
    /// Must stay alive for the duration of the application so buffered log
    /// lines are flushed on exit.
    _log_guard: tracing_appender::non_blocking::WorkerGuard,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.app_id
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// Application metadata trait.
///
/// Define your application's identity by implementing this trait.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "chicken105";
    const PROJECT_ID: &'static str = "session_lobby";
}

/// Builder for creating applications with proper initialization.
pub struct AppBuilder<A: Application> {
    context: AppContext,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    /// Create a new application builder.
    ///
    /// This performs all the common initialization:
    /// - Resolves the platform-specific log directory and creates it
    /// - Initializes logging (file + console)
    pub fn new(version: &'static str) -> Result<Self, BoxError> {
        Self::with_logs_dir(version, default_logs_dir(A::STUDIO, A::PROJECT_ID)?)
    }

    /// Like [`AppBuilder::new`], but logs into `logs_dir`.
    pub fn with_logs_dir(version: &'static str, logs_dir: PathBuf) -> Result<Self, BoxError> {
        fs::create_dir_all(&logs_dir)?;
        let file_name = log_file_name(A::APP_ID);
        let log_file = logs_dir.join(&file_name);

        let file_appender = tracing_appender::rolling::never(&logs_dir, &file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Separate layer: file (non-blocking) + console (stdout)
        let file_layer = fmt::Layer::default()
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(level_filter());

        let console_layer = fmt::Layer::default()
            .with_target(false)
            .with_filter(level_filter());

        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .try_init()?;

        tracing::info!("{} {version} logging to {}", A::APP_ID, log_file.display());

        Ok(Self {
            context: AppContext {
                app_id: A::APP_ID,
                version,
                logs_dir,
                log_file,
                _log_guard: guard,
            },
            _marker: PhantomData,
        })
    }

    pub fn build_simple(self) -> AppContext {
        self.context
    }
}

/// `RUST_LOG` wins; otherwise INFO in debug builds and WARN in release builds.
fn level_filter() -> EnvFilter {
    #[cfg(debug_assertions)]
    let level = LevelFilter::INFO;

    #[cfg(not(debug_assertions))]
    let level = LevelFilter::WARN;

    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

fn default_logs_dir(studio: &str, project_id: &str) -> Result<PathBuf, BoxError> {
    #[cfg(debug_assertions)]
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(".out");

    #[cfg(not(debug_assertions))]
    let base = dirs::data_local_dir().ok_or("no local data directory on this platform")?;

    Ok(logs_dir_in(&base, studio, project_id))
}

fn logs_dir_in(base: &Path, studio: &str, project_id: &str) -> PathBuf {
    base.join(studio).join(project_id).join("logs")
}

fn log_file_name(app_id: &str) -> String {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    format!("{app_id}.{stamp}.log")
}
