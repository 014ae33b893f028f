//! Tracing subscriber setup.
//!
//! One `fmt` layer on stderr, in the format chosen by `LOG_FORMAT`, plus a
//! JSON file sink under `LOG_DIR` when that is set. Files roll daily
//! (`app.YYYY-MM-DD.log`) and only the newest [`LOG_RETENTION_FILES`] are
//! kept. The filter comes from `RUST_LOG` when set, otherwise from
//! `LOG_LEVEL` with noisy library targets held at `warn`.

use crate::settings::EnvMap;
use posgrado_core::AppError;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Noisy library targets kept at `warn` unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: [&str; 4] = ["tower_http", "sqlx", "reqwest", "hyper"];

/// File name prefix of the rolling log files.
pub const LOG_FILE_PREFIX: &str = "app";

/// Daily files kept in `LOG_DIR`.
pub const LOG_RETENTION_FILES: usize = 10;

/// Output format of the stderr layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-field human-readable lines.
    #[default]
    Pretty,
    /// Single-line human-readable output.
    Compact,
    /// One JSON object per event, for log shippers.
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(AppError::application(format!(
                "Unknown LOG_FORMAT '{other}', expected pretty, compact or json"
            ))),
        }
    }
}

/// Log level, stderr format and optional file directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Stderr output format.
    pub format: LogFormat,
    /// Directory for rolling JSON log files; no file output when `None`.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            dir: None,
        }
    }
}

impl LoggingConfig {
    /// Read `LOG_LEVEL`, `LOG_FORMAT` and `LOG_DIR`.
    ///
    /// # Errors
    ///
    /// Returns an application error for an unknown format.
    pub fn from_env(env: &EnvMap) -> Result<Self, AppError> {
        let level = env
            .get("LOG_LEVEL")
            .map(|l| l.trim().to_ascii_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "info".to_string());
        let format = env
            .get("LOG_FORMAT")
            .map_or(Ok(LogFormat::Pretty), |raw| LogFormat::parse(raw))?;
        let dir = env
            .get("LOG_DIR")
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);

        Ok(Self { level, format, dir })
    }

    /// Filter directives used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directives(&self) -> String {
        QUIET_TARGETS
            .iter()
            .fold(self.level.clone(), |acc, target| format!("{acc},{target}=warn"))
    }
}

/// Daily-rolling appender writing `app.YYYY-MM-DD.log` files into `dir`.
///
/// # Errors
///
/// Returns an application error if the directory cannot be used.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender, AppError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(LOG_RETENTION_FILES)
        .build(dir)
        .map_err(|e| {
            AppError::application(format!("Cannot write log files to {}", dir.display()))
                .with_source(e)
        })
}

/// Install the global subscriber.
///
/// The returned guard flushes the file sink when dropped; keep it alive for
/// the life of the process.
///
/// # Errors
///
/// Returns an application error for an invalid level or an unusable log
/// directory, or an internal error if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>, AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.directives()))
        .map_err(|e| {
            AppError::application(format!("Invalid log level '{}'", config.level)).with_source(e)
        })?;

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(dir)?);
            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let base = tracing_subscriber::registry().with(filter).with(file_layer);
    let installed = match config.format {
        LogFormat::Json => base
            .with(fmt::layer().json().with_current_span(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => base
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => base
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    installed
        .map_err(|e| AppError::internal("Could not install the log subscriber").with_source(e))?;
    Ok(guard)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use posgrado_core::ErrorKind;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_env(&EnvMap::new()).unwrap();
        assert_eq!(config, LoggingConfig::default());
    }

    #[test]
    fn test_directives_quiet_libraries() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(
            config.directives(),
            "debug,tower_http=warn,sqlx=warn,reqwest=warn,hyper=warn"
        );
    }

    #[test]
    fn test_from_env() {
        let env = EnvMap::from([
            ("LOG_LEVEL".to_string(), " WARN ".to_string()),
            ("LOG_FORMAT".to_string(), "JSON".to_string()),
            ("LOG_DIR".to_string(), "/var/log/posgrado".to_string()),
        ]);
        let config = LoggingConfig::from_env(&env).unwrap();

        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.dir, Some(PathBuf::from("/var/log/posgrado")));
    }

    #[test]
    fn test_blank_dir_disables_files() {
        let env = EnvMap::from([("LOG_DIR".to_string(), "  ".to_string())]);
        assert_eq!(LoggingConfig::from_env(&env).unwrap().dir, None);
    }

    #[test]
    fn test_unknown_format() {
        let env = EnvMap::from([("LOG_FORMAT".to_string(), "xml".to_string())]);
        let err = LoggingConfig::from_env(&env).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Application);
    }

    #[test]
    fn test_file_appender_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut appender = file_appender(dir.path()).unwrap();
        appender.write_all(b"{\"msg\":\"hola\"}\n").unwrap();
        appender.flush().unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("app."), "{names:?}");
        assert!(names[0].ends_with(".log"), "{names:?}");
    }
}
