//! Tracing subscriber setup.
//!
//! Code logs through the `tracing` macros only; this module installs the
//! subscriber once at startup. `RUST_LOG` takes precedence over `LOG_LEVEL`.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const MAX_LOG_FILES: usize = 5;

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(config: &LoggingConfig, debug: bool) -> String {
    let level = if debug {
        "debug"
    } else {
        config.filter_level().unwrap_or("info")
    };
    format!("ocr_api={level},tower_http={level}")
}

/// Splits `LOG_FILE` into the directory to write in and the file name prefix.
fn file_target(path: &str) -> (PathBuf, String) {
    let path = Path::new(path);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let prefix = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ocr_api.log".to_string());
    (dir, prefix)
}

fn file_appender(path: &str) -> anyhow::Result<RollingFileAppender> {
    let (dir, prefix) = file_target(path);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(MAX_LOG_FILES)
        .build(&dir)
        .with_context(|| format!("opening log file in {}", dir.display()))
}

/// Installs the global subscriber. Keep the returned guard alive for the whole
/// process or buffered file output is lost.
pub fn init(config: &LoggingConfig, debug: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config, debug)));

    let (file_layer, guard) = if config.file_enabled {
        let (writer, guard) = tracing_appender::non_blocking(file_appender(&config.file)?);
        let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let json_layer = config.json.then(|| fmt::layer().json());
    let text_layer = (!config.json).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_default_directive_follows_level() {
        let mut logging = Config::default().logging;
        assert_eq!(
            default_directive(&logging, false),
            "ocr_api=info,tower_http=info"
        );

        logging.level = "WARNING".to_string();
        assert_eq!(
            default_directive(&logging, false),
            "ocr_api=warn,tower_http=warn"
        );
        assert_eq!(
            default_directive(&logging, true),
            "ocr_api=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_file_target_defaults_to_current_dir() {
        assert_eq!(
            file_target("ocr_api.log"),
            (PathBuf::from("."), "ocr_api.log".to_string())
        );
        assert_eq!(
            file_target("logs/app/ocr.log"),
            (PathBuf::from("logs/app"), "ocr.log".to_string())
        );
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("ocr_api.log");

        file_appender(path.to_str().unwrap()).unwrap();
        assert!(tmp.path().join("nested").is_dir());
    }
}
