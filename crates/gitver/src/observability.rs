//! Observability setup: structured logging.
//!
//! Log events go to stderr, never stdout, which carries command output
//! (including `--json` documents). A JSONL file layer is added when a log
//! path or directory is configured.

use anyhow::{Context, Result};
use gitver_core::LogLevel;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "GITVER_LOG_PATH";
const ENV_LOG_DIR: &str = "GITVER_LOG_DIR";
const LOG_FILE_SUFFIX: &str = ".jsonl";

/// Configuration for observability setup.
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// Service name, used for the log file name.
    pub service: String,
    /// Directory for JSONL log files from config.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Service name from the package, log directory from config.
    pub fn from_env_with_overrides(log_dir: Option<PathBuf>) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            log_dir,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogTarget {
    dir: PathBuf,
    file_name: String,
}

/// Keeps the file writer's background thread alive; hold it until exit so
/// buffered lines are flushed.
pub struct ObservabilityGuard {
    _log_guard: Option<WorkerGuard>,
}

/// Install the global subscriber.
pub fn init_observability(
    cfg: &ObservabilityConfig,
    env_filter: EnvFilter,
) -> Result<ObservabilityGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, log_guard) = match resolve_log_target(&cfg.service, cfg.log_dir.as_deref()) {
        Some(Ok(target)) => {
            let appender = tracing_appender::rolling::never(&target.dir, &target.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer);
            (Some(layer), Some(guard))
        }
        Some(Err(err)) => {
            eprintln!("Warning: {err}. File logging disabled.");
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    tracing::debug!("observability initialized");

    Ok(ObservabilityGuard {
        _log_guard: log_guard,
    })
}

/// Build an `EnvFilter` from CLI flags, environment and config.
///
/// Priority: quiet flag > verbose flag > `--log-level` > `RUST_LOG` >
/// `default_level`.
pub fn env_filter(
    quiet: bool,
    verbose: u8,
    log_level: Option<LogLevel>,
    default_level: LogLevel,
) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    if verbose > 0 {
        let level = match verbose {
            1 => "debug",
            _ => "trace",
        };
        return EnvFilter::new(level);
    }

    if let Some(level) = log_level {
        return EnvFilter::new(level.as_str());
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.as_str()))
}

fn resolve_log_target(
    service: &str,
    config_log_dir: Option<&Path>,
) -> Option<Result<LogTarget, String>> {
    let path_override = std::env::var_os(ENV_LOG_PATH).map(PathBuf::from);
    let dir_override = std::env::var_os(ENV_LOG_DIR).map(PathBuf::from);

    resolve_log_target_with(
        service,
        path_override,
        dir_override,
        config_log_dir.map(PathBuf::from),
    )
}

/// `None` when no file logging is configured.
fn resolve_log_target_with(
    service: &str,
    path_override: Option<PathBuf>,
    dir_override: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Option<Result<LogTarget, String>> {
    if let Some(path) = path_override {
        return Some(log_target_from_path(path));
    }

    dir_override
        .or(config_dir)
        .map(|dir| log_target_from_dir(dir, service))
}

fn log_target_from_dir(dir: PathBuf, service: &str) -> Result<LogTarget, String> {
    let file_name = format!("{service}{LOG_FILE_SUFFIX}");
    ensure_writable(&dir, &file_name)?;
    Ok(LogTarget { dir, file_name })
}

fn log_target_from_path(path: PathBuf) -> Result<LogTarget, String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| format!("{ENV_LOG_PATH} must end in a UTF-8 file name"))?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_writable(dir, &file_name)?;

    Ok(LogTarget {
        dir: dir.to_path_buf(),
        file_name,
    })
}

fn ensure_writable(dir: &Path, file_name: &str) -> Result<(), String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create log directory {}: {e}", dir.display()))?;

    let path = dir.join(file_name);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("Failed to open log file {}: {e}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn quiet_overrides_everything() {
        let filter = env_filter(true, 2, Some(LogLevel::Trace), LogLevel::Info);
        assert_eq!(filter.to_string(), "error");
    }

    #[test]
    fn verbose_maps_to_debug_and_trace() {
        assert_eq!(env_filter(false, 1, None, LogLevel::Warn).to_string(), "debug");
        assert_eq!(env_filter(false, 2, None, LogLevel::Warn).to_string(), "trace");
    }

    #[test]
    fn verbose_beats_log_level_flag() {
        let filter = env_filter(false, 1, Some(LogLevel::Error), LogLevel::Warn);
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn log_level_flag_is_used() {
        let filter = env_filter(false, 0, Some(LogLevel::Info), LogLevel::Warn);
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn no_file_target_unless_configured() {
        assert_eq!(resolve_log_target_with("demo", None, None, None), None);
    }

    #[test]
    fn path_override_wins() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("custom.jsonl");
        let target = resolve_log_target_with(
            "demo",
            Some(file.clone()),
            Some(tmp.path().join("ignored")),
            None,
        )
        .unwrap()
        .unwrap();

        assert_eq!(target.dir.join(&target.file_name), file);
        assert!(file.is_file());
    }

    #[test]
    fn dir_override_beats_config_dir() {
        let tmp = TempDir::new().unwrap();
        let env_dir = tmp.path().join("env");
        let target = resolve_log_target_with(
            "demo",
            None,
            Some(env_dir.clone()),
            Some(tmp.path().join("config")),
        )
        .unwrap()
        .unwrap();

        assert_eq!(target.dir, env_dir);
        assert_eq!(target.file_name, format!("demo{LOG_FILE_SUFFIX}"));
    }

    #[test]
    fn config_dir_is_created() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("logs");
        let target = resolve_log_target_with("demo", None, None, Some(dir.clone()))
            .unwrap()
            .unwrap();

        assert_eq!(target.dir, dir);
        assert!(dir.join("demo.jsonl").is_file());
    }
}
