use crate::models::SubsystemSettings;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Create `log_dir` and a daily rotating, non-blocking writer inside it
fn rolling_writer(log_dir: &str, log_prefix: &str) -> Result<(NonBlocking, WorkerGuard)> {
    let log_path = Utf8PathBuf::from(log_dir);
    if !log_path.exists() {
        fs::create_dir_all(&log_path)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }

    let file_appender = rolling::daily(log_dir, log_prefix);
    Ok(tracing_appender::non_blocking(file_appender))
}

/// `RUST_LOG` wins; otherwise debug or info depending on `debug_mode`
fn env_filter(debug_mode: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_mode {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

/// Setup logging with rotating file appender.
///
/// Logs are written to the specified directory with daily rotation. Thread
/// ids are included so worker-thread and game-thread lines can be told apart.
///
/// # Arguments
/// * `log_dir` - Directory for log files (e.g., "logs")
/// * `log_prefix` - Prefix for log files (e.g., "steam-async")
/// * `debug_mode` - If true, use debug level; otherwise use info level
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(log_dir: &str, log_prefix: &str, debug_mode: bool) -> Result<WorkerGuard> {
    setup_logging_with_console(log_dir, log_prefix, debug_mode, false)
}

/// Setup logging with optional console output for debugging.
///
/// # Arguments
/// * `log_dir` - Directory for log files
/// * `log_prefix` - Prefix for log files
/// * `debug_mode` - If true, use debug level; otherwise use info level
/// * `console_output` - If true, also log to console
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging_with_console(
    log_dir: &str,
    log_prefix: &str,
    debug_mode: bool,
    console_output: bool,
) -> Result<WorkerGuard> {
    let (non_blocking, guard) = rolling_writer(log_dir, log_prefix)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    // Only one global subscriber per process
    let console_layer = console_output.then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false)
            .with_thread_names(true)
    });

    tracing_subscriber::registry()
        .with(env_filter(debug_mode))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}",
        log_dir,
        log_prefix,
        debug_mode,
        console_output
    );

    Ok(guard)
}

/// Setup logging that writes one JSON object per line.
///
/// Same rotation and filtering as [`setup_logging`], for feeding logs into
/// tooling instead of reading them.
pub fn setup_json_logging(log_dir: &str, log_prefix: &str, debug_mode: bool) -> Result<WorkerGuard> {
    let (non_blocking, guard) = rolling_writer(log_dir, log_prefix)?;

    tracing_subscriber::registry()
        .with(env_filter(debug_mode))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_thread_names(true)
                .with_current_span(false),
        )
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    tracing::info!(
        "JSON logging initialized: dir={}, prefix={}, debug={}",
        log_dir,
        log_prefix,
        debug_mode
    );

    Ok(guard)
}

/// Setup logging as configured in `settings`
///
/// JSON files when `json_logs` is set, otherwise plain files with optional
/// console output.
pub fn setup_logging_from_settings(
    settings: &SubsystemSettings,
    log_prefix: &str,
    console_output: bool,
) -> Result<WorkerGuard> {
    if settings.json_logs {
        setup_json_logging(&settings.log_dir, log_prefix, settings.debug_mode)
    } else {
        setup_logging_with_console(
            &settings.log_dir,
            log_prefix,
            settings.debug_mode,
            console_output,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    #[allow(unused_variables)]
    fn test_setup_logging() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().to_str().unwrap();

        // May fail if another test already installed a subscriber,
        // but the directory is created either way
        let result = setup_logging(log_dir, "test", false);

        assert!(Utf8PathBuf::from(log_dir).exists());
    }

    #[test]
    fn test_log_directory_created() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("nested").join("logs");
        let log_dir_str = log_dir.to_str().unwrap();

        // Writer only, no global subscriber
        let (_writer, _guard) = rolling_writer(log_dir_str, "test").unwrap();

        assert!(log_dir.exists());
    }

    #[test]
    fn test_second_subscriber_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().to_str().unwrap();

        let first = setup_json_logging(log_dir, "first", true);
        let second = setup_logging(log_dir, "second", true);

        // Whichever test ran first owns the global subscriber
        assert!(first.is_err() || second.is_err());
    }

    #[test]
    #[allow(unused_variables)]
    fn test_settings_select_json_logs() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("json");
        let settings = SubsystemSettings {
            log_dir: log_dir.to_str().unwrap().to_string(),
            json_logs: true,
            ..Default::default()
        };

        // The writer is created before the global subscriber is installed
        let result = setup_logging_from_settings(&settings, "test", false);

        assert!(log_dir.exists());
    }
}
