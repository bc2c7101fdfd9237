//! Logger bootstrap shared by the binaries.
//!
//! Logs go to stderr so stdout stays free for reports. `RUST_LOG` wins over the
//! level passed in.

use flexi_logger::{Logger, LoggerHandle};
use log::info;
use std::sync::OnceLock;

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Starts the stderr logger once per process. Later calls are no-ops.
///
/// # Errors
/// - Returns an error when `level` is not one of trace|debug|info|warn|error.
/// - Returns an error when the logger backend fails to start.
pub fn init_logging(level: &str) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let level = normalize_level(level)?;
    let handle = Logger::try_with_env_or_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_stderr()
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;
    let _ = LOGGER.set(handle);

    info!(
        "event=app_start level={} version={}",
        level,
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

pub fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error|off"
        )),
    }
}
