//! Structured logging setup.
//!
//! Logs go through `tracing` with consistent fields:
//! - `subsystem`: subsystem identifier (consensus, bridge, ordering, ...)
//! - structured context fields per event
//!
//! Output is either human-readable or JSON, per [`crate::TelemetryConfig`].

use tracing_subscriber::{fmt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Guard that keeps the logging subscriber installed.
pub struct LoggingGuard {
    _initialized: bool,
}

/// Install the global tracing subscriber.
///
/// The filter comes from `LF_LOG_LEVEL` (or `RUST_LOG`) with the
/// configured level as fallback.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingGuard, TelemetryError> {
    let filter = EnvFilter::try_from_env("LF_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let result = if config.json_logs {
        tracing::subscriber::set_global_default(
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .json()
                .finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            fmt::Subscriber::builder().with_env_filter(filter).finish(),
        )
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    tracing::debug!(
        level = %config.log_level,
        json = config.json_logs,
        "Structured logging configured"
    );
    Ok(LoggingGuard { _initialized: true })
}

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
    (error, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}
