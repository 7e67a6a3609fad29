//! # Fabric Telemetry
//!
//! Observability for Ledger Fabric:
//!
//! - **Metrics**: Prometheus counters/gauges/histograms in a process-wide
//!   registry, with a text-format snapshot view.
//! - **Logging**: structured `tracing` with an env-driven filter.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fabric_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("Failed to init telemetry");
//!
//!     // Application code; metrics and structured logs are live.
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LF_LOG_LEVEL` | `info` | Log level filter |
//! | `LF_JSON_LOGS` | `false` | Emit JSON log lines |

pub mod logging;
pub mod metrics;

pub use logging::LoggingGuard;
pub use metrics::{encode_metrics, register_metrics, HistogramTimer, MetricsHandle};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default log level when no env filter is set.
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Read configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("LF_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: std::env::var("LF_JSON_LOGS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.json_logs),
        }
    }
}

/// Initialize metrics and logging.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics_handle = register_metrics()?;
    let logging_guard = logging::init_logging(config)?;

    Ok(TelemetryGuard {
        _logging: logging_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
    _metrics: MetricsHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }
}
