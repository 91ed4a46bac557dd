//! # Pushgate Telemetry
//!
//! Logging and metrics bootstrap shared by every Pushgate crate.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an env filter, pretty output for
//!   development and JSON lines for containers
//! - **Metrics**: Prometheus counters describing pipeline outcomes, rendered by
//!   the gateway at `GET /metrics`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pg_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `pushgate` | Service name attached to log lines |
//! | `PG_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `PG_JSON_LOGS` | `false` (`true` in containers) | Emit JSON log lines |
//! | `PG_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, CERTIFICATE_FETCHES, MESSAGES_RECEIVED, MESSAGES_REJECTED,
    SUBSCRIPTION_CONFIRMATIONS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize log subscriber: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        log_level = %config.log_level,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _private: () })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a labelled counter increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
