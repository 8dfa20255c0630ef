//! # Ledger Telemetry
//!
//! Logging and metrics for the discovery ledger.
//!
//! - **Logs**: `tracing-subscriber` with an `EnvFilter` and a pretty or JSON
//!   `fmt` layer
//! - **Metrics**: Prometheus registry for node-level series, encoded together
//!   with component metrics by [`gather_metrics`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _logging = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DL_SERVICE_NAME` | `discovery-ledger` | Service name in logs |
//! | `DL_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `DL_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `DL_LOG_TARGET` | `true` | Print event targets |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging, LoggingState};
pub use metrics::{
    gather_metrics, record_ledger_stats, register_metrics, HistogramTimer, CHAIN_HEIGHT,
    FAULT_RATE, MEMO_EVICTIONS, MINING_DURATION, MINING_FAILURES, REGISTRY, SCHEDULER_TICKS,
    TOTAL_SCIENTIFIC_VALUE, UNITS_BY_STATUS, UNITS_MINED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging and register node metrics.
///
/// Tolerates being called after another subscriber or a previous
/// registration, so tests and embedders can call it freely.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<LoggingState, TelemetryError> {
    let state = init_logging(config)?;
    if let Err(e) = register_metrics() {
        tracing::debug!(error = %e, "Node metrics already registered");
    }
    Ok(state)
}

/// Span carrying the component name, for grouping a task's log lines.
///
/// ```rust,ignore
/// let _span = component_span!("audit_loop", component = "scheduler").entered();
/// ```
#[macro_export]
macro_rules! component_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Increment a counter, optionally by label values.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
