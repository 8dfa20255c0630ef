//! Structured logging.
//!
//! One `tracing-subscriber` registry with an `EnvFilter` and either a
//! human readable or a JSON `fmt` layer. Every event carries the structured
//! fields its call site attached (`work_id`, `validator`, `index`, ...).

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Outcome of [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingState {
    /// This call installed the global subscriber.
    Installed,
    /// A global subscriber was already set; it is left in place.
    AlreadySet,
}

/// Build the filter for `config`.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level {:?}: {e}", config.log_level)))
}

/// Install the global subscriber.
///
/// Safe to call more than once: later calls report
/// [`LoggingState::AlreadySet`] instead of failing.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingState, TelemetryError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(LoggingState::AlreadySet);
    }

    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(config.with_target),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(config.with_target))
            .try_init()
    };

    match installed {
        Ok(()) => {
            tracing::info!(
                service = %config.service_name,
                level = %config.log_level,
                json = config.json_logs,
                "Logging initialized"
            );
            Ok(LoggingState::Installed)
        }
        // Lost a race with another initializer
        Err(_) if tracing::dispatcher::has_been_set() => Ok(LoggingState::AlreadySet),
        Err(e) => Err(TelemetryError::LoggingInit(e.to_string())),
    }
}
