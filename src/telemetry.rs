//! Structured logging setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::{LogFormat, LoggingConfig},
    errors::StartupError,
};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level` when set.
///
/// # Errors
///
/// Fails when the filter directive does not parse or a subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<(), StartupError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|err| StartupError::Telemetry(err.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false).compact()).try_init(),
    };

    result.map_err(|err| StartupError::Telemetry(err.to_string()))
}
