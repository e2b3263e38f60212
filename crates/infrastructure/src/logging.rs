//! Logging initialization

use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

/// Errors raised while installing the global subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

/// Build the filter: `RUST_LOG` wins, the configured directive is the fallback
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| LoggingError::Filter(e.to_string()))
}

/// Install the global tracing subscriber
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;

    let (text_layer, json_layer) = match config.format {
        LogFormat::Text => (Some(fmt::layer().with_target(true)), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_current_span(true))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    debug!(format = ?config.format, "Logging initialized");
    Ok(())
}
