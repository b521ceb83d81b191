//! Tracing subscriber setup for binaries embedding the board engine.

use crate::config::LogConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before the configured filter.
pub const LOG_ENV_VAR: &str = "KAI_LOG";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {source}")]
    InvalidFilter {
        /// Directive that failed to parse.
        directive: String,
        /// Parser error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    /// A global subscriber is already installed.
    #[error("failed to initialize tracing subscriber: {0}")]
    Install(String),
}

/// Resolves the filter from `KAI_LOG`, falling back to `config.filter`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when the configured directive
/// cannot be parsed.
pub fn build_filter(config: &LogConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|source| TelemetryError::InvalidFilter {
        directive: config.filter.clone(),
        source,
    })
}

/// Installs a global fmt subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a subscriber has
/// already been installed.
pub fn init_tracing(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| TelemetryError::Install(err.to_string()))
}
