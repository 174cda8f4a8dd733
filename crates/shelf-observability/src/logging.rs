//! Logging subscriber initialisation.

use shelf_core::{LogFormat, LoggingConfig};
use tracing_subscriber::{
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Errors raised while initialising logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The configured level directive didn't parse.
    #[error("invalid log level directive {directive:?}: {reason}")]
    InvalidLevel { directive: String, reason: String },

    /// A global subscriber is already installed.
    #[error("failed to initialise tracing subscriber: {0}")]
    AlreadyInitialised(#[from] tracing_subscriber::util::TryInitError),
}

/// Build the level filter.
///
/// `RUST_LOG` wins over the configured level when it is set.
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level).map_err(|e| LoggingError::InvalidLevel {
        directive: config.level.clone(),
        reason: e.to_string(),
    })
}

/// Install the global `tracing` subscriber.
///
/// Returns an error instead of panicking when called twice.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_env_filter(config)?;

    match config.format {
        LogFormat::Human => init_with_layer(
            filter,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(std::io::stderr),
        ),
        LogFormat::Json => init_with_layer(
            filter,
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_writer(std::io::stderr),
        ),
    }
}

fn init_with_layer<L>(filter: EnvFilter, fmt_layer: L) -> Result<(), LoggingError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()?;
    Ok(())
}
