//! Tracing subscriber setup for applications embedding the engine.

use crate::config::LoggingConfig;
use crate::error::{EngineError, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber filtered by `config.filter`.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| EngineError::Config(format!("invalid log filter {:?}: {e}", config.filter)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let installed = if config.compact {
        builder.compact().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        debug!("tracing subscriber already installed");
    }
    Ok(())
}
