//! CLI error types.

use adapter_loader::LoaderError;
use forecast_kernel::SimulationError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The forecast kernel rejected the inputs or produced an unstable value.
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// The price source could not be read.
    #[error("Price source error: {0}")]
    Loader(#[from] LoaderError),

    /// A command line argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON output failed.
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
