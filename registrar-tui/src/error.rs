//! Error types for the console.

use crate::api_client::ApiClientError;
use crate::config::ConfigError;
use registrar_grid::GridError;

#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiClientError),
    #[error("Grid setup failed: {0}")]
    Grid(#[from] GridError),
    #[error("Logging setup failed: {0}")]
    Telemetry(String),
}
