//! Error types for the console host.

use lifeview_client::ClientError;
use lifeview_core::{ConfigError, ControllerError};
use lifeview_render::SurfaceError;

/// Errors that stop the host.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// The controller could not be built.
    #[error("controller error: {0}")]
    Controller(#[from] ControllerError),

    /// A frame could not be written.
    #[error("frame export error: {0}")]
    Surface(#[from] SurfaceError),

    /// Reading the console failed.
    #[error("console I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking export task panicked or was cancelled.
    #[error("export task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
