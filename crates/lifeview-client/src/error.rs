//! Error types for talking to the simulation service.
//!
//! Every failure a remote call can produce ends up here. The controller
//! treats all of them the same way (log, keep the stale snapshot, retry on the
//! next cycle), but the variants stay distinct so logs say what went wrong.

use lifeview_types::SnapshotError;

use crate::service::Endpoint;

/// Errors that can occur while calling the simulation service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (connect failure, timeout).
    #[error("{endpoint} transport error: {message}")]
    Transport {
        /// The endpoint that was called.
        endpoint: Endpoint,
        /// Description of the underlying failure.
        message: String,
    },

    /// The service answered with a non-success HTTP status.
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        /// The endpoint that was called.
        endpoint: Endpoint,
        /// HTTP status code.
        status: u16,
        /// Response body, for the log.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("{endpoint} response decode failed: {message}")]
    Decode {
        /// The endpoint that was called.
        endpoint: Endpoint,
        /// Description of the decode failure.
        message: String,
    },

    /// The service answered `success: false`.
    #[error("{endpoint} rejected the command")]
    Rejected {
        /// The endpoint that was called.
        endpoint: Endpoint,
    },

    /// A grid reply did not match the session's grid dimensions.
    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    /// The HTTP client itself could not be built.
    #[error("client setup error: {0}")]
    Setup(String),
}

impl ClientError {
    /// The endpoint involved, when the error came from a call.
    pub const fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. }
            | Self::Rejected { endpoint } => Some(*endpoint),
            Self::Snapshot(_) | Self::Setup(_) => None,
        }
    }
}
