//! Facade error types.

use crate::envelope::ResultEnvelope;
use crate::transport::TransportError;

/// Message used when an error envelope resolved no message of its own.
pub const MSG_CANNOT_COMPLETE: &str = "Cannot complete operation";

/// Errors returned by the [`Client`](crate::Client) facade.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A call classified as an error, raised because `throw` was left on.
    /// Carries the full envelope for inspection.
    #[error("{message}")]
    Request {
        /// The envelope's message, or [`MSG_CANNOT_COMPLETE`].
        message: String,
        /// The normalized outcome.
        envelope: Box<ResultEnvelope>,
    },

    /// Transport-level construction failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl FetchError {
    pub(crate) fn request(envelope: ResultEnvelope) -> Self {
        let message = envelope
            .message
            .clone()
            .unwrap_or_else(|| MSG_CANNOT_COMPLETE.to_string());
        Self::Request {
            message,
            envelope: Box::new(envelope),
        }
    }

    /// The envelope carried by a request error, if this is one.
    pub fn envelope(&self) -> Option<&ResultEnvelope> {
        match self {
            FetchError::Request { envelope, .. } => Some(envelope),
            FetchError::Transport(_) => None,
        }
    }
}
