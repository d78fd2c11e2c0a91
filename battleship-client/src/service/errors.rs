//! Errors returned by a [`GameService`](crate::service::GameService).
//!
//! The `Display` of every variant is the message shown to the user.

use thiserror::Error;

use crate::service::TransportError;

/// Message shown when a fleet is randomized twice.
pub(crate) const ALREADY_PLACED_MESSAGE: &str =
    "You have already placed all ships for this player.";

/// Reason a call to the game service failed.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(#[source] TransportError),

    /// The service answered with a non-success status. The message is the service's own,
    /// passed through verbatim.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Random placement was requested for a fleet that is already fully placed.
    #[error("{}", ALREADY_PLACED_MESSAGE)]
    AlreadyPlaced,

    /// A response body could not be decoded.
    #[error("Invalid JSON from server")]
    Malformed(#[source] serde_json::Error),

    /// A response that must carry data came back empty.
    #[error("Empty response from {0}")]
    EmptyResponse(&'static str),

    /// The configured service root could not be turned into a request URL.
    #[error("invalid service endpoint {0:?}")]
    Endpoint(String),
}

impl ServiceError {
    /// Wrap any error as a transport failure.
    pub fn transport(err: impl Into<TransportError>) -> Self {
        ServiceError::Transport(err.into())
    }

    /// Build a rejection with the given status and message.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        ServiceError::Rejected {
            status,
            message: message.into(),
        }
    }

    /// The HTTP status of a rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
