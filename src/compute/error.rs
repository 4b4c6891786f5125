//! Error types for the Compute client.

use thiserror::Error;

use crate::config::ConfigError;
use crate::waiter::NotFound;

use super::ResourceKind;

/// Errors raised by [`ComputeClient`](super::ComputeClient).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ComputeError {
    /// Raised when the client configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when a request is missing a required field.
    #[error("invalid request: {0}")]
    Validation(String),
    /// Raised when the API answers 404 for a resource.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind of resource requested.
        kind: ResourceKind,
        /// Identifier that could not be found.
        id: String,
    },
    /// Raised for any other non-success HTTP status.
    #[error("compute API returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Fault message reported by the API.
        message: String,
    },
    /// Raised when the request could not be sent or the response not read.
    #[error("transport error: {message}")]
    Transport {
        /// Message returned by the HTTP client.
        message: String,
    },
    /// Raised when a response body does not match the expected shape.
    #[error("failed to decode {kind} response: {message}")]
    Decode {
        /// Kind of resource being decoded.
        kind: ResourceKind,
        /// Deserialisation failure detail.
        message: String,
    },
}

impl NotFound for ComputeError {
    fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ConfigError> for ComputeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<reqwest::Error> for ComputeError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}
