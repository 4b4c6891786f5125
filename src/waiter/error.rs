//! Error types for status waits.

use std::time::Duration;

use thiserror::Error;

use crate::status::ResourceStatus;

/// Errors raised by [`StatusWaiter`](super::StatusWaiter).
///
/// `E` is the error type of the caller's fetch function; fetch failures are
/// returned as [`WaitError::Fetch`] without modification.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum WaitError<E> {
    /// Raised before polling when the request is incomplete.
    #[error("invalid wait request: missing {0}")]
    Validation(String),
    /// Raised when the deadline passes without a matching status.
    #[error(
        "timed out after {elapsed:?} waiting for resource {resource_id} (last status: {})",
        describe(.last_status.as_ref())
    )]
    Timeout {
        /// Identifier of the resource being waited on.
        resource_id: String,
        /// Status reported by the most recent poll, if any.
        last_status: Option<ResourceStatus>,
        /// Time spent waiting when the deadline check failed.
        elapsed: Duration,
    },
    /// Raised when the caller cancels the wait.
    #[error("wait for resource {resource_id} was cancelled")]
    Cancelled {
        /// Identifier of the resource being waited on.
        resource_id: String,
        /// Status reported by the most recent poll, if any.
        last_status: Option<ResourceStatus>,
    },
    /// Failure returned by the fetch function.
    #[error(transparent)]
    Fetch(E),
}

impl<E> WaitError<E> {
    /// Returns `true` for [`WaitError::Timeout`].
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` for [`WaitError::Cancelled`].
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Status observed by the last poll before a timeout or cancellation.
    #[must_use]
    pub const fn last_status(&self) -> Option<&ResourceStatus> {
        match self {
            Self::Timeout { last_status, .. } | Self::Cancelled { last_status, .. } => {
                last_status.as_ref()
            }
            Self::Validation(_) | Self::Fetch(_) => None,
        }
    }

    /// Extracts the upstream fetch error, if this is one.
    #[must_use]
    pub fn into_fetch_error(self) -> Option<E> {
        match self {
            Self::Fetch(err) => Some(err),
            Self::Validation(_) | Self::Timeout { .. } | Self::Cancelled { .. } => None,
        }
    }
}

fn describe(status: Option<&ResourceStatus>) -> &str {
    status.map_or("none observed", ResourceStatus::as_str)
}
