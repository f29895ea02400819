//! Error taxonomy shared by every connector.

use std::time::Duration;

/// Errors surfaced to the sync driver.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// An upstream listing or mutation call failed.
    #[error("{service} {operation} failed: {message}")]
    Upstream {
        /// Upstream service name.
        service: String,
        /// Operation that was being performed (e.g. `list user permissions`).
        operation: String,
        /// Upstream error detail.
        message: String,
        /// HTTP status, when the failure came from a response.
        status_code: Option<u16>,
        /// Whether the caller may retry the whole call.
        retryable: bool,
        /// Upstream retry hint.
        retry_after: Option<Duration>,
    },

    /// The request cannot be honoured as issued; nothing was mutated.
    #[error("precondition failed: {message}")]
    PreconditionFailed {
        /// What was wrong with the request.
        message: String,
    },

    /// A caller-supplied page token could not be decoded.
    #[error("invalid page token: {message}")]
    InvalidPageToken {
        /// Decoder detail.
        message: String,
    },

    /// Upstream data contradicts the request that produced it.
    #[error("inconsistent upstream data: {message}")]
    Inconsistency {
        /// Description of the mismatch.
        message: String,
    },

    /// Connector configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Validation failure.
        message: String,
    },

    /// The operation was cancelled before it completed.
    #[error("operation cancelled: {operation}")]
    Cancelled {
        /// Operation that was interrupted.
        operation: String,
    },

    /// Internal failure (serialization and similar).
    #[error("internal error: {message}")]
    Internal {
        /// Failure detail.
        message: String,
    },
}

impl SyncError {
    /// Build a precondition failure.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            message: message.into(),
        }
    }

    /// Build an inconsistency error.
    pub fn inconsistency(message: impl Into<String>) -> Self {
        Self::Inconsistency {
            message: message.into(),
        }
    }

    /// Build an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if the driver may retry the call that produced this error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { retryable, .. } => *retryable,
            Self::PreconditionFailed { .. }
            | Self::InvalidPageToken { .. }
            | Self::Inconsistency { .. }
            | Self::InvalidConfig { .. }
            | Self::Cancelled { .. }
            | Self::Internal { .. } => false,
        }
    }

    /// Get the upstream retry hint, if any.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Upstream { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal {
            message: format!("JSON error: {err}"),
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
