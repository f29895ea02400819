//! Tag Manager client error types.

use std::time::Duration;

use idsync_core::SyncError;
use thiserror::Error;

/// Service name used in surfaced errors.
pub const SERVICE: &str = "tagmanager";

/// Tag Manager client errors.
#[derive(Error, Debug)]
pub enum TagManagerError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request URL could not be built
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Tag Manager API returned an error
    #[error("Tag Manager API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        retry_after: Option<u64>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TagManagerError {
    /// Check if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder() && !e.is_decode(),
            Self::Api { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            Self::Json(_) | Self::Url(_) | Self::Config(_) => false,
        }
    }

    /// Get the suggested retry delay.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Api { retry_after, .. } => retry_after.map(Duration::from_secs),
            _ => None,
        }
    }

    /// HTTP status of the failed call, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Api { status, .. } => Some(*status),
            Self::Json(_) | Self::Url(_) | Self::Config(_) => None,
        }
    }

    /// Convert to a sync error, naming the operation that failed.
    #[must_use]
    pub fn to_sync_error(&self, operation: &str) -> SyncError {
        match self {
            Self::Config(msg) => SyncError::InvalidConfig {
                message: msg.clone(),
            },
            Self::Url(e) => SyncError::InvalidConfig {
                message: format!("invalid request URL: {e}"),
            },
            Self::Http(_) | Self::Json(_) | Self::Api { .. } => SyncError::Upstream {
                service: SERVICE.into(),
                operation: operation.into(),
                message: self.to_string(),
                status_code: self.status_code(),
                retryable: self.is_retryable(),
                retry_after: self.retry_after(),
            },
        }
    }
}

/// Result type for Tag Manager client operations.
pub type TagManagerResult<T> = Result<T, TagManagerError>;
