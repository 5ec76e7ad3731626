//! Error types for backend requests.

use thiserror::Error;

use crate::RestrictionId;

/// Result alias for backend requests.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by [`crate::AdminApi`] calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, kept for the error banner.
        body: String,
    },

    /// Response body did not match the expected envelope.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Base URL could not be used to build endpoint URLs.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A restriction row that carries neither or both value fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("restriction {id} ({title}): {reason}")]
pub struct InvalidRestriction {
    /// Row id.
    pub id: RestrictionId,
    /// Row title.
    pub title: String,
    /// Which shape rule was broken.
    pub reason: &'static str,
}
