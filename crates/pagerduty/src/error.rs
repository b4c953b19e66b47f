//! Error type shared by every `PagerDuty` operation.

use thiserror::Error;

/// Errors that can occur while talking to `PagerDuty`.
#[derive(Error, Debug)]
pub enum PagerDutyError {
    /// The API rejected the credentials (HTTP 401).
    #[error("Unauthorized")]
    Unauthorized,

    /// The credentials lack access to the resource (HTTP 403).
    #[error("Forbidden")]
    Forbidden,

    /// The resource does not exist (HTTP 404), or a lookup resolved nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success response.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected JSON shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The discovery capability could not produce a base URL.
    #[error("Discovery failed: {0}")]
    Discovery(String),
}

impl PagerDutyError {
    /// HTTP status this error was derived from, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is the not-found kind.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
