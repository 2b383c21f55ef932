//! Error types for client operations.

use crate::validate::ValidationError;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Client error types.
///
/// Rejections by the provider are not errors: they are reported through
/// [`Response::status`](crate::Response::status).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Message failed local validation; nothing was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Connection, DNS, TLS or timeout failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider answered with a body that breaks the API contract.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Returns true if this error was raised before any network I/O.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if the request could not be delivered to the provider.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
