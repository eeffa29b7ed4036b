//! Error types for the Bring! REST client.

use thiserror::Error;

/// Errors from the Bring! API surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with its error envelope.
    #[error("{message}")]
    Service { message: String },

    /// Non-success HTTP status without a decodable envelope.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The response body did not match the expected shape.
    #[error("cannot decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client-side configuration problem (bad header value, bad URL).
    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
