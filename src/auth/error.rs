//! Error types for the browser-assisted login pipeline.

use thiserror::Error;

/// Errors that can occur while acquiring a credential through the browser.
///
/// All variants are terminal for the current login attempt; the caller
/// surfaces the error and the user re-invokes the command to retry.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The browser engine failed to start.
    #[error("browser engine failed to start: {reason}. Install Chromium or Google Chrome and try again")]
    Launch { reason: String },

    /// The human did not complete the login in time.
    #[error("timed out after {seconds}s waiting for login to complete")]
    LoginTimeout { seconds: u64 },

    /// Neither the intercepted response nor browser storage yielded a token.
    #[error("no access token found in the login response or browser storage")]
    MissingToken,

    /// A token was found but no user id could be derived from it.
    #[error("access token carries no derivable user id")]
    MissingUserId,

    /// The token is not a decodable three-segment JWT.
    #[error("invalid token format (not a valid JWT)")]
    InvalidTokenFormat,

    /// JavaScript evaluation in the page failed.
    #[error("JavaScript evaluation failed: {script_hint} - {error}")]
    JsEvaluation { script_hint: String, error: String },

    /// Generic automation protocol error.
    #[error("browser protocol error: {0}")]
    Protocol(String),
}

/// Result type alias for login pipeline operations.
pub type Result<T> = std::result::Result<T, AuthError>;
