//! Error types for Sonia
//!
//! This module defines the error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Fallback text shown when an error carries no displayable message
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Main error type for Sonia operations
///
/// Covers configuration problems, assistant service failures, client-side
/// validation, and the lower-level IO/serialization/HTTP errors they wrap.
#[derive(Error, Debug)]
pub enum SoniaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Assistant service rejected a request or could not be reached
    ///
    /// The message is shown to the user verbatim, so it carries either the
    /// service's `detail` field or a generic status line.
    #[error("{0}")]
    Api(String),

    /// Input rejected before any request was sent
    #[error("{0}")]
    Validation(String),

    /// A request of the same kind is already in flight
    #[error("A {0} is already in progress")]
    Busy(&'static str),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Sonia operations
///
/// Uses `anyhow::Error` so call sites can attach context freely; the
/// structured [`SoniaError`] is recovered with `downcast_ref` where needed.
pub type Result<T> = anyhow::Result<T>;

/// Normalize any error into a string suitable for display in the chat
///
/// Structured [`SoniaError`] values yield their own message; anything else
/// collapses to [`UNEXPECTED_ERROR_MESSAGE`].
///
/// # Examples
///
/// ```
/// use sonia::error::{handle_api_error, SoniaError};
///
/// let err: anyhow::Error = SoniaError::Api("model unavailable".to_string()).into();
/// assert_eq!(handle_api_error(&err), "model unavailable");
///
/// let other = anyhow::anyhow!("something odd");
/// assert_eq!(handle_api_error(&other), "An unexpected error occurred");
/// ```
pub fn handle_api_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<SoniaError>() {
        Some(err) => {
            let message = err.to_string();
            if message.trim().is_empty() {
                UNEXPECTED_ERROR_MESSAGE.to_string()
            } else {
                message
            }
        }
        None => UNEXPECTED_ERROR_MESSAGE.to_string(),
    }
}
