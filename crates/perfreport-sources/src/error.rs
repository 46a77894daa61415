//! Source error types.

use thiserror::Error;

/// Errors that can occur when reading from a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The API rejected the credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The configured base URL cannot be joined with a request path.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A failure injected into a dataset read.
    #[error("injected failure on {0}")]
    Injected(String),
}
