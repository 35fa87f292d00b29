//! Transport error types.

use std::error::Error as StdError;
use thiserror::Error;

/// Transport failures reported by the caller-supplied HTTP layer.
///
/// Third-party client errors are folded into these variants so the public API does
/// not expose `reqwest` types. A `RequestFailed` with status 429 or 418 is treated
/// as a provider throttle by the dispatcher.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NetworkError {
    /// Request failed with HTTP status code.
    #[error("Request failed with status {status}: {message}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Request timed out.
    #[error("Request timeout")]
    Timeout,

    /// Connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Opaque transport error.
    #[error("Transport error")]
    Transport(#[source] Box<dyn StdError + Send + Sync + 'static>),
}
