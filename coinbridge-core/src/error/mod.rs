//! # Error Handling
//!
//! A single, strongly-typed error enum shared by every coinbridge component.
//!
//! ## Error Hierarchy
//!
//! ```text
//! Error
//! ├── Symbol                - Codec failures (invalid format, unknown market, bad pair)
//! ├── RateLimited           - Throttle signal (soft when produced by the dispatcher)
//! ├── Exchange              - Business-logic error returned by the provider, verbatim
//! ├── UnsupportedOrderField - Side/type the normalizer cannot map safely
//! ├── NotFound              - Order-book store miss
//! ├── Network               - Transport layer errors (via NetworkError)
//! ├── Parse                 - Payload parsing errors (via ParseError)
//! ├── Authentication        - Missing or rejected credentials
//! ├── InvalidRequest        - Invalid parameters
//! └── Context               - Error with additional context
//! ```
//!
//! ## Rate limiting is soft
//!
//! The dispatcher never returns `Err(Error::RateLimited)` for a skipped call: it
//! returns [`Dispatched::Stale`](crate::dispatcher::Dispatched) carrying the best
//! available value. `RateLimited` appears as an error only when a caller converts a
//! stale outcome with `into_fresh()`, or when an adapter classifies a provider
//! response as a throttle before handing it to the dispatcher.
//!
//! ## Quick Start
//!
//! ```rust
//! use coinbridge_core::error::{ContextExt, Error, Result};
//!
//! fn lookup(symbol: &str) -> Result<()> {
//!     if symbol.is_empty() {
//!         return Err(Error::invalid_request("Symbol cannot be empty"));
//!     }
//!     Ok(())
//! }
//!
//! let err = lookup("").context("Failed to refresh order book").unwrap_err();
//! assert!(err.report().contains("Symbol cannot be empty"));
//! ```

mod context;
mod convert;
mod details;
mod network;
mod parse;

use std::borrow::Cow;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

pub use context::ContextExt;
pub use details::ExchangeErrorDetails;
pub use network::NetworkError;
pub use parse::ParseError;

pub use crate::symbol::SymbolError;

/// Result type alias for all coinbridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP statuses exchanges use to signal throttling or an IP ban.
const THROTTLE_STATUSES: [u16; 2] = [429, 418];

/// The primary error type for coinbridge.
///
/// Large variants are boxed to keep the enum small.
///
/// # Example
///
/// ```rust
/// use coinbridge_core::error::Error;
///
/// let err = Error::not_found("BTC/USD spot");
/// assert!(err.to_string().contains("BTC/USD spot"));
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Symbol codec failures.
    #[error("Symbol error: {0}")]
    Symbol(SymbolError),

    /// Throttle signal with optional retry information.
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Error message
        message: Cow<'static, str>,
        /// Optional duration to wait before retrying
        retry_after: Option<Duration>,
    },

    /// Business-logic error returned by the exchange, propagated verbatim.
    #[error("Exchange error: {0}")]
    Exchange(Box<ExchangeErrorDetails>),

    /// The normalizer met a side or order type it cannot map safely.
    #[error("Unsupported {field} '{value}' from {exchange}")]
    UnsupportedOrderField {
        /// Exchange the payload came from
        exchange: Cow<'static, str>,
        /// Field name ("side" or "type")
        field: &'static str,
        /// Raw value as reported by the exchange
        value: String,
    },

    /// Requested entry has never been populated.
    #[error("Not found: {0}")]
    NotFound(Cow<'static, str>),

    /// Network-related errors. Boxed to reduce enum size.
    #[error("Network error: {0}")]
    Network(Box<NetworkError>),

    /// Errors during payload parsing. Boxed to reduce enum size.
    #[error("Parse error: {0}")]
    Parse(Box<ParseError>),

    /// Authentication errors (missing credentials, rejected signature).
    #[error("Authentication error: {0}")]
    Authentication(Cow<'static, str>),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(Cow<'static, str>),

    /// Error with additional context, preserving the error chain.
    #[error("{context}")]
    Context {
        /// Context message describing what operation failed
        context: String,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    // ==================== Constructor Methods ====================

    /// Creates an exchange (provider) error.
    ///
    /// ```rust
    /// use coinbridge_core::error::Error;
    ///
    /// let err = Error::exchange("-2010", "Account has insufficient balance");
    /// assert!(err.to_string().contains("-2010"));
    /// ```
    pub fn exchange(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Exchange(Box::new(ExchangeErrorDetails::new(code, message)))
    }

    /// Creates an exchange error with the raw response attached.
    pub fn exchange_with_data(
        code: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self::Exchange(Box::new(ExchangeErrorDetails::with_data(
            code, message, data,
        )))
    }

    /// Creates a rate limited error with optional retry duration.
    pub fn rate_limited(
        message: impl Into<Cow<'static, str>>,
        retry_after: Option<Duration>,
    ) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates an unsupported order field error.
    pub fn unsupported_order_field(
        exchange: impl Into<Cow<'static, str>>,
        field: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::UnsupportedOrderField {
            exchange: exchange.into(),
            field,
            value: value.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(what: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(what.into())
    }

    /// Creates a network error from a message.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(Box::new(NetworkError::ConnectionFailed(msg.into())))
    }

    /// Creates an authentication error.
    pub fn authentication(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Creates an invalid request error.
    pub fn invalid_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    // ==================== Context Methods ====================

    /// Attaches context to an existing error.
    ///
    /// ```rust
    /// use coinbridge_core::error::Error;
    ///
    /// let err = Error::network("Connection refused")
    ///     .context("Failed to fetch order book for ETH/BTC");
    /// assert!(matches!(err.root_cause(), Error::Network(_)));
    /// ```
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    // ==================== Chain Traversal Methods ====================

    fn iter_chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |err| match err {
            Error::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        })
    }

    /// Returns the root cause of the error, skipping Context layers.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        self.iter_chain().last().unwrap_or(self)
    }

    /// Generates a detailed error report with the full chain.
    #[must_use]
    pub fn report(&self) -> String {
        use std::fmt::Write;
        let mut report = self.to_string();

        let mut current: Option<&(dyn StdError + 'static)> = self.source();
        while let Some(err) = current {
            let _ = write!(report, "\nCaused by: {err}");
            current = err.source();
        }
        report
    }

    // ==================== Helper Methods (Context Penetrating) ====================

    /// Returns `true` when the provider signalled throttling or an IP ban.
    ///
    /// Matches `RateLimited` and HTTP 429/418 responses, through Context layers.
    #[must_use]
    pub fn is_provider_throttle(&self) -> bool {
        match self.root_cause() {
            Error::RateLimited { .. } => true,
            Error::Network(ne) => matches!(
                ne.as_ref(),
                NetworkError::RequestFailed { status, .. } if THROTTLE_STATUSES.contains(status)
            ),
            _ => false,
        }
    }

    /// Returns the message and retry hint if this is a rate limited error.
    #[must_use]
    pub fn as_rate_limited(&self) -> Option<(&str, Option<Duration>)> {
        match self.root_cause() {
            Error::RateLimited {
                message,
                retry_after,
            } => Some((message.as_ref(), *retry_after)),
            _ => None,
        }
    }

    /// Returns the provider details if this is an exchange error.
    #[must_use]
    pub fn as_exchange(&self) -> Option<&ExchangeErrorDetails> {
        match self.root_cause() {
            Error::Exchange(details) => Some(details.as_ref()),
            _ => None,
        }
    }

    /// Checks if a later attempt could succeed without changing the request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.root_cause() {
            Error::Network(ne) => matches!(
                ne.as_ref(),
                NetworkError::Timeout | NetworkError::ConnectionFailed(_)
            ),
            Error::RateLimited { .. } => true,
            _ => false,
        }
    }

    /// Checks if this is an order-book store miss.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Error::NotFound(_))
    }
}
