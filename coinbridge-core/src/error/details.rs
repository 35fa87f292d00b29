//! Provider error details.

use serde_json::Value;

/// A business-logic error reported by an exchange (insufficient funds, unknown order, ...).
///
/// Kept verbatim so the adapter's caller sees exactly what the provider said.
///
/// ```rust
/// use coinbridge_core::error::ExchangeErrorDetails;
///
/// let details = ExchangeErrorDetails::new("EOrder:Insufficient funds", "Insufficient funds");
/// assert_eq!(details.code, "EOrder:Insufficient funds");
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub struct ExchangeErrorDetails {
    /// Error code as a string; exchanges mix numeric and symbolic codes.
    pub code: String,
    /// Descriptive message from the exchange.
    pub message: String,
    /// Optional raw response for debugging.
    pub data: Option<Value>,
}

impl ExchangeErrorDetails {
    /// Creates details with the given code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Creates details with the raw response attached.
    pub fn with_data(code: impl Into<String>, message: impl Into<String>, data: Value) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl std::fmt::Display for ExchangeErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}
