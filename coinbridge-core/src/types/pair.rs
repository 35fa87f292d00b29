//! Canonical currency pair.

use crate::symbol::SymbolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An ordered (base, quote) currency identity, independent of any exchange's formatting.
///
/// Codes are stored uppercase and the base always differs from the quote. Values
/// are immutable once constructed.
///
/// ```rust
/// use coinbridge_core::types::CurrencyPair;
///
/// let pair = CurrencyPair::new("eth", "btc").unwrap();
/// assert_eq!(pair.base(), "ETH");
/// assert_eq!(pair.to_string(), "ETH/BTC");
/// assert_eq!(pair.invert().to_string(), "BTC/ETH");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPair {
    base: String,
    quote: String,
}

impl CurrencyPair {
    /// Builds a pair from two currency codes.
    ///
    /// Codes are trimmed and uppercased; they must be non-empty ASCII alphanumerics.
    pub fn new(base: impl AsRef<str>, quote: impl AsRef<str>) -> Result<Self, SymbolError> {
        let base = normalize_code(base.as_ref())?;
        let quote = normalize_code(quote.as_ref())?;
        if base == quote {
            return Err(SymbolError::SameCurrency(base));
        }
        Ok(Self { base, quote })
    }

    /// Base currency code.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote currency code.
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Returns the pair with base and quote swapped.
    #[must_use]
    pub fn invert(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
        }
    }
}

fn normalize_code(code: &str) -> Result<String, SymbolError> {
    let code = code.trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SymbolError::InvalidCurrency(code.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for CurrencyPair {
    type Err = SymbolError;

    /// Parses the canonical `BASE/QUOTE` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .split_once('/')
            .ok_or_else(|| SymbolError::InvalidFormat(format!("expected BASE/QUOTE, got '{s}'")))?;
        Self::new(base, quote)
    }
}

impl TryFrom<String> for CurrencyPair {
    type Error = SymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyPair> for String {
    fn from(pair: CurrencyPair) -> Self {
        pair.to_string()
    }
}
