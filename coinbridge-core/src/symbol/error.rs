//! Symbol codec error types.

use std::fmt;

/// Errors raised while building currency pairs or converting exchange symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// The symbol does not have the shape the mapping expects
    InvalidFormat(String),

    /// The pair or symbol is absent from the market table
    UnknownMarket(String),

    /// Invalid currency code
    InvalidCurrency(String),

    /// Base and quote are the same currency
    SameCurrency(String),

    /// Empty symbol string
    EmptySymbol,
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(msg) => write!(f, "Invalid symbol format: {msg}"),
            Self::UnknownMarket(market) => write!(f, "Unknown market: {market}"),
            Self::InvalidCurrency(code) => write!(f, "Invalid currency code: '{code}'"),
            Self::SameCurrency(code) => {
                write!(f, "Base and quote are both {code}")
            }
            Self::EmptySymbol => write!(f, "Symbol string is empty"),
        }
    }
}

impl std::error::Error for SymbolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SymbolError::InvalidFormat("btcusdt".to_string()).to_string(),
            "Invalid symbol format: btcusdt"
        );
        assert_eq!(
            SymbolError::UnknownMarket("XXBTZUSD".to_string()).to_string(),
            "Unknown market: XXBTZUSD"
        );
        assert_eq!(
            SymbolError::InvalidCurrency("B-C".to_string()).to_string(),
            "Invalid currency code: 'B-C'"
        );
        assert_eq!(
            SymbolError::SameCurrency("BTC".to_string()).to_string(),
            "Base and quote are both BTC"
        );
        assert_eq!(
            SymbolError::EmptySymbol.to_string(),
            "Symbol string is empty"
        );
    }
}
