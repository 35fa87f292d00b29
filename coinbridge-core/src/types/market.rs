//! Market-type tag used to key order books.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Distinguishes order-book flavors for the same pair (spot vs margin, ...).
///
/// ```rust
/// use coinbridge_core::types::MarketType;
///
/// assert_eq!("SPOT".parse::<MarketType>().unwrap(), MarketType::Spot);
/// assert_eq!(MarketType::Spot.to_string(), "spot");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketType {
    /// Spot market
    #[default]
    Spot,
    /// Margin market
    Margin,
    /// Futures market
    Futures,
    /// Any other exchange-specific flavor, stored lowercase
    Other(String),
}

impl MarketType {
    /// Lowercase tag for this market type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Spot => "spot",
            Self::Margin => "margin",
            Self::Futures => "futures",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Ok(match tag.as_str() {
            "spot" => Self::Spot,
            "margin" => Self::Margin,
            "futures" | "future" => Self::Futures,
            _ => Self::Other(tag),
        })
    }
}

impl From<String> for MarketType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(market_type) => market_type,
            Err(never) => match never {},
        }
    }
}

impl From<MarketType> for String {
    fn from(value: MarketType) -> Self {
        value.to_string()
    }
}
