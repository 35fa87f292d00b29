//! Ticker type definitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Amount, CurrencyPair, Price, Timestamp};

/// Latest prices for one pair: last trade, best bid and ask, and the 24h range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Canonical pair
    pub pair: CurrencyPair,

    /// Timestamp in milliseconds
    pub timestamp: Timestamp,

    /// Last traded price
    pub last: Price,

    /// Current best bid price
    pub bid: Price,

    /// Current best ask price
    pub ask: Price,

    /// Highest price in 24h
    pub high: Option<Price>,

    /// Lowest price in 24h
    pub low: Option<Price>,

    /// Base volume traded in 24h
    pub volume: Option<Amount>,
}

impl Ticker {
    /// Creates a ticker with the required prices; range and volume start empty.
    pub fn new(
        pair: CurrencyPair,
        timestamp: Timestamp,
        last: Price,
        bid: Price,
        ask: Price,
    ) -> Self {
        Self {
            pair,
            timestamp,
            last,
            bid,
            ask,
            high: None,
            low: None,
            volume: None,
        }
    }

    /// Sets the 24h high and low.
    #[must_use]
    pub fn with_range(mut self, high: Option<Price>, low: Option<Price>) -> Self {
        self.high = high;
        self.low = low;
        self
    }

    /// Sets the 24h base volume.
    #[must_use]
    pub fn with_volume(mut self, volume: Option<Amount>) -> Self {
        self.volume = volume;
        self
    }

    /// `ask - bid`.
    pub fn spread(&self) -> Price {
        self.ask - self.bid
    }

    /// Midpoint of bid and ask.
    pub fn mid_price(&self) -> Price {
        Price::new((self.bid.as_decimal() + self.ask.as_decimal()) / Decimal::TWO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ticker() -> Ticker {
        Ticker::new(
            CurrencyPair::new("ETH", "BTC").unwrap(),
            1_500_000_000_000,
            Price::new(dec!(0.0713)),
            Price::new(dec!(0.0712)),
            Price::new(dec!(0.0716)),
        )
    }

    #[test]
    fn test_spread_and_mid() {
        let ticker = ticker();
        assert_eq!(ticker.spread(), Price::new(dec!(0.0004)));
        assert_eq!(ticker.mid_price(), Price::new(dec!(0.0714)));
    }

    #[test]
    fn test_builders() {
        let ticker = ticker()
            .with_range(Some(Price::new(dec!(0.075))), Some(Price::new(dec!(0.069))))
            .with_volume(Some(Amount::new(dec!(1520.5))));
        assert_eq!(ticker.high, Some(Price::new(dec!(0.075))));
        assert_eq!(ticker.volume.map(|v| v.as_decimal()), Some(dec!(1520.5)));
    }

    #[test]
    fn test_serde_uses_canonical_pair() {
        let json = serde_json::to_value(ticker()).unwrap();
        assert_eq!(json["pair"], "ETH/BTC");
        assert_eq!(json["high"], serde_json::Value::Null);
    }
}
