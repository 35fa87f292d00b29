//! Order-book snapshot types.

use serde::{Deserialize, Serialize};

use super::{Amount, Cost, Price, Timestamp};

/// Order book entry (price level).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderBookEntry {
    /// Price level
    pub price: Price,

    /// Total amount at this price level
    pub amount: Amount,
}

impl OrderBookEntry {
    /// Create a new order book entry
    pub fn new(price: Price, amount: Amount) -> Self {
        Self { price, amount }
    }
}

/// Order book side (bids or asks).
pub type OrderBookSide = Vec<OrderBookEntry>;

/// Aggregate of one book side: total base amount and total quote value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideTotals {
    /// Sum of amounts
    pub amount: Amount,
    /// Sum of `price * amount`
    pub value: Cost,
}

/// A full bid/ask snapshot for one pair and market type.
///
/// Snapshots are replaced wholesale on every refresh and never merged. Bids are
/// expected best-first (descending price), asks best-first (ascending price);
/// [`OrderBookSnapshot::new`] sorts them to enforce that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderBookSnapshot {
    /// Bid levels, highest price first
    pub bids: OrderBookSide,

    /// Ask levels, lowest price first
    pub asks: OrderBookSide,

    /// Last-updated time in milliseconds since epoch
    pub timestamp: Timestamp,
}

impl OrderBookSnapshot {
    /// Builds a snapshot, sorting both sides best-first.
    pub fn new(mut bids: OrderBookSide, mut asks: OrderBookSide, timestamp: Timestamp) -> Self {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self {
            bids,
            asks,
            timestamp,
        }
    }

    /// Best (highest) bid.
    pub fn best_bid(&self) -> Option<&OrderBookEntry> {
        self.bids.first()
    }

    /// Best (lowest) ask.
    pub fn best_ask(&self) -> Option<&OrderBookEntry> {
        self.asks.first()
    }

    /// Difference between best ask and best bid.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// Midpoint between best bid and best ask.
    pub fn mid_price(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(Price::new(
                (bid.price.as_decimal() + ask.price.as_decimal()) / rust_decimal::Decimal::TWO,
            )),
            _ => None,
        }
    }

    /// Total amount and value resting on the bid side.
    pub fn total_bids(&self) -> SideTotals {
        side_totals(&self.bids)
    }

    /// Total amount and value resting on the ask side.
    pub fn total_asks(&self) -> SideTotals {
        side_totals(&self.asks)
    }

    /// Keeps at most `depth` levels per side.
    pub fn truncate(&mut self, depth: usize) {
        self.bids.truncate(depth);
        self.asks.truncate(depth);
    }

    /// Returns `true` when both sides are empty.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

fn side_totals(side: &[OrderBookEntry]) -> SideTotals {
    side.iter().fold(SideTotals::default(), |acc, level| SideTotals {
        amount: acc.amount + level.amount,
        value: acc.value + level.price * level.amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: rust_decimal::Decimal, amount: rust_decimal::Decimal) -> OrderBookEntry {
        OrderBookEntry::new(Price::new(price), Amount::new(amount))
    }

    fn sample() -> OrderBookSnapshot {
        OrderBookSnapshot::new(
            vec![level(dec!(99), dec!(1)), level(dec!(100), dec!(2))],
            vec![level(dec!(102), dec!(3)), level(dec!(101), dec!(0.5))],
            1_500_000_000_000,
        )
    }

    #[test]
    fn test_new_sorts_best_first() {
        let book = sample();
        assert_eq!(book.best_bid().unwrap().price, Price::new(dec!(100)));
        assert_eq!(book.best_ask().unwrap().price, Price::new(dec!(101)));
    }

    #[test]
    fn test_spread_and_mid() {
        let book = sample();
        assert_eq!(book.spread(), Some(Price::new(dec!(1))));
        assert_eq!(book.mid_price(), Some(Price::new(dec!(100.5))));
    }

    #[test]
    fn test_totals() {
        let book = sample();
        let bids = book.total_bids();
        assert_eq!(bids.amount, Amount::new(dec!(3)));
        assert_eq!(bids.value, Cost::new(dec!(299)));

        let asks = book.total_asks();
        assert_eq!(asks.amount, Amount::new(dec!(3.5)));
        assert_eq!(asks.value, Cost::new(dec!(356.5)));
    }

    #[test]
    fn test_empty_book() {
        let book = OrderBookSnapshot::new(vec![], vec![], 0);
        assert!(book.is_empty());
        assert_eq!(book.spread(), None);
        assert_eq!(book.total_bids(), SideTotals::default());
    }

    #[test]
    fn test_truncate() {
        let mut book = sample();
        book.truncate(1);
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.asks.len(), 1);
    }
}
