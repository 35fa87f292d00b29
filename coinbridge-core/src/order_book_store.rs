//! Order-Book Store
//!
//! Latest order-book snapshot per `(pair, market type)`. Writers replace a whole
//! snapshot; readers get an [`Arc`] to the snapshot that was current when they
//! looked, so a reader never observes a book that is half old and half new.
//!
//! ```rust
//! use coinbridge_core::order_book_store::OrderBookStore;
//! use coinbridge_core::types::{CurrencyPair, MarketType, OrderBookSnapshot};
//!
//! let store = OrderBookStore::new();
//! let pair = CurrencyPair::new("ETH", "BTC").unwrap();
//! store.put(pair.clone(), MarketType::Spot, OrderBookSnapshot::new(vec![], vec![], 0));
//!
//! assert!(store.get(&pair, &MarketType::Spot).is_ok());
//! assert!(store.get(&pair, &MarketType::Margin).is_err());
//! ```

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

use crate::error::{Error, Result};
use crate::types::{CurrencyPair, MarketType, OrderBookSnapshot};

type BooksByMarket = HashMap<MarketType, Arc<OrderBookSnapshot>>;

/// Thread-safe map of the latest snapshot per pair and market type.
#[derive(Debug, Default)]
pub struct OrderBookStore {
    books: Mutex<HashMap<CurrencyPair, BooksByMarket>>,
}

impl OrderBookStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot for `(pair, market_type)`.
    ///
    /// Accepts an owned snapshot or one already shared behind an [`Arc`].
    pub fn put(
        &self,
        pair: CurrencyPair,
        market_type: MarketType,
        snapshot: impl Into<Arc<OrderBookSnapshot>>,
    ) {
        let snapshot = snapshot.into();
        trace!(
            pair = %pair,
            market_type = %market_type,
            bids = snapshot.bids.len(),
            asks = snapshot.asks.len(),
            "Stored order book"
        );
        self.books
            .lock()
            .entry(pair)
            .or_default()
            .insert(market_type, snapshot);
    }

    /// Latest snapshot for `(pair, market_type)`.
    ///
    /// Fails with [`Error::NotFound`] if the pair was never populated or has no
    /// book for that market type.
    pub fn get(
        &self,
        pair: &CurrencyPair,
        market_type: &MarketType,
    ) -> Result<Arc<OrderBookSnapshot>> {
        let books = self.books.lock();
        let by_market = books
            .get(pair)
            .ok_or_else(|| Error::not_found(format!("no order book for {pair}")))?;
        by_market
            .get(market_type)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no {market_type} order book for {pair}")))
    }

    /// Pairs with at least one stored book.
    pub fn pairs(&self) -> Vec<CurrencyPair> {
        self.books.lock().keys().cloned().collect()
    }

    /// Number of stored snapshots across all pairs and market types.
    pub fn len(&self) -> usize {
        self.books.lock().values().map(HashMap::len).sum()
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every snapshot.
    pub fn clear(&self) {
        self.books.lock().clear();
    }
}
