//! # Coinbridge
//!
//! Canonical multi-exchange aggregation core. One currency-pair and order model
//! in front of many exchanges, each with its own symbols, payloads and rate
//! limits.
//!
//! ## Components
//!
//! - **Symbol Codec**: `ETH/BTC` to `BTC-ETH`, `ethbtc`, `ETHBTC` and back
//! - **Rate-Limited Dispatcher**: per-endpoint pacing; provider throttles put the
//!   whole exchange on a cooldown while callers keep getting the last good data
//! - **Order-Book Store**: latest snapshot per pair and market type; tickers are
//!   kept the same way
//! - **Order Normalizer**: exchange orders and balances to [`CanonicalOrder`] and
//!   [`Balances`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coinbridge::prelude::*;
//! use serde_json::Value;
//!
//! struct Http;
//!
//! #[async_trait::async_trait]
//! impl Transport for Http {
//!     async fn public(&self, _request: &ExchangeRequest) -> Result<Value> {
//!         unimplemented!("perform the GET")
//!     }
//!
//!     async fn private(&self, _request: &ExchangeRequest, _nonce: u64) -> Result<Value> {
//!         unimplemented!("sign and perform the request")
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     init_logging(&LogConfig::default());
//!     let bittrex = Adapter::new(Bittrex, Http, ExchangeConfig::default())?;
//!     let pair = CurrencyPair::new("ETH", "BTC")?;
//!     let book = bittrex.update_order_book(&pair, MarketType::Spot).await?;
//!     if let Some(snapshot) = book.value() {
//!         println!("best bid: {:?}", snapshot.best_bid());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub use coinbridge_core;
pub use coinbridge_exchanges;

// Re-export core types
pub use coinbridge_core::{
    error::{Error, Result},
    types::{
        Amount, BalanceEntry, Balances, CanonicalOrder, CurrencyPair, MarketType,
        OrderBookEntry, OrderBookSnapshot, OrderSide, OrderStatus, OrderType, Price, Ticker,
    },
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use coinbridge_exchanges::prelude::*;
}
