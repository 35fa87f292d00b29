//! Coinbridge exchange dialects
//!
//! Each module describes one exchange: its endpoints, payload shapes, status and
//! side vocabulary, and how it signals rate limiting. The generic
//! [`adapter::Adapter`] combines a dialect with a caller-supplied
//! [`adapter::Transport`] and the core components.
//!
//! # Supported Exchanges
//!
//! | Exchange | Symbols | Markets loaded from |
//! |----------|---------|---------------------|
//! | Binance  | `ETHBTC` | `exchangeInfo` |
//! | Bitfinex | `ethbtc` | fixed codec |
//! | Bittrex  | `BTC-ETH` | fixed codec |
//! | Kraken   | `ETHXBT` | `AssetPairs` |
//! | Liqui    | `eth_btc` | `info` (limits only) |
//! | Poloniex | `BTC_ETH` | fixed codec |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::return_self_not_must_use)]

// Re-export coinbridge-core
pub use coinbridge_core;

pub mod adapter;
mod parsing;

/// Binance spot
pub mod binance;

/// Bitfinex v1
pub mod bitfinex;

/// Bittrex v1.1
pub mod bittrex;

/// Kraken
pub mod kraken;

/// Liqui
pub mod liqui;

/// Poloniex
pub mod poloniex;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapter::{
        Adapter, Dialect, ExchangeRequest, HttpMethod, MarketListing, OrderRequest, Quotas,
        Transport,
    };
    pub use crate::binance::Binance;
    pub use crate::bitfinex::Bitfinex;
    pub use crate::bittrex::Bittrex;
    pub use crate::kraken::Kraken;
    pub use crate::liqui::Liqui;
    pub use crate::poloniex::Poloniex;
    pub use coinbridge_core::prelude::*;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
