//! Coinbridge Core Library
//!
//! Exchange-independent building blocks of the multi-exchange aggregation layer:
//!
//! - **Symbol Codec** ([`symbol`]): currency pairs to exchange symbols and back
//! - **Rate-Limited Dispatcher** ([`dispatcher`]): per-endpoint pacing, provider
//!   ban handling and fallback to the last good value
//! - **Order-Book Store** ([`order_book_store`]): latest snapshot per pair and
//!   market type, replaced atomically
//! - **Order Normalizer** ([`normalize`]): exchange orders and balances to the
//!   canonical model
//!
//! Amounts and prices are `rust_decimal::Decimal` throughout.
//!
//! # Example
//!
//! ```rust
//! use coinbridge_core::prelude::*;
//!
//! # fn example() -> Result<()> {
//! let codec = SymbolCodec::delimited("-", LetterCase::Upper, true)?;
//! let pair = CurrencyPair::new("ETH", "BTC")?;
//! assert_eq!(codec.to_symbol(&pair)?, "BTC-ETH");
//! assert_eq!(codec.to_pair("BTC-ETH")?, pair);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// - module_name_repetitions: SymbolCodec in symbol, OrderBookStore in order_book_store
// - missing_errors_doc: nearly every public function returns Result
// - doc_markdown: HMAC, JSON, AssetPairs and friends read fine without backticks
// - cast_possible_wrap / cast_sign_loss: timestamp conversions between i64 and u64
// - unreadable_literal: epoch timestamps read better without separators
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::unreadable_literal)]

// Re-exports of external dependencies
pub use rust_decimal;
pub use serde_json;

pub mod auth;
pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod limits;
pub mod logging;
pub mod nonce;
pub mod normalize;
pub mod order_book_store;
pub mod parser_utils;
pub mod symbol;
pub mod time;
pub mod types;

pub use config::{CadencePolicy, DispatcherConfig, ExchangeConfig, ExchangeConfigBuilder};
pub use credentials::SecretString;
pub use dispatcher::{CachedEndpoint, Dispatched, Dispatcher, EndpointKey, StaleReason};
pub use error::{ContextExt, Error, ExchangeErrorDetails, NetworkError, ParseError, Result};
pub use order_book_store::OrderBookStore;
pub use symbol::{SymbolCodec, SymbolError};
pub use types::{
    Amount, BalanceEntry, Balances, CanonicalOrder, Cost, CurrencyPair, MarketType,
    OrderBookEntry, OrderBookSnapshot, OrderSide, OrderStatus, OrderType, Price, Ticker,
};

/// Prelude module for convenient imports
///
/// ```rust
/// use coinbridge_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{DigestFormat, HashAlgorithm, hash, hmac_sign};
    pub use crate::config::{
        CadencePolicy, DispatcherConfig, ExchangeConfig, ExchangeConfigBuilder,
    };
    pub use crate::credentials::SecretString;
    pub use crate::dispatcher::{CachedEndpoint, Dispatched, Dispatcher, EndpointKey, StaleReason};
    pub use crate::error::{ContextExt, Error, Result};
    pub use crate::limits::{DefaultLimits, ExchangeLimits, PairLimits, TableLimits, validate_order};
    pub use crate::logging::{LogConfig, LogFormat, LogLevel, init_logging, try_init_logging};
    pub use crate::nonce::{Nonce, NonceResolution};
    pub use crate::normalize::{
        ExchangeContext, FieldVocabulary, FillReport, Lifecycle, RawBalance, RawOrder,
        RawStatus, RawTimestamp, normalize, normalize_all, normalize_balances,
    };
    pub use crate::order_book_store::OrderBookStore;
    pub use crate::symbol::{
        DelimitedFormat, FixedWidthFormat, LetterCase, MarketTable, SymbolCodec, SymbolError,
    };
    pub use crate::time::{Clock, ManualClock, SystemClock, milliseconds, seconds};
    pub use crate::types::{
        Amount, BalanceEntry, Balances, CanonicalOrder, Cost, CurrencyPair, MarketType,
        OrderBookEntry, OrderBookSide, OrderBookSnapshot, OrderSide, OrderStatus, OrderType,
        Price, SideTotals, Symbol, Ticker, Timestamp,
    };
    pub use rust_decimal::Decimal;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "coinbridge-core");
    }
}
