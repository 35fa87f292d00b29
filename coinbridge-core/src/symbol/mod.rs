//! Symbol Codec
//!
//! Converts between canonical [`CurrencyPair`](crate::types::CurrencyPair) values and
//! exchange-native symbols.
//!
//! | Variant | Example exchange symbol | Pair |
//! |---------|-------------------------|------|
//! | Delimited, upper, inverted | `BTC-ETH` | `ETH/BTC` |
//! | Delimited, lower | `eth_btc` | `ETH/BTC` |
//! | Fixed width (3), lower | `btcusd` | `BTC/USD` |
//! | Table | `XXBTZUSD` | `XBT/USD` |
//!
//! Inverted mappings model exchanges that list the quote currency first; the swap
//! is applied on encode and undone on decode.
//!
//! Delimited and fixed-width symbols decode in any letter case. Table symbols must
//! match the exchange's spelling exactly.
//!
//! ```rust
//! use coinbridge_core::symbol::{LetterCase, SymbolCodec};
//! use coinbridge_core::types::CurrencyPair;
//!
//! let codec = SymbolCodec::fixed_width(3, LetterCase::Lower, false).unwrap();
//! let pair = codec.to_pair("ltcbtc").unwrap();
//! assert_eq!(pair, CurrencyPair::new("LTC", "BTC").unwrap());
//! assert!(codec.to_pair("ltcbtc2").is_err());
//! ```

mod codec;
mod error;
mod table;

pub use codec::{DelimitedFormat, FixedWidthFormat, LetterCase, SymbolCodec};
pub use error::SymbolError;
pub use table::MarketTable;
