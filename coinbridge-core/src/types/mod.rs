//! Canonical data model.
//!
//! Currency pairs, market-type tags, order-book snapshots, tickers, orders and
//! balances, independent of any exchange's formatting.

pub mod balance;
/// Decimal newtypes (Price, Amount, Cost)
pub mod financial;
pub mod market;
pub mod order;
pub mod orderbook;
pub mod pair;
pub mod ticker;

pub use balance::{BalanceEntry, Balances};
pub use financial::{Amount, Cost, Price};
pub use market::MarketType;
pub use order::{CanonicalOrder, OrderSide, OrderStatus, OrderType};
pub use orderbook::{OrderBookEntry, OrderBookSide, OrderBookSnapshot, SideTotals};
pub use pair::CurrencyPair;
pub use ticker::Ticker;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Exchange-native market identifier.
pub type Symbol = String;
