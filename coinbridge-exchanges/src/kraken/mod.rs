//! Kraken (REST API v0).
//!
//! Every response is an envelope `{"error": [...], "result": ...}`; the dialect
//! unwraps it so parsers only see `result`. Kraken's pair names are opaque
//! (`XETHXXBT`, alternate name `ETHXBT`), so the codec is a table built from
//! `AssetPairs`, keyed by the alternate name that order payloads carry.
//!
//! Kraken keeps its own asset codes: bitcoin is `XBT`, and legacy assets carry a
//! one-letter class prefix (`XXBT`, `ZEUR`) that is stripped.

mod parser;

pub use parser::{
    parse_balances, parse_markets, parse_open_orders, parse_order, parse_order_book,
    parse_placed_order_id, parse_ticker,
};

use crate::adapter::{
    Dialect, ExchangeRequest, MarketListing, OrderRequest, Quotas, order_type_token,
    required_price, side_token,
};
use coinbridge_core::error::{Error, Result};
use coinbridge_core::normalize::{FieldVocabulary, Lifecycle, RawBalance, RawOrder, RawStatus};
use coinbridge_core::symbol::{MarketTable, SymbolCodec};
use coinbridge_core::types::{CurrencyPair, OrderBookSnapshot, OrderSide, OrderType, Ticker};
use serde_json::Value;

/// Error prefixes Kraken uses when throttling.
const THROTTLE_MARKERS: [&str; 2] = ["EAPI:Rate limit exceeded", "EOrder:Rate limit exceeded"];

/// Kraken order status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KrakenStatus {
    /// Not yet entered into the book
    Pending,
    /// Resting on the book
    Open,
    /// Closed by the engine
    Closed,
    /// Cancelled
    Canceled,
    /// Expired
    Expired,
    /// Anything else, kept verbatim
    Other(String),
}

impl KrakenStatus {
    /// Parses the `status` field.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "open" => Self::Open,
            "closed" => Self::Closed,
            "canceled" => Self::Canceled,
            "expired" => Self::Expired,
            other => Self::Other(other.to_string()),
        }
    }
}

impl RawStatus for KrakenStatus {
    fn lifecycle(&self) -> Lifecycle {
        match self {
            Self::Pending | Self::Open => Lifecycle::Open,
            Self::Closed => Lifecycle::Closed,
            Self::Canceled | Self::Expired => Lifecycle::Cancelled,
            Self::Other(raw) => Lifecycle::Unrecognized(raw.clone()),
        }
    }
}

/// The Kraken dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Kraken;

impl Dialect for Kraken {
    type Status = KrakenStatus;

    const ID: &'static str = "kraken";
    const NAME: &'static str = "Kraken";
    const FIELDS: FieldVocabulary = FieldVocabulary::new(
        &[("buy", OrderSide::Buy), ("sell", OrderSide::Sell)],
        &[
            ("limit", OrderType::Limit),
            ("market", OrderType::Market),
            ("stop-loss", OrderType::Stop),
            ("stop-loss-limit", OrderType::Stop),
        ],
    );
    const QUOTAS: Quotas = Quotas {
        order_book: 30,
        ticker: 30,
        open_orders: 15,
        balances: 15,
    };

    fn initial_codec(&self) -> Result<SymbolCodec> {
        Ok(SymbolCodec::Table(MarketTable::new()))
    }

    fn check_response(&self, mut payload: Value) -> Result<Value> {
        let errors: Vec<String> = payload["error"]
            .as_array()
            .map(|errors| errors.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        if let Some(first) = errors.first() {
            if errors
                .iter()
                .any(|e| THROTTLE_MARKERS.iter().any(|marker| e.starts_with(marker)))
            {
                return Err(Error::rate_limited(first.clone(), None));
            }
            let code = first.split(':').next().unwrap_or(first.as_str()).to_string();
            let message = errors.join("; ");
            return Err(Error::exchange_with_data(code, message, payload));
        }
        match payload.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(Error::exchange_with_data(
                "EGeneral",
                "response carries neither error nor result",
                payload,
            )),
        }
    }

    fn markets_request(&self) -> Option<ExchangeRequest> {
        Some(ExchangeRequest::get("/0/public/AssetPairs"))
    }

    fn parse_markets(&self, payload: &Value) -> Result<MarketListing> {
        parse_markets(payload)
    }

    fn order_book_request(&self, symbol: &str, depth: usize) -> ExchangeRequest {
        ExchangeRequest::get("/0/public/Depth")
            .param("pair", symbol)
            .param("count", depth)
            .scoped(symbol)
    }

    fn parse_order_book(&self, payload: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
        parse_order_book(payload, now_ms)
    }

    fn ticker_request(&self, symbol: &str) -> ExchangeRequest {
        ExchangeRequest::get("/0/public/Ticker")
            .param("pair", symbol)
            .scoped(symbol)
    }

    fn parse_ticker(
        &self,
        payload: &Value,
        symbol: &str,
        pair: &CurrencyPair,
        now_ms: i64,
    ) -> Result<Ticker> {
        parse_ticker(payload, symbol, pair, now_ms)
    }

    fn open_orders_request(&self) -> ExchangeRequest {
        ExchangeRequest::post("/0/private/OpenOrders")
    }

    fn parse_open_orders(&self, payload: &Value) -> Result<Vec<RawOrder<KrakenStatus>>> {
        parse_open_orders(payload)
    }

    fn order_request(&self, id: &str, _symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(ExchangeRequest::post("/0/private/QueryOrders").param("txid", id))
    }

    fn parse_order(&self, payload: &Value, id: &str) -> Result<RawOrder<KrakenStatus>> {
        parse_order(payload, id)
    }

    fn balances_request(&self) -> ExchangeRequest {
        ExchangeRequest::post("/0/private/Balance")
    }

    fn parse_balances(&self, payload: &Value) -> Result<Vec<RawBalance>> {
        parse_balances(payload)
    }

    fn place_order_request(&self, order: &OrderRequest, symbol: &str) -> Result<ExchangeRequest> {
        let request = ExchangeRequest::post("/0/private/AddOrder")
            .param("pair", symbol)
            .param("type", side_token::<Self>(order.side)?)
            .param("ordertype", order_type_token::<Self>(order.order_type)?)
            .param("volume", order.amount);
        if order.order_type == OrderType::Market {
            return Ok(request);
        }
        Ok(request.param("price", required_price::<Self>(order)?))
    }

    fn parse_placed_order_id(&self, payload: &Value) -> Result<String> {
        parse_placed_order_id(payload)
    }

    fn cancel_order_request(&self, id: &str, _symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(ExchangeRequest::post("/0/private/CancelOrder").param("txid", id))
    }
}

/// Currency code of a Kraken asset name: `XXBT` becomes `XBT`, `ZEUR` becomes `EUR`.
pub fn asset_code(asset: &str) -> &str {
    match asset.as_bytes() {
        [b'X' | b'Z', _, _, _] => &asset[1..],
        _ => asset,
    }
}
