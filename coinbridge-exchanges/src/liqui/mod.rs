//! Liqui (public API v3, trade API v1).
//!
//! Pairs are lowercase and underscore-separated (`eth_btc`). Every private call
//! goes to the single `/tapi` endpoint with a `method` parameter, so private
//! requests are scoped by method to keep their pacing apart. The trade API only
//! accepts 32-bit nonces, so they are counted in seconds.

mod parser;

pub use parser::{
    parse_balances, parse_markets, parse_open_orders, parse_order, parse_order_book,
    parse_placed_order_id, parse_ticker,
};

use crate::adapter::{
    Dialect, ExchangeRequest, MarketListing, OrderRequest, Quotas, required_price, side_token,
};
use coinbridge_core::error::{Error, Result};
use coinbridge_core::nonce::NonceResolution;
use coinbridge_core::normalize::{FieldVocabulary, Lifecycle, RawBalance, RawOrder, RawStatus};
use coinbridge_core::symbol::{LetterCase, SymbolCodec};
use coinbridge_core::types::{CurrencyPair, OrderBookSnapshot, OrderSide, OrderType, Ticker};
use serde_json::Value;

const THROTTLE_MARKER: &str = "too many requests";

/// Error Liqui returns from `ActiveOrders` for an account without orders.
const NO_ORDERS: &str = "no orders";

/// Liqui order status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquiStatus {
    /// 0: active
    Active,
    /// 1: executed
    Executed,
    /// 2: cancelled
    Cancelled,
    /// 3: cancelled after partial execution
    CancelledPartiallyExecuted,
    /// Any other code
    Other(i64),
}

impl From<i64> for LiquiStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Active,
            1 => Self::Executed,
            2 => Self::Cancelled,
            3 => Self::CancelledPartiallyExecuted,
            other => Self::Other(other),
        }
    }
}

impl RawStatus for LiquiStatus {
    fn lifecycle(&self) -> Lifecycle {
        match self {
            Self::Active => Lifecycle::Open,
            Self::Executed => Lifecycle::Closed,
            Self::Cancelled | Self::CancelledPartiallyExecuted => Lifecycle::Cancelled,
            Self::Other(code) => Lifecycle::Unrecognized(code.to_string()),
        }
    }
}

/// The Liqui dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Liqui;

impl Dialect for Liqui {
    type Status = LiquiStatus;

    const ID: &'static str = "liqui";
    const NAME: &'static str = "Liqui";
    const FIELDS: FieldVocabulary = FieldVocabulary::new(
        &[("buy", OrderSide::Buy), ("sell", OrderSide::Sell)],
        &[("limit", OrderType::Limit)],
    );
    const QUOTAS: Quotas = Quotas {
        order_book: 60,
        ticker: 60,
        open_orders: 30,
        balances: 30,
    };
    const NONCE_RESOLUTION: NonceResolution = NonceResolution::Seconds;

    fn initial_codec(&self) -> Result<SymbolCodec> {
        codec()
    }

    fn check_response(&self, mut payload: Value) -> Result<Value> {
        if payload.get("success").and_then(Value::as_i64) == Some(0) {
            let message = payload["error"].as_str().unwrap_or("request failed").to_string();
            if message == NO_ORDERS {
                return Ok(Value::Null);
            }
            if message.to_ascii_lowercase().contains(THROTTLE_MARKER) {
                return Err(Error::rate_limited(message, None));
            }
            return Err(Error::exchange_with_data("error", message, payload));
        }
        match payload.get_mut("return") {
            Some(inner) => Ok(inner.take()),
            None => Ok(payload),
        }
    }

    fn markets_request(&self) -> Option<ExchangeRequest> {
        Some(ExchangeRequest::get("/api/3/info"))
    }

    fn parse_markets(&self, payload: &Value) -> Result<MarketListing> {
        parse_markets(payload)
    }

    fn order_book_request(&self, symbol: &str, depth: usize) -> ExchangeRequest {
        ExchangeRequest::get(format!("/api/3/depth/{symbol}")).param("limit", depth)
    }

    fn parse_order_book(&self, payload: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
        parse_order_book(payload, now_ms)
    }

    fn ticker_request(&self, symbol: &str) -> ExchangeRequest {
        ExchangeRequest::get(format!("/api/3/ticker/{symbol}"))
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
        trade_api("ActiveOrders")
    }

    fn parse_open_orders(&self, payload: &Value) -> Result<Vec<RawOrder<LiquiStatus>>> {
        parse_open_orders(payload)
    }

    fn order_request(&self, id: &str, _symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(trade_api("OrderInfo").param("order_id", id))
    }

    fn parse_order(&self, payload: &Value, id: &str) -> Result<RawOrder<LiquiStatus>> {
        parse_order(payload, id)
    }

    fn balances_request(&self) -> ExchangeRequest {
        trade_api("getInfo")
    }

    fn parse_balances(&self, payload: &Value) -> Result<Vec<RawBalance>> {
        parse_balances(payload)
    }

    fn place_order_request(&self, order: &OrderRequest, symbol: &str) -> Result<ExchangeRequest> {
        if order.order_type != OrderType::Limit {
            return Err(Error::unsupported_order_field(
                Self::NAME,
                "type",
                order.order_type.to_string(),
            ));
        }
        Ok(trade_api("Trade")
            .param("pair", symbol)
            .param("type", side_token::<Self>(order.side)?)
            .param("rate", required_price::<Self>(order)?)
            .param("amount", order.amount))
    }

    fn parse_placed_order_id(&self, payload: &Value) -> Result<String> {
        parse_placed_order_id(payload)
    }

    fn cancel_order_request(&self, id: &str, _symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(trade_api("CancelOrder").param("order_id", id))
    }
}

pub(crate) fn codec() -> Result<SymbolCodec> {
    Ok(SymbolCodec::delimited("_", LetterCase::Lower, false)?)
}

fn trade_api(method: &str) -> ExchangeRequest {
    ExchangeRequest::post("/tapi").param("method", method).scoped(method)
}
