//! Bittrex (REST API v1.1).
//!
//! Markets are written quote first: `BTC-ETH` trades ETH against BTC. Responses
//! come wrapped as `{"success": bool, "message": "...", "result": ...}`, and only
//! limit orders can be placed, through separate buy and sell endpoints.

mod parser;

pub use parser::{
    parse_balances, parse_open_orders, parse_order, parse_order_book, parse_placed_order_id,
    parse_ticker,
};

use crate::adapter::{Dialect, ExchangeRequest, OrderRequest, Quotas, required_price};
use coinbridge_core::error::{Error, Result};
use coinbridge_core::normalize::{FieldVocabulary, Lifecycle, RawBalance, RawOrder, RawStatus};
use coinbridge_core::symbol::{LetterCase, SymbolCodec};
use coinbridge_core::types::{CurrencyPair, OrderBookSnapshot, OrderSide, OrderType, Ticker};
use serde_json::Value;

/// Fragments of Bittrex error messages that signal throttling.
const THROTTLE_MARKERS: [&str; 2] = ["RATE", "THROTTLE"];

/// Bittrex order state, derived from the `Closed` and `CancelInitiated` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BittrexStatus {
    /// No close time
    Open,
    /// Cancellation requested; the order stays open until Bittrex closes it
    CancelPending,
    /// Close time set; the remaining quantity tells filled from abandoned
    Closed,
}

impl RawStatus for BittrexStatus {
    fn lifecycle(&self) -> Lifecycle {
        match self {
            Self::Open | Self::CancelPending => Lifecycle::Open,
            Self::Closed => Lifecycle::Closed,
        }
    }
}

/// The Bittrex dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bittrex;

impl Dialect for Bittrex {
    type Status = BittrexStatus;

    const ID: &'static str = "bittrex";
    const NAME: &'static str = "Bittrex";
    // One token carries both side and type.
    const FIELDS: FieldVocabulary = FieldVocabulary::new(
        &[("LIMIT_BUY", OrderSide::Buy), ("LIMIT_SELL", OrderSide::Sell)],
        &[("LIMIT_BUY", OrderType::Limit), ("LIMIT_SELL", OrderType::Limit)],
    );
    const QUOTAS: Quotas = Quotas {
        order_book: 60,
        ticker: 60,
        open_orders: 20,
        balances: 20,
    };

    fn initial_codec(&self) -> Result<SymbolCodec> {
        Ok(SymbolCodec::delimited("-", LetterCase::Upper, true)?)
    }

    fn check_response(&self, mut payload: Value) -> Result<Value> {
        if payload["success"].as_bool() == Some(true) {
            return Ok(payload["result"].take());
        }
        let message = payload["message"].as_str().unwrap_or("request failed").to_string();
        let upper = message.to_ascii_uppercase();
        if THROTTLE_MARKERS.iter().any(|marker| upper.contains(marker)) {
            return Err(Error::rate_limited(message, None));
        }
        Err(Error::exchange_with_data(message.clone(), message, payload))
    }

    fn order_book_request(&self, symbol: &str, _depth: usize) -> ExchangeRequest {
        ExchangeRequest::get("/api/v1.1/public/getorderbook")
            .param("market", symbol)
            .param("type", "both")
            .scoped(symbol)
    }

    fn parse_order_book(&self, payload: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
        parse_order_book(payload, now_ms)
    }

    fn ticker_request(&self, symbol: &str) -> ExchangeRequest {
        ExchangeRequest::get("/api/v1.1/public/getmarketsummary")
            .param("market", symbol)
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
        ExchangeRequest::get("/api/v1.1/market/getopenorders")
    }

    fn parse_open_orders(&self, payload: &Value) -> Result<Vec<RawOrder<BittrexStatus>>> {
        parse_open_orders(payload)
    }

    fn order_request(&self, id: &str, _symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(ExchangeRequest::get("/api/v1.1/account/getorder").param("uuid", id))
    }

    fn parse_order(&self, payload: &Value, _id: &str) -> Result<RawOrder<BittrexStatus>> {
        parse_order(payload)
    }

    fn balances_request(&self) -> ExchangeRequest {
        ExchangeRequest::get("/api/v1.1/account/getbalances")
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
        let path = match order.side {
            OrderSide::Buy => "/api/v1.1/market/buylimit",
            OrderSide::Sell => "/api/v1.1/market/selllimit",
        };
        Ok(ExchangeRequest::get(path)
            .param("market", symbol)
            .param("quantity", order.amount)
            .param("rate", required_price::<Self>(order)?))
    }

    fn parse_placed_order_id(&self, payload: &Value) -> Result<String> {
        parse_placed_order_id(payload)
    }

    fn cancel_order_request(&self, id: &str, _symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(ExchangeRequest::get("/api/v1.1/market/cancel").param("uuid", id))
    }
}
