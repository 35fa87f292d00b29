//! Poloniex (public and trading APIs).
//!
//! Markets are written quote first and uppercase: `BTC_ETH` trades ETH against
//! BTC. Both APIs multiplex on a `command` parameter over a single path, so every
//! request is scoped by command (and public ones by market too).
//!
//! A single order is rebuilt from its trades (`returnOrderTrades`). Trades cannot
//! tell a filled order from a cancelled one, so such orders come back `Aborted`
//! with their executed amount.

mod parser;

pub use parser::{
    parse_balances, parse_open_orders, parse_order, parse_order_book, parse_placed_order_id,
    parse_ticker,
};

use crate::adapter::{Dialect, ExchangeRequest, OrderRequest, Quotas, required_price};
use coinbridge_core::error::{Error, Result};
use coinbridge_core::normalize::{FieldVocabulary, Lifecycle, RawBalance, RawOrder};
use coinbridge_core::symbol::{LetterCase, SymbolCodec};
use coinbridge_core::types::{CurrencyPair, OrderBookSnapshot, OrderSide, OrderType, Ticker};
use serde_json::Value;

const THROTTLE_MARKER: &str = "Please do not make more than";

/// The Poloniex dialect.
///
/// `returnOpenOrders` lists resting orders only, so every order it reports is open.
#[derive(Debug, Clone, Copy, Default)]
pub struct Poloniex;

impl Dialect for Poloniex {
    type Status = Lifecycle;

    const ID: &'static str = "poloniex";
    const NAME: &'static str = "Poloniex";
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

    fn initial_codec(&self) -> Result<SymbolCodec> {
        Ok(SymbolCodec::delimited("_", LetterCase::Upper, true)?)
    }

    fn check_response(&self, payload: Value) -> Result<Value> {
        let Some(message) = payload.get("error").and_then(Value::as_str) else {
            return Ok(payload);
        };
        let message = message.to_string();
        if message.starts_with(THROTTLE_MARKER) {
            return Err(Error::rate_limited(message, None));
        }
        Err(Error::exchange_with_data("error", message, payload))
    }

    fn order_book_request(&self, symbol: &str, depth: usize) -> ExchangeRequest {
        ExchangeRequest::get("/public")
            .param("command", "returnOrderBook")
            .param("currencyPair", symbol)
            .param("depth", depth)
            .scoped(format!("returnOrderBook/{symbol}"))
    }

    fn parse_order_book(&self, payload: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
        parse_order_book(payload, now_ms)
    }

    fn ticker_request(&self, symbol: &str) -> ExchangeRequest {
        ExchangeRequest::get("/public")
            .param("command", "returnTicker")
            .scoped(format!("returnTicker/{symbol}"))
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
        trading_api("returnOpenOrders").param("currencyPair", "all")
    }

    fn parse_open_orders(&self, payload: &Value) -> Result<Vec<RawOrder<Lifecycle>>> {
        parse_open_orders(payload)
    }

    fn order_request(&self, id: &str, _symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(trading_api("returnOrderTrades").param("orderNumber", id))
    }

    fn parse_order(&self, payload: &Value, id: &str) -> Result<RawOrder<Lifecycle>> {
        parse_order(payload, id)
    }

    fn balances_request(&self) -> ExchangeRequest {
        trading_api("returnCompleteBalances")
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
        let command = match order.side {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        };
        Ok(trading_api(command)
            .param("currencyPair", symbol)
            .param("rate", required_price::<Self>(order)?)
            .param("amount", order.amount))
    }

    fn parse_placed_order_id(&self, payload: &Value) -> Result<String> {
        parse_placed_order_id(payload)
    }

    fn cancel_order_request(&self, id: &str, _symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(trading_api("cancelOrder").param("orderNumber", id))
    }
}

fn trading_api(command: &str) -> ExchangeRequest {
    ExchangeRequest::post("/tradingApi")
        .param("command", command)
        .scoped(command)
}
