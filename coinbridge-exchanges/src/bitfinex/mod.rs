//! Bitfinex (v1 REST API).
//!
//! Symbols are two three-letter codes run together in lowercase (`ethbtc`).
//! Bitfinex throttles between 10 and 90 requests per minute depending on load
//! and answers over-quota calls with `{"error": "ERR_RATE_LIMIT"}`; the
//! balances and active-orders endpoints are paced well below that.

mod parser;

pub use parser::{
    parse_balances, parse_open_orders, parse_order, parse_order_book, parse_placed_order_id,
    parse_ticker,
};

use crate::adapter::{
    Dialect, ExchangeRequest, OrderRequest, Quotas, order_type_token, side_token,
};
use coinbridge_core::error::{Error, Result};
use coinbridge_core::normalize::{FieldVocabulary, Lifecycle, RawBalance, RawOrder, RawStatus};
use coinbridge_core::symbol::{LetterCase, SymbolCodec};
use coinbridge_core::types::{CurrencyPair, OrderBookSnapshot, OrderSide, OrderType, Ticker};
use serde_json::Value;

/// Token Bitfinex uses to signal throttling.
pub const RATE_LIMIT_TOKEN: &str = "ERR_RATE_LIMIT";

/// Bitfinex order state, reported as two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitfinexStatus {
    /// Order still rests on the book
    pub is_live: bool,
    /// Order was cancelled
    pub is_cancelled: bool,
}

impl RawStatus for BitfinexStatus {
    fn lifecycle(&self) -> Lifecycle {
        if self.is_cancelled {
            Lifecycle::Cancelled
        } else if self.is_live {
            Lifecycle::Open
        } else {
            Lifecycle::Closed
        }
    }
}

/// The Bitfinex dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bitfinex;

impl Dialect for Bitfinex {
    type Status = BitfinexStatus;

    const ID: &'static str = "bitfinex";
    const NAME: &'static str = "Bitfinex";
    const FIELDS: FieldVocabulary = FieldVocabulary::new(
        &[("buy", OrderSide::Buy), ("sell", OrderSide::Sell)],
        &[
            ("exchange limit", OrderType::Limit),
            ("exchange market", OrderType::Market),
            ("exchange stop", OrderType::Stop),
            ("limit", OrderType::MarginLimit),
            ("market", OrderType::MarginMarket),
            ("stop", OrderType::MarginStop),
        ],
    );
    const QUOTAS: Quotas = Quotas {
        order_book: 60,
        ticker: 60,
        open_orders: 10,
        balances: 12,
    };

    fn initial_codec(&self) -> Result<SymbolCodec> {
        Ok(SymbolCodec::fixed_width(3, LetterCase::Lower, false)?)
    }

    fn check_response(&self, payload: Value) -> Result<Value> {
        let message = ["error", "message"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_str));
        match message {
            Some(RATE_LIMIT_TOKEN) => Err(Error::rate_limited(RATE_LIMIT_TOKEN, None)),
            Some(message) if !message.is_empty() => {
                let message = message.to_string();
                Err(Error::exchange_with_data("error", message, payload))
            }
            _ => Ok(payload),
        }
    }

    fn order_book_request(&self, symbol: &str, depth: usize) -> ExchangeRequest {
        ExchangeRequest::get(format!("/v1/book/{symbol}"))
            .param("limit_bids", depth)
            .param("limit_asks", depth)
    }

    fn parse_order_book(&self, payload: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
        parse_order_book(payload, now_ms)
    }

    fn ticker_request(&self, symbol: &str) -> ExchangeRequest {
        ExchangeRequest::get(format!("/v1/pubticker/{symbol}"))
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
        ExchangeRequest::post("/v1/orders")
    }

    fn parse_open_orders(&self, payload: &Value) -> Result<Vec<RawOrder<BitfinexStatus>>> {
        parse_open_orders(payload)
    }

    fn order_request(&self, id: &str, _symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(ExchangeRequest::post("/v1/order/status").param("order_id", numeric_id(id)?))
    }

    fn parse_order(&self, payload: &Value, _id: &str) -> Result<RawOrder<BitfinexStatus>> {
        parse_order(payload)
    }

    fn balances_request(&self) -> ExchangeRequest {
        ExchangeRequest::post("/v1/balances")
    }

    fn parse_balances(&self, payload: &Value) -> Result<Vec<RawBalance>> {
        parse_balances(payload)
    }

    fn place_order_request(&self, order: &OrderRequest, symbol: &str) -> Result<ExchangeRequest> {
        let mut request = ExchangeRequest::post("/v1/order/new")
            .param("symbol", symbol)
            .param("amount", order.amount)
            .param("side", side_token::<Self>(order.side)?)
            .param("type", order_type_token::<Self>(order.order_type)?)
            .param("exchange", "bitfinex")
            .param("is_hidden", false);
        // Bitfinex wants a price on every order; it is ignored for market orders.
        request = match order.price {
            Some(price) => request.param("price", price),
            None => request.param("price", "1"),
        };
        Ok(request)
    }

    fn parse_placed_order_id(&self, payload: &Value) -> Result<String> {
        parse_placed_order_id(payload)
    }

    fn cancel_order_request(&self, id: &str, _symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(ExchangeRequest::post("/v1/order/cancel").param("order_id", numeric_id(id)?))
    }
}

fn numeric_id(id: &str) -> Result<i64> {
    id.trim()
        .parse()
        .map_err(|_| Error::invalid_request(format!("Bitfinex order ids are numeric, got '{id}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinbridge_core::types::{Amount, CurrencyPair, Price};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_status_flags() {
        let status = |is_live, is_cancelled| BitfinexStatus { is_live, is_cancelled }.lifecycle();
        assert_eq!(status(true, false), Lifecycle::Open);
        assert_eq!(status(false, false), Lifecycle::Closed);
        assert_eq!(status(false, true), Lifecycle::Cancelled);
        assert_eq!(status(true, true), Lifecycle::Cancelled);
    }

    #[test]
    fn test_codec_is_fixed_width_lowercase() {
        let codec = Bitfinex.initial_codec().unwrap();
        let pair = CurrencyPair::new("ETH", "BTC").unwrap();
        assert_eq!(codec.to_symbol(&pair).unwrap(), "ethbtc");
        assert_eq!(codec.to_pair("ETHBTC").unwrap(), pair);
        assert!(codec.to_pair("ethbtcx").is_err());
    }

    #[test]
    fn test_rate_limit_body_is_throttle() {
        let err = Bitfinex
            .check_response(json!({"error": "ERR_RATE_LIMIT"}))
            .unwrap_err();
        assert!(err.is_provider_throttle());

        let err = Bitfinex
            .check_response(json!({"message": "ERR_RATE_LIMIT"}))
            .unwrap_err();
        assert!(err.is_provider_throttle());
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = Bitfinex
            .check_response(json!({"message": "Invalid order: not enough exchange balance"}))
            .unwrap_err();
        assert!(!err.is_provider_throttle());
        assert_eq!(
            err.as_exchange().map(|d| d.message.as_str()),
            Some("Invalid order: not enough exchange balance")
        );
        assert!(Bitfinex.check_response(json!([{"id": 1}])).is_ok());
    }

    #[test]
    fn test_vocabulary_round_trip() {
        assert_eq!(Bitfinex::FIELDS.order_type("Exchange Limit"), Some(OrderType::Limit));
        assert_eq!(Bitfinex::FIELDS.order_type("limit"), Some(OrderType::MarginLimit));
        assert_eq!(Bitfinex::FIELDS.order_type_token(OrderType::Limit), Some("exchange limit"));
        assert_eq!(Bitfinex::FIELDS.side("SELL"), Some(OrderSide::Sell));
    }

    #[test]
    fn test_place_order_request() {
        let order = OrderRequest::limit(
            CurrencyPair::new("ETH", "BTC").unwrap(),
            OrderSide::Buy,
            Amount::new(dec!(1.5)),
            Price::new(dec!(0.0712)),
        );
        let request = Bitfinex.place_order_request(&order, "ethbtc").unwrap();
        assert_eq!(request.path, "/v1/order/new");
        assert_eq!(request.params["type"], "exchange limit");
        assert_eq!(request.params["side"], "buy");
        assert_eq!(request.params["amount"], "1.5");
        assert_eq!(request.params["price"], "0.0712");
    }

    #[test]
    fn test_order_ids_must_be_numeric() {
        assert!(Bitfinex.cancel_order_request("448411153", None).is_ok());
        assert!(Bitfinex.cancel_order_request("abc", None).is_err());
    }
}
