//! Binance (spot REST API v3).
//!
//! Binance symbols run base and quote together (`ETHBTC`, `BTCUSDT`), so codes
//! of different lengths cannot be split without the market list: the codec is a
//! table filled by [`Adapter::load_markets`](crate::adapter::Adapter::load_markets)
//! from `/api/v3/exchangeInfo`, which also carries the per-pair price and lot
//! filters.
//!
//! Request weight is counted per minute, so the dispatcher runs in fixed windows
//! unless configured otherwise.

mod parser;

pub use parser::{
    parse_balances, parse_markets, parse_open_orders, parse_order, parse_order_book,
    parse_placed_order_id, parse_ticker,
};

use crate::adapter::{
    Dialect, ExchangeRequest, MarketListing, OrderRequest, Quotas, required_price, side_token,
};
use coinbridge_core::config::{CadencePolicy, DispatcherConfig};
use coinbridge_core::error::{Error, Result};
use coinbridge_core::normalize::{FieldVocabulary, Lifecycle, RawBalance, RawOrder, RawStatus};
use coinbridge_core::symbol::{MarketTable, SymbolCodec};
use coinbridge_core::types::{CurrencyPair, OrderBookSnapshot, OrderSide, OrderType, Ticker};
use serde_json::Value;
use std::time::Duration;

/// Error codes Binance uses for request-weight and order-rate throttling.
pub const THROTTLE_CODES: [i64; 2] = [-1003, -1015];

/// Depths the `/api/v3/depth` endpoint accepts.
const DEPTH_LIMITS: [usize; 8] = [5, 10, 20, 50, 100, 500, 1000, 5000];

/// Window Binance counts request weight over.
const WEIGHT_WINDOW: Duration = Duration::from_secs(60);

/// Binance order status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinanceStatus {
    /// Accepted, nothing executed
    New,
    /// Partially executed, still working
    PartiallyFilled,
    /// Fully executed
    Filled,
    /// Cancelled by the user
    Canceled,
    /// Cancel requested, not yet confirmed
    PendingCancel,
    /// Rejected by the matching engine
    Rejected,
    /// Expired per its time-in-force
    Expired,
    /// Anything else, kept verbatim
    Other(String),
}

impl BinanceStatus {
    /// Parses the `status` field.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "NEW" => Self::New,
            "PARTIALLY_FILLED" => Self::PartiallyFilled,
            "FILLED" => Self::Filled,
            "CANCELED" => Self::Canceled,
            "PENDING_CANCEL" => Self::PendingCancel,
            "REJECTED" => Self::Rejected,
            "EXPIRED" => Self::Expired,
            other => Self::Other(other.to_string()),
        }
    }
}

impl RawStatus for BinanceStatus {
    fn lifecycle(&self) -> Lifecycle {
        match self {
            Self::New | Self::PartiallyFilled => Lifecycle::Open,
            Self::Filled => Lifecycle::Closed,
            Self::Canceled | Self::PendingCancel | Self::Rejected | Self::Expired => {
                Lifecycle::Cancelled
            }
            Self::Other(raw) => Lifecycle::Unrecognized(raw.clone()),
        }
    }
}

/// The Binance dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Binance;

impl Dialect for Binance {
    type Status = BinanceStatus;

    const ID: &'static str = "binance";
    const NAME: &'static str = "Binance";
    const FIELDS: FieldVocabulary = FieldVocabulary::new(
        &[("BUY", OrderSide::Buy), ("SELL", OrderSide::Sell)],
        &[
            ("LIMIT", OrderType::Limit),
            ("MARKET", OrderType::Market),
            ("STOP_LOSS_LIMIT", OrderType::Stop),
            ("STOP_LOSS", OrderType::Stop),
            ("TAKE_PROFIT_LIMIT", OrderType::Stop),
            ("TAKE_PROFIT", OrderType::Stop),
            ("LIMIT_MAKER", OrderType::Limit),
        ],
    );
    const QUOTAS: Quotas = Quotas {
        order_book: 60,
        ticker: 60,
        open_orders: 20,
        balances: 20,
    };

    fn initial_codec(&self) -> Result<SymbolCodec> {
        Ok(SymbolCodec::Table(MarketTable::new()))
    }

    fn tune(&self, config: DispatcherConfig) -> DispatcherConfig {
        match config.cadence {
            CadencePolicy::Spacing => config.with_cadence(CadencePolicy::FixedWindow {
                window: WEIGHT_WINDOW,
            }),
            CadencePolicy::FixedWindow { .. } => config,
        }
    }

    fn check_response(&self, payload: Value) -> Result<Value> {
        let Some(code) = payload.get("code").and_then(Value::as_i64) else {
            return Ok(payload);
        };
        if code >= 0 {
            return Ok(payload);
        }
        let message = payload["msg"].as_str().unwrap_or_default().to_string();
        if THROTTLE_CODES.contains(&code) {
            return Err(Error::rate_limited(message, None));
        }
        Err(Error::exchange_with_data(code.to_string(), message, payload))
    }

    fn markets_request(&self) -> Option<ExchangeRequest> {
        Some(ExchangeRequest::get("/api/v3/exchangeInfo"))
    }

    fn parse_markets(&self, payload: &Value) -> Result<MarketListing> {
        parse_markets(payload)
    }

    fn order_book_request(&self, symbol: &str, depth: usize) -> ExchangeRequest {
        ExchangeRequest::get("/api/v3/depth")
            .param("symbol", symbol)
            .param("limit", depth_limit(depth))
            .scoped(symbol)
    }

    fn parse_order_book(&self, payload: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
        parse_order_book(payload, now_ms)
    }

    fn ticker_request(&self, symbol: &str) -> ExchangeRequest {
        ExchangeRequest::get("/api/v3/ticker/24hr")
            .param("symbol", symbol)
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
        ExchangeRequest::get("/api/v3/openOrders")
    }

    fn parse_open_orders(&self, payload: &Value) -> Result<Vec<RawOrder<BinanceStatus>>> {
        parse_open_orders(payload)
    }

    fn order_request(&self, id: &str, symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(ExchangeRequest::get("/api/v3/order")
            .param("symbol", require_symbol(symbol, "order lookup")?)
            .param("orderId", id))
    }

    fn parse_order(&self, payload: &Value, _id: &str) -> Result<RawOrder<BinanceStatus>> {
        parse_order(payload)
    }

    fn balances_request(&self) -> ExchangeRequest {
        ExchangeRequest::get("/api/v3/account")
    }

    fn parse_balances(&self, payload: &Value) -> Result<Vec<RawBalance>> {
        parse_balances(payload)
    }

    fn place_order_request(&self, order: &OrderRequest, symbol: &str) -> Result<ExchangeRequest> {
        let request = ExchangeRequest::post("/api/v3/order")
            .param("symbol", symbol)
            .param("side", side_token::<Self>(order.side)?)
            .param("quantity", order.amount)
            .param("newOrderRespType", "ACK");
        match order.order_type {
            OrderType::Limit => Ok(request
                .param("type", "LIMIT")
                .param("timeInForce", "GTC")
                .param("price", required_price::<Self>(order)?)),
            OrderType::Market => Ok(request.param("type", "MARKET")),
            other => Err(Error::unsupported_order_field(
                Self::NAME,
                "type",
                other.to_string(),
            )),
        }
    }

    fn parse_placed_order_id(&self, payload: &Value) -> Result<String> {
        parse_placed_order_id(payload)
    }

    fn cancel_order_request(&self, id: &str, symbol: Option<&str>) -> Result<ExchangeRequest> {
        Ok(ExchangeRequest::delete("/api/v3/order")
            .param("symbol", require_symbol(symbol, "cancellation")?)
            .param("orderId", id))
    }
}

/// Smallest accepted depth covering `depth` levels.
fn depth_limit(depth: usize) -> usize {
    DEPTH_LIMITS
        .iter()
        .copied()
        .find(|limit| *limit >= depth)
        .unwrap_or(DEPTH_LIMITS[DEPTH_LIMITS.len() - 1])
}

fn require_symbol<'a>(symbol: Option<&'a str>, what: &str) -> Result<&'a str> {
    symbol.ok_or_else(|| Error::invalid_request(format!("Binance {what} needs the order's pair")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinbridge_core::types::{Amount, CurrencyPair, Price};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_status_lifecycle() {
        assert_eq!(BinanceStatus::from_raw("NEW").lifecycle(), Lifecycle::Open);
        assert_eq!(BinanceStatus::from_raw("PARTIALLY_FILLED").lifecycle(), Lifecycle::Open);
        assert_eq!(BinanceStatus::from_raw("FILLED").lifecycle(), Lifecycle::Closed);
        assert_eq!(BinanceStatus::from_raw("EXPIRED").lifecycle(), Lifecycle::Cancelled);
        assert_eq!(
            BinanceStatus::from_raw("EXPIRED_IN_MATCH").lifecycle(),
            Lifecycle::Unrecognized("EXPIRED_IN_MATCH".into())
        );
    }

    #[test]
    fn test_throttle_codes() {
        let err = Binance
            .check_response(json!({"code": -1003, "msg": "Too much request weight used"}))
            .unwrap_err();
        assert!(err.is_provider_throttle());

        let err = Binance
            .check_response(json!({"code": -2010, "msg": "Account has insufficient balance"}))
            .unwrap_err();
        assert!(!err.is_provider_throttle());
        assert_eq!(err.as_exchange().map(|d| d.code.as_str()), Some("-2010"));

        assert!(Binance.check_response(json!({"symbol": "ETHBTC", "orderId": 1})).is_ok());
    }

    #[test]
    fn test_depth_limit_rounds_up() {
        assert_eq!(depth_limit(1), 5);
        assert_eq!(depth_limit(50), 50);
        assert_eq!(depth_limit(51), 100);
        assert_eq!(depth_limit(10_000), 5000);
    }

    #[test]
    fn test_order_book_requests_are_scoped_per_symbol() {
        let eth = Binance.order_book_request("ETHBTC", 50).endpoint_key();
        let ltc = Binance.order_book_request("LTCBTC", 50).endpoint_key();
        assert_ne!(eth, ltc);
    }

    #[test]
    fn test_tune_switches_to_weight_window() {
        let tuned = Binance.tune(DispatcherConfig::default());
        assert_eq!(tuned.cadence, CadencePolicy::FixedWindow { window: WEIGHT_WINDOW });

        let custom = DispatcherConfig::default().with_cadence(CadencePolicy::FixedWindow {
            window: Duration::from_secs(10),
        });
        assert_eq!(Binance.tune(custom.clone()), custom);
    }

    #[test]
    fn test_place_order_request() {
        let pair = CurrencyPair::new("ETH", "BTC").unwrap();
        let limit = OrderRequest::limit(
            pair.clone(),
            OrderSide::Sell,
            Amount::new(dec!(0.25)),
            Price::new(dec!(0.0712)),
        );
        let request = Binance.place_order_request(&limit, "ETHBTC").unwrap();
        assert_eq!(request.params["type"], "LIMIT");
        assert_eq!(request.params["side"], "SELL");
        assert_eq!(request.params["timeInForce"], "GTC");
        assert_eq!(request.params["price"], "0.0712");

        let stop = OrderRequest {
            order_type: OrderType::Stop,
            ..limit
        };
        assert!(matches!(
            Binance.place_order_request(&stop, "ETHBTC"),
            Err(Error::UnsupportedOrderField { .. })
        ));
    }

    #[test]
    fn test_cancel_needs_symbol() {
        assert!(Binance.cancel_order_request("12", None).is_err());
        let request = Binance.cancel_order_request("12", Some("ETHBTC")).unwrap();
        assert_eq!(request.endpoint_key().as_str(), "DELETE/api/v3/order");
    }
}
