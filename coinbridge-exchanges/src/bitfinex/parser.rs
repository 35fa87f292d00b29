use super::BitfinexStatus;
use crate::parsing::{TickerKeys, array, levels_from_objects, ticker_from_object};
use coinbridge_core::error::{ParseError, Result};
use coinbridge_core::normalize::{FillReport, RawBalance, RawOrder, RawTimestamp};
use coinbridge_core::parser_utils::{
    parse_bool, parse_decimal, parse_decimal_required, parse_id, parse_str, parse_str_required,
};
use coinbridge_core::time::truncate_fractional_seconds;
use coinbridge_core::types::{CurrencyPair, OrderBookSnapshot, Ticker};
use serde_json::Value;

/// Parses `/v1/book/{symbol}`.
pub fn parse_order_book(data: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
    let bids = levels_from_objects(&data["bids"], "bids", "price", "amount")?;
    let asks = levels_from_objects(&data["asks"], "asks", "price", "amount")?;
    Ok(OrderBookSnapshot::new(bids, asks, now_ms))
}

/// Parses one order object (`/v1/order/status` or an element of `/v1/orders`).
pub fn parse_order(data: &Value) -> Result<RawOrder<BitfinexStatus>> {
    let status = BitfinexStatus {
        is_live: parse_bool(data, "is_live").ok_or(ParseError::missing_field("is_live"))?,
        is_cancelled: parse_bool(data, "is_cancelled")
            .ok_or(ParseError::missing_field("is_cancelled"))?,
    };
    Ok(RawOrder {
        id: parse_id(data, "id")?,
        symbol: parse_str_required(data, "symbol")?.to_string(),
        side: parse_str_required(data, "side")?.to_string(),
        order_type: Some(parse_str_required(data, "type")?.to_string()),
        status,
        fill: FillReport::Remaining {
            amount: parse_decimal_required(data, "original_amount")?,
            remaining: parse_decimal_required(data, "remaining_amount")?,
        },
        limit_price: parse_decimal(data, "price"),
        average_price: parse_decimal(data, "avg_execution_price"),
        timestamp: RawTimestamp::Fractional(parse_str_required(data, "timestamp")?.to_string()),
    })
}

/// Parses `/v1/orders`.
pub fn parse_open_orders(data: &Value) -> Result<Vec<RawOrder<BitfinexStatus>>> {
    array(data, "orders")?.iter().map(parse_order).collect()
}

/// Parses `/v1/balances`, keeping the exchange wallet only.
pub fn parse_balances(data: &Value) -> Result<Vec<RawBalance>> {
    array(data, "balances")?
        .iter()
        .filter(|wallet| wallet["type"].as_str() == Some("exchange"))
        .map(|wallet| {
            Ok(RawBalance::TotalAvailable {
                currency: parse_str_required(wallet, "currency")?.to_string(),
                total: parse_decimal_required(wallet, "amount")?,
                available: parse_decimal_required(wallet, "available")?,
            })
        })
        .collect()
}

/// Reads the id of a newly placed order.
pub fn parse_placed_order_id(data: &Value) -> Result<String> {
    parse_id(data, "order_id").or_else(|_| parse_id(data, "id"))
}

const TICKER_KEYS: TickerKeys = TickerKeys {
    last: "last_price",
    bid: "bid",
    ask: "ask",
    high: "high",
    low: "low",
    volume: "volume",
};

/// Parses `/v1/pubticker/{symbol}`.
pub fn parse_ticker(
    data: &Value,
    _symbol: &str,
    pair: &CurrencyPair,
    now_ms: i64,
) -> Result<Ticker> {
    let timestamp = match parse_str(data, "timestamp") {
        Some(value) => truncate_fractional_seconds(value)? * 1000,
        None => now_ms,
    };
    ticker_from_object(data, &TICKER_KEYS, pair, timestamp)
}
