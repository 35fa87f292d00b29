use super::BittrexStatus;
use crate::parsing::{TickerKeys, array, levels_from_objects, ticker_from_object};
use coinbridge_core::error::{ParseError, Result};
use coinbridge_core::normalize::{FillReport, RawBalance, RawOrder, RawTimestamp};
use coinbridge_core::parser_utils::{
    parse_bool, parse_decimal, parse_decimal_required, parse_id, parse_str, parse_str_required,
};
use coinbridge_core::time::parse_datetime_seconds;
use coinbridge_core::types::{CurrencyPair, OrderBookSnapshot, Ticker};
use serde_json::Value;

/// Bittrex timestamps are UTC without an offset, with optional fractional seconds.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parses `public/getorderbook?type=both`.
pub fn parse_order_book(data: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
    let bids = levels_from_objects(&data["buy"], "buy", "Rate", "Quantity")?;
    let asks = levels_from_objects(&data["sell"], "sell", "Rate", "Quantity")?;
    Ok(OrderBookSnapshot::new(bids, asks, now_ms))
}

/// Parses one order from `market/getopenorders` or `account/getorder`.
///
/// The open-orders listing names the side-and-type token `OrderType`; the
/// single-order endpoint names it `Type`.
pub fn parse_order(data: &Value) -> Result<RawOrder<BittrexStatus>> {
    let token = parse_str(data, "OrderType")
        .or_else(|| parse_str(data, "Type"))
        .ok_or(ParseError::missing_field("OrderType"))?;
    let status = if parse_str(data, "Closed").is_some_and(|closed| !closed.is_empty()) {
        BittrexStatus::Closed
    } else if parse_bool(data, "CancelInitiated").unwrap_or(false) {
        BittrexStatus::CancelPending
    } else {
        BittrexStatus::Open
    };

    Ok(RawOrder {
        id: parse_id(data, "OrderUuid")?,
        symbol: parse_str_required(data, "Exchange")?.to_string(),
        side: token.to_string(),
        order_type: Some(token.to_string()),
        status,
        fill: FillReport::Remaining {
            amount: parse_decimal_required(data, "Quantity")?,
            remaining: parse_decimal_required(data, "QuantityRemaining")?,
        },
        limit_price: parse_decimal(data, "Limit"),
        average_price: parse_decimal(data, "PricePerUnit"),
        timestamp: RawTimestamp::Formatted {
            value: parse_str_required(data, "Opened")?.to_string(),
            format: TIME_FORMAT,
        },
    })
}

/// Parses `market/getopenorders`.
pub fn parse_open_orders(data: &Value) -> Result<Vec<RawOrder<BittrexStatus>>> {
    array(data, "result")?.iter().map(parse_order).collect()
}

/// Parses `account/getbalances`.
pub fn parse_balances(data: &Value) -> Result<Vec<RawBalance>> {
    array(data, "result")?
        .iter()
        .map(|balance| {
            Ok(RawBalance::TotalAvailable {
                currency: parse_str_required(balance, "Currency")?.to_string(),
                total: parse_decimal(balance, "Balance").unwrap_or_default(),
                available: parse_decimal(balance, "Available").unwrap_or_default(),
            })
        })
        .collect()
}

/// Reads `uuid` from a `buylimit` or `selllimit` result.
pub fn parse_placed_order_id(data: &Value) -> Result<String> {
    parse_id(data, "uuid")
}

const TICKER_KEYS: TickerKeys = TickerKeys {
    last: "Last",
    bid: "Bid",
    ask: "Ask",
    high: "High",
    low: "Low",
    volume: "Volume",
};

/// Parses `public/getmarketsummary`: a one-element list.
pub fn parse_ticker(
    data: &Value,
    _symbol: &str,
    pair: &CurrencyPair,
    now_ms: i64,
) -> Result<Ticker> {
    let summary = array(data, "result")?
        .first()
        .ok_or(ParseError::missing_field("result"))?;
    let timestamp = match parse_str(summary, "TimeStamp") {
        Some(value) => parse_datetime_seconds(value, TIME_FORMAT)? * 1000,
        None => now_ms,
    };
    ticker_from_object(summary, &TICKER_KEYS, pair, timestamp)
}
