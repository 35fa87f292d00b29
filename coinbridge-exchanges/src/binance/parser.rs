use super::BinanceStatus;
use crate::adapter::MarketListing;
use crate::parsing::{TickerKeys, array, levels_from_arrays, ticker_from_object};
use coinbridge_core::error::{ParseError, Result};
use coinbridge_core::limits::{PairLimits, TableLimits, places_from_step};
use coinbridge_core::normalize::{FillReport, RawBalance, RawOrder, RawTimestamp};
use coinbridge_core::parser_utils::{
    parse_decimal, parse_decimal_required, parse_i64, parse_id, parse_str, parse_str_required,
};
use coinbridge_core::types::{CurrencyPair, OrderBookSnapshot, Ticker};
use rust_decimal::Decimal;
use serde_json::Value;

/// Parses `/api/v3/exchangeInfo` into the symbol table and trading limits.
///
/// Only markets in `TRADING` status are listed.
pub fn parse_markets(data: &Value) -> Result<MarketListing> {
    let mut markets = Vec::new();
    let mut limits = TableLimits::new(PairLimits::default());

    for market in array(&data["symbols"], "symbols")? {
        if parse_str(market, "status") != Some("TRADING") {
            continue;
        }
        let symbol = parse_str_required(market, "symbol")?;
        let pair = CurrencyPair::new(
            parse_str_required(market, "baseAsset")?,
            parse_str_required(market, "quoteAsset")?,
        )?;
        limits.insert(pair.clone(), parse_filters(market));
        markets.push((symbol.to_string(), pair));
    }
    Ok(MarketListing { markets, limits })
}

fn parse_filters(market: &Value) -> PairLimits {
    let mut limits = PairLimits::default();
    let Some(filters) = market["filters"].as_array() else {
        return limits;
    };
    for filter in filters {
        match parse_str(filter, "filterType").unwrap_or_default() {
            "PRICE_FILTER" => {
                limits.price_decimal_places =
                    parse_str(filter, "tickSize").and_then(places_from_step);
            }
            "LOT_SIZE" => {
                limits.amount_decimal_places =
                    parse_str(filter, "stepSize").and_then(places_from_step);
                limits.min_amount = parse_decimal(filter, "minQty").unwrap_or_default();
            }
            "MIN_NOTIONAL" | "NOTIONAL" => {
                limits.min_total = parse_decimal(filter, "minNotional").unwrap_or_default();
            }
            _ => {}
        }
    }
    limits
}

/// Parses `/api/v3/depth`.
pub fn parse_order_book(data: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
    let bids = levels_from_arrays(&data["bids"], "bids")?;
    let asks = levels_from_arrays(&data["asks"], "asks")?;
    Ok(OrderBookSnapshot::new(bids, asks, now_ms))
}

/// Parses one order from `/api/v3/order` or `/api/v3/openOrders`.
pub fn parse_order(data: &Value) -> Result<RawOrder<BinanceStatus>> {
    let amount = parse_decimal_required(data, "origQty")?;
    let executed = parse_decimal_required(data, "executedQty")?;
    let average_price = parse_decimal(data, "cummulativeQuoteQty")
        .filter(|_| !executed.is_zero())
        .map(|quote| quote / executed);
    let time = parse_i64(data, "time")
        .or_else(|| parse_i64(data, "transactTime"))
        .ok_or(ParseError::missing_field("time"))?;

    Ok(RawOrder {
        id: parse_id(data, "orderId")?,
        symbol: parse_str_required(data, "symbol")?.to_string(),
        side: parse_str_required(data, "side")?.to_string(),
        order_type: parse_str(data, "type").map(str::to_string),
        status: BinanceStatus::from_raw(parse_str_required(data, "status")?),
        fill: FillReport::Executed { amount, executed },
        limit_price: parse_decimal(data, "price").filter(|p| *p > Decimal::ZERO),
        average_price,
        timestamp: RawTimestamp::Millis(time),
    })
}

/// Parses `/api/v3/openOrders`.
pub fn parse_open_orders(data: &Value) -> Result<Vec<RawOrder<BinanceStatus>>> {
    array(data, "orders")?.iter().map(parse_order).collect()
}

/// Parses the `balances` of `/api/v3/account`.
pub fn parse_balances(data: &Value) -> Result<Vec<RawBalance>> {
    array(&data["balances"], "balances")?
        .iter()
        .map(|balance| {
            Ok(RawBalance::FreeLocked {
                currency: parse_str_required(balance, "asset")?.to_string(),
                free: parse_decimal_required(balance, "free")?,
                locked: parse_decimal_required(balance, "locked")?,
            })
        })
        .collect()
}

/// Reads `orderId` from an `ACK` order response.
pub fn parse_placed_order_id(data: &Value) -> Result<String> {
    parse_id(data, "orderId")
}

const TICKER_KEYS: TickerKeys = TickerKeys {
    last: "lastPrice",
    bid: "bidPrice",
    ask: "askPrice",
    high: "highPrice",
    low: "lowPrice",
    volume: "volume",
};

/// Parses `/api/v3/ticker/24hr` for one symbol, stamped with its `closeTime`.
pub fn parse_ticker(
    data: &Value,
    _symbol: &str,
    pair: &CurrencyPair,
    now_ms: i64,
) -> Result<Ticker> {
    let timestamp = parse_i64(data, "closeTime").unwrap_or(now_ms);
    ticker_from_object(data, &TICKER_KEYS, pair, timestamp)
}
