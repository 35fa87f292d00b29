use crate::parsing::{TickerKeys, array, levels_from_arrays, object, ticker_from_object};
use coinbridge_core::error::{Error, ParseError, Result};
use coinbridge_core::normalize::{FillReport, Lifecycle, RawBalance, RawOrder, RawTimestamp};
use coinbridge_core::parser_utils::{
    parse_decimal, parse_decimal_required, parse_id, parse_str_required,
};
use coinbridge_core::types::{CurrencyPair, OrderBookSnapshot, Ticker};
use rust_decimal::Decimal;
use serde_json::Value;

/// Poloniex dates are UTC without an offset.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses `returnOrderBook`.
pub fn parse_order_book(data: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
    let bids = levels_from_arrays(&data["bids"], "bids")?;
    let asks = levels_from_arrays(&data["asks"], "asks")?;
    Ok(OrderBookSnapshot::new(bids, asks, now_ms))
}

// `amount` is what remains; `startingAmount` is the original size when present.
fn parse_open_order(symbol: &str, data: &Value) -> Result<RawOrder<Lifecycle>> {
    let remaining = parse_decimal_required(data, "amount")?;
    let amount = parse_decimal(data, "startingAmount").unwrap_or(remaining);
    Ok(RawOrder {
        id: parse_id(data, "orderNumber")?,
        symbol: symbol.to_string(),
        side: parse_str_required(data, "type")?.to_string(),
        order_type: None,
        status: Lifecycle::Open,
        fill: FillReport::Remaining { amount, remaining },
        limit_price: parse_decimal(data, "rate"),
        average_price: None,
        timestamp: RawTimestamp::Formatted {
            value: parse_str_required(data, "date")?.to_string(),
            format: DATE_FORMAT,
        },
    })
}

/// Parses `returnOpenOrders` for all markets: `{symbol: [order, ...]}`.
pub fn parse_open_orders(data: &Value) -> Result<Vec<RawOrder<Lifecycle>>> {
    let mut orders = Vec::new();
    for (symbol, market_orders) in object(data, "openOrders")? {
        for order in array(market_orders, "openOrders")? {
            orders.push(parse_open_order(symbol, order)?);
        }
    }
    Ok(orders)
}

/// Rebuilds an order from its `returnOrderTrades` listing.
///
/// The trades tell what executed but not the original size, nor whether the rest
/// was cancelled. The order is reported as closed with its executed amount as
/// both size and fill, at the amount-weighted average trade rate, created at its
/// earliest trade.
pub fn parse_order(data: &Value, id: &str) -> Result<RawOrder<Lifecycle>> {
    let trades = array(data, "orderTrades")?;
    let Some(first) = trades.first() else {
        return Err(Error::not_found(format!("no trades for Poloniex order {id}")));
    };

    let mut executed = Decimal::ZERO;
    let mut notional = Decimal::ZERO;
    let mut earliest = parse_str_required(first, "date")?;
    for trade in trades {
        let amount = parse_decimal_required(trade, "amount")?;
        executed += amount;
        notional += amount * parse_decimal_required(trade, "rate")?;
        let date = parse_str_required(trade, "date")?;
        // Fixed-width dates order the same as text.
        if date < earliest {
            earliest = date;
        }
    }
    let average = (!executed.is_zero()).then(|| notional / executed);

    Ok(RawOrder {
        id: id.to_string(),
        symbol: parse_str_required(first, "currencyPair")?.to_string(),
        side: parse_str_required(first, "type")?.to_string(),
        order_type: None,
        status: Lifecycle::Cancelled,
        fill: FillReport::Executed {
            amount: executed,
            executed,
        },
        limit_price: None,
        average_price: average,
        timestamp: RawTimestamp::Formatted {
            value: earliest.to_string(),
            format: DATE_FORMAT,
        },
    })
}

/// Parses `returnCompleteBalances`: `{currency: {available, onOrders, ...}}`.
pub fn parse_balances(data: &Value) -> Result<Vec<RawBalance>> {
    object(data, "balances")?
        .iter()
        .map(|(currency, balance)| {
            Ok(RawBalance::FreeLocked {
                currency: currency.clone(),
                free: parse_decimal_required(balance, "available")?,
                locked: parse_decimal_required(balance, "onOrders")?,
            })
        })
        .collect()
}

/// Reads `orderNumber` from a `buy` or `sell` result.
pub fn parse_placed_order_id(data: &Value) -> Result<String> {
    parse_id(data, "orderNumber")
}

// Poloniex symbols put the quote first, so its `quoteVolume` is counted in the
// canonical base currency.
const TICKER_KEYS: TickerKeys = TickerKeys {
    last: "last",
    bid: "highestBid",
    ask: "lowestAsk",
    high: "high24hr",
    low: "low24hr",
    volume: "quoteVolume",
};

/// Picks `symbol` out of `returnTicker`, which covers every market.
pub fn parse_ticker(
    data: &Value,
    symbol: &str,
    pair: &CurrencyPair,
    now_ms: i64,
) -> Result<Ticker> {
    let entry = object(data, "returnTicker")?.get(symbol).ok_or_else(|| {
        ParseError::invalid_value("returnTicker", format!("no entry for {symbol}"))
    })?;
    ticker_from_object(entry, &TICKER_KEYS, pair, now_ms)
}
