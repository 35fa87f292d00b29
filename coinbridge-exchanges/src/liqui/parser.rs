use super::{LiquiStatus, codec};
use crate::adapter::MarketListing;
use crate::parsing::{TickerKeys, levels_from_arrays, object, ticker_from_object};
use coinbridge_core::error::{ParseError, Result};
use coinbridge_core::limits::{PairLimits, TableLimits};
use coinbridge_core::normalize::{FillReport, RawBalance, RawOrder, RawTimestamp};
use coinbridge_core::parser_utils::{
    decimal_from_value, parse_decimal, parse_decimal_required, parse_i64, parse_id,
    parse_str_required,
};
use coinbridge_core::types::{CurrencyPair, OrderBookSnapshot, Ticker};
use serde_json::Value;
use tracing::debug;

/// Parses `/api/3/info`: decimal places and minimum amounts per pair.
///
/// Hidden pairs are skipped.
pub fn parse_markets(data: &Value) -> Result<MarketListing> {
    let codec = codec()?;
    let mut markets = Vec::new();
    let mut limits = TableLimits::new(PairLimits::default());

    for (symbol, info) in object(&data["pairs"], "pairs")? {
        if parse_i64(info, "hidden") == Some(1) {
            continue;
        }
        let pair = codec.to_pair(symbol)?;
        let places = parse_i64(info, "decimal_places").and_then(|d| u32::try_from(d).ok());
        limits.insert(
            pair.clone(),
            PairLimits {
                price_decimal_places: places,
                amount_decimal_places: places,
                min_amount: parse_decimal(info, "min_amount").unwrap_or_default(),
                ..PairLimits::default()
            },
        );
        markets.push((symbol.clone(), pair));
    }
    Ok(MarketListing { markets, limits })
}

/// Parses `/api/3/depth/{pair}`: one entry keyed by the pair.
pub fn parse_order_book(data: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
    let (_, book) = object(data, "depth")?
        .iter()
        .next()
        .ok_or(ParseError::missing_field("depth"))?;
    let bids = levels_from_arrays(&book["bids"], "bids")?;
    let asks = levels_from_arrays(&book["asks"], "asks")?;
    Ok(OrderBookSnapshot::new(bids, asks, now_ms))
}

// `amount` is what remains; `start_amount` only comes with OrderInfo. Without it
// the listing cannot tell how much has executed and reports nothing filled.
fn parse_order_entry(id: &str, data: &Value) -> Result<RawOrder<LiquiStatus>> {
    let remaining = parse_decimal_required(data, "amount")?;
    let amount = parse_decimal(data, "start_amount")
        .filter(|start| !start.is_zero())
        .unwrap_or(remaining);
    let status = parse_i64(data, "status").ok_or(ParseError::missing_field("status"))?;
    let created = parse_i64(data, "timestamp_created")
        .ok_or(ParseError::missing_field("timestamp_created"))?;
    Ok(RawOrder {
        id: id.to_string(),
        symbol: parse_str_required(data, "pair")?.to_string(),
        side: parse_str_required(data, "type")?.to_string(),
        order_type: None,
        status: LiquiStatus::from(status),
        fill: FillReport::Remaining { amount, remaining },
        limit_price: parse_decimal(data, "rate"),
        average_price: None,
        timestamp: RawTimestamp::Seconds(created),
    })
}

/// Parses `ActiveOrders`: `{order_id: order}`.
pub fn parse_open_orders(data: &Value) -> Result<Vec<RawOrder<LiquiStatus>>> {
    // An account without orders gets an error, surfaced here as null.
    if data.is_null() {
        return Ok(Vec::new());
    }
    object(data, "return")?
        .iter()
        .map(|(id, order)| parse_order_entry(id, order))
        .collect()
}

/// Parses `OrderInfo`: `{order_id: order}`.
pub fn parse_order(data: &Value, id: &str) -> Result<RawOrder<LiquiStatus>> {
    let order = object(data, "return")?
        .get(id)
        .ok_or_else(|| {
            ParseError::invalid_value("order_id", format!("order {id} not in response"))
        })?;
    parse_order_entry(id, order)
}

/// Parses the `funds` of `getInfo`.
pub fn parse_balances(data: &Value) -> Result<Vec<RawBalance>> {
    object(&data["funds"], "funds")?
        .iter()
        .map(|(currency, amount)| {
            let total = decimal_from_value(amount)
                .ok_or_else(|| {
                    ParseError::invalid_value("funds", format!("{currency}: {amount}"))
                })?;
            Ok(RawBalance::TotalOnly {
                currency: currency.clone(),
                total,
            })
        })
        .collect()
}

/// Reads `order_id` from a `Trade` result.
///
/// Liqui answers `0` when the order executed in full on placement; that yields
/// an empty id since there is no order left to track.
pub fn parse_placed_order_id(data: &Value) -> Result<String> {
    let id = parse_id(data, "order_id")?;
    if id == "0" {
        debug!("Liqui order filled on placement");
        return Ok(String::new());
    }
    Ok(id)
}

// `buy` and `sell` are the best standing buy and sell prices; `vol_cur` is
// counted in the first currency of the pair.
const TICKER_KEYS: TickerKeys = TickerKeys {
    last: "last",
    bid: "buy",
    ask: "sell",
    high: "high",
    low: "low",
    volume: "vol_cur",
};

/// Parses `/api/3/ticker/{pair}`: one entry keyed by the pair, stamped with its
/// `updated` time in seconds.
pub fn parse_ticker(
    data: &Value,
    symbol: &str,
    pair: &CurrencyPair,
    now_ms: i64,
) -> Result<Ticker> {
    let entries = object(data, "ticker")?;
    let entry = entries
        .get(symbol)
        .or_else(|| entries.values().next())
        .ok_or(ParseError::missing_field("ticker"))?;
    let timestamp = parse_i64(entry, "updated").map_or(now_ms, |secs| secs * 1000);
    ticker_from_object(entry, &TICKER_KEYS, pair, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Dialect;
    use crate::liqui::Liqui;
    use coinbridge_core::limits::ExchangeLimits;
    use coinbridge_core::normalize::{ExchangeContext, normalize, normalize_all, normalize_balances};
    use coinbridge_core::types::{CurrencyPair, OrderSide, OrderStatus};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_markets() {
        let data = json!({
            "server_time": 1500000000,
            "pairs": {
                "eth_btc": {
                    "decimal_places": 8, "min_price": 0.00000001, "min_amount": 0.01,
                    "hidden": 0, "fee": 0.25
                },
                "ltc_btc": {"decimal_places": 6, "min_amount": 0.1, "hidden": 1, "fee": 0.25}
            }
        });
        let listing = parse_markets(&data).unwrap();
        assert_eq!(listing.markets.len(), 1);
        let eth = CurrencyPair::new("ETH", "BTC").unwrap();
        assert_eq!(listing.markets[0], ("eth_btc".to_string(), eth.clone()));
        assert_eq!(listing.limits.amount_decimal_places(&eth), Some(8));
        assert_eq!(listing.limits.min_amount(&eth), dec!(0.01));
    }

    #[test]
    fn test_active_orders_report_nothing_filled() {
        let data = json!({
            "343152": {"pair": "eth_btc", "type": "sell", "amount": 12.345, "rate": 0.0712,
                       "timestamp_created": 1342448420, "status": 0}
        });
        let raws = parse_open_orders(&data).unwrap();
        let codec = Liqui.initial_codec().unwrap();
        let ctx = ExchangeContext::new(Liqui::NAME, &codec, &Liqui::FIELDS);
        let orders = normalize_all(&raws, &ctx).unwrap();
        assert_eq!(orders[0].id(), "343152");
        assert_eq!(orders[0].side(), OrderSide::Sell);
        assert_eq!(orders[0].order_type(), None);
        assert!(orders[0].filled_amount().is_zero());
        assert_eq!(orders[0].created_at(), 1342448420);

        assert!(parse_open_orders(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_order_info_uses_start_amount() {
        let data = json!({
            "343152": {"pair": "eth_btc", "type": "buy", "start_amount": 13.345, "amount": 12.345,
                       "rate": 0.0712, "timestamp_created": 1342448420, "status": 3}
        });
        let raw = parse_order(&data, "343152").unwrap();
        let codec = Liqui.initial_codec().unwrap();
        let ctx = ExchangeContext::new(Liqui::NAME, &codec, &Liqui::FIELDS);
        let order = normalize(&raw, &ctx).unwrap();
        assert_eq!(order.status(), OrderStatus::Aborted);
        assert_eq!(order.filled_amount().as_decimal(), dec!(1));
    }

    #[test]
    fn test_order_book() {
        let data = json!({
            "eth_btc": {"asks": [[0.0713, 1.5]], "bids": [[0.0711, 2.0], [0.0712, 0.1]]}
        });
        let book = parse_order_book(&data, 3).unwrap();
        assert_eq!(book.best_bid().map(|e| e.price.as_decimal()), Some(dec!(0.0712)));
    }

    #[test]
    fn test_balances() {
        let data = json!({"funds": {"eth": 325, "btc": 23.998, "ltc": 0}, "open_orders": 1});
        let balances = normalize_balances(parse_balances(&data).unwrap()).unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances.get("ETH").unwrap().total.as_decimal(), dec!(325));
    }

    #[test]
    fn test_immediate_fill_has_no_id() {
        assert_eq!(parse_placed_order_id(&json!({"order_id": 0, "received": 1})).unwrap(), "");
        assert_eq!(parse_placed_order_id(&json!({"order_id": 12345})).unwrap(), "12345");
    }

    #[test]
    fn test_ticker_keyed_by_pair() {
        let data = json!({
            "eth_btc": {
                "high": 0.075, "low": 0.069, "avg": 0.072, "vol": 108.3, "vol_cur": 1520.5,
                "last": 0.0713, "buy": 0.0712, "sell": 0.0716, "updated": 1500000000
            }
        });
        let pair = CurrencyPair::new("ETH", "BTC").unwrap();
        let ticker = parse_ticker(&data, "eth_btc", &pair, 0).unwrap();
        assert_eq!(ticker.bid.as_decimal(), dec!(0.0712));
        assert_eq!(ticker.ask.as_decimal(), dec!(0.0716));
        assert_eq!(ticker.volume.map(|v| v.as_decimal()), Some(dec!(1520.5)));
        assert_eq!(ticker.timestamp, 1_500_000_000_000);

        assert!(parse_ticker(&json!({}), "eth_btc", &pair, 0).is_err());
    }
}
