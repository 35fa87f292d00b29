use super::{KrakenStatus, asset_code};
use crate::adapter::MarketListing;
use crate::parsing::{levels_from_arrays, object, text};
use coinbridge_core::error::{ParseError, Result};
use coinbridge_core::limits::{PairLimits, TableLimits};
use coinbridge_core::normalize::{FillReport, RawBalance, RawOrder, RawTimestamp};
use coinbridge_core::parser_utils::{
    decimal_from_value, parse_decimal, parse_decimal_required, parse_i64, parse_str,
    parse_str_required,
};
use coinbridge_core::types::{Amount, CurrencyPair, OrderBookSnapshot, Price, Ticker};
use rust_decimal::Decimal;
use serde_json::Value;

/// Amount decimal places when `AssetPairs` does not say.
const DEFAULT_LOT_DECIMALS: u32 = 8;

/// Minimum order sizes per base currency, for pairs without `ordermin`.
const MIN_ORDER_SIZES: &[(&str, Decimal)] = &[
    ("REP", Decimal::from_parts(3, 0, 0, false, 1)),
    ("XBT", Decimal::from_parts(2, 0, 0, false, 3)),
    ("BCH", Decimal::from_parts(2, 0, 0, false, 3)),
    ("DASH", Decimal::from_parts(3, 0, 0, false, 2)),
    ("DOGE", Decimal::from_parts(3000, 0, 0, false, 0)),
    ("EOS", Decimal::from_parts(3, 0, 0, false, 0)),
    ("ETH", Decimal::from_parts(2, 0, 0, false, 2)),
    ("ETC", Decimal::from_parts(3, 0, 0, false, 1)),
    ("GNO", Decimal::from_parts(3, 0, 0, false, 2)),
    ("LTC", Decimal::from_parts(1, 0, 0, false, 1)),
    ("MLN", Decimal::from_parts(1, 0, 0, false, 1)),
    ("XMR", Decimal::from_parts(1, 0, 0, false, 1)),
    ("XRP", Decimal::from_parts(30, 0, 0, false, 0)),
    ("XLM", Decimal::from_parts(300, 0, 0, false, 0)),
    ("ZEC", Decimal::from_parts(3, 0, 0, false, 2)),
    ("USDT", Decimal::from_parts(5, 0, 0, false, 0)),
];

/// Parses `AssetPairs` into the symbol table and trading limits.
///
/// Dark-pool pairs (`.d` suffix) are skipped.
pub fn parse_markets(data: &Value) -> Result<MarketListing> {
    let mut markets = Vec::new();
    let mut limits = TableLimits::new(PairLimits {
        amount_decimal_places: Some(DEFAULT_LOT_DECIMALS),
        ..PairLimits::default()
    });

    for (name, info) in object(data, "result")? {
        if name.ends_with(".d") {
            continue;
        }
        let symbol = parse_str(info, "altname").unwrap_or(name.as_str());
        let pair = market_pair(info)?;
        let min_amount = parse_decimal(info, "ordermin").unwrap_or_else(|| min_order_size(&pair));
        let pair_limits = PairLimits {
            price_decimal_places: parse_i64(info, "pair_decimals")
                .and_then(|d| u32::try_from(d).ok()),
            amount_decimal_places: parse_i64(info, "lot_decimals")
                .and_then(|d| u32::try_from(d).ok())
                .or(Some(DEFAULT_LOT_DECIMALS)),
            min_amount,
            min_total: Decimal::ZERO,
        };
        limits.insert(pair.clone(), pair_limits);
        markets.push((symbol.to_string(), pair));
    }
    Ok(MarketListing { markets, limits })
}

fn market_pair(info: &Value) -> Result<CurrencyPair> {
    if let Some((base, quote)) = parse_str(info, "wsname").and_then(|ws| ws.split_once('/')) {
        return Ok(CurrencyPair::new(base, quote)?);
    }
    let base = parse_str_required(info, "base")?;
    let quote = parse_str_required(info, "quote")?;
    Ok(CurrencyPair::new(asset_code(base), asset_code(quote))?)
}

fn min_order_size(pair: &CurrencyPair) -> Decimal {
    MIN_ORDER_SIZES
        .iter()
        .find(|(code, _)| *code == pair.base())
        .map_or(Decimal::ZERO, |(_, size)| *size)
}

/// Parses `Depth`: the result holds one entry keyed by Kraken's pair name.
pub fn parse_order_book(data: &Value, now_ms: i64) -> Result<OrderBookSnapshot> {
    let (_, book) = object(data, "result")?
        .iter()
        .next()
        .ok_or(ParseError::missing_field("result"))?;
    let bids = levels_from_arrays(&book["bids"], "bids")?;
    let asks = levels_from_arrays(&book["asks"], "asks")?;
    Ok(OrderBookSnapshot::new(bids, asks, now_ms))
}

fn parse_order_entry(txid: &str, data: &Value) -> Result<RawOrder<KrakenStatus>> {
    let descr = &data["descr"];
    let amount = parse_decimal_required(data, "vol")?;
    let executed = parse_decimal_required(data, "vol_exec")?;
    Ok(RawOrder {
        id: txid.to_string(),
        symbol: parse_str_required(descr, "pair")?.to_string(),
        side: parse_str_required(descr, "type")?.to_string(),
        order_type: parse_str(descr, "ordertype").map(str::to_string),
        status: KrakenStatus::from_raw(parse_str_required(data, "status")?),
        fill: FillReport::Executed { amount, executed },
        limit_price: descr
            .get("price")
            .and_then(decimal_from_value)
            .filter(|p| *p > Decimal::ZERO),
        average_price: parse_decimal(data, "price"),
        timestamp: RawTimestamp::Fractional(text(data, "opentm")?),
    })
}

/// Parses `OpenOrders`: `{"open": {txid: order}}`.
pub fn parse_open_orders(data: &Value) -> Result<Vec<RawOrder<KrakenStatus>>> {
    object(&data["open"], "open")?
        .iter()
        .map(|(txid, order)| parse_order_entry(txid, order))
        .collect()
}

/// Parses `QueryOrders`: `{txid: order}`.
pub fn parse_order(data: &Value, txid: &str) -> Result<RawOrder<KrakenStatus>> {
    let orders = object(data, "result")?;
    let order = orders.get(txid).ok_or_else(|| {
        ParseError::invalid_value("txid", format!("order {txid} not in response"))
    })?;
    parse_order_entry(txid, order)
}

/// Parses `Balance`: `{asset: "amount"}`.
pub fn parse_balances(data: &Value) -> Result<Vec<RawBalance>> {
    object(data, "result")?
        .iter()
        .map(|(asset, amount)| {
            let total = decimal_from_value(amount)
                .ok_or_else(|| ParseError::invalid_value("balance", format!("{asset}: {amount}")))?;
            Ok(RawBalance::TotalOnly {
                currency: asset_code(asset).to_string(),
                total,
            })
        })
        .collect()
}

/// Reads the first transaction id of an `AddOrder` result.
pub fn parse_placed_order_id(data: &Value) -> Result<String> {
    data["txid"]
        .get(0)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ParseError::missing_field("txid").into())
}

/// Parses `Ticker`: one entry keyed by Kraken's pair name. Each figure is an
/// array; prices lead with the price and ranges end with the rolling 24h value.
pub fn parse_ticker(
    data: &Value,
    _symbol: &str,
    pair: &CurrencyPair,
    now_ms: i64,
) -> Result<Ticker> {
    let (_, entry) = object(data, "result")?
        .iter()
        .next()
        .ok_or(ParseError::missing_field("result"))?;
    let price = |key: &'static str| -> Result<Price> {
        entry[key]
            .get(0)
            .and_then(decimal_from_value)
            .map(Price::new)
            .ok_or_else(|| ParseError::missing_field(key).into())
    };
    let rolling = |key: &str| entry[key].get(1).and_then(decimal_from_value);
    Ok(Ticker::new(pair.clone(), now_ms, price("c")?, price("b")?, price("a")?)
        .with_range(rolling("h").map(Price::new), rolling("l").map(Price::new))
        .with_volume(rolling("v").map(Amount::new)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Dialect;
    use crate::kraken::Kraken;
    use coinbridge_core::limits::ExchangeLimits;
    use coinbridge_core::normalize::{ExchangeContext, normalize, normalize_balances};
    use coinbridge_core::symbol::{MarketTable, SymbolCodec};
    use coinbridge_core::types::{OrderStatus, OrderType};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn asset_pairs() -> Value {
        json!({
            "XETHXXBT": {
                "altname": "ETHXBT", "wsname": "ETH/XBT", "base": "XETH", "quote": "XXBT",
                "pair_decimals": 5, "lot_decimals": 8
            },
            "XETHXXBT.d": {
                "altname": "ETHXBT.d", "base": "XETH", "quote": "XXBT", "pair_decimals": 5
            },
            "XLTCZEUR": {
                "altname": "LTCEUR", "base": "XLTC", "quote": "ZEUR",
                "pair_decimals": 2, "lot_decimals": 8, "ordermin": "0.05"
            }
        })
    }

    fn codec() -> SymbolCodec {
        let listing = parse_markets(&asset_pairs()).unwrap();
        SymbolCodec::Table(MarketTable::from_markets(listing.markets).unwrap())
    }

    fn order(status: &str, vol_exec: &str) -> Value {
        json!({
            "status": status,
            "opentm": 1499827319.5596,
            "descr": {"pair": "ETHXBT", "type": "sell", "ordertype": "limit", "price": "0.07120"},
            "vol": "2.00000000",
            "vol_exec": vol_exec,
            "price": "0.07115"
        })
    }

    #[test]
    fn test_markets_skip_dark_pools() {
        let listing = parse_markets(&asset_pairs()).unwrap();
        assert_eq!(listing.markets.len(), 2);

        let codec = codec();
        let eth = CurrencyPair::new("ETH", "XBT").unwrap();
        assert_eq!(codec.to_symbol(&eth).unwrap(), "ETHXBT");
        assert_eq!(codec.to_pair("LTCEUR").unwrap(), CurrencyPair::new("LTC", "EUR").unwrap());
    }

    #[test]
    fn test_market_limits() {
        let listing = parse_markets(&asset_pairs()).unwrap();
        let eth = CurrencyPair::new("ETH", "XBT").unwrap();
        let ltc = CurrencyPair::new("LTC", "EUR").unwrap();
        assert_eq!(listing.limits.price_decimal_places(&eth), Some(5));
        assert_eq!(listing.limits.amount_decimal_places(&eth), Some(8));
        assert_eq!(listing.limits.min_amount(&eth), dec!(0.02));
        assert_eq!(listing.limits.min_amount(&ltc), dec!(0.05));
        assert_eq!(listing.limits.price_decimal_places(&ltc), Some(2));
    }

    #[test]
    fn test_open_orders() {
        let data = json!({"open": {"OQCLML-BW3P3-BUCMWZ": order("open", "0.50000000")}});
        let raws = parse_open_orders(&data).unwrap();
        let codec = codec();
        let ctx = ExchangeContext::new(Kraken::NAME, &codec, &Kraken::FIELDS);
        let order = normalize(&raws[0], &ctx).unwrap();

        assert_eq!(order.id(), "OQCLML-BW3P3-BUCMWZ");
        assert_eq!(order.status(), OrderStatus::Active);
        assert_eq!(order.order_type(), Some(OrderType::Limit));
        assert_eq!(order.remaining_amount().as_decimal(), dec!(1.5));
        assert_eq!(order.rate().as_decimal(), dec!(0.0712));
        assert_eq!(order.created_at(), 1499827319);
    }

    #[test]
    fn test_query_order_picks_requested_txid() {
        let data = json!({
            "OB5VMB-B4U2U-DK2WRW": order("closed", "2.00000000"),
            "OQCLML-BW3P3-BUCMWZ": order("canceled", "0.00000000")
        });
        let raw = parse_order(&data, "OB5VMB-B4U2U-DK2WRW").unwrap();
        let codec = codec();
        let ctx = ExchangeContext::new(Kraken::NAME, &codec, &Kraken::FIELDS);
        let filled = normalize(&raw, &ctx).unwrap();
        assert_eq!(filled.status(), OrderStatus::Filled);
        assert_eq!(filled.rate().as_decimal(), dec!(0.07115));

        assert!(parse_order(&data, "MISSING").is_err());
    }

    #[test]
    fn test_order_book_takes_the_single_entry() {
        let data = json!({
            "XETHXXBT": {
                "asks": [["0.07130", "10.000", 1499827319]],
                "bids": [["0.07110", "4.000", 1499827319], ["0.07120", "1.000", 1499827319]]
            }
        });
        let book = parse_order_book(&data, 1).unwrap();
        assert_eq!(book.best_bid().map(|e| e.price.as_decimal()), Some(dec!(0.0712)));
        assert!(parse_order_book(&json!({}), 1).is_err());
    }

    #[test]
    fn test_balances_strip_asset_class() {
        let data = json!({"XXBT": "1.2500000000", "ZEUR": "310.4200", "XETH": "0.0000000000"});
        let balances = normalize_balances(parse_balances(&data).unwrap()).unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances.get("XBT").unwrap().total.as_decimal(), dec!(1.25));
        assert!(balances.get("EUR").unwrap().hold.is_zero());
    }

    #[test]
    fn test_placed_order_id() {
        let data = json!({
            "descr": {"order": "buy 1.25 ETHXBT @ limit 0.07123"},
            "txid": ["OUF4EM-FRGI2-MQMWZD"]
        });
        assert_eq!(parse_placed_order_id(&data).unwrap(), "OUF4EM-FRGI2-MQMWZD");
        assert!(parse_placed_order_id(&json!({"txid": []})).is_err());
    }

    #[test]
    fn test_ticker_arrays() {
        let data = json!({
            "XETHXXBT": {
                "a": ["0.07160", "1", "1.000"],
                "b": ["0.07120", "3", "3.000"],
                "c": ["0.07130", "0.50000000"],
                "v": ["100.1", "1520.5"],
                "p": ["0.0711", "0.0712"],
                "t": [120, 1450],
                "l": ["0.07000", "0.06900"],
                "h": ["0.07400", "0.07500"],
                "o": "0.07000"
            }
        });
        let pair = CurrencyPair::new("ETH", "XBT").unwrap();
        let ticker = parse_ticker(&data, "ETHXBT", &pair, 42).unwrap();
        assert_eq!(ticker.last.as_decimal(), dec!(0.0713));
        assert_eq!(ticker.bid.as_decimal(), dec!(0.0712));
        assert_eq!(ticker.ask.as_decimal(), dec!(0.0716));
        assert_eq!(ticker.high.map(|p| p.as_decimal()), Some(dec!(0.075)));
        assert_eq!(ticker.low.map(|p| p.as_decimal()), Some(dec!(0.069)));
        assert_eq!(ticker.volume.map(|v| v.as_decimal()), Some(dec!(1520.5)));
        assert_eq!(ticker.timestamp, 42);

        let err = parse_ticker(&json!({"XETHXXBT": {"a": [], "b": ["1"]}}), "ETHXBT", &pair, 0)
            .unwrap_err();
        assert!(err.to_string().contains("c"), "{err}");
    }
}
