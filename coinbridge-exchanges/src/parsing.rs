//! Payload helpers shared by the dialect parsers.

use coinbridge_core::error::{ParseError, Result};
use coinbridge_core::parser_utils::{parse_decimal, parse_decimal_required, parse_level};
use coinbridge_core::types::{
    Amount, CurrencyPair, OrderBookEntry, OrderBookSide, Price, Ticker, Timestamp,
};
use serde_json::{Map, Value};

/// Parses a side of `[price, amount, ...]` levels.
pub(crate) fn levels_from_arrays(side: &Value, field: &'static str) -> Result<OrderBookSide> {
    array(side, field)?
        .iter()
        .map(|level| {
            let (price, amount) = parse_level(level)?;
            Ok(OrderBookEntry::new(Price::new(price), Amount::new(amount)))
        })
        .collect()
}

/// Parses a side of `{"price": .., "amount": ..}` levels.
pub(crate) fn levels_from_objects(
    side: &Value,
    field: &'static str,
    price_key: &'static str,
    amount_key: &'static str,
) -> Result<OrderBookSide> {
    array(side, field)?
        .iter()
        .map(|level| {
            let price = parse_decimal_required(level, price_key)?;
            let amount = parse_decimal_required(level, amount_key)?;
            Ok(OrderBookEntry::new(Price::new(price), Amount::new(amount)))
        })
        .collect()
}

/// Keys of a flat ticker object.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TickerKeys {
    pub last: &'static str,
    pub bid: &'static str,
    pub ask: &'static str,
    pub high: &'static str,
    pub low: &'static str,
    pub volume: &'static str,
}

/// Reads a ticker from one flat object. Last, bid and ask are required.
pub(crate) fn ticker_from_object(
    data: &Value,
    keys: &TickerKeys,
    pair: &CurrencyPair,
    timestamp: Timestamp,
) -> Result<Ticker> {
    let price = |key: &str| parse_decimal(data, key).map(Price::new);
    Ok(Ticker::new(
        pair.clone(),
        timestamp,
        Price::new(parse_decimal_required(data, keys.last)?),
        Price::new(parse_decimal_required(data, keys.bid)?),
        Price::new(parse_decimal_required(data, keys.ask)?),
    )
    .with_range(price(keys.high), price(keys.low))
    .with_volume(parse_decimal(data, keys.volume).map(Amount::new)))
}

pub(crate) fn array<'a>(value: &'a Value, field: &'static str) -> Result<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| {
        ParseError::invalid_value(field, format!("expected an array, got {}", kind(value))).into()
    })
}

pub(crate) fn object<'a>(value: &'a Value, field: &'static str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        ParseError::invalid_value(field, format!("expected an object, got {}", kind(value))).into()
    })
}

/// Reads a field holding either a string or a number as text.
pub(crate) fn text(value: &Value, key: &'static str) -> Result<String> {
    match value.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ParseError::missing_field(key).into()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_levels_from_arrays() {
        let side = levels_from_arrays(&json!([["0.0712", "1.5"], [0.0711, 2]]), "bids").unwrap();
        assert_eq!(side.len(), 2);
        assert_eq!(side[1].price.as_decimal(), dec!(0.0711));
        assert_eq!(side[1].amount.as_decimal(), dec!(2));
    }

    #[test]
    fn test_levels_from_objects() {
        let side = levels_from_objects(
            &json!([{"Rate": 0.0712, "Quantity": 3.25}]),
            "sell",
            "Rate",
            "Quantity",
        )
        .unwrap();
        assert_eq!(side[0].amount.as_decimal(), dec!(3.25));
    }

    #[test]
    fn test_shape_errors_name_the_field() {
        let err = levels_from_arrays(&json!({"price": 1}), "asks").unwrap_err();
        assert!(err.to_string().contains("asks"));
        assert!(object(&json!([]), "result").is_err());
    }

    #[test]
    fn test_ticker_from_object() {
        const KEYS: TickerKeys = TickerKeys {
            last: "last",
            bid: "bid",
            ask: "ask",
            high: "high",
            low: "low",
            volume: "volume",
        };
        let pair = CurrencyPair::new("ETH", "BTC").unwrap();
        let ticker = ticker_from_object(
            &json!({"last": "0.0713", "bid": 0.0712, "ask": "0.0716", "high": "0.075"}),
            &KEYS,
            &pair,
            7,
        )
        .unwrap();
        assert_eq!(ticker.bid.as_decimal(), dec!(0.0712));
        assert_eq!(ticker.high.map(|p| p.as_decimal()), Some(dec!(0.075)));
        assert_eq!(ticker.low, None);
        assert_eq!(ticker.timestamp, 7);

        let err = ticker_from_object(&json!({"last": "1", "bid": "1"}), &KEYS, &pair, 7)
            .unwrap_err();
        assert!(err.to_string().contains("ask"), "{err}");
    }

    #[test]
    fn test_text_accepts_numbers() {
        let data = json!({"opentm": 1500000000.1234, "id": "O5ABC"});
        assert_eq!(text(&data, "opentm").unwrap(), "1500000000.1234");
        assert_eq!(text(&data, "id").unwrap(), "O5ABC");
        assert!(text(&data, "missing").is_err());
    }
}
