//! Common parser utilities for exchange payloads.
//!
//! Exchanges encode the same number as a JSON string on one endpoint and a JSON
//! number on the next. These helpers accept either.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::error::{ParseError, Result};

/// Parses a `Decimal` from a JSON string or number.
///
/// Empty strings are treated as `None`. Numbers go through their textual form so
/// `0.1` stays exactly `0.1`.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_decimal_text(s),
        Value::Number(n) => parse_decimal_text(&n.to_string()),
        _ => None,
    }
}

fn parse_decimal_text(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Parses a `Decimal` field (string or number format).
pub fn parse_decimal(data: &Value, key: &str) -> Option<Decimal> {
    data.get(key).and_then(decimal_from_value)
}

/// Parses a mandatory `Decimal` field.
pub fn parse_decimal_required(data: &Value, key: &'static str) -> Result<Decimal> {
    let value = data.get(key).ok_or(ParseError::missing_field(key))?;
    decimal_from_value(value)
        .ok_or_else(|| ParseError::invalid_value(key, format!("not a decimal: {value}")).into())
}

/// Borrows a string field.
pub fn parse_str<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

/// Borrows a mandatory string field.
pub fn parse_str_required<'a>(data: &'a Value, key: &'static str) -> Result<&'a str> {
    parse_str(data, key).ok_or_else(|| ParseError::missing_field(key).into())
}

/// Reads an identifier that may be a string or an integer, as text.
pub fn parse_id(data: &Value, key: &'static str) -> Result<String> {
    match data.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ParseError::missing_field(key).into()),
    }
}

/// Parses an integer field (string or number format).
pub fn parse_i64(data: &Value, key: &str) -> Option<i64> {
    data.get(key).and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
    })
}

/// Parses a boolean field (bool, `"true"`/`"false"` or `0`/`1`).
pub fn parse_bool(data: &Value, key: &str) -> Option<bool> {
    match data.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

/// Parses a `[price, amount, ...]` array level; extra elements are ignored.
pub fn parse_level(value: &Value) -> Result<(Decimal, Decimal)> {
    let level = value
        .as_array()
        .filter(|level| level.len() >= 2)
        .ok_or_else(|| {
            ParseError::invalid_value("level", format!("not a [price, amount] pair: {value}"))
        })?;
    let price = decimal_from_value(&level[0])
        .ok_or_else(|| ParseError::invalid_value("price", level[0].to_string()))?;
    let amount = decimal_from_value(&level[1])
        .ok_or_else(|| ParseError::invalid_value("amount", level[1].to_string()))?;
    Ok((price, amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_decimal_from_string() {
        let data = json!({"price": "123.45"});
        assert_eq!(parse_decimal(&data, "price"), Some(dec!(123.45)));
    }

    #[test]
    fn test_parse_decimal_from_number_is_exact() {
        let data = json!({"price": 0.1, "tiny": 1e-8});
        assert_eq!(parse_decimal(&data, "price"), Some(dec!(0.1)));
        assert_eq!(parse_decimal(&data, "tiny"), Some(dec!(0.00000001)));
    }

    #[test]
    fn test_parse_decimal_empty_or_missing() {
        let data = json!({"price": "", "other": "123"});
        assert_eq!(parse_decimal(&data, "price"), None);
        assert_eq!(parse_decimal(&data, "missing"), None);
    }

    #[test]
    fn test_parse_decimal_required() {
        let data = json!({"amount": "2.5", "bad": "x"});
        assert_eq!(parse_decimal_required(&data, "amount").unwrap(), dec!(2.5));
        assert!(matches!(parse_decimal_required(&data, "bad"), Err(Error::Parse(_))));
        assert!(parse_decimal_required(&data, "none").is_err());
    }

    #[test]
    fn test_strings_ids_and_integers() {
        let data = json!({"id": 448192, "uuid": "abc", "time": "1704110400000", "n": 7});
        assert_eq!(parse_id(&data, "id").unwrap(), "448192");
        assert_eq!(parse_id(&data, "uuid").unwrap(), "abc");
        assert_eq!(parse_str(&data, "uuid"), Some("abc"));
        assert!(parse_str_required(&data, "id").is_err());
        assert_eq!(parse_i64(&data, "time"), Some(1_704_110_400_000));
        assert_eq!(parse_i64(&data, "n"), Some(7));
    }

    #[test]
    fn test_parse_bool() {
        let data = json!({"a": true, "b": "false", "c": 1, "d": "x"});
        assert_eq!(parse_bool(&data, "a"), Some(true));
        assert_eq!(parse_bool(&data, "b"), Some(false));
        assert_eq!(parse_bool(&data, "c"), Some(true));
        assert_eq!(parse_bool(&data, "d"), None);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(
            parse_level(&json!(["0.0712", "1.5", 1500000000])).unwrap(),
            (dec!(0.0712), dec!(1.5))
        );
        assert!(parse_level(&json!(["0.0712"])).is_err());
        assert!(parse_level(&json!({"price": 1})).is_err());
    }
}
