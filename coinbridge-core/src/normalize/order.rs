use rust_decimal::Decimal;
use tracing::warn;

use super::{ExchangeContext, Lifecycle, RawStatus};
use crate::error::{Error, ParseError, Result};
use crate::time::{ms_to_seconds, parse_datetime_seconds, truncate_fractional_seconds};
use crate::types::{Amount, CanonicalOrder, OrderStatus, Price};

/// How an exchange reports progress on an order.
///
/// Exchanges report either what is left or what has executed. Only the reported
/// figure is used for the derivation, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillReport {
    /// Original amount and amount still open
    Remaining {
        /// Originally requested amount
        amount: Decimal,
        /// Amount still open
        remaining: Decimal,
    },
    /// Original amount and amount executed so far
    Executed {
        /// Originally requested amount
        amount: Decimal,
        /// Amount executed so far
        executed: Decimal,
    },
}

impl FillReport {
    /// `(amount, filled, remaining)`, validated to be non-negative.
    fn amounts(&self) -> Result<(Decimal, Decimal, Decimal)> {
        let (amount, filled, remaining) = match *self {
            Self::Remaining { amount, remaining } => (amount, amount - remaining, remaining),
            Self::Executed { amount, executed } => (amount, executed, amount - executed),
        };
        if amount < Decimal::ZERO {
            return Err(
                ParseError::invalid_value("amount", format!("negative amount {amount}")).into(),
            );
        }
        if filled < Decimal::ZERO || remaining < Decimal::ZERO {
            return Err(ParseError::invalid_value(
                "amount",
                format!("fill of {filled} with {remaining} remaining exceeds amount {amount}"),
            )
            .into());
        }
        Ok((amount, filled, remaining))
    }
}

/// Order creation time as the exchange encodes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTimestamp {
    /// Whole seconds since epoch
    Seconds(i64),
    /// Milliseconds since epoch
    Millis(i64),
    /// Decimal seconds as text, e.g. `"1500000000.123"`
    Fractional(String),
    /// Formatted UTC date-time with its `chrono` format string
    Formatted {
        /// Date-time text
        value: String,
        /// strftime format
        format: &'static str,
    },
}

impl RawTimestamp {
    /// Whole seconds since epoch, sub-second precision truncated.
    pub fn to_seconds(&self) -> Result<i64> {
        match self {
            Self::Seconds(secs) => Ok(*secs),
            Self::Millis(ms) => Ok(ms_to_seconds(*ms)),
            Self::Fractional(value) => truncate_fractional_seconds(value),
            Self::Formatted { value, format } => parse_datetime_seconds(value, format),
        }
    }
}

/// An order as parsed from an exchange payload, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOrder<S> {
    /// Exchange order id
    pub id: String,
    /// Exchange-native symbol
    pub symbol: String,
    /// Raw side token
    pub side: String,
    /// Raw order-type token, if the payload carries one
    pub order_type: Option<String>,
    /// Raw status
    pub status: S,
    /// Amount progress
    pub fill: FillReport,
    /// Requested limit price
    pub limit_price: Option<Decimal>,
    /// Average execution price
    pub average_price: Option<Decimal>,
    /// Creation time
    pub timestamp: RawTimestamp,
}

/// Normalizes one raw order.
///
/// # Errors
///
/// - the symbol does not decode with the exchange's codec
/// - the side or order type is not in the exchange's vocabulary
/// - the fill figures are inconsistent or the timestamp is malformed
pub fn normalize<S: RawStatus>(
    raw: &RawOrder<S>,
    ctx: &ExchangeContext<'_>,
) -> Result<CanonicalOrder> {
    let pair = ctx.codec.to_pair(&raw.symbol)?;
    let side = ctx.fields.side(&raw.side).ok_or_else(|| {
        Error::unsupported_order_field(ctx.exchange.to_owned(), "side", raw.side.clone())
    })?;
    let order_type = raw
        .order_type
        .as_deref()
        .map(|token| {
            ctx.fields.order_type(token).ok_or_else(|| {
                Error::unsupported_order_field(ctx.exchange.to_owned(), "type", token)
            })
        })
        .transpose()?;
    let (amount, filled, remaining) = raw.fill.amounts()?;
    let status = canonical_status(raw.status.lifecycle(), remaining, ctx.exchange, &raw.id);
    let rate = select_rate(status, raw.limit_price, raw.average_price);
    let created_at = raw
        .timestamp
        .to_seconds()
        .map_err(|e| e.context(format!("order {} on {}", raw.id, ctx.exchange)))?;

    Ok(CanonicalOrder::new(
        raw.id.clone(),
        pair,
        side,
        order_type,
        status,
        Amount::new(amount),
        Amount::new(filled),
        Amount::new(remaining),
        Price::new(rate),
        created_at,
    ))
}

/// Normalizes a batch, stopping at the first failure.
pub fn normalize_all<'r, S, I>(raws: I, ctx: &ExchangeContext<'_>) -> Result<Vec<CanonicalOrder>>
where
    S: RawStatus + 'r,
    I: IntoIterator<Item = &'r RawOrder<S>>,
{
    raws.into_iter().map(|raw| normalize(raw, ctx)).collect()
}

// A close with something left over is taken as partially filled then abandoned.
// Exchanges do not say so explicitly.
fn canonical_status(
    lifecycle: Lifecycle,
    remaining: Decimal,
    exchange: &str,
    id: &str,
) -> OrderStatus {
    match lifecycle {
        Lifecycle::Open => OrderStatus::Active,
        Lifecycle::Closed if remaining.is_zero() => OrderStatus::Filled,
        Lifecycle::Closed | Lifecycle::Cancelled => OrderStatus::Aborted,
        Lifecycle::Unrecognized(raw_status) => {
            warn!(exchange, order_id = id, raw_status = %raw_status, "Unrecognized order status");
            OrderStatus::Unknown
        }
    }
}

fn select_rate(status: OrderStatus, limit: Option<Decimal>, average: Option<Decimal>) -> Decimal {
    match average {
        Some(avg) if status != OrderStatus::Active && !avg.is_zero() => avg,
        _ => limit.unwrap_or(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::FieldVocabulary;
    use crate::symbol::{LetterCase, SymbolCodec};
    use crate::types::{CurrencyPair, OrderSide, OrderType};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    const FIELDS: FieldVocabulary = FieldVocabulary::new(
        &[("buy", OrderSide::Buy), ("sell", OrderSide::Sell)],
        &[("limit", OrderType::Limit), ("market", OrderType::Market)],
    );

    fn codec() -> SymbolCodec {
        SymbolCodec::delimited("-", LetterCase::Upper, true).unwrap()
    }

    fn raw(status: Lifecycle, fill: FillReport) -> RawOrder<Lifecycle> {
        RawOrder {
            id: "42".into(),
            symbol: "BTC-ETH".into(),
            side: "buy".into(),
            order_type: Some("limit".into()),
            status,
            fill,
            limit_price: Some(dec!(0.05)),
            average_price: Some(dec!(0.049)),
            timestamp: RawTimestamp::Fractional("1500000000.999".into()),
        }
    }

    fn remaining(amount: Decimal, remaining: Decimal) -> FillReport {
        FillReport::Remaining { amount, remaining }
    }

    #[test]
    fn test_closed_with_zero_remaining_is_filled() {
        let codec = codec();
        let ctx = ExchangeContext::new("bittrex", &codec, &FIELDS);
        let order = normalize(&raw(Lifecycle::Closed, remaining(dec!(2), dec!(0))), &ctx).unwrap();

        assert_eq!(order.status(), OrderStatus::Filled);
        assert_eq!(order.pair(), &CurrencyPair::new("ETH", "BTC").unwrap());
        assert_eq!(order.filled_amount(), Amount::new(dec!(2)));
        assert_eq!(order.rate(), Price::new(dec!(0.049)));
        assert_eq!(order.created_at(), 1_500_000_000);
        assert_eq!(order.order_type(), Some(OrderType::Limit));
    }

    #[test]
    fn test_closed_with_remaining_is_aborted() {
        let codec = codec();
        let ctx = ExchangeContext::new("bittrex", &codec, &FIELDS);
        let closed = raw(Lifecycle::Closed, remaining(dec!(2), dec!(0.5)));
        let order = normalize(&closed, &ctx).unwrap();
        assert_eq!(order.status(), OrderStatus::Aborted);
        assert_eq!(order.filled_amount(), Amount::new(dec!(1.5)));
        assert_eq!(order.remaining_amount(), Amount::new(dec!(0.5)));
    }

    #[test]
    fn test_open_order_uses_limit_price() {
        let codec = codec();
        let ctx = ExchangeContext::new("bittrex", &codec, &FIELDS);
        let fill = FillReport::Executed {
            amount: dec!(3),
            executed: dec!(1),
        };
        let order = normalize(&raw(Lifecycle::Open, fill), &ctx).unwrap();
        assert_eq!(order.status(), OrderStatus::Active);
        assert_eq!(order.rate(), Price::new(dec!(0.05)));
        assert_eq!(order.remaining_amount(), Amount::new(dec!(2)));
    }

    #[test]
    fn test_zero_average_falls_back_to_limit() {
        let codec = codec();
        let ctx = ExchangeContext::new("bitfinex", &codec, &FIELDS);
        let mut order = raw(Lifecycle::Cancelled, remaining(dec!(1), dec!(1)));
        order.average_price = Some(Decimal::ZERO);
        let order = normalize(&order, &ctx).unwrap();
        assert_eq!(order.status(), OrderStatus::Aborted);
        assert_eq!(order.rate(), Price::new(dec!(0.05)));
    }

    #[test]
    fn test_unrecognized_status_is_unknown() {
        let codec = codec();
        let ctx = ExchangeContext::new("kraken", &codec, &FIELDS);
        let order = normalize(
            &raw(Lifecycle::Unrecognized("frozen".into()), remaining(dec!(1), dec!(1))),
            &ctx,
        )
        .unwrap();
        assert_eq!(order.status(), OrderStatus::Unknown);
    }

    #[test]
    fn test_unknown_side_is_hard_error() {
        let codec = codec();
        let ctx = ExchangeContext::new("liqui", &codec, &FIELDS);
        let mut order = raw(Lifecycle::Open, remaining(dec!(1), dec!(1)));
        order.side = "short".into();
        let err = normalize(&order, &ctx).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedOrderField { field: "side", ref value, .. } if value == "short"
        ));

        let mut order = raw(Lifecycle::Open, remaining(dec!(1), dec!(1)));
        order.order_type = Some("iceberg".into());
        assert!(matches!(
            normalize(&order, &ctx).unwrap_err(),
            Error::UnsupportedOrderField { field: "type", .. }
        ));
    }

    #[test]
    fn test_bad_symbol_and_timestamp() {
        let codec = codec();
        let ctx = ExchangeContext::new("bittrex", &codec, &FIELDS);
        let mut order = raw(Lifecycle::Open, remaining(dec!(1), dec!(1)));
        order.symbol = "BTCETH".into();
        assert!(matches!(normalize(&order, &ctx).unwrap_err(), Error::Symbol(_)));

        let mut order = raw(Lifecycle::Open, remaining(dec!(1), dec!(1)));
        order.timestamp = RawTimestamp::Fractional("yesterday".into());
        let err = normalize(&order, &ctx).unwrap_err();
        assert!(matches!(err.root_cause(), Error::Parse(_)));
    }

    #[test]
    fn test_overfilled_order_rejected() {
        let codec = codec();
        let ctx = ExchangeContext::new("bittrex", &codec, &FIELDS);
        let fill = FillReport::Executed {
            amount: dec!(1),
            executed: dec!(1.5),
        };
        assert!(normalize(&raw(Lifecycle::Closed, fill), &ctx).is_err());
    }

    #[test]
    fn test_timestamp_encodings() {
        assert_eq!(RawTimestamp::Seconds(7).to_seconds().unwrap(), 7);
        assert_eq!(RawTimestamp::Millis(1_500_000_000_999).to_seconds().unwrap(), 1_500_000_000);
        let formatted = RawTimestamp::Formatted {
            value: "2017-07-14T02:40:00.123".into(),
            format: "%Y-%m-%dT%H:%M:%S%.f",
        };
        assert_eq!(formatted.to_seconds().unwrap(), 1_500_000_000);
    }

    #[test]
    fn test_normalize_all_stops_at_first_failure() {
        let codec = codec();
        let ctx = ExchangeContext::new("bittrex", &codec, &FIELDS);
        let good = raw(Lifecycle::Open, remaining(dec!(1), dec!(1)));
        let mut bad = good.clone();
        bad.side = "hold".into();

        assert_eq!(normalize_all([&good, &good], &ctx).unwrap().len(), 2);
        assert!(normalize_all([&good, &bad, &good], &ctx).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_amounts_add_up(
            (amount, part) in (0i64..1_000_000_000).prop_flat_map(|a| (Just(a), 0..=a)),
            executed in any::<bool>(),
        ) {
            let amount = Decimal::new(amount, 8);
            let part = Decimal::new(part, 8);
            let fill = if executed {
                FillReport::Executed { amount, executed: part }
            } else {
                FillReport::Remaining { amount, remaining: part }
            };
            let codec = codec();
            let ctx = ExchangeContext::new("bittrex", &codec, &FIELDS);
            let order = normalize(&raw(Lifecycle::Closed, fill), &ctx).unwrap();

            prop_assert_eq!(order.filled_amount() + order.remaining_amount(), order.amount());
            let expected = if order.remaining_amount().is_zero() {
                OrderStatus::Filled
            } else {
                OrderStatus::Aborted
            };
            prop_assert_eq!(order.status(), expected);
        }
    }
}
