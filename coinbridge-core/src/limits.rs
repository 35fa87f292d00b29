//! Exchange-imposed limits on order prices and amounts.
//!
//! Exchanges restrict how many decimal places a price or amount may carry and how
//! small an order may be. [`validate_order`] checks a prospective order against
//! an [`ExchangeLimits`] source before it is placed, so the rejection happens
//! locally instead of costing a request.
//!
//! ```rust
//! use coinbridge_core::limits::{DefaultLimits, validate_order};
//! use coinbridge_core::types::{Amount, CurrencyPair, Price};
//! use rust_decimal_macros::dec;
//!
//! let pair = CurrencyPair::new("ETH", "BTC").unwrap();
//! let price = Some(Price::new(dec!(0.07)));
//! let ok = validate_order(&DefaultLimits, &pair, Amount::new(dec!(1.5)), price);
//! assert!(ok.is_ok());
//!
//! let too_precise = validate_order(&DefaultLimits, &pair, Amount::new(dec!(0.000000001)), None);
//! assert!(too_precise.is_err());
//! ```

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::types::{Amount, CurrencyPair, Price};

/// Source of per-pair order limits.
pub trait ExchangeLimits: Send + Sync + Debug {
    /// Maximum decimal places in the price, `None` when unrestricted.
    fn price_decimal_places(&self, pair: &CurrencyPair) -> Option<u32>;

    /// Maximum decimal places in the amount, `None` when unrestricted.
    fn amount_decimal_places(&self, pair: &CurrencyPair) -> Option<u32>;

    /// Smallest tradable amount.
    fn min_amount(&self, pair: &CurrencyPair) -> Decimal;

    /// Smallest `amount * price`, in the quote currency.
    fn min_total(&self, pair: &CurrencyPair) -> Decimal;
}

/// Limits for exchanges that do not publish any.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLimits;

impl ExchangeLimits for DefaultLimits {
    fn price_decimal_places(&self, _pair: &CurrencyPair) -> Option<u32> {
        Some(8)
    }

    fn amount_decimal_places(&self, _pair: &CurrencyPair) -> Option<u32> {
        Some(8)
    }

    fn min_amount(&self, _pair: &CurrencyPair) -> Decimal {
        Decimal::new(1, 8)
    }

    fn min_total(&self, _pair: &CurrencyPair) -> Decimal {
        Decimal::ZERO
    }
}

/// Limits of one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairLimits {
    /// Maximum price decimal places
    pub price_decimal_places: Option<u32>,
    /// Maximum amount decimal places
    pub amount_decimal_places: Option<u32>,
    /// Minimum amount
    pub min_amount: Decimal,
    /// Minimum total
    pub min_total: Decimal,
}

/// Limits looked up per pair, with a fallback for unlisted pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableLimits {
    pairs: HashMap<CurrencyPair, PairLimits>,
    fallback: PairLimits,
}

impl TableLimits {
    /// Creates an empty table answering every pair with `fallback`.
    pub fn new(fallback: PairLimits) -> Self {
        Self {
            pairs: HashMap::new(),
            fallback,
        }
    }

    /// Sets the limits of one pair.
    pub fn insert(&mut self, pair: CurrencyPair, limits: PairLimits) {
        self.pairs.insert(pair, limits);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_pair(mut self, pair: CurrencyPair, limits: PairLimits) -> Self {
        self.insert(pair, limits);
        self
    }

    /// Limits in effect for `pair`.
    pub fn for_pair(&self, pair: &CurrencyPair) -> &PairLimits {
        self.pairs.get(pair).unwrap_or(&self.fallback)
    }

    /// Number of pairs with explicit limits.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if no pair has explicit limits.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl ExchangeLimits for TableLimits {
    fn price_decimal_places(&self, pair: &CurrencyPair) -> Option<u32> {
        self.for_pair(pair).price_decimal_places
    }

    fn amount_decimal_places(&self, pair: &CurrencyPair) -> Option<u32> {
        self.for_pair(pair).amount_decimal_places
    }

    fn min_amount(&self, pair: &CurrencyPair) -> Decimal {
        self.for_pair(pair).min_amount
    }

    fn min_total(&self, pair: &CurrencyPair) -> Decimal {
        self.for_pair(pair).min_total
    }
}

/// Number of significant decimal places, ignoring trailing zeros.
pub fn decimal_places(value: Decimal) -> u32 {
    value.normalize().scale()
}

/// Decimal places implied by a step size such as `"0.00100000"` (3).
///
/// Returns `None` for a zero or malformed step.
pub fn places_from_step(step: &str) -> Option<u32> {
    let step: Decimal = step.trim().parse().ok()?;
    (!step.is_zero()).then(|| decimal_places(step))
}

/// Checks an order against the exchange's limits.
///
/// `price` is `None` for market orders; the total check is skipped then.
pub fn validate_order(
    limits: &dyn ExchangeLimits,
    pair: &CurrencyPair,
    amount: Amount,
    price: Option<Price>,
) -> Result<()> {
    let amount = amount.as_decimal();
    if amount <= Decimal::ZERO {
        return Err(Error::invalid_request(format!("{pair}: amount must be positive")));
    }
    if let Some(max) = limits.amount_decimal_places(pair) {
        if decimal_places(amount) > max {
            return Err(Error::invalid_request(format!(
                "{pair}: amount {amount} has more than {max} decimal places"
            )));
        }
    }
    let min_amount = limits.min_amount(pair);
    if amount < min_amount {
        return Err(Error::invalid_request(format!(
            "{pair}: amount {amount} below minimum {min_amount}"
        )));
    }

    let Some(price) = price.map(|p| p.as_decimal()) else {
        return Ok(());
    };
    if price <= Decimal::ZERO {
        return Err(Error::invalid_request(format!("{pair}: price must be positive")));
    }
    if let Some(max) = limits.price_decimal_places(pair) {
        if decimal_places(price) > max {
            return Err(Error::invalid_request(format!(
                "{pair}: price {price} has more than {max} decimal places"
            )));
        }
    }
    let total = amount * price;
    let min_total = limits.min_total(pair);
    if total < min_total {
        return Err(Error::invalid_request(format!(
            "{pair}: total {total} below minimum {min_total}"
        )));
    }
    Ok(())
}
