use rust_decimal::Decimal;

use crate::error::{ParseError, Result};
use crate::types::{Amount, BalanceEntry, Balances};

/// One currency's balance in the shape the exchange reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBalance {
    /// Available and locked amounts (total is their sum)
    FreeLocked {
        /// Currency code
        currency: String,
        /// Available amount
        free: Decimal,
        /// Amount tied up in orders
        locked: Decimal,
    },
    /// Total and available amounts (hold is the difference)
    TotalAvailable {
        /// Currency code
        currency: String,
        /// Total amount
        total: Decimal,
        /// Available amount
        available: Decimal,
    },
    /// Total only; nothing is reported as held
    TotalOnly {
        /// Currency code
        currency: String,
        /// Total amount
        total: Decimal,
    },
}

impl RawBalance {
    fn into_entry(self) -> Result<BalanceEntry> {
        let (currency, total, hold) = match self {
            Self::FreeLocked {
                currency,
                free,
                locked,
            } => {
                if free < Decimal::ZERO {
                    return Err(negative("free", &currency, free));
                }
                if locked < Decimal::ZERO {
                    return Err(negative("locked", &currency, locked));
                }
                (currency, free + locked, locked)
            }
            Self::TotalAvailable {
                currency,
                total,
                available,
            } => {
                if available < Decimal::ZERO || available > total {
                    return Err(ParseError::invalid_value(
                        "available",
                        format!("{currency}: available {available} outside 0..={total}"),
                    )
                    .into());
                }
                (currency, total, total - available)
            }
            Self::TotalOnly { currency, total } => (currency, total, Decimal::ZERO),
        };
        if total < Decimal::ZERO {
            return Err(negative("total", &currency, total));
        }
        Ok(BalanceEntry {
            currency: currency.trim().to_ascii_uppercase(),
            total: Amount::new(total),
            hold: Amount::new(hold),
        })
    }
}

fn negative(field: &'static str, currency: &str, value: Decimal) -> crate::error::Error {
    ParseError::invalid_value(field, format!("{currency}: negative amount {value}")).into()
}

/// Builds [`Balances`] from raw entries, dropping currencies with a zero total.
pub fn normalize_balances<I>(raws: I) -> Result<Balances>
where
    I: IntoIterator<Item = RawBalance>,
{
    let mut balances = Balances::new();
    for raw in raws {
        let entry = raw.into_entry()?;
        if !entry.total.is_zero() {
            balances.insert(entry);
        }
    }
    Ok(balances)
}
