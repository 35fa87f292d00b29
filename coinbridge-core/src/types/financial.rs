//! Decimal newtypes for prices, amounts and costs.
//!
//! Exchanges disagree on precision, so every number in the canonical model is a
//! [`Decimal`]; subtraction such as `original - remaining` stays exact.
//!
//! ```rust
//! use coinbridge_core::types::{Amount, Cost, Price};
//! use rust_decimal_macros::dec;
//!
//! let cost: Cost = Price::new(dec!(0.05)) * Amount::new(dec!(2));
//! assert_eq!(cost.as_decimal(), dec!(0.10));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

macro_rules! decimal_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Decimal);

        impl $name {
            /// Zero value.
            pub const ZERO: Self = Self(Decimal::ZERO);

            /// Wraps a decimal.
            pub fn new(value: Decimal) -> Self {
                Self(value)
            }

            /// Returns the inner `Decimal` value.
            #[inline]
            pub fn as_decimal(&self) -> Decimal {
                self.0
            }

            /// Returns `true` if the value is zero.
            #[inline]
            pub fn is_zero(&self) -> bool {
                self.0.is_zero()
            }

            /// Returns `true` if the value is strictly negative.
            #[inline]
            pub fn is_negative(&self) -> bool {
                self.0.is_sign_negative() && !self.0.is_zero()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.normalize())
            }
        }

        impl From<Decimal> for $name {
            fn from(value: Decimal) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Decimal {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = rust_decimal::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<Decimal>().map(Self)
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|v| v.0).sum())
            }
        }
    };
}

decimal_newtype!(
    /// Price of one unit of the base currency, denominated in the quote currency.
    Price
);

decimal_newtype!(
    /// Quantity of the base currency.
    Amount
);

decimal_newtype!(
    /// Price multiplied by amount, denominated in the quote currency.
    Cost
);

impl Mul<Amount> for Price {
    type Output = Cost;

    fn mul(self, rhs: Amount) -> Cost {
        Cost(self.0 * rhs.0)
    }
}
