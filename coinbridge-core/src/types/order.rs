//! Canonical order model.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Amount, CurrencyPair, Price};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy order
    Buy,
    /// Sell order
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Limit order
    Limit,
    /// Market order
    Market,
    /// Stop order
    Stop,
    /// Limit order on the margin account
    MarginLimit,
    /// Market order on the margin account
    MarginMarket,
    /// Stop order on the margin account
    MarginStop,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Limit => "limit",
            Self::Market => "market",
            Self::Stop => "stop",
            Self::MarginLimit => "margin_limit",
            Self::MarginMarket => "margin_market",
            Self::MarginStop => "margin_stop",
        };
        f.write_str(s)
    }
}

/// Canonical order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Open on the book
    Active,
    /// Completely filled
    Filled,
    /// Closed before completion (cancelled, expired, partially filled then abandoned)
    Aborted,
    /// The exchange reported a status with no known mapping
    Unknown,
}

impl OrderStatus {
    /// Returns `true` for statuses that will not change anymore.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Filled | Self::Aborted)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Filled => "filled",
            Self::Aborted => "aborted",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// An exchange order in normalized form.
///
/// Built fresh by the normalizer for every payload and never mutated afterwards;
/// callers needing fresh state re-fetch and re-normalize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOrder {
    id: String,
    pair: CurrencyPair,
    side: OrderSide,
    order_type: Option<OrderType>,
    status: OrderStatus,
    amount: Amount,
    filled_amount: Amount,
    remaining_amount: Amount,
    rate: Price,
    created_at: i64,
}

impl CanonicalOrder {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: String,
        pair: CurrencyPair,
        side: OrderSide,
        order_type: Option<OrderType>,
        status: OrderStatus,
        amount: Amount,
        filled_amount: Amount,
        remaining_amount: Amount,
        rate: Price,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            pair,
            side,
            order_type,
            status,
            amount,
            filled_amount,
            remaining_amount,
            rate,
            created_at,
        }
    }

    /// Exchange order id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Currency pair the order trades.
    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    /// Buy or sell.
    pub fn side(&self) -> OrderSide {
        self.side
    }

    /// Order type, when the exchange reports one.
    pub fn order_type(&self) -> Option<OrderType> {
        self.order_type
    }

    /// Canonical status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Originally requested amount.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Amount executed so far.
    pub fn filled_amount(&self) -> Amount {
        self.filled_amount
    }

    /// Amount still open.
    pub fn remaining_amount(&self) -> Amount {
        self.remaining_amount
    }

    /// Average fill price for settled orders, else the requested limit price.
    pub fn rate(&self) -> Price {
        self.rate
    }

    /// Creation time in seconds since epoch.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }
}
