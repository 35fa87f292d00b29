//! Order Normalizer
//!
//! Turns exchange order and balance payloads into the canonical model.
//!
//! Every exchange reports order state in its own vocabulary. A dialect models its
//! raw status as a sum type implementing [`RawStatus`], which reduces it to a
//! [`Lifecycle`] stage; the normalizer then applies one policy for all exchanges:
//!
//! | Lifecycle | Remaining | Canonical status |
//! |-----------|-----------|------------------|
//! | `Open` | any | `Active` |
//! | `Closed` | zero | `Filled` |
//! | `Closed` | nonzero | `Aborted` |
//! | `Cancelled` | any | `Aborted` |
//! | `Unrecognized` | any | `Unknown` (logged) |
//!
//! Sides and order types go through a per-exchange [`FieldVocabulary`]; a value
//! missing from it is a hard [`Error::UnsupportedOrderField`](crate::error::Error).

mod balance;
mod order;

pub use balance::{RawBalance, normalize_balances};
pub use order::{FillReport, RawOrder, RawTimestamp, normalize, normalize_all};

use crate::symbol::SymbolCodec;
use crate::types::{OrderSide, OrderType};

/// Exchange-independent stage of an order's life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    /// Resting on the book, pending or partially filled
    Open,
    /// Closed by the exchange; filled or abandoned depending on what remains
    Closed,
    /// Cancelled, expired or rejected
    Cancelled,
    /// A raw value the dialect does not know; carries the raw text for reporting
    Unrecognized(String),
}

/// A dialect's raw order status.
pub trait RawStatus {
    /// Lifecycle stage of this status.
    fn lifecycle(&self) -> Lifecycle;
}

impl RawStatus for Lifecycle {
    fn lifecycle(&self) -> Lifecycle {
        self.clone()
    }
}

/// Static lookup tables for an exchange's side and order-type tokens.
///
/// Matching is case-insensitive. The same tables serve the reverse direction when
/// orders are placed.
#[derive(Debug, Clone, Copy)]
pub struct FieldVocabulary {
    sides: &'static [(&'static str, OrderSide)],
    order_types: &'static [(&'static str, OrderType)],
}

impl FieldVocabulary {
    /// Builds a vocabulary from token tables.
    pub const fn new(
        sides: &'static [(&'static str, OrderSide)],
        order_types: &'static [(&'static str, OrderType)],
    ) -> Self {
        Self { sides, order_types }
    }

    /// Canonical side of a raw token.
    pub fn side(&self, raw: &str) -> Option<OrderSide> {
        lookup(self.sides, raw)
    }

    /// Canonical order type of a raw token.
    pub fn order_type(&self, raw: &str) -> Option<OrderType> {
        lookup(self.order_types, raw)
    }

    /// Exchange token for a side (first match wins).
    pub fn side_token(&self, side: OrderSide) -> Option<&'static str> {
        reverse(self.sides, side)
    }

    /// Exchange token for an order type (first match wins).
    pub fn order_type_token(&self, order_type: OrderType) -> Option<&'static str> {
        reverse(self.order_types, order_type)
    }
}

fn lookup<T: Copy>(table: &[(&'static str, T)], raw: &str) -> Option<T> {
    let raw = raw.trim();
    table
        .iter()
        .find(|(token, _)| token.eq_ignore_ascii_case(raw))
        .map(|(_, value)| *value)
}

fn reverse<T: Copy + PartialEq>(table: &[(&'static str, T)], value: T) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, candidate)| *candidate == value)
        .map(|(token, _)| *token)
}

/// What the normalizer needs to know about the source exchange.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeContext<'a> {
    /// Exchange id, used in errors and log lines
    pub exchange: &'a str,
    /// Codec decoding the order's symbol
    pub codec: &'a SymbolCodec,
    /// Side and type vocabulary
    pub fields: &'a FieldVocabulary,
}

impl<'a> ExchangeContext<'a> {
    /// Bundles the exchange context.
    pub fn new(exchange: &'a str, codec: &'a SymbolCodec, fields: &'a FieldVocabulary) -> Self {
        Self {
            exchange,
            codec,
            fields,
        }
    }
}
