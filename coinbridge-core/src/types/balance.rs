//! Account balance types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Amount;

/// Balance of one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// Currency code (uppercase)
    pub currency: String,
    /// Total amount held
    pub total: Amount,
    /// Amount locked in open orders or otherwise unavailable
    pub hold: Amount,
}

impl BalanceEntry {
    /// Amount available for new orders.
    pub fn free(&self) -> Amount {
        self.total - self.hold
    }
}

/// Balances of an account, keyed by currency code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    entries: BTreeMap<String, BalanceEntry>,
}

impl Balances {
    /// Creates an empty balance set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any previous entry for the same currency.
    pub fn insert(&mut self, entry: BalanceEntry) {
        self.entries.insert(entry.currency.clone(), entry);
    }

    /// Looks up a currency (case-insensitive).
    pub fn get(&self, currency: &str) -> Option<&BalanceEntry> {
        self.entries.get(&currency.to_ascii_uppercase())
    }

    /// Iterates entries in currency order.
    pub fn iter(&self) -> impl Iterator<Item = &BalanceEntry> {
        self.entries.values()
    }

    /// Number of currencies held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no currency is held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<BalanceEntry> for Balances {
    fn from_iter<I: IntoIterator<Item = BalanceEntry>>(iter: I) -> Self {
        let mut balances = Self::new();
        for entry in iter {
            balances.insert(entry);
        }
        balances
    }
}
