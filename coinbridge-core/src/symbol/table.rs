//! Lookup table for exchanges whose symbols are opaque asset-pair ids.

use std::collections::HashMap;
use tracing::info;

use super::SymbolError;
use crate::error::{Error, Result};
use crate::types::CurrencyPair;

/// Bidirectional map between exchange symbols and currency pairs.
///
/// Populated from the exchange's market-list response. Lookups for anything not
/// present at build time fail with [`SymbolError::UnknownMarket`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketTable {
    by_symbol: HashMap<String, CurrencyPair>,
    by_pair: HashMap<CurrencyPair, String>,
}

impl MarketTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(symbol, pair)` entries.
    ///
    /// A symbol or pair appearing twice is rejected, since the mapping would no
    /// longer be invertible.
    pub fn from_markets<I, S>(markets: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, CurrencyPair)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (symbol, pair) in markets {
            let symbol = symbol.into();
            if table.by_symbol.contains_key(&symbol) {
                return Err(Error::invalid_request(format!(
                    "duplicate market symbol {symbol}"
                )));
            }
            if let Some(existing) = table.by_pair.get(&pair) {
                return Err(Error::invalid_request(format!(
                    "{pair} is listed as both {existing} and {symbol}"
                )));
            }
            table.by_pair.insert(pair.clone(), symbol.clone());
            table.by_symbol.insert(symbol, pair);
        }
        Ok(table)
    }

    /// Replaces the contents with a freshly fetched market list.
    ///
    /// The table is left untouched if the new list is invalid.
    pub fn rebuild<I, S>(&mut self, markets: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, CurrencyPair)>,
        S: Into<String>,
    {
        let fresh = Self::from_markets(markets)?;
        info!(markets = fresh.len(), "Rebuilt market table");
        *self = fresh;
        Ok(())
    }

    /// Native symbol of a pair.
    pub fn symbol_for(&self, pair: &CurrencyPair) -> std::result::Result<&str, SymbolError> {
        self.by_pair
            .get(pair)
            .map(String::as_str)
            .ok_or_else(|| SymbolError::UnknownMarket(pair.to_string()))
    }

    /// Pair of a native symbol.
    ///
    /// The lookup is exact: `symbol` must be spelled as the exchange listed it.
    pub fn pair_for(&self, symbol: &str) -> std::result::Result<&CurrencyPair, SymbolError> {
        self.by_symbol
            .get(symbol)
            .ok_or_else(|| SymbolError::UnknownMarket(symbol.to_string()))
    }

    /// Returns `true` if the pair is tradable on this exchange.
    pub fn contains(&self, pair: &CurrencyPair) -> bool {
        self.by_pair.contains_key(pair)
    }

    /// Iterates all `(symbol, pair)` entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CurrencyPair)> {
        self.by_symbol.iter().map(|(s, p)| (s.as_str(), p))
    }

    /// Number of markets.
    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    /// Returns `true` if no market is known.
    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(base: &str, quote: &str) -> CurrencyPair {
        CurrencyPair::new(base, quote).unwrap()
    }

    #[test]
    fn test_lookup_both_directions() {
        let table = MarketTable::from_markets([
            ("XXBTZEUR", pair("XBT", "EUR")),
            ("XETHXXBT", pair("ETH", "XBT")),
        ])
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.symbol_for(&pair("ETH", "XBT")).unwrap(), "XETHXXBT");
        assert_eq!(table.pair_for("XXBTZEUR").unwrap(), &pair("XBT", "EUR"));
        assert!(table.contains(&pair("XBT", "EUR")));
    }

    #[test]
    fn test_symbol_lookup_is_exact() {
        let table = MarketTable::from_markets([("tBTCUSD", pair("BTC", "USD"))]).unwrap();
        assert!(table.pair_for("tBTCUSD").is_ok());
        assert!(matches!(table.pair_for("TBTCUSD"), Err(SymbolError::UnknownMarket(_))));
        assert!(table.pair_for("tbtcusd").is_err());
    }

    #[test]
    fn test_duplicates_rejected() {
        let dup_pair = MarketTable::from_markets([
            ("XXBTZEUR", pair("XBT", "EUR")),
            ("XBTEUR.d", pair("XBT", "EUR")),
        ]);
        assert!(matches!(dup_pair, Err(Error::InvalidRequest(_))));

        let dup_symbol = MarketTable::from_markets([
            ("XXBTZEUR", pair("XBT", "EUR")),
            ("XXBTZEUR", pair("XBT", "USD")),
        ]);
        assert!(dup_symbol.is_err());
    }

    #[test]
    fn test_rebuild_replaces_or_keeps() {
        let mut table = MarketTable::from_markets([("A", pair("XBT", "EUR"))]).unwrap();
        table.rebuild([("B", pair("ETH", "EUR"))]).unwrap();
        assert!(table.pair_for("A").is_err());
        assert_eq!(table.pair_for("B").unwrap(), &pair("ETH", "EUR"));

        let bad = table.rebuild([("C", pair("LTC", "EUR")), ("C", pair("LTC", "USD"))]);
        assert!(bad.is_err());
        assert_eq!(table.len(), 1);
        assert!(table.pair_for("B").is_ok());
    }
}
