//! Bidirectional conversion between [`CurrencyPair`] and exchange symbols.

use serde::{Deserialize, Serialize};

use super::{MarketTable, SymbolError};
use crate::types::CurrencyPair;

/// Case convention of an exchange's symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterCase {
    /// `BTC-USD`
    #[default]
    Upper,
    /// `btc_usd`
    Lower,
}

impl LetterCase {
    fn apply(self, code: &str) -> String {
        match self {
            Self::Upper => code.to_ascii_uppercase(),
            Self::Lower => code.to_ascii_lowercase(),
        }
    }
}

/// Symbols made of two codes joined by a delimiter, e.g. `BTC-ETH` or `eth_btc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedFormat {
    delimiter: String,
    case: LetterCase,
    inverted: bool,
}

impl DelimitedFormat {
    /// Creates a non-inverted format. The delimiter must not be empty.
    pub fn new(delimiter: impl Into<String>, case: LetterCase) -> Result<Self, SymbolError> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(SymbolError::InvalidFormat(
                "delimiter must not be empty, use a fixed-width format instead".to_string(),
            ));
        }
        Ok(Self {
            delimiter,
            case,
            inverted: false,
        })
    }

    /// Sets whether the exchange lists the quote currency first.
    #[must_use]
    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    fn encode(&self, pair: &CurrencyPair) -> String {
        let (first, second) = ordered(pair, self.inverted);
        format!(
            "{}{}{}",
            self.case.apply(first),
            self.delimiter,
            self.case.apply(second)
        )
    }

    fn decode(&self, symbol: &str) -> Result<CurrencyPair, SymbolError> {
        let symbol = non_empty(symbol)?;
        let (first, second) = symbol
            .split_once(self.delimiter.as_str())
            .filter(|(_, rest)| !rest.contains(self.delimiter.as_str()))
            .ok_or_else(|| {
                SymbolError::InvalidFormat(format!(
                    "'{symbol}' does not contain exactly one '{}'",
                    self.delimiter
                ))
            })?;
        build(first, second, self.inverted)
    }
}

/// Symbols made of two concatenated fixed-width codes, e.g. `btcusd` or `tBTCUSD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWidthFormat {
    code_width: usize,
    prefix: String,
    case: LetterCase,
    inverted: bool,
}

impl FixedWidthFormat {
    /// Creates a format splitting at `code_width` characters.
    pub fn new(code_width: usize, case: LetterCase) -> Result<Self, SymbolError> {
        if code_width == 0 {
            return Err(SymbolError::InvalidFormat(
                "code width must be positive".to_string(),
            ));
        }
        Ok(Self {
            code_width,
            prefix: String::new(),
            case,
            inverted: false,
        })
    }

    /// Sets a literal prefix carried by every symbol (matched case-sensitively).
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets whether the exchange lists the quote currency first.
    #[must_use]
    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Total symbol length this format accepts.
    pub fn symbol_len(&self) -> usize {
        self.prefix.len() + 2 * self.code_width
    }

    fn encode(&self, pair: &CurrencyPair) -> Result<String, SymbolError> {
        for code in [pair.base(), pair.quote()] {
            if code.len() != self.code_width {
                return Err(SymbolError::InvalidFormat(format!(
                    "{code} is not {} characters wide",
                    self.code_width
                )));
            }
        }
        let (first, second) = ordered(pair, self.inverted);
        Ok(format!(
            "{}{}{}",
            self.prefix,
            self.case.apply(first),
            self.case.apply(second)
        ))
    }

    fn decode(&self, symbol: &str) -> Result<CurrencyPair, SymbolError> {
        let symbol = non_empty(symbol)?;
        if !symbol.is_ascii() || symbol.len() != self.symbol_len() {
            return Err(SymbolError::InvalidFormat(format!(
                "'{symbol}' is not {} ASCII characters long",
                self.symbol_len()
            )));
        }
        let body = symbol.strip_prefix(self.prefix.as_str()).ok_or_else(|| {
            SymbolError::InvalidFormat(format!("'{symbol}' lacks prefix '{}'", self.prefix))
        })?;
        let (first, second) = body.split_at(self.code_width);
        build(first, second, self.inverted)
    }
}

/// Per-exchange mapping between canonical pairs and native symbols.
///
/// Built once from exchange metadata and held for the adapter's lifetime. The
/// round-trip law `to_pair(to_symbol(p)) == p` holds for every variant; case is
/// normalized on decode so it never affects currency identity.
///
/// ```rust
/// use coinbridge_core::symbol::{LetterCase, SymbolCodec};
/// use coinbridge_core::types::CurrencyPair;
///
/// let codec = SymbolCodec::delimited("-", LetterCase::Upper, true).unwrap();
/// let pair = CurrencyPair::new("ETH", "BTC").unwrap();
///
/// assert_eq!(codec.to_symbol(&pair).unwrap(), "BTC-ETH");
/// assert_eq!(codec.to_pair("BTC-ETH").unwrap(), pair);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolCodec {
    /// Delimiter-separated codes
    Delimited(DelimitedFormat),
    /// Concatenated fixed-width codes
    FixedWidth(FixedWidthFormat),
    /// Opaque identifiers resolved through a table built from the market list
    Table(MarketTable),
}

impl SymbolCodec {
    /// Shorthand for a [`DelimitedFormat`] codec.
    pub fn delimited(
        delimiter: impl Into<String>,
        case: LetterCase,
        inverted: bool,
    ) -> Result<Self, SymbolError> {
        Ok(Self::Delimited(
            DelimitedFormat::new(delimiter, case)?.inverted(inverted),
        ))
    }

    /// Shorthand for a [`FixedWidthFormat`] codec.
    pub fn fixed_width(
        code_width: usize,
        case: LetterCase,
        inverted: bool,
    ) -> Result<Self, SymbolError> {
        Ok(Self::FixedWidth(
            FixedWidthFormat::new(code_width, case)?.inverted(inverted),
        ))
    }

    /// Formats a pair as an exchange symbol.
    pub fn to_symbol(&self, pair: &CurrencyPair) -> Result<String, SymbolError> {
        match self {
            Self::Delimited(format) => Ok(format.encode(pair)),
            Self::FixedWidth(format) => format.encode(pair),
            Self::Table(table) => table.symbol_for(pair).map(str::to_string),
        }
    }

    /// Parses an exchange symbol back into a pair.
    pub fn to_pair(&self, symbol: &str) -> Result<CurrencyPair, SymbolError> {
        match self {
            Self::Delimited(format) => format.decode(symbol),
            Self::FixedWidth(format) => format.decode(symbol),
            Self::Table(table) => table.pair_for(symbol).cloned(),
        }
    }

    /// Mutable access to the market table for table-based codecs.
    pub fn table_mut(&mut self) -> Option<&mut MarketTable> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }
}

impl From<DelimitedFormat> for SymbolCodec {
    fn from(format: DelimitedFormat) -> Self {
        Self::Delimited(format)
    }
}

impl From<FixedWidthFormat> for SymbolCodec {
    fn from(format: FixedWidthFormat) -> Self {
        Self::FixedWidth(format)
    }
}

impl From<MarketTable> for SymbolCodec {
    fn from(table: MarketTable) -> Self {
        Self::Table(table)
    }
}

fn ordered(pair: &CurrencyPair, inverted: bool) -> (&str, &str) {
    if inverted {
        (pair.quote(), pair.base())
    } else {
        (pair.base(), pair.quote())
    }
}

fn build(first: &str, second: &str, inverted: bool) -> Result<CurrencyPair, SymbolError> {
    if inverted {
        CurrencyPair::new(second, first)
    } else {
        CurrencyPair::new(first, second)
    }
}

fn non_empty(symbol: &str) -> Result<&str, SymbolError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(SymbolError::EmptySymbol);
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(base: &str, quote: &str) -> CurrencyPair {
        CurrencyPair::new(base, quote).unwrap()
    }

    #[test]
    fn test_inverted_dash_upper() {
        let codec = SymbolCodec::delimited("-", LetterCase::Upper, true).unwrap();
        assert_eq!(codec.to_symbol(&pair("BTC", "USD")).unwrap(), "USD-BTC");
        assert_eq!(codec.to_pair("USD-BTC").unwrap(), pair("BTC", "USD"));
    }

    #[test]
    fn test_lowercase_underscore() {
        let codec = SymbolCodec::delimited("_", LetterCase::Lower, false).unwrap();
        assert_eq!(codec.to_symbol(&pair("ETH", "BTC")).unwrap(), "eth_btc");
        assert_eq!(codec.to_pair("eth_btc").unwrap(), pair("ETH", "BTC"));
    }

    #[test]
    fn test_delimited_rejects_bad_shapes() {
        let codec = SymbolCodec::delimited("_", LetterCase::Upper, false).unwrap();
        assert!(matches!(
            codec.to_pair("BTCUSD"),
            Err(SymbolError::InvalidFormat(_))
        ));
        assert!(matches!(
            codec.to_pair("BTC_USD_X"),
            Err(SymbolError::InvalidFormat(_))
        ));
        assert!(matches!(
            codec.to_pair("_USD"),
            Err(SymbolError::InvalidCurrency(_))
        ));
        assert_eq!(codec.to_pair("  "), Err(SymbolError::EmptySymbol));
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        assert!(SymbolCodec::delimited("", LetterCase::Upper, false).is_err());
    }

    #[test]
    fn test_fixed_width() {
        let codec = SymbolCodec::fixed_width(3, LetterCase::Lower, false).unwrap();
        assert_eq!(codec.to_symbol(&pair("BTC", "USD")).unwrap(), "btcusd");
        assert_eq!(codec.to_pair("btcusd").unwrap(), pair("BTC", "USD"));
        assert_eq!(codec.to_pair("BTCUSD").unwrap(), pair("BTC", "USD"));
    }

    #[test]
    fn test_fixed_width_length_mismatch() {
        let codec = SymbolCodec::fixed_width(3, LetterCase::Lower, false).unwrap();
        assert!(matches!(
            codec.to_pair("btcusdt"),
            Err(SymbolError::InvalidFormat(_))
        ));
        assert!(matches!(
            codec.to_symbol(&pair("DASH", "BTC")),
            Err(SymbolError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_fixed_width_with_prefix() {
        let codec: SymbolCodec = FixedWidthFormat::new(3, LetterCase::Upper)
            .unwrap()
            .with_prefix("t")
            .into();
        assert_eq!(codec.to_symbol(&pair("ETH", "USD")).unwrap(), "tETHUSD");
        assert_eq!(codec.to_pair("tETHUSD").unwrap(), pair("ETH", "USD"));
        assert!(codec.to_pair("fETHUSD").is_err());
    }

    #[test]
    fn test_fixed_width_inverted() {
        let codec = SymbolCodec::fixed_width(3, LetterCase::Upper, true).unwrap();
        assert_eq!(codec.to_symbol(&pair("ETH", "BTC")).unwrap(), "BTCETH");
        assert_eq!(codec.to_pair("BTCETH").unwrap(), pair("ETH", "BTC"));
    }

    #[test]
    fn test_table_codec() {
        let table =
            MarketTable::from_markets([("XXBTZUSD", pair("XBT", "USD"))]).unwrap();
        let codec = SymbolCodec::from(table);
        assert_eq!(codec.to_symbol(&pair("XBT", "USD")).unwrap(), "XXBTZUSD");
        assert_eq!(codec.to_pair("XXBTZUSD").unwrap(), pair("XBT", "USD"));
        assert!(matches!(
            codec.to_symbol(&pair("ETH", "USD")),
            Err(SymbolError::UnknownMarket(_))
        ));
        assert!(matches!(
            codec.to_pair("XETHZUSD"),
            Err(SymbolError::UnknownMarket(_))
        ));
    }

    #[test]
    fn test_table_mut_only_for_tables() {
        let mut codec = SymbolCodec::delimited("-", LetterCase::Upper, false).unwrap();
        assert!(codec.table_mut().is_none());
        let mut codec = SymbolCodec::Table(MarketTable::new());
        assert!(codec.table_mut().is_some());
    }
}
