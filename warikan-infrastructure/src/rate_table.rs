use fxhash::FxHashMap;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;
use warikan_domain::{ConversionRates, Currency};

#[derive(Debug, Error)]
pub enum RateTableError {
    #[error("Failed to read rate table '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed rate table")]
    Parse(#[from] serde_json::Error),
    #[error("Rate {from}->{to} must be positive, got {rate}")]
    NonPositiveRate {
        from: Currency,
        to: Currency,
        rate: Decimal,
    },
    #[error("Rate {from}->{to} is quoted more than once")]
    DuplicateQuote { from: Currency, to: Currency },
    #[error("Rate {0}->{0} is implicit and cannot be quoted")]
    IdentityQuote(Currency),
}

#[derive(Deserialize)]
struct RateFile {
    #[serde(default)]
    base: Option<Currency>,
    #[serde(default)]
    rates: Vec<Quote>,
}

#[derive(Deserialize)]
struct Quote {
    from: Currency,
    to: Currency,
    rate: Decimal,
}

/// In-memory conversion quotes, optionally anchored on a base currency.
///
/// A quote `from -> to` with rate `r` means one unit of `from` buys `r` units
/// of `to`. Inverse and base-currency paths are derived on lookup.
#[derive(Clone, Debug, Default)]
pub struct RateTable {
    base: Option<Currency>,
    quotes: FxHashMap<(Currency, Currency), Decimal>,
}

impl RateTable {
    pub fn new(base: Option<Currency>) -> Self {
        Self {
            base,
            quotes: FxHashMap::default(),
        }
    }

    pub fn with_quote(
        mut self,
        from: Currency,
        to: Currency,
        rate: Decimal,
    ) -> Result<Self, RateTableError> {
        self.insert(from, to, rate)?;
        Ok(self)
    }

    pub fn insert(
        &mut self,
        from: Currency,
        to: Currency,
        rate: Decimal,
    ) -> Result<(), RateTableError> {
        if from == to {
            return Err(RateTableError::IdentityQuote(from));
        }
        if rate <= Decimal::ZERO {
            return Err(RateTableError::NonPositiveRate { from, to, rate });
        }
        if self.quotes.contains_key(&(from.clone(), to.clone())) {
            return Err(RateTableError::DuplicateQuote { from, to });
        }
        self.quotes.insert((from, to), rate);
        Ok(())
    }

    pub fn from_json(source: &str) -> Result<Self, RateTableError> {
        let file: RateFile = serde_json::from_str(source)?;
        let mut table = Self::new(file.base);
        for quote in file.rates {
            table.insert(quote.from, quote.to, quote.rate)?;
        }
        tracing::debug!(
            base = ?table.base,
            quote_count = table.quotes.len(),
            "Rate table loaded"
        );
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RateTableError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| RateTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&source)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl ConversionRates for RateTable {
    fn base_currency(&self) -> Option<&Currency> {
        self.base.as_ref()
    }

    fn direct_rate(&self, from: &Currency, to: &Currency) -> Option<Decimal> {
        self.quotes.get(&(from.clone(), to.clone())).copied()
    }
}
