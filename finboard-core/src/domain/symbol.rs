//! Validated ticker symbols.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_TICKER_LEN: usize = 16;

/// A ticker such as `AAPL`, optionally qualified by an exchange (`AAPL:NASDAQ`).
///
/// The ticker is always upper-case. Cache keys and simulated data are derived
/// from the ticker alone; the exchange only matters to the remote news
/// endpoint, which expects `TICKER:EXCHANGE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    ticker: String,
    exchange: Option<String>,
}

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, DataError> {
        let trimmed = input.trim().to_ascii_uppercase();
        let invalid = |reason: &str| DataError::InvalidSymbol {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (ticker, exchange) = match trimmed.split_once(':') {
            Some((t, e)) => (t.trim().to_string(), Some(e.trim().to_string())),
            None => (trimmed, None),
        };

        if ticker.is_empty() {
            return Err(invalid("empty ticker"));
        }
        if ticker.len() > MAX_TICKER_LEN {
            return Err(invalid("ticker too long"));
        }
        if !ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
        {
            return Err(invalid("unexpected character"));
        }
        if let Some(ex) = &exchange {
            if ex.is_empty() || !ex.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid("malformed exchange suffix"));
            }
        }

        Ok(Self { ticker, exchange })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn exchange(&self) -> Option<&str> {
        self.exchange.as_deref()
    }

    /// `TICKER:EXCHANGE`, using `default_exchange` when the symbol has none.
    pub fn qualified(&self, default_exchange: &str) -> String {
        let exchange = self.exchange.as_deref().unwrap_or(default_exchange);
        format!("{}:{exchange}", self.ticker)
    }
}

impl FromStr for Symbol {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ticker)
    }
}
