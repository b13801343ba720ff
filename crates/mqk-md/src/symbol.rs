//! Security identity used as the primary key for every table lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of security a [`Symbol`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityKind {
    Equity,
    Option,
    Future,
    Crypto,
}

impl SecurityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityKind::Equity => "equity",
            SecurityKind::Option => "option",
            SecurityKind::Future => "future",
            SecurityKind::Crypto => "crypto",
        }
    }
}

/// Immutable security identifier: (ticker, market, kind).
///
/// Tickers are stored upper-cased and markets lower-cased so that
/// `Symbol::equity("xyz", "USA") == Symbol::equity("XYZ", "usa")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol {
    ticker: String,
    market: String,
    kind: SecurityKind,
}

impl Symbol {
    pub fn new(ticker: impl AsRef<str>, market: impl AsRef<str>, kind: SecurityKind) -> Self {
        Self {
            ticker: ticker.as_ref().trim().to_ascii_uppercase(),
            market: market.as_ref().trim().to_ascii_lowercase(),
            kind,
        }
    }

    pub fn equity(ticker: impl AsRef<str>, market: impl AsRef<str>) -> Self {
        Self::new(ticker, market, SecurityKind::Equity)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn kind(&self) -> SecurityKind {
        self.kind
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.ticker, self.market, self.kind.as_str())
    }
}
