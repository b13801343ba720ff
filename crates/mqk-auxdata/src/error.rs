//! Fatal errors for auxiliary-event subscriptions.
//!
//! Only fatal conditions are represented here. Missing factor tables, dates
//! without map coverage, and lookups that hit no record are normal outcomes
//! and surface as empty event lists, never as errors.

use std::fmt;

use chrono::NaiveDate;
use mqk_md::{Micros, Symbol};

/// Emission step a fatal configuration error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalPhase {
    SplitOccurred,
    DividendPaid,
}

impl FatalPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            FatalPhase::SplitOccurred => "split/occurred",
            FatalPhase::DividendPaid => "dividend/paid",
        }
    }
}

impl fmt::Display for FatalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference data that cannot be used. Always a pipeline bug upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A stored reference price was zero when its event had to be emitted.
    ZeroReferencePrice {
        symbol: Symbol,
        date: NaiveDate,
        phase: FatalPhase,
    },
    /// The map resolver could not produce a table at subscription setup.
    MissingMapTable { symbol: Symbol, start: NaiveDate },
    /// Live subscriptions require map coverage on their first date.
    NoMapCoverage { symbol: Symbol, start: NaiveDate },
    /// `reference_price * price_factor` does not fit the fixed-point range.
    DistributionOverflow {
        symbol: Symbol,
        date: NaiveDate,
        reference_price: Micros,
        price_factor: Micros,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::ZeroReferencePrice {
                symbol,
                date,
                phase,
            } => write!(
                f,
                "CONFIG_ZERO_REFERENCE_PRICE symbol={symbol} date={date} phase={phase}"
            ),
            ConfigurationError::MissingMapTable { symbol, start } => {
                write!(f, "CONFIG_MISSING_MAP_TABLE symbol={symbol} start={start}")
            }
            ConfigurationError::NoMapCoverage { symbol, start } => {
                write!(f, "CONFIG_NO_MAP_COVERAGE symbol={symbol} start={start}")
            }
            ConfigurationError::DistributionOverflow {
                symbol,
                date,
                reference_price,
                price_factor,
            } => write!(
                f,
                "CONFIG_DISTRIBUTION_OVERFLOW symbol={symbol} date={date} \
                 reference_price={reference_price} price_factor={price_factor}"
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Anything that terminates a subscription's stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxError {
    Configuration(ConfigurationError),
    /// The caller drove a date that is not strictly after the previous one.
    OutOfOrderDate {
        symbol: Symbol,
        previous: NaiveDate,
        date: NaiveDate,
    },
    /// The subscription already failed; it must be rebuilt from scratch.
    Aborted { symbol: Symbol },
}

impl AuxError {
    pub fn symbol(&self) -> &Symbol {
        match self {
            AuxError::Configuration(ConfigurationError::ZeroReferencePrice { symbol, .. })
            | AuxError::Configuration(ConfigurationError::MissingMapTable { symbol, .. })
            | AuxError::Configuration(ConfigurationError::NoMapCoverage { symbol, .. })
            | AuxError::Configuration(ConfigurationError::DistributionOverflow { symbol, .. })
            | AuxError::OutOfOrderDate { symbol, .. }
            | AuxError::Aborted { symbol } => symbol,
        }
    }
}

impl fmt::Display for AuxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuxError::Configuration(e) => e.fmt(f),
            AuxError::OutOfOrderDate {
                symbol,
                previous,
                date,
            } => write!(
                f,
                "tradable dates must be strictly increasing for {symbol}: {previous} then {date}"
            ),
            AuxError::Aborted { symbol } => {
                write!(f, "subscription for {symbol} aborted by an earlier fatal error")
            }
        }
    }
}

impl std::error::Error for AuxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuxError::Configuration(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigurationError> for AuxError {
    fn from(e: ConfigurationError) -> Self {
        AuxError::Configuration(e)
    }
}
