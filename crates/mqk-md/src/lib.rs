//! mqk-md
//!
//! Reference data for the auxiliary-event feed: factor tables (splits,
//! dividends), map tables (renames, delistings), the tradable-date calendar,
//! and the daily price bars the feed is merged with.
//!
//! Pure data + lookups. The only IO lives in [`ingest_csv`] and [`store`],
//! which load tables once; everything handed to subscriptions is immutable.

pub mod calendar;
pub mod factor;
pub mod fixedpoint;
pub mod ingest_csv;
pub mod map;
pub mod provider;
pub mod store;
pub mod symbol;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use calendar::{CalendarSpec, TradingCalendar};
pub use factor::{DividendLookahead, FactorRecord, FactorTable, SplitLookahead};
pub use fixedpoint::{Micros, ParseMicrosError, MICROS_SCALE};
pub use map::{MapRecord, MapTable};
pub use provider::{FactorResolver, MapResolver, SubscriptionRequest};
pub use store::TableStore;
pub use symbol::{SecurityKind, Symbol};

/// One daily bar of the primary (raw, unadjusted) price stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: Micros,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: Micros) -> Self {
        Self { date, close }
    }
}

// ---------------------------------------------------------------------------
// Table construction errors
// ---------------------------------------------------------------------------

/// Structural problems found while building a [`FactorTable`] or [`MapTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    NotStrictlyIncreasing {
        symbol: Symbol,
        previous: NaiveDate,
        date: NaiveDate,
    },
    NonPositiveFactor {
        symbol: Symbol,
        date: NaiveDate,
        field: &'static str,
        value: Micros,
    },
    PriceFactorAboveOne {
        symbol: Symbol,
        date: NaiveDate,
        value: Micros,
    },
    NegativeReferencePrice {
        symbol: Symbol,
        date: NaiveDate,
        value: Micros,
    },
    DelistingNotLast {
        symbol: Symbol,
        date: NaiveDate,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::NotStrictlyIncreasing {
                symbol,
                previous,
                date,
            } => write!(
                f,
                "{symbol}: record dates must be strictly increasing ({previous} then {date})"
            ),
            TableError::NonPositiveFactor {
                symbol,
                date,
                field,
                value,
            } => write!(f, "{symbol}: {field} must be positive on {date}, got {value}"),
            TableError::PriceFactorAboveOne {
                symbol,
                date,
                value,
            } => write!(f, "{symbol}: price_factor must be <= 1 on {date}, got {value}"),
            TableError::NegativeReferencePrice {
                symbol,
                date,
                value,
            } => write!(
                f,
                "{symbol}: reference_price must not be negative on {date}, got {value}"
            ),
            TableError::DelistingNotLast { symbol, date } => {
                write!(f, "{symbol}: delisting record on {date} is not the last record")
            }
        }
    }
}

impl std::error::Error for TableError {}
