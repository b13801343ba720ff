//! Map table: per-symbol, date-ordered ticker remap history.
//!
//! Conventions:
//! - The first record is the listing (`old_ticker` may be empty or equal to
//!   `new_ticker`).
//! - A record with `old_ticker != new_ticker` (both non-empty) is a rename.
//! - A record with an empty `new_ticker` is the delisting; it may only be last.
//!
//! Used by providers to gate whether a symbol has corporate-action coverage
//! on a date, to detect renames, and to find the delisting date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;
use crate::TableError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRecord {
    pub date: NaiveDate,
    pub old_ticker: String,
    pub new_ticker: String,
}

impl MapRecord {
    pub fn new(
        date: NaiveDate,
        old_ticker: impl Into<String>,
        new_ticker: impl Into<String>,
    ) -> Self {
        Self {
            date,
            old_ticker: old_ticker.into(),
            new_ticker: new_ticker.into(),
        }
    }

    pub fn is_delisting(&self) -> bool {
        self.new_ticker.is_empty()
    }

    pub fn is_rename(&self) -> bool {
        !self.old_ticker.is_empty()
            && !self.new_ticker.is_empty()
            && self.old_ticker != self.new_ticker
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapTable {
    symbol: Symbol,
    records: Vec<MapRecord>,
}

impl MapTable {
    /// Build a table from date-ordered records. A delisting record may only
    /// be last.
    pub fn new(symbol: Symbol, records: Vec<MapRecord>) -> Result<Self, TableError> {
        for pair in records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(TableError::NotStrictlyIncreasing {
                    symbol,
                    previous: pair[0].date,
                    date: pair[1].date,
                });
            }
        }
        let last = records.len().saturating_sub(1);
        if let Some((_, r)) = records
            .iter()
            .enumerate()
            .find(|(i, r)| r.is_delisting() && *i != last)
        {
            return Err(TableError::DelistingNotLast {
                symbol,
                date: r.date,
            });
        }
        Ok(Self { symbol, records })
    }

    /// Table with no records: the symbol is known but has no coverage.
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            records: Vec::new(),
        }
    }

    /// Symbol this table belongs to.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// All records, ascending by date.
    pub fn records(&self) -> &[MapRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Listing date.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn delisting_date(&self) -> Option<NaiveDate> {
        self.records.last().filter(|r| r.is_delisting()).map(|r| r.date)
    }

    /// `true` iff the table belongs to `symbol`, is non-empty, `date` is on or
    /// after the listing and, when delisted, on or before the delisting date.
    pub fn has_coverage(&self, symbol: &Symbol, date: NaiveDate) -> bool {
        if &self.symbol != symbol {
            return false;
        }
        let Some(first) = self.first_date() else {
            return false;
        };
        if date < first {
            return false;
        }
        match self.delisting_date() {
            Some(delisted) => date <= delisted,
            None => true,
        }
    }

    /// Ticker in effect on `date`: the `new_ticker` of the latest non-delisting
    /// record on or before `date`.
    pub fn ticker_on(&self, date: NaiveDate) -> Option<&str> {
        let upto = self.records.partition_point(|r| r.date <= date);
        self.records[..upto]
            .iter()
            .rev()
            .find(|r| !r.is_delisting())
            .map(|r| r.new_ticker.as_str())
    }

    /// Rename record effective exactly on `date`.
    ///
    /// Point query for consumers. The symbol-changed provider compares
    /// [`MapTable::ticker_on`] against the last ticker it saw instead, so a
    /// rename on an undriven date is still reported on the next covered one.
    pub fn rename_on(&self, date: NaiveDate) -> Option<&MapRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.records[i])
            .filter(|r| r.is_rename())
    }
}
