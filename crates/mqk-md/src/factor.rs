//! Factor table: per-symbol, date-ordered corporate-action adjustment history.
//!
//! Each [`FactorRecord`] describes the adjustment that takes effect on its
//! date. A `split_factor` of `1.0` means "no split on this date"; a
//! `price_factor` of `1.0` means "no dividend on this date". Rows where both
//! are `1.0` are plain history entries (they still extend coverage).
//!
//! Tables are immutable after [`FactorTable::new`] and are shared between
//! subscriptions behind an `Arc`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::TradingCalendar;
use crate::fixedpoint::Micros;
use crate::symbol::Symbol;
use crate::TableError;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorRecord {
    /// Date the adjustment takes effect.
    pub date: NaiveDate,
    /// Dividend adjustment ratio for this date, in `(0, 1]` (`1.0` = none).
    pub price_factor: Micros,
    /// Split ratio for this date (`1.0` = none). Always positive.
    pub split_factor: Micros,
    /// Price level tied to the event. May be zero on plain history rows.
    pub reference_price: Micros,
}

impl FactorRecord {
    /// Split row: `price_factor` is `1.0`.
    pub fn split(date: NaiveDate, split_factor: Micros, reference_price: Micros) -> Self {
        Self {
            date,
            price_factor: Micros::ONE,
            split_factor,
            reference_price,
        }
    }

    /// Dividend row: `split_factor` is `1.0`.
    pub fn dividend(date: NaiveDate, price_factor: Micros, reference_price: Micros) -> Self {
        Self {
            date,
            price_factor,
            split_factor: Micros::ONE,
            reference_price,
        }
    }

    pub fn is_split(&self) -> bool {
        self.split_factor != Micros::ONE
    }

    pub fn is_dividend(&self) -> bool {
        self.price_factor != Micros::ONE
    }
}

/// A split that takes effect on the next tradable date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLookahead {
    pub effective_date: NaiveDate,
    pub factor: Micros,
    pub reference_price: Micros,
}

/// A dividend that takes effect on the next tradable date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DividendLookahead {
    pub effective_date: NaiveDate,
    pub price_factor_ratio: Micros,
    pub reference_price: Micros,
}

// ---------------------------------------------------------------------------
// FactorTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorTable {
    symbol: Symbol,
    records: Vec<FactorRecord>,
}

impl FactorTable {
    /// Build a table from records that are already in date order.
    ///
    /// Fails when dates are not strictly increasing, a factor is not
    /// positive, a price factor exceeds `1.0`, or a reference price is
    /// negative. Unsorted input is rejected rather than sorted: an
    /// out-of-order factor file indicates a broken upstream export.
    pub fn new(symbol: Symbol, records: Vec<FactorRecord>) -> Result<Self, TableError> {
        for pair in records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(TableError::NotStrictlyIncreasing {
                    symbol,
                    previous: pair[0].date,
                    date: pair[1].date,
                });
            }
        }
        for r in &records {
            if !r.split_factor.is_positive() {
                return Err(TableError::NonPositiveFactor {
                    symbol,
                    date: r.date,
                    field: "split_factor",
                    value: r.split_factor,
                });
            }
            if !r.price_factor.is_positive() {
                return Err(TableError::NonPositiveFactor {
                    symbol,
                    date: r.date,
                    field: "price_factor",
                    value: r.price_factor,
                });
            }
            if r.price_factor > Micros::ONE {
                return Err(TableError::PriceFactorAboveOne {
                    symbol,
                    date: r.date,
                    value: r.price_factor,
                });
            }
            if r.reference_price < Micros::ZERO {
                return Err(TableError::NegativeReferencePrice {
                    symbol,
                    date: r.date,
                    value: r.reference_price,
                });
            }
        }
        Ok(Self { symbol, records })
    }

    /// Symbol this table belongs to.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// All records, ascending by date.
    pub fn records(&self) -> &[FactorRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Date of the earliest record.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    /// Date of the latest record.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Record effective exactly on `date`.
    pub fn record_on(&self, date: NaiveDate) -> Option<&FactorRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.records[i])
    }

    /// `true` iff the table belongs to `symbol` and `date` lies within
    /// `[first_date, last_date]`.
    ///
    /// Query API for consumers; the split and dividend providers gate on map
    /// coverage instead, so a split on the first row can still be announced.
    pub fn has_coverage(&self, symbol: &Symbol, date: NaiveDate) -> bool {
        if &self.symbol != symbol {
            return false;
        }
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => first <= date && date <= last,
            _ => false,
        }
    }

    pub fn splits(&self) -> impl Iterator<Item = &FactorRecord> {
        self.records.iter().filter(|r| r.is_split())
    }

    pub fn dividends(&self) -> impl Iterator<Item = &FactorRecord> {
        self.records.iter().filter(|r| r.is_dividend())
    }

    /// The split, if any, effective on the first tradable date strictly
    /// after `date`.
    pub fn next_day_split(
        &self,
        date: NaiveDate,
        calendar: &dyn TradingCalendar,
    ) -> Option<SplitLookahead> {
        let next = calendar.next_tradable_after(date)?;
        self.record_on(next)
            .filter(|r| r.is_split())
            .map(|r| SplitLookahead {
                effective_date: r.date,
                factor: r.split_factor,
                reference_price: r.reference_price,
            })
    }

    /// The dividend, if any, effective on the first tradable date strictly
    /// after `date`.
    pub fn next_day_dividend(
        &self,
        date: NaiveDate,
        calendar: &dyn TradingCalendar,
    ) -> Option<DividendLookahead> {
        let next = calendar.next_tradable_after(date)?;
        self.record_on(next)
            .filter(|r| r.is_dividend())
            .map(|r| DividendLookahead {
                effective_date: r.date,
                price_factor_ratio: r.price_factor,
                reference_price: r.reference_price,
            })
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
