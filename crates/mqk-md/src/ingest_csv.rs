//! CSV readers for factor files, map files and daily price bars.
//!
//! ## Column contracts (case-insensitive, order-independent)
//!
//! | File        | Columns                                               |
//! |-------------|-------------------------------------------------------|
//! | factor file | `date`, `price_factor`, `split_factor`, `reference_price` |
//! | map file    | `date`, `old_ticker`, `new_ticker`                    |
//! | price bars  | `date`, `close`                                       |
//!
//! Dates are `YYYY-MM-DD` or `YYYYMMDD`. Decimal columns go through
//! [`Micros::parse`] (no floats). Unlike bar ingestion, a bad row is never
//! skipped: a silently dropped factor row would shift every split it touches.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use chrono::NaiveDate;

use crate::factor::{FactorRecord, FactorTable};
use crate::fixedpoint::Micros;
use crate::map::{MapRecord, MapTable};
use crate::symbol::Symbol;
use crate::{PriceBar, TableError};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum CsvError {
    Io(String),
    MissingHeader(&'static str),
    ParseField {
        row: usize,
        field: &'static str,
        raw: String,
    },
    Table(TableError),
}

impl fmt::Display for CsvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvError::Io(msg) => write!(f, "csv io error: {msg}"),
            CsvError::MissingHeader(col) => {
                write!(f, "csv missing required header column: '{col}'")
            }
            CsvError::ParseField { row, field, raw } => {
                write!(f, "csv row {row}: cannot parse field '{field}' from value '{raw}'")
            }
            CsvError::Table(e) => write!(f, "csv table invalid: {e}"),
        }
    }
}

impl std::error::Error for CsvError {}

impl From<TableError> for CsvError {
    fn from(e: TableError) -> Self {
        CsvError::Table(e)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a factor file body into a validated [`FactorTable`].
pub fn parse_factor_csv(symbol: Symbol, src: &str) -> Result<FactorTable, CsvError> {
    let rows = parse_rows(
        src,
        &["date", "price_factor", "split_factor", "reference_price"],
        |row| {
            Ok(FactorRecord {
                date: row.date("date")?,
                price_factor: row.micros("price_factor")?,
                split_factor: row.micros("split_factor")?,
                reference_price: row.micros("reference_price")?,
            })
        },
    )?;
    Ok(FactorTable::new(symbol, rows)?)
}

/// Parse a map file body into a validated [`MapTable`].
pub fn parse_map_csv(symbol: Symbol, src: &str) -> Result<MapTable, CsvError> {
    let rows = parse_rows(src, &["date", "old_ticker", "new_ticker"], |row| {
        Ok(MapRecord::new(
            row.date("date")?,
            row.text("old_ticker")?.to_ascii_uppercase(),
            row.text("new_ticker")?.to_ascii_uppercase(),
        ))
    })?;
    Ok(MapTable::new(symbol, rows)?)
}

/// Parse daily bars. Output is sorted by date (stable).
pub fn parse_bars_csv(src: &str) -> Result<Vec<PriceBar>, CsvError> {
    let mut bars = parse_rows(src, &["date", "close"], |row| {
        Ok(PriceBar::new(row.date("date")?, row.micros("close")?))
    })?;
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

pub fn read_factor_file(symbol: Symbol, path: &Path) -> Result<FactorTable, CsvError> {
    parse_factor_csv(symbol, &read_to_string(path)?)
}

pub fn read_map_file(symbol: Symbol, path: &Path) -> Result<MapTable, CsvError> {
    parse_map_csv(symbol, &read_to_string(path)?)
}

pub fn read_bars_file(path: &Path) -> Result<Vec<PriceBar>, CsvError> {
    parse_bars_csv(&read_to_string(path)?)
}

/// Accepts `YYYY-MM-DD` or compact `YYYYMMDD`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
}

// ---------------------------------------------------------------------------
// Row plumbing
// ---------------------------------------------------------------------------

struct Row<'a> {
    num: usize,
    fields: Vec<&'a str>,
    cols: &'a HashMap<String, usize>,
}

impl<'a> Row<'a> {
    fn text(&self, name: &'static str) -> Result<&'a str, CsvError> {
        let i = *self
            .cols
            .get(name)
            .ok_or(CsvError::MissingHeader(name))?;
        // A short row (trailing empty column dropped by the exporter) reads as "".
        Ok(self.fields.get(i).copied().map(str::trim).unwrap_or(""))
    }

    fn date(&self, name: &'static str) -> Result<NaiveDate, CsvError> {
        let raw = self.text(name)?;
        parse_date(raw).ok_or_else(|| self.bad(name, raw))
    }

    fn micros(&self, name: &'static str) -> Result<Micros, CsvError> {
        let raw = self.text(name)?;
        Micros::parse(raw).map_err(|_| self.bad(name, raw))
    }

    fn bad(&self, field: &'static str, raw: &str) -> CsvError {
        CsvError::ParseField {
            row: self.num,
            field,
            raw: raw.to_string(),
        }
    }
}

fn parse_rows<T>(
    src: &str,
    required: &[&'static str],
    mut decode: impl FnMut(&Row<'_>) -> Result<T, CsvError>,
) -> Result<Vec<T>, CsvError> {
    let mut lines = src.lines();
    let header = match lines.next() {
        Some(l) => l.trim_start_matches('\u{feff}'),
        None => return Ok(Vec::new()),
    };
    let cols = build_col_index(header, required)?;

    let mut out = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = Row {
            // 1-based, header = row 1
            num: idx + 2,
            fields: line.split(',').collect(),
            cols: &cols,
        };
        out.push(decode(&row)?);
    }
    Ok(out)
}

fn build_col_index(
    header: &str,
    required: &[&'static str],
) -> Result<HashMap<String, usize>, CsvError> {
    let cols: HashMap<String, usize> = header
        .split(',')
        .enumerate()
        .map(|(i, c)| (c.trim().to_ascii_lowercase(), i))
        .collect();
    for &name in required {
        if !cols.contains_key(name) {
            return Err(CsvError::MissingHeader(name));
        }
    }
    Ok(cols)
}

fn read_to_string(path: &Path) -> Result<String, CsvError> {
    std::fs::read_to_string(path)
        .map_err(|e| CsvError::Io(format!("read '{}': {e}", path.display())))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn factor_file_round_trips_into_table() {
        let src = "\
date,price_factor,split_factor,reference_price
2022-03-10,0.99,1,80.00

20220615,1,0.5,100.00
";
        let t = parse_factor_csv(Symbol::equity("XYZ", "usa"), src).unwrap();
        assert_eq!(t.records().len(), 2);
        assert_eq!(t.records()[1].date, d(2022, 6, 15));
        assert_eq!(t.records()[1].split_factor, Micros::new(500_000));
        assert!(t.records()[0].is_dividend());
    }

    #[test]
    fn columns_are_order_independent_and_case_insensitive() {
        let src = "Reference_Price,DATE,split_factor,price_factor\n100,2022-06-15,0.5,1\n";
        let t = parse_factor_csv(Symbol::equity("XYZ", "usa"), src).unwrap();
        assert_eq!(t.records()[0].reference_price, Micros::from_units(100));
    }

    #[test]
    fn bad_decimal_reports_row_and_field() {
        let src = "date,price_factor,split_factor,reference_price\n2022-06-15,1,half,100\n";
        let err = parse_factor_csv(Symbol::equity("XYZ", "usa"), src).unwrap_err();
        match err {
            CsvError::ParseField { row, field, raw } => {
                assert_eq!(row, 2);
                assert_eq!(field, "split_factor");
                assert_eq!(raw, "half");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_reference_price_is_rejected() {
        let src = "date,price_factor,split_factor,reference_price\n2022-06-15,1,0.5,-100\n";
        let err = parse_factor_csv(Symbol::equity("XYZ", "usa"), src).unwrap_err();
        match err {
            CsvError::Table(TableError::NegativeReferencePrice { date, value, .. }) => {
                assert_eq!(date, d(2022, 6, 15));
                assert_eq!(value, Micros::from_units(-100));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_header_is_reported() {
        let err = parse_map_csv(Symbol::equity("XYZ", "usa"), "date,old_ticker\n").unwrap_err();
        assert!(matches!(err, CsvError::MissingHeader("new_ticker")));
    }

    #[test]
    fn map_file_with_trailing_delisting() {
        let src = "date,old_ticker,new_ticker\n2010-01-04,,old\n2020-03-02,OLD,\n";
        let t = parse_map_csv(Symbol::equity("OLD", "usa"), src).unwrap();
        assert_eq!(t.delisting_date(), Some(d(2020, 3, 2)));
        assert_eq!(t.ticker_on(d(2015, 1, 2)), Some("OLD"));
    }

    #[test]
    fn out_of_order_rows_surface_table_error() {
        let src = "date,old_ticker,new_ticker\n2020-01-02,,A\n2019-01-02,A,B\n";
        let err = parse_map_csv(Symbol::equity("A", "usa"), src).unwrap_err();
        assert!(matches!(err, CsvError::Table(TableError::NotStrictlyIncreasing { .. })));
    }

    #[test]
    fn bars_are_sorted() {
        let src = "date,close\n2022-06-14,99.5\n2022-06-13,99.50\n";
        let bars = parse_bars_csv(src).unwrap();
        assert_eq!(bars[0].date, d(2022, 6, 13));
        assert_eq!(bars[1].close, Micros::new(99_500_000));
    }

    #[test]
    fn empty_source_is_empty() {
        assert!(parse_bars_csv("").unwrap().is_empty());
    }
}
