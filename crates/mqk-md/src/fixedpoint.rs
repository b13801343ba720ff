//! Fixed-point decimal type for reference data.
//!
//! Prices, split factors and price-factor ratios all use a 1e-6 (micros)
//! fixed-point representation stored as `i64`. No floating point is used at
//! any stage: values are parsed from decimal strings and rendered back with
//! exactly six fractional digits.
//!
//! # Scale
//!
//! `1.0 == Micros(1_000_000)`. A 2-for-1 split factor of `0.5` is
//! `Micros(500_000)`; a `$100.00` reference price is `Micros(100_000_000)`.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Number of micros in one unit.
pub const MICROS_SCALE: i64 = 1_000_000;

// ---------------------------------------------------------------------------
// Micros newtype
// ---------------------------------------------------------------------------

/// A fixed-point decimal at 1e-6 scale.
///
/// There is intentionally no `From<i64>`: callers go through
/// [`Micros::new`], [`Micros::from_units`] or [`Micros::parse`] so that a raw
/// integer is never silently taken as a price.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Micros(i64);

impl Micros {
    pub const ZERO: Micros = Micros(0);
    pub const ONE: Micros = Micros(MICROS_SCALE);

    #[inline]
    pub const fn new(raw: i64) -> Self {
        Micros(raw)
    }

    /// Whole units, e.g. `Micros::from_units(100)` is `100.000000`.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Micros(units * MICROS_SCALE)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Multiply by a ratio that is itself expressed in micros.
    ///
    /// The intermediate product is computed in `i128` and truncated toward
    /// zero. Returns `None` only when the result does not fit in `i64`.
    pub fn mul_ratio(self, ratio: Micros) -> Option<Micros> {
        let wide = (self.0 as i128) * (ratio.0 as i128) / (MICROS_SCALE as i128);
        i64::try_from(wide).ok().map(Micros)
    }

    /// Parse a decimal string deterministically.
    ///
    /// Accepts an optional leading sign and at most 6 fractional digits.
    /// Rejects empty input, non-digits, or a second `.` separator.
    pub fn parse(s: &str) -> Result<Micros, ParseMicrosError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseMicrosError::Empty);
        }
        let invalid = || ParseMicrosError::Invalid(s.to_string());

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }
        if frac_part.len() > 6 {
            return Err(ParseMicrosError::TooManyDecimalPlaces(s.to_string()));
        }

        let int_val: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let frac_val: i64 = format!("{frac_part:0<6}").parse().map_err(|_| invalid())?;

        let micros = int_val
            .checked_mul(MICROS_SCALE)
            .and_then(|v| v.checked_add(frac_val))
            .ok_or_else(invalid)?;

        Ok(Micros(if negative { -micros } else { micros }))
    }
}

impl Add for Micros {
    type Output = Micros;
    #[inline]
    fn add(self, rhs: Micros) -> Micros {
        Micros(self.0 + rhs.0)
    }
}

impl Sub for Micros {
    type Output = Micros;
    #[inline]
    fn sub(self, rhs: Micros) -> Micros {
        Micros(self.0 - rhs.0)
    }
}

impl fmt::Display for Micros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / MICROS_SCALE;
        let frac = (self.0 % MICROS_SCALE).abs();
        // -0.25 truncates to 0 units; keep the sign.
        if self.0 < 0 && units == 0 {
            write!(f, "-{units}.{frac:06}")
        } else {
            write!(f, "{units}.{frac:06}")
        }
    }
}

impl From<Micros> for String {
    fn from(m: Micros) -> String {
        m.to_string()
    }
}

impl TryFrom<String> for Micros {
    type Error = ParseMicrosError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Micros::parse(&s)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMicrosError {
    Empty,
    Invalid(String),
    /// More than 6 decimal places would require rounding.
    TooManyDecimalPlaces(String),
}

impl fmt::Display for ParseMicrosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMicrosError::Empty => write!(f, "decimal value is empty"),
            ParseMicrosError::Invalid(raw) => write!(f, "invalid decimal value: '{raw}'"),
            ParseMicrosError::TooManyDecimalPlaces(raw) => {
                write!(f, "decimal value has more than 6 decimal places: '{raw}'")
            }
        }
    }
}

impl std::error::Error for ParseMicrosError {}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
