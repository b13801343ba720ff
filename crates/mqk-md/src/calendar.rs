//! Tradable-date calendar.
//!
//! Deterministic, pure logic. No IO, no wall-clock.
//!
//! Date enumeration belongs to the market calendar; the auxiliary-event
//! pipeline only consumes it through [`TradingCalendar`]. The bundled
//! [`CalendarSpec`] covers the two calendars the desk trades:
//!
//! - [`CalendarSpec::AlwaysOn`]: every calendar day is tradable (crypto, tests).
//! - [`CalendarSpec::NyseWeekdays`]: Monday-Friday, minus a hardcoded set of
//!   US market holidays for 2023-2026.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Upper bound on how far [`TradingCalendar::next_tradable_after`] searches.
///
/// No real exchange closes for more than a couple of weeks; anything longer
/// is treated as "no next tradable date".
pub const MAX_CLOSED_RUN_DAYS: i64 = 31;

// ---------------------------------------------------------------------------
// TradingCalendar
// ---------------------------------------------------------------------------

/// Market calendar collaborator.
///
/// Implementations must be immutable after construction; one instance is
/// shared by every subscription on the same exchange.
pub trait TradingCalendar: Send + Sync {
    /// `true` if the market is open for trading on `date`.
    fn is_tradable(&self, date: NaiveDate) -> bool;

    /// First tradable date strictly after `date`, if one exists within
    /// [`MAX_CLOSED_RUN_DAYS`].
    fn next_tradable_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut d = date;
        for _ in 0..MAX_CLOSED_RUN_DAYS {
            d = d.succ_opt()?;
            if self.is_tradable(d) {
                return Some(d);
            }
        }
        None
    }

    /// All tradable dates in `[start, end]`, ascending.
    fn tradable_dates(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut out = Vec::new();
        let mut d = start;
        while d <= end {
            if self.is_tradable(d) {
                out.push(d);
            }
            match d.succ_opt() {
                Some(next) => d = next,
                None => break,
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// CalendarSpec
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarSpec {
    /// 24/7, every date is tradable.
    AlwaysOn,

    /// NYSE-style equities:
    /// - Weekdays only (Monday-Friday).
    /// - Hardcoded US market holidays 2023-2026.
    NyseWeekdays,
}

impl CalendarSpec {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always_on" | "24x7" => Some(CalendarSpec::AlwaysOn),
            "nyse_weekdays" | "nyse" => Some(CalendarSpec::NyseWeekdays),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarSpec::AlwaysOn => "always_on",
            CalendarSpec::NyseWeekdays => "nyse_weekdays",
        }
    }
}

impl TradingCalendar for CalendarSpec {
    fn is_tradable(&self, date: NaiveDate) -> bool {
        match self {
            CalendarSpec::AlwaysOn => true,
            CalendarSpec::NyseWeekdays => is_nyse_trading_day(date),
        }
    }

    fn next_tradable_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            CalendarSpec::AlwaysOn => date.checked_add_signed(Duration::days(1)),
            CalendarSpec::NyseWeekdays => {
                let mut d = date;
                for _ in 0..MAX_CLOSED_RUN_DAYS {
                    d = d.succ_opt()?;
                    if is_nyse_trading_day(d) {
                        return Some(d);
                    }
                }
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// NYSE trading days
// ---------------------------------------------------------------------------

fn is_nyse_trading_day(date: NaiveDate) -> bool {
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    !is_nyse_holiday(date.year(), date.month(), date.day())
}

/// Observed NYSE full-day closures, 2023-2026. Extend as needed.
fn is_nyse_holiday(year: i32, month: u32, day: u32) -> bool {
    const HOLIDAYS: &[(i32, u32, u32)] = &[
        // ── 2023 ─────────────────────────────────────────────────────────
        (2023, 1, 2),   // New Year's Day (observed Mon)
        (2023, 1, 16),  // MLK Day
        (2023, 2, 20),  // Presidents' Day
        (2023, 4, 7),   // Good Friday
        (2023, 5, 29),  // Memorial Day
        (2023, 6, 19),  // Juneteenth
        (2023, 7, 4),   // Independence Day
        (2023, 9, 4),   // Labor Day
        (2023, 11, 23), // Thanksgiving
        (2023, 12, 25), // Christmas
        // ── 2024 ─────────────────────────────────────────────────────────
        (2024, 1, 1),   // New Year's Day
        (2024, 1, 15),  // MLK Day
        (2024, 2, 19),  // Presidents' Day
        (2024, 3, 29),  // Good Friday
        (2024, 5, 27),  // Memorial Day
        (2024, 6, 19),  // Juneteenth
        (2024, 7, 4),   // Independence Day
        (2024, 9, 2),   // Labor Day
        (2024, 11, 28), // Thanksgiving
        (2024, 12, 25), // Christmas
        // ── 2025 ─────────────────────────────────────────────────────────
        (2025, 1, 1),   // New Year's Day
        (2025, 1, 9),   // National Day of Mourning (President Carter)
        (2025, 1, 20),  // MLK Day
        (2025, 2, 17),  // Presidents' Day
        (2025, 4, 18),  // Good Friday
        (2025, 5, 26),  // Memorial Day
        (2025, 6, 19),  // Juneteenth
        (2025, 7, 4),   // Independence Day
        (2025, 9, 1),   // Labor Day
        (2025, 11, 27), // Thanksgiving
        (2025, 12, 25), // Christmas
        // ── 2026 ─────────────────────────────────────────────────────────
        (2026, 1, 1),   // New Year's Day
        (2026, 1, 19),  // MLK Day
        (2026, 2, 16),  // Presidents' Day
        (2026, 4, 3),   // Good Friday
        (2026, 5, 25),  // Memorial Day
        (2026, 6, 19),  // Juneteenth
        (2026, 7, 3),   // Independence Day (observed, July 4 falls on Saturday)
        (2026, 9, 7),   // Labor Day
        (2026, 11, 26), // Thanksgiving
        (2026, 12, 25), // Christmas
    ];
    HOLIDAYS.contains(&(year, month, day))
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
    fn weekend_and_holiday_are_closed() {
        let cal = CalendarSpec::NyseWeekdays;
        assert!(cal.is_tradable(d(2024, 1, 8))); // Mon
        assert!(!cal.is_tradable(d(2024, 1, 6))); // Sat
        assert!(!cal.is_tradable(d(2024, 1, 7))); // Sun
        assert!(!cal.is_tradable(d(2024, 1, 1))); // New Year's Day
    }

    #[test]
    fn next_tradable_skips_weekend() {
        let cal = CalendarSpec::NyseWeekdays;
        assert_eq!(cal.next_tradable_after(d(2024, 1, 5)), Some(d(2024, 1, 8)));
    }

    /// Thursday before Good Friday 2024 rolls over the long weekend.
    #[test]
    fn next_tradable_skips_holiday_weekend() {
        let cal = CalendarSpec::NyseWeekdays;
        assert_eq!(cal.next_tradable_after(d(2024, 3, 28)), Some(d(2024, 4, 1)));
    }

    #[test]
    fn always_on_is_every_day() {
        let cal = CalendarSpec::AlwaysOn;
        assert!(cal.is_tradable(d(2024, 1, 6)));
        assert_eq!(cal.next_tradable_after(d(2024, 1, 6)), Some(d(2024, 1, 7)));
    }

    #[test]
    fn tradable_dates_inclusive_range() {
        let cal = CalendarSpec::NyseWeekdays;
        let dates = cal.tradable_dates(d(2024, 1, 5), d(2024, 1, 9));
        assert_eq!(dates, vec![d(2024, 1, 5), d(2024, 1, 8), d(2024, 1, 9)]);
        assert!(cal.tradable_dates(d(2024, 1, 9), d(2024, 1, 5)).is_empty());
    }

    #[test]
    fn parse_names() {
        assert_eq!(CalendarSpec::parse("NYSE_WEEKDAYS"), Some(CalendarSpec::NyseWeekdays));
        assert_eq!(CalendarSpec::parse("always_on"), Some(CalendarSpec::AlwaysOn));
        assert_eq!(CalendarSpec::parse("lse"), None);
    }
}
