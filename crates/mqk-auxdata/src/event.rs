//! Auxiliary events delivered ahead of the primary bar for a date.

use chrono::NaiveDate;
use mqk_md::{Micros, Symbol};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPhase {
    /// Advisory, one tradable date before the split takes effect.
    Warning,
    /// The split takes effect on this date.
    Occurred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelistingPhase {
    /// Last trading date.
    Warning,
    /// First date after the last trading date.
    Delisted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuxEventKind {
    Split {
        price: Micros,
        #[serde(rename = "split_factor")]
        factor: Micros,
        phase: SplitPhase,
    },
    Dividend {
        distribution: Micros,
        reference_price: Micros,
    },
    Delisting {
        price: Micros,
        phase: DelistingPhase,
    },
    SymbolChanged {
        old_ticker: String,
        new_ticker: String,
    },
}

impl AuxEventKind {
    pub fn label(&self) -> &'static str {
        match self {
            AuxEventKind::Split {
                phase: SplitPhase::Warning,
                ..
            } => "split/warning",
            AuxEventKind::Split {
                phase: SplitPhase::Occurred,
                ..
            } => "split/occurred",
            AuxEventKind::Dividend { .. } => "dividend",
            AuxEventKind::Delisting {
                phase: DelistingPhase::Warning,
                ..
            } => "delisting/warning",
            AuxEventKind::Delisting {
                phase: DelistingPhase::Delisted,
                ..
            } => "delisting/delisted",
            AuxEventKind::SymbolChanged { .. } => "symbol_changed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryEvent {
    pub symbol: Symbol,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub kind: AuxEventKind,
}

impl AuxiliaryEvent {
    pub fn split(
        symbol: Symbol,
        date: NaiveDate,
        price: Micros,
        factor: Micros,
        phase: SplitPhase,
    ) -> Self {
        Self {
            symbol,
            date,
            kind: AuxEventKind::Split {
                price,
                factor,
                phase,
            },
        }
    }

    pub fn dividend(
        symbol: Symbol,
        date: NaiveDate,
        distribution: Micros,
        reference_price: Micros,
    ) -> Self {
        Self {
            symbol,
            date,
            kind: AuxEventKind::Dividend {
                distribution,
                reference_price,
            },
        }
    }

    pub fn delisting(
        symbol: Symbol,
        date: NaiveDate,
        price: Micros,
        phase: DelistingPhase,
    ) -> Self {
        Self {
            symbol,
            date,
            kind: AuxEventKind::Delisting { price, phase },
        }
    }

    pub fn symbol_changed(
        symbol: Symbol,
        date: NaiveDate,
        old_ticker: impl Into<String>,
        new_ticker: impl Into<String>,
    ) -> Self {
        Self {
            symbol,
            date,
            kind: AuxEventKind::SymbolChanged {
                old_ticker: old_ticker.into(),
                new_ticker: new_ticker.into(),
            },
        }
    }

    /// `(price, factor, phase)` when this is a split event.
    pub fn as_split(&self) -> Option<(Micros, Micros, SplitPhase)> {
        match self.kind {
            AuxEventKind::Split {
                price,
                factor,
                phase,
            } => Some((price, factor, phase)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_payload_shape() {
        let e = AuxiliaryEvent::split(
            Symbol::equity("XYZ", "usa"),
            NaiveDate::from_ymd_opt(2022, 6, 15).unwrap(),
            Micros::from_units(100),
            Micros::new(500_000),
            SplitPhase::Occurred,
        );
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "split");
        assert_eq!(v["date"], "2022-06-15");
        assert_eq!(v["price"], "100.000000");
        assert_eq!(v["split_factor"], "0.500000");
        assert_eq!(v["phase"], "occurred");
        assert_eq!(v["symbol"]["ticker"], "XYZ");
        assert_eq!(e.kind.label(), "split/occurred");
    }
}
