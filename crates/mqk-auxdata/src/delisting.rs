//! Delisting detection, driven by the map table's delisting record.
//!
//! `Warning` goes out on the first tradable date on or after the delisting
//! date (the last trading day), `Delisted` on the first date strictly after
//! it. A subscription that starts past the delisting date gets both on its
//! first call. Unlike the factor-driven providers this one is not gated on
//! map coverage: the `Delisted` date is by definition outside it.

use chrono::NaiveDate;
use mqk_md::Micros;
use tracing::debug;

use crate::error::AuxError;
use crate::event::{AuxiliaryEvent, DelistingPhase};
use crate::provider::{EventProvider, NewTradableDate, SubscriptionContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DelistingState {
    #[default]
    Listed,
    Warned,
    /// Terminal.
    Delisted,
}

#[derive(Debug, Default)]
pub struct DelistingEventProvider {
    ctx: Option<SubscriptionContext>,
    delisting_date: Option<NaiveDate>,
    state: DelistingState,
}

impl DelistingEventProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DelistingState {
        self.state
    }
}

impl EventProvider for DelistingEventProvider {
    fn name(&self) -> &'static str {
        "delisting"
    }

    fn initialize(&mut self, ctx: &SubscriptionContext) {
        self.delisting_date = ctx.map_table.delisting_date();
        self.ctx = Some(ctx.clone());
        self.state = DelistingState::Listed;
    }

    fn on_new_tradable_date(
        &mut self,
        args: &NewTradableDate<'_>,
    ) -> Result<Vec<AuxiliaryEvent>, AuxError> {
        let Some(ctx) = self.ctx.as_ref() else {
            return Ok(Vec::new());
        };
        if ctx.symbol() != args.symbol {
            return Ok(Vec::new());
        }
        let Some(delisted_on) = self.delisting_date else {
            return Ok(Vec::new());
        };

        let price = args.last_raw_price.unwrap_or(Micros::ZERO);
        let mut out = Vec::new();

        if self.state == DelistingState::Listed && args.date >= delisted_on {
            self.state = DelistingState::Warned;
            out.push(AuxiliaryEvent::delisting(
                args.symbol.clone(),
                args.date,
                price,
                DelistingPhase::Warning,
            ));
        }
        if self.state == DelistingState::Warned && args.date > delisted_on {
            self.state = DelistingState::Delisted;
            debug!(symbol = %args.symbol, date = %args.date, "symbol delisted");
            out.push(AuxiliaryEvent::delisting(
                args.symbol.clone(),
                args.date,
                price,
                DelistingPhase::Delisted,
            ));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mqk_md::{CalendarSpec, MapRecord, MapTable, SubscriptionRequest, Symbol};

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn provider(start: NaiveDate) -> DelistingEventProvider {
        let symbol = Symbol::equity("OLD", "usa");
        let map = MapTable::new(
            symbol.clone(),
            vec![
                MapRecord::new(d(2010, 1, 4), "OLD", "OLD"),
                MapRecord::new(d(2022, 9, 30), "OLD", ""),
            ],
        )
        .unwrap();
        let mut p = DelistingEventProvider::new();
        p.initialize(&SubscriptionContext {
            request: SubscriptionRequest::new(symbol, start, d(2022, 12, 30)),
            factor_table: None,
            map_table: Arc::new(map),
            calendar: Arc::new(CalendarSpec::NyseWeekdays),
        });
        p
    }

    fn step(p: &mut DelistingEventProvider, date: NaiveDate) -> Vec<DelistingPhase> {
        let symbol = Symbol::equity("OLD", "usa");
        p.on_new_tradable_date(&NewTradableDate {
            date,
            symbol: &symbol,
            last_raw_price: Some(Micros::from_units(3)),
        })
        .unwrap()
        .into_iter()
        .filter_map(|e| match e.kind {
            crate::event::AuxEventKind::Delisting { phase, .. } => Some(phase),
            _ => None,
        })
        .collect()
    }

    #[test]
    fn warning_on_last_day_then_delisted_next_day() {
        let mut p = provider(d(2022, 9, 1));
        assert!(step(&mut p, d(2022, 9, 29)).is_empty());
        assert_eq!(step(&mut p, d(2022, 9, 30)), vec![DelistingPhase::Warning]);
        assert_eq!(step(&mut p, d(2022, 10, 3)), vec![DelistingPhase::Delisted]);
        assert!(step(&mut p, d(2022, 10, 4)).is_empty());
        assert_eq!(p.state(), DelistingState::Delisted);
    }

    #[test]
    fn late_start_emits_both_phases_at_once() {
        let mut p = provider(d(2022, 10, 3));
        assert_eq!(
            step(&mut p, d(2022, 10, 3)),
            vec![DelistingPhase::Warning, DelistingPhase::Delisted]
        );
    }
}
