//! Per-subscription tradable-date scheduler.
//!
//! Drives every registered provider once per tradable date, in registration
//! order, and concatenates their output in that same order. Single pass: dates
//! must strictly increase, and any fatal error leaves the scheduler aborted
//! for good. Replaying from an earlier date means building a new one.

use chrono::NaiveDate;
use mqk_md::{Micros, Symbol};
use tracing::{debug, error};

use crate::error::AuxError;
use crate::event::AuxiliaryEvent;
use crate::provider::{EventProvider, NewTradableDate, SubscriptionContext};

/// Drives one subscription's providers, one tradable date per call.
pub struct TradableDateScheduler {
    ctx: SubscriptionContext,
    providers: Vec<Box<dyn EventProvider>>,
    last_date: Option<NaiveDate>,
    aborted: bool,
}

impl TradableDateScheduler {
    /// Bind and initialize `providers` against `ctx`. Each provider is
    /// initialized exactly once, here.
    pub fn new(ctx: SubscriptionContext, mut providers: Vec<Box<dyn EventProvider>>) -> Self {
        for p in providers.iter_mut() {
            p.initialize(&ctx);
        }
        Self {
            ctx,
            providers,
            last_date: None,
            aborted: false,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        self.ctx.symbol()
    }

    pub fn context(&self) -> &SubscriptionContext {
        &self.ctx
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last_date
    }

    /// Auxiliary events for `date`, to be delivered before that date's bar.
    pub fn on_new_tradable_date(
        &mut self,
        date: NaiveDate,
        last_raw_price: Option<Micros>,
    ) -> Result<Vec<AuxiliaryEvent>, AuxError> {
        if self.aborted {
            return Err(AuxError::Aborted {
                symbol: self.ctx.symbol().clone(),
            });
        }
        if let Some(previous) = self.last_date {
            if date <= previous {
                return Err(self.abort(AuxError::OutOfOrderDate {
                    symbol: self.ctx.symbol().clone(),
                    previous,
                    date,
                }));
            }
        }
        self.last_date = Some(date);

        let args = NewTradableDate {
            date,
            symbol: &self.ctx.request.symbol,
            last_raw_price,
        };

        let mut out = Vec::new();
        let mut failure = None;
        for p in self.providers.iter_mut() {
            match p.on_new_tradable_date(&args) {
                Ok(events) => out.extend(events),
                Err(e) => {
                    error!(provider = p.name(), error = %e, "provider failed");
                    failure = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = failure {
            return Err(self.abort(e));
        }

        if !out.is_empty() {
            debug!(symbol = %self.ctx.symbol(), %date, events = out.len(), "aux step");
            for e in &out {
                debug!(symbol = %e.symbol, date = %e.date, kind = e.kind.label(), "aux event");
            }
        }
        Ok(out)
    }

    fn abort(&mut self, e: AuxError) -> AuxError {
        self.aborted = true;
        error!(symbol = %self.ctx.symbol(), error = %e, "subscription aborted");
        e
    }
}
