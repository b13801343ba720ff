//! Split detection: two-phase Warning / Occurred protocol.
//!
//! A split effective on tradable date `D'` is announced on the tradable date
//! `D` immediately before it (Warning, advisory) and confirmed on `D'`
//! (Occurred, strict). The provider holds at most one pending split, and the
//! pending slot is cleared in the same step that emits the Occurred event.
//!
//! # Per-call order (when the gate is open)
//!
//! 1. Resolve pending: emit Occurred at the stored reference price, or fail
//!    with `ZeroReferencePrice` if that price is zero.
//! 2. New lookahead: if a split is effective on the next tradable date, store
//!    it and emit Warning at the last raw price (0 if unknown).
//!
//! So Occurred always precedes Warning within one date's output.

use std::mem;

use tracing::trace;

use mqk_md::Micros;

use crate::error::{AuxError, ConfigurationError, FatalPhase};
use crate::event::{AuxiliaryEvent, SplitPhase};
use crate::provider::{EventProvider, NewTradableDate, SubscriptionContext};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// At most one announced split per provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PendingSplit {
    #[default]
    Idle,
    /// Announced split awaiting its effective date.
    PendingConfirmed {
        factor: Micros,
        reference_price: Micros,
    },
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Emits `Split` Warning and Occurred events for one subscription.
#[derive(Debug, Default)]
pub struct SplitEventProvider {
    ctx: Option<SubscriptionContext>,
    state: PendingSplit,
}

impl SplitEventProvider {
    /// Unbound provider; silent until [`EventProvider::initialize`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current pending slot.
    pub fn state(&self) -> PendingSplit {
        self.state
    }
}

impl EventProvider for SplitEventProvider {
    fn name(&self) -> &'static str {
        "split"
    }

    fn initialize(&mut self, ctx: &SubscriptionContext) {
        self.ctx = Some(ctx.clone());
        self.state = PendingSplit::Idle;
    }

    fn on_new_tradable_date(
        &mut self,
        args: &NewTradableDate<'_>,
    ) -> Result<Vec<AuxiliaryEvent>, AuxError> {
        let Some(ctx) = self.ctx.as_ref() else {
            return Ok(Vec::new());
        };
        let Some(factors) = ctx.factor_gate(args) else {
            trace!(symbol = %args.symbol, date = %args.date, "split gate closed");
            return Ok(Vec::new());
        };

        let mut out = Vec::new();

        if let PendingSplit::PendingConfirmed {
            factor,
            reference_price,
        } = mem::take(&mut self.state)
        {
            if reference_price.is_zero() {
                return Err(ConfigurationError::ZeroReferencePrice {
                    symbol: args.symbol.clone(),
                    date: args.date,
                    phase: FatalPhase::SplitOccurred,
                }
                .into());
            }
            out.push(AuxiliaryEvent::split(
                args.symbol.clone(),
                args.date,
                reference_price,
                factor,
                SplitPhase::Occurred,
            ));
        }

        if let Some(next) = factors.next_day_split(args.date, ctx.calendar.as_ref()) {
            self.state = PendingSplit::PendingConfirmed {
                factor: next.factor,
                reference_price: next.reference_price,
            };
            out.push(AuxiliaryEvent::split(
                args.symbol.clone(),
                args.date,
                args.last_raw_price.unwrap_or(Micros::ZERO),
                next.factor,
                SplitPhase::Warning,
            ));
        }

        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
