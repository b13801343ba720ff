//! Dividend detection.
//!
//! Same lookahead shape as splits but with a single emission: the dividend
//! effective on the next tradable date is recorded silently, and on that date
//! a `Dividend` event is emitted with
//!
//! ```text
//! distribution = reference_price - reference_price * price_factor_ratio
//! ```
//!
//! A zero stored reference price at payment time is fatal, mirroring the
//! split Occurred path.

use std::mem;

use tracing::trace;

use mqk_md::Micros;

use crate::error::{AuxError, ConfigurationError, FatalPhase};
use crate::event::AuxiliaryEvent;
use crate::provider::{EventProvider, NewTradableDate, SubscriptionContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PendingDividend {
    #[default]
    Idle,
    Pending {
        price_factor_ratio: Micros,
        reference_price: Micros,
    },
}

#[derive(Debug, Default)]
pub struct DividendEventProvider {
    ctx: Option<SubscriptionContext>,
    state: PendingDividend,
}

impl DividendEventProvider {
    /// Unbound provider; silent until [`EventProvider::initialize`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PendingDividend {
        self.state
    }
}

/// Cash amount per share implied by a price-factor ratio.
///
/// `None` when the adjusted price overflows. Factor-table validation keeps
/// the ratio in `(0, 1]` and the reference price non-negative, so loaded
/// tables never hit it.
pub fn distribution(reference_price: Micros, price_factor_ratio: Micros) -> Option<Micros> {
    reference_price
        .mul_ratio(price_factor_ratio)
        .map(|adjusted| reference_price - adjusted)
}

impl EventProvider for DividendEventProvider {
    fn name(&self) -> &'static str {
        "dividend"
    }

    fn initialize(&mut self, ctx: &SubscriptionContext) {
        self.ctx = Some(ctx.clone());
        self.state = PendingDividend::Idle;
    }

    fn on_new_tradable_date(
        &mut self,
        args: &NewTradableDate<'_>,
    ) -> Result<Vec<AuxiliaryEvent>, AuxError> {
        let Some(ctx) = self.ctx.as_ref() else {
            return Ok(Vec::new());
        };
        let Some(factors) = ctx.factor_gate(args) else {
            trace!(symbol = %args.symbol, date = %args.date, "dividend gate closed");
            return Ok(Vec::new());
        };

        let mut out = Vec::new();

        if let PendingDividend::Pending {
            price_factor_ratio,
            reference_price,
        } = mem::take(&mut self.state)
        {
            if reference_price.is_zero() {
                return Err(ConfigurationError::ZeroReferencePrice {
                    symbol: args.symbol.clone(),
                    date: args.date,
                    phase: FatalPhase::DividendPaid,
                }
                .into());
            }
            let Some(amount) = distribution(reference_price, price_factor_ratio) else {
                return Err(ConfigurationError::DistributionOverflow {
                    symbol: args.symbol.clone(),
                    date: args.date,
                    reference_price,
                    price_factor: price_factor_ratio,
                }
                .into());
            };
            out.push(AuxiliaryEvent::dividend(
                args.symbol.clone(),
                args.date,
                amount,
                reference_price,
            ));
        }

        if let Some(next) = factors.next_day_dividend(args.date, ctx.calendar.as_ref()) {
            self.state = PendingDividend::Pending {
                price_factor_ratio: next.price_factor_ratio,
                reference_price: next.reference_price,
            };
        }

        Ok(out)
    }
}
