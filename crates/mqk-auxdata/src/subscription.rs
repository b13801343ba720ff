//! Subscription setup: one symbol bound to its table snapshots and providers.

use std::sync::Arc;

use mqk_md::{FactorResolver, MapResolver, PriceBar, SubscriptionRequest, TradingCalendar};
use tracing::debug;

use crate::error::{AuxError, ConfigurationError};
use crate::feed::MergedFeed;
use crate::provider::{build_providers, EventProvider, ProviderKind, SubscriptionContext};
use crate::scheduler::TradableDateScheduler;

/// One symbol's feed: resolved tables plus its bound providers.
pub struct Subscription {
    scheduler: TradableDateScheduler,
}

impl Subscription {
    /// Resolve tables for `request` and bind `providers` to them.
    ///
    /// A missing factor table is normal (no corporate-action history). A
    /// missing map table is a fatal configuration error.
    pub fn open(
        request: SubscriptionRequest,
        factors: &dyn FactorResolver,
        maps: &dyn MapResolver,
        calendar: Arc<dyn TradingCalendar>,
        providers: Vec<Box<dyn EventProvider>>,
    ) -> Result<Self, AuxError> {
        let Some(map_table) = maps.resolve(&request) else {
            return Err(ConfigurationError::MissingMapTable {
                symbol: request.symbol.clone(),
                start: request.start,
            }
            .into());
        };
        let factor_table = factors.resolve(&request.symbol);

        debug!(
            symbol = %request.symbol,
            start = %request.start,
            end = %request.end,
            has_factor_table = factor_table.is_some(),
            map_records = map_table.records().len(),
            "subscription opened"
        );

        let ctx = SubscriptionContext {
            request,
            factor_table,
            map_table,
            calendar,
        };
        Ok(Self {
            scheduler: TradableDateScheduler::new(ctx, providers),
        })
    }

    /// [`Subscription::open`] with the standard provider set.
    pub fn open_standard(
        request: SubscriptionRequest,
        factors: &dyn FactorResolver,
        maps: &dyn MapResolver,
        calendar: Arc<dyn TradingCalendar>,
    ) -> Result<Self, AuxError> {
        Self::open(
            request,
            factors,
            maps,
            calendar,
            build_providers(&ProviderKind::STANDARD),
        )
    }

    /// Fails unless the map table covers the start date. Live sessions call
    /// this; backtests tolerate symbols that list mid-range.
    pub fn require_map_coverage(&self) -> Result<(), AuxError> {
        let ctx = self.scheduler.context();
        if ctx.map_table.has_coverage(ctx.symbol(), ctx.start()) {
            return Ok(());
        }
        Err(ConfigurationError::NoMapCoverage {
            symbol: ctx.symbol().clone(),
            start: ctx.start(),
        }
        .into())
    }

    pub fn scheduler(&self) -> &TradableDateScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut TradableDateScheduler {
        &mut self.scheduler
    }

    /// Merge this subscription's auxiliary events with its raw bars.
    pub fn feed<I>(self, bars: I) -> MergedFeed<I::IntoIter>
    where
        I: IntoIterator<Item = PriceBar>,
    {
        MergedFeed::new(self.scheduler, bars.into_iter())
    }
}
