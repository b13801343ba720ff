//! Event-provider boundary.
//!
//! Every auxiliary-data source (splits, dividends, delistings, renames)
//! implements [`EventProvider`]. The scheduler holds them as
//! `Box<dyn EventProvider>` in registration order and never looks past this
//! trait.
//!
//! # Caller contract
//!
//! - [`EventProvider::initialize`] is called exactly once, before any date.
//! - [`EventProvider::on_new_tradable_date`] is called exactly once per
//!   tradable date, with strictly increasing dates. No repeats, no rewinds.
//! - Restarting from an earlier date means building fresh providers.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use mqk_md::{FactorTable, MapTable, Micros, SubscriptionRequest, Symbol, TradingCalendar};

use crate::delisting::DelistingEventProvider;
use crate::dividend::DividendEventProvider;
use crate::error::AuxError;
use crate::event::AuxiliaryEvent;
use crate::mapping::SymbolChangedEventProvider;
use crate::split::SplitEventProvider;

// ---------------------------------------------------------------------------
// Subscription context
// ---------------------------------------------------------------------------

/// Everything a provider binds to at initialization.
///
/// Tables are shared, immutable snapshots. Cloning the context clones `Arc`s.
#[derive(Clone)]
pub struct SubscriptionContext {
    pub request: SubscriptionRequest,
    /// `None` when the symbol has no corporate-action history.
    pub factor_table: Option<Arc<FactorTable>>,
    pub map_table: Arc<MapTable>,
    pub calendar: Arc<dyn TradingCalendar>,
}

impl SubscriptionContext {
    pub fn symbol(&self) -> &Symbol {
        &self.request.symbol
    }

    pub fn start(&self) -> NaiveDate {
        self.request.start
    }

    /// Gate shared by the factor-driven providers (split, dividend).
    ///
    /// Open only when the call is for this subscription's symbol, a factor
    /// table exists, and the map table covers the date.
    pub(crate) fn factor_gate(&self, args: &NewTradableDate<'_>) -> Option<&FactorTable> {
        if self.symbol() != args.symbol {
            return None;
        }
        let factors = self.factor_table.as_deref()?;
        if !self.map_table.has_coverage(args.symbol, args.date) {
            return None;
        }
        Some(factors)
    }
}

impl fmt::Debug for SubscriptionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionContext")
            .field("request", &self.request)
            .field("has_factor_table", &self.factor_table.is_some())
            .field("map_records", &self.map_table.records().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Per-date arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct NewTradableDate<'a> {
    pub date: NaiveDate,
    pub symbol: &'a Symbol,
    /// Last raw (unadjusted) price seen before this date's bar, if any.
    pub last_raw_price: Option<Micros>,
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// One auxiliary-data source bound to a single subscription.
pub trait EventProvider: Send {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Bind symbol, tables and start date. Called once, before the first date.
    fn initialize(&mut self, ctx: &SubscriptionContext);

    /// Events for a newly elapsed tradable date, in emission order.
    ///
    /// An `Err` is always fatal for the subscription.
    fn on_new_tradable_date(
        &mut self,
        args: &NewTradableDate<'_>,
    ) -> Result<Vec<AuxiliaryEvent>, AuxError>;
}

// ---------------------------------------------------------------------------
// Built-in provider kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    SymbolChanged,
    Split,
    Dividend,
    Delisting,
}

impl ProviderKind {
    /// Default registration order.
    pub const STANDARD: [ProviderKind; 4] = [
        ProviderKind::SymbolChanged,
        ProviderKind::Split,
        ProviderKind::Dividend,
        ProviderKind::Delisting,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symbol_changed" | "mapping" => Some(ProviderKind::SymbolChanged),
            "split" | "splits" => Some(ProviderKind::Split),
            "dividend" | "dividends" => Some(ProviderKind::Dividend),
            "delisting" | "delistings" => Some(ProviderKind::Delisting),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::SymbolChanged => "symbol_changed",
            ProviderKind::Split => "split",
            ProviderKind::Dividend => "dividend",
            ProviderKind::Delisting => "delisting",
        }
    }

    /// Fresh, unbound provider instance.
    pub fn build(&self) -> Box<dyn EventProvider> {
        match self {
            ProviderKind::SymbolChanged => Box::new(SymbolChangedEventProvider::new()),
            ProviderKind::Split => Box::new(SplitEventProvider::new()),
            ProviderKind::Dividend => Box::new(DividendEventProvider::new()),
            ProviderKind::Delisting => Box::new(DelistingEventProvider::new()),
        }
    }
}

/// Fresh provider instances for `kinds`, in the given order.
pub fn build_providers(kinds: &[ProviderKind]) -> Vec<Box<dyn EventProvider>> {
    kinds.iter().map(ProviderKind::build).collect()
}
