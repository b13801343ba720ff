//! mqk-auxdata
//!
//! Auxiliary-event subsystem of the market-data feed. Detects corporate
//! actions (splits, dividends, delistings, ticker renames) from reference
//! tables and injects them, exactly once and in a fixed order, ahead of the
//! raw bar for the same date.
//!
//! Layering:
//! - [`provider`]: the [`EventProvider`] seam every source implements.
//! - [`split`], [`dividend`], [`delisting`], [`mapping`]: concrete providers.
//! - [`scheduler`]: drives one subscription's providers per tradable date.
//! - [`subscription`]: resolves tables and builds the scheduler.
//! - [`feed`]: merges scheduler output with the bar stream.
//!
//! Everything here is synchronous and owned by a single subscription. Tables
//! are shared read-only through `Arc`; provider state never is.

pub mod delisting;
pub mod dividend;
pub mod error;
pub mod event;
pub mod feed;
pub mod mapping;
pub mod provider;
pub mod scheduler;
pub mod settings;
pub mod split;
pub mod subscription;

pub use delisting::{DelistingEventProvider, DelistingState};
pub use dividend::{DividendEventProvider, PendingDividend};
pub use error::{AuxError, ConfigurationError, FatalPhase};
pub use event::{AuxEventKind, AuxiliaryEvent, DelistingPhase, SplitPhase};
pub use feed::{FeedItem, MergedFeed};
pub use mapping::SymbolChangedEventProvider;
pub use provider::{
    build_providers, EventProvider, NewTradableDate, ProviderKind, SubscriptionContext,
};
pub use scheduler::TradableDateScheduler;
pub use settings::FeedSettings;
pub use split::{PendingSplit, SplitEventProvider};
pub use subscription::Subscription;
