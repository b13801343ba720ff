//! Resolver boundary for reference tables.
//!
//! Subscriptions never load files themselves; they ask a resolver for an
//! already-built, immutable table. This module defines **only** the request
//! type and the two resolver traits. Concrete directory loading lives in
//! [`crate::store`].

use std::sync::Arc;

use chrono::NaiveDate;

use crate::factor::FactorTable;
use crate::map::MapTable;
use crate::symbol::Symbol;

/// What a feed is being opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub symbol: Symbol,
    /// First date the feed will be driven for.
    pub start: NaiveDate,
    /// Last date (inclusive) the feed will be driven for.
    pub end: NaiveDate,
}

impl SubscriptionRequest {
    pub fn new(symbol: Symbol, start: NaiveDate, end: NaiveDate) -> Self {
        Self { symbol, start, end }
    }
}

/// Resolves a symbol's factor table.
///
/// `None` is a normal outcome: most symbols have no corporate-action history.
/// Callers must treat it as "no coverage", never as an error.
pub trait FactorResolver: Send + Sync {
    fn resolve(&self, symbol: &Symbol) -> Option<Arc<FactorTable>>;
}

/// Resolves the map table for a subscription.
///
/// Expected to always produce a table (an empty one for unknown tickers).
/// `None` means the resolver cannot serve this subscription at all, which
/// subscription setup treats as fatal.
pub trait MapResolver: Send + Sync {
    fn resolve(&self, request: &SubscriptionRequest) -> Option<Arc<MapTable>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::FactorRecord;
    use crate::fixedpoint::Micros;

    struct OneSymbol {
        table: Arc<FactorTable>,
    }

    impl FactorResolver for OneSymbol {
        fn resolve(&self, symbol: &Symbol) -> Option<Arc<FactorTable>> {
            (self.table.symbol() == symbol).then(|| Arc::clone(&self.table))
        }
    }

    #[test]
    fn resolver_is_object_safe_and_shares_tables() {
        let xyz = Symbol::equity("XYZ", "usa");
        let table = FactorTable::new(
            xyz.clone(),
            vec![FactorRecord::split(
                NaiveDate::from_ymd_opt(2022, 6, 15).unwrap(),
                Micros::new(500_000),
                Micros::from_units(100),
            )],
        )
        .unwrap();
        let r: Box<dyn FactorResolver> = Box::new(OneSymbol {
            table: Arc::new(table),
        });

        let a = r.resolve(&xyz).unwrap();
        let b = r.resolve(&xyz).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(r.resolve(&Symbol::equity("ABC", "usa")).is_none());
    }
}
