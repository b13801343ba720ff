//! Fatal configuration error scenario tests.
//!
//! Validates that:
//! - A split whose stored reference price is zero still produces its
//!   advisory Warning, then fails with `ZeroReferencePrice` on the date it
//!   takes effect, carrying symbol, date and phase.
//! - The subscription is aborted: later dates return `Aborted`.
//! - The merged feed surfaces the error once and then ends.
//! - The same rule applies to dividends at payment time.

use std::sync::Arc;

use chrono::NaiveDate;
use mqk_auxdata::{
    build_providers, AuxError, ConfigurationError, FatalPhase, FeedItem, ProviderKind,
    Subscription,
};
use mqk_md::{
    CalendarSpec, FactorRecord, FactorTable, MapRecord, MapTable, Micros, PriceBar,
    SubscriptionRequest, Symbol, TableStore,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn xyz() -> Symbol {
    Symbol::equity("XYZ", "usa")
}

fn open(record: FactorRecord, kinds: &[ProviderKind]) -> Subscription {
    let store = TableStore::new("usa")
        .with_factor_table(FactorTable::new(xyz(), vec![record]).unwrap())
        .with_map_table(
            MapTable::new(xyz(), vec![MapRecord::new(d(2000, 1, 3), "XYZ", "XYZ")]).unwrap(),
        );
    Subscription::open(
        SubscriptionRequest::new(xyz(), d(2022, 6, 13), d(2022, 6, 17)),
        &store,
        &store,
        Arc::new(CalendarSpec::NyseWeekdays),
        build_providers(kinds),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Scenario 3: zero reference price on a split
// ---------------------------------------------------------------------------

#[test]
fn split_occurred_with_zero_reference_price_aborts() {
    let mut sub = open(
        FactorRecord::split(d(2022, 6, 15), Micros::new(500_000), Micros::ZERO),
        &[ProviderKind::Split],
    );
    let s = sub.scheduler_mut();

    assert_eq!(s.on_new_tradable_date(d(2022, 6, 14), None).unwrap().len(), 1);

    let err = s.on_new_tradable_date(d(2022, 6, 15), None).unwrap_err();
    assert_eq!(
        err,
        AuxError::Configuration(ConfigurationError::ZeroReferencePrice {
            symbol: xyz(),
            date: d(2022, 6, 15),
            phase: FatalPhase::SplitOccurred,
        })
    );
    assert!(s.is_aborted());
    assert!(matches!(
        s.on_new_tradable_date(d(2022, 6, 16), None),
        Err(AuxError::Aborted { .. })
    ));
}

#[test]
fn merged_feed_stops_after_the_error() {
    let sub = open(
        FactorRecord::split(d(2022, 6, 15), Micros::new(500_000), Micros::ZERO),
        &ProviderKind::STANDARD,
    );
    let bars: Vec<PriceBar> = (13..=17)
        .map(|day| PriceBar::new(d(2022, 6, day), Micros::from_units(100)))
        .collect();

    let items: Vec<Result<FeedItem, AuxError>> = sub.feed(bars).collect();
    let last = items.last().unwrap();
    assert!(matches!(last, Err(AuxError::Configuration(_))));
    assert_eq!(items.iter().filter(|i| i.is_err()).count(), 1);

    // Nothing dated on or after the failing date was delivered.
    for item in &items[..items.len() - 1] {
        assert!(item.as_ref().unwrap().date() < d(2022, 6, 15));
    }
}

// ---------------------------------------------------------------------------
// Dividend counterpart
// ---------------------------------------------------------------------------

#[test]
fn dividend_with_zero_reference_price_aborts_on_payment() {
    let mut sub = open(
        FactorRecord::dividend(d(2022, 6, 15), Micros::new(990_000), Micros::ZERO),
        &[ProviderKind::Dividend],
    );
    let s = sub.scheduler_mut();

    assert!(s.on_new_tradable_date(d(2022, 6, 14), None).unwrap().is_empty());
    let err = s.on_new_tradable_date(d(2022, 6, 15), None).unwrap_err();
    assert!(matches!(
        err,
        AuxError::Configuration(ConfigurationError::ZeroReferencePrice {
            phase: FatalPhase::DividendPaid,
            ..
        })
    ));
}
