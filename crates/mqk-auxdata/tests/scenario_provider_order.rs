//! Provider registration order scenario tests.
//!
//! Validates that:
//! - With providers registered as `[Split, Dividend]` and both emitting on
//!   the same date, every Split-provider event precedes every
//!   Dividend-provider event for that date.
//! - Reversing the registration order reverses the output order.
//! - Within the split provider, Occurred precedes a fresh Warning.

use std::sync::Arc;

use chrono::NaiveDate;
use mqk_auxdata::{build_providers, AuxEventKind, AuxiliaryEvent, ProviderKind, Subscription};
use mqk_md::{
    CalendarSpec, FactorRecord, FactorTable, MapRecord, MapTable, Micros, SubscriptionRequest,
    Symbol, TableStore,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn xyz() -> Symbol {
    Symbol::equity("XYZ", "usa")
}

/// 06-15 carries a split and a dividend on the same row; 06-16 carries a
/// second split so the 06-15 split output is Occurred followed by Warning.
fn store() -> TableStore {
    let records = vec![
        FactorRecord {
            date: d(2022, 6, 15),
            price_factor: Micros::new(980_000),
            split_factor: Micros::new(500_000),
            reference_price: Micros::from_units(100),
        },
        FactorRecord::split(
            d(2022, 6, 16),
            Micros::from_units(2),
            Micros::from_units(48),
        ),
    ];
    TableStore::new("usa")
        .with_factor_table(FactorTable::new(xyz(), records).unwrap())
        .with_map_table(
            MapTable::new(xyz(), vec![MapRecord::new(d(2000, 1, 3), "XYZ", "XYZ")]).unwrap(),
        )
}

fn run_to_0615(kinds: &[ProviderKind]) -> Vec<AuxiliaryEvent> {
    let store = store();
    let mut sub = Subscription::open(
        SubscriptionRequest::new(xyz(), d(2022, 6, 14), d(2022, 6, 30)),
        &store,
        &store,
        Arc::new(CalendarSpec::NyseWeekdays),
        build_providers(kinds),
    )
    .unwrap();
    let s = sub.scheduler_mut();
    s.on_new_tradable_date(d(2022, 6, 14), Some(Micros::from_units(99)))
        .unwrap();
    s.on_new_tradable_date(d(2022, 6, 15), Some(Micros::from_units(98)))
        .unwrap()
}

fn labels(events: &[AuxiliaryEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.kind.label()).collect()
}

// ---------------------------------------------------------------------------
// Scenario 4
// ---------------------------------------------------------------------------

#[test]
fn split_events_precede_dividend_events() {
    let out = run_to_0615(&[ProviderKind::Split, ProviderKind::Dividend]);
    assert_eq!(labels(&out), vec!["split/occurred", "split/warning", "dividend"]);

    let AuxEventKind::Dividend {
        distribution,
        reference_price,
    } = &out[2].kind
    else {
        panic!("expected dividend, got {:?}", out[2]);
    };
    assert_eq!(*reference_price, Micros::from_units(100));
    assert_eq!(*distribution, Micros::from_units(2));
}

#[test]
fn reversed_registration_reverses_output() {
    let out = run_to_0615(&[ProviderKind::Dividend, ProviderKind::Split]);
    assert_eq!(labels(&out), vec!["dividend", "split/occurred", "split/warning"]);
}
