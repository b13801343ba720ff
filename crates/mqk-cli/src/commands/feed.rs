//! Auxiliary-event feed command handlers.
//!
//! Covers `mqk aux replay` and `mqk aux tables`.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use mqk_auxdata::Subscription;
use mqk_md::{ingest_csv, SubscriptionRequest, Symbol, TableStore, TradingCalendar};
use tracing::info;

use super::{load_feed_settings, parse_config_mode, parse_date_arg};

pub struct ReplayArgs {
    pub config_paths: Vec<String>,
    pub ticker: String,
    pub start: String,
    pub end: String,
    pub bars: Option<String>,
    pub mode: String,
    pub strict_keys: bool,
}

/// Execute `mqk aux replay`: one JSON object per feed item on stdout.
///
/// Items already printed stay printed when the feed aborts; the error is
/// returned afterwards so the exit code is non-zero.
pub fn replay(args: ReplayArgs) -> Result<()> {
    let mode = parse_config_mode(&args.mode)?;
    let start = parse_date_arg("start", &args.start)?;
    let end = parse_date_arg("end", &args.end)?;
    if end < start {
        bail!("--end {end} is before --start {start}");
    }

    let (_loaded, settings) = load_feed_settings(&args.config_paths, mode, args.strict_keys)?;
    let store = TableStore::load_dir(&settings.data_root, &settings.market)?;

    let bars = match &args.bars {
        Some(p) => ingest_csv::read_bars_file(Path::new(p))
            .with_context(|| format!("load bars failed: {p}"))?,
        None => Vec::new(),
    };

    let symbol = Symbol::equity(&args.ticker, &settings.market);
    let calendar: Arc<dyn TradingCalendar> = Arc::new(settings.calendar);
    let sub = Subscription::open(
        SubscriptionRequest::new(symbol.clone(), start, end),
        &store,
        &store,
        calendar,
        settings.build_providers(),
    )?;
    if settings.require_map_coverage {
        sub.require_map_coverage()?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut items = 0usize;
    for item in sub.feed(bars) {
        let item = item.with_context(|| format!("feed aborted for {symbol}"))?;
        let line = serde_json::to_string(&item).context("serialize feed item failed")?;
        writeln!(out, "{line}").context("write stdout failed")?;
        items += 1;
    }
    out.flush().context("flush stdout failed")?;

    info!(symbol = %symbol, items, "replay complete");
    Ok(())
}

/// Execute `mqk aux tables`: table counts plus every split, rename and
/// delisting record, one per line.
pub fn tables(config_paths: &[String]) -> Result<()> {
    let (_loaded, settings) =
        load_feed_settings(config_paths, mqk_config::ConfigMode::Backtest, false)?;
    let store = TableStore::load_dir(&settings.data_root, &settings.market)?;

    println!(
        "market={} factor_tables={} map_tables={}",
        store.market(),
        store.factor_tables().count(),
        store.map_tables().count()
    );

    for table in store.factor_tables() {
        for r in table.splits() {
            println!(
                "split ticker={} date={} split_factor={} reference_price={}",
                table.symbol().ticker(),
                r.date,
                r.split_factor,
                r.reference_price
            );
        }
    }

    for table in store.map_tables() {
        for r in table.records().iter().filter(|r| r.is_rename()) {
            println!(
                "rename ticker={} date={} old={} new={}",
                table.symbol().ticker(),
                r.date,
                r.old_ticker,
                r.new_ticker
            );
        }
        if let Some(date) = table.delisting_date() {
            println!("delisting ticker={} date={}", table.symbol().ticker(), date);
        }
    }

    Ok(())
}
