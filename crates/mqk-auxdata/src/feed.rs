//! Merged auxiliary + bar stream.
//!
//! Walks the calendar's tradable dates in `[start, end]` alongside a
//! date-sorted bar stream. For each tradable date the scheduler runs before
//! any bar on that date is released, so auxiliary events always precede the
//! bar for the same date. `last_raw_price` handed to providers is the close of
//! the most recent bar already delivered.
//!
//! Bars dated before `start` only seed the last close; bars after `end` are
//! not delivered. After the first error the iterator is exhausted.

use std::collections::VecDeque;
use std::iter::Peekable;
use std::vec;

use chrono::NaiveDate;
use mqk_md::{Micros, PriceBar};
use serde::{Deserialize, Serialize};

use crate::error::AuxError;
use crate::event::AuxiliaryEvent;
use crate::scheduler::TradableDateScheduler;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum FeedItem {
    Aux(AuxiliaryEvent),
    Bar(PriceBar),
}

impl FeedItem {
    pub fn date(&self) -> NaiveDate {
        match self {
            FeedItem::Aux(e) => e.date,
            FeedItem::Bar(b) => b.date,
        }
    }
}

/// Iterator of [`FeedItem`]s for one subscription, in delivery order.
pub struct MergedFeed<I: Iterator<Item = PriceBar>> {
    scheduler: TradableDateScheduler,
    dates: Peekable<vec::IntoIter<NaiveDate>>,
    bars: Peekable<I>,
    start: NaiveDate,
    end: NaiveDate,
    pending: VecDeque<FeedItem>,
    last_close: Option<Micros>,
    done: bool,
}

impl<I: Iterator<Item = PriceBar>> MergedFeed<I> {
    /// Merge `scheduler` output with `bars`, which must be sorted by date.
    pub fn new(scheduler: TradableDateScheduler, bars: I) -> Self {
        let ctx = scheduler.context();
        let (start, end) = (ctx.request.start, ctx.request.end);
        let dates = ctx.calendar.tradable_dates(start, end);
        Self {
            scheduler,
            dates: dates.into_iter().peekable(),
            bars: bars.peekable(),
            start,
            end,
            pending: VecDeque::new(),
            last_close: None,
            done: false,
        }
    }

    /// Scheduler driving this feed (for inspecting abort state).
    pub fn scheduler(&self) -> &TradableDateScheduler {
        &self.scheduler
    }

    fn seed_from_early_bars(&mut self) {
        while let Some(bar) = self.bars.next_if(|b| b.date < self.start) {
            self.last_close = Some(bar.close);
        }
    }
}

impl<I: Iterator<Item = PriceBar>> Iterator for MergedFeed<I> {
    type Item = Result<FeedItem, AuxError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(item) = self.pending.pop_front() {
                return Some(Ok(item));
            }
            self.seed_from_early_bars();

            let end = self.end;
            let next_date = self.dates.peek().copied();
            let next_bar_date = self.bars.peek().map(|b| b.date).filter(|d| *d <= end);

            let step_date = match (next_date, next_bar_date) {
                (Some(d), Some(b)) if d <= b => Some(d),
                (Some(d), None) => Some(d),
                (_, Some(_)) => None,
                (None, None) => {
                    self.done = true;
                    return None;
                }
            };

            match step_date {
                Some(date) => {
                    self.dates.next();
                    match self.scheduler.on_new_tradable_date(date, self.last_close) {
                        Ok(events) => self.pending.extend(events.into_iter().map(FeedItem::Aux)),
                        Err(e) => {
                            self.done = true;
                            return Some(Err(e));
                        }
                    }
                }
                None => {
                    let bar = self.bars.next()?;
                    self.last_close = Some(bar.close);
                    return Some(Ok(FeedItem::Bar(bar)));
                }
            }
        }
    }
}
