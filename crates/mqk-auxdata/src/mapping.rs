//! Ticker renames from the map table.

use std::sync::Arc;

use mqk_md::MapTable;
use tracing::trace;

use crate::error::AuxError;
use crate::event::AuxiliaryEvent;
use crate::provider::{EventProvider, NewTradableDate, SubscriptionContext};

/// Emits `SymbolChanged` whenever the ticker in effect differs from the one
/// last seen. Seeded with the ticker on the subscription's start date so a
/// subscription never opens with a rename for history it did not observe.
#[derive(Debug, Default)]
pub struct SymbolChangedEventProvider {
    map: Option<Arc<MapTable>>,
    current_ticker: Option<String>,
}

impl SymbolChangedEventProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_ticker(&self) -> Option<&str> {
        self.current_ticker.as_deref()
    }
}

impl EventProvider for SymbolChangedEventProvider {
    fn name(&self) -> &'static str {
        "symbol_changed"
    }

    fn initialize(&mut self, ctx: &SubscriptionContext) {
        self.current_ticker = ctx.map_table.ticker_on(ctx.start()).map(str::to_string);
        self.map = Some(Arc::clone(&ctx.map_table));
    }

    fn on_new_tradable_date(
        &mut self,
        args: &NewTradableDate<'_>,
    ) -> Result<Vec<AuxiliaryEvent>, AuxError> {
        let Some(map) = self.map.as_ref() else {
            return Ok(Vec::new());
        };
        if !map.has_coverage(args.symbol, args.date) {
            trace!(symbol = %args.symbol, date = %args.date, "no map coverage");
            return Ok(Vec::new());
        }
        let Some(ticker) = map.ticker_on(args.date) else {
            return Ok(Vec::new());
        };

        match self.current_ticker.as_deref() {
            Some(current) if current == ticker => Ok(Vec::new()),
            Some(current) => {
                let event = AuxiliaryEvent::symbol_changed(
                    args.symbol.clone(),
                    args.date,
                    current,
                    ticker,
                );
                self.current_ticker = Some(ticker.to_string());
                Ok(vec![event])
            }
            // First covered date for a subscription that started before listing.
            None => {
                self.current_ticker = Some(ticker.to_string());
                Ok(Vec::new())
            }
        }
    }
}
