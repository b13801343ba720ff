//! Directory-backed table store.
//!
//! Layout (one market per store):
//!
//! ```text
//! <root>/<market>/factor_files/<ticker>.csv
//! <root>/<market>/map_files/<ticker>.csv
//! ```
//!
//! Everything is loaded once in [`TableStore::load_dir`]; resolution hands out
//! clones of the same `Arc`, so any number of subscriptions (on any number of
//! threads) read the same immutable tables.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::factor::FactorTable;
use crate::ingest_csv::{read_factor_file, read_map_file};
use crate::map::MapTable;
use crate::provider::{FactorResolver, MapResolver, SubscriptionRequest};
use crate::symbol::Symbol;

#[derive(Debug, Clone, Default)]
pub struct TableStore {
    market: String,
    factors: BTreeMap<String, Arc<FactorTable>>,
    maps: BTreeMap<String, Arc<MapTable>>,
}

impl TableStore {
    /// Empty store for `market`.
    pub fn new(market: impl AsRef<str>) -> Self {
        Self {
            market: market.as_ref().trim().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Add a factor table (keyed by its symbol's ticker).
    pub fn with_factor_table(mut self, table: FactorTable) -> Self {
        self.factors
            .insert(table.symbol().ticker().to_string(), Arc::new(table));
        self
    }

    /// Add a map table (keyed by its symbol's ticker).
    pub fn with_map_table(mut self, table: MapTable) -> Self {
        self.maps
            .insert(table.symbol().ticker().to_string(), Arc::new(table));
        self
    }

    /// Lower-cased market this store serves.
    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn factor_tables(&self) -> impl Iterator<Item = &Arc<FactorTable>> {
        self.factors.values()
    }

    pub fn map_tables(&self) -> impl Iterator<Item = &Arc<MapTable>> {
        self.maps.values()
    }

    /// Load every factor and map file for `market` under `root`.
    ///
    /// A missing `factor_files/` or `map_files/` directory is tolerated (the
    /// market simply has no such history). A file that fails to parse is an
    /// error: partial reference data is worse than none.
    pub fn load_dir(root: &Path, market: &str) -> Result<Self> {
        let mut store = TableStore::new(market);
        let market_dir = root.join(&store.market);

        for (ticker, path) in csv_files(&market_dir.join("factor_files"))? {
            let symbol = Symbol::equity(&ticker, &store.market);
            let table = read_factor_file(symbol, &path)
                .with_context(|| format!("load factor file failed: {}", path.display()))?;
            debug!(ticker = %ticker, records = table.records().len(), "loaded factor table");
            store = store.with_factor_table(table);
        }

        for (ticker, path) in csv_files(&market_dir.join("map_files"))? {
            let symbol = Symbol::equity(&ticker, &store.market);
            let table = read_map_file(symbol, &path)
                .with_context(|| format!("load map file failed: {}", path.display()))?;
            debug!(ticker = %ticker, records = table.records().len(), "loaded map table");
            store = store.with_map_table(table);
        }

        Ok(store)
    }
}

impl FactorResolver for TableStore {
    fn resolve(&self, symbol: &Symbol) -> Option<Arc<FactorTable>> {
        if symbol.market() != self.market {
            return None;
        }
        self.factors
            .get(symbol.ticker())
            .filter(|t| t.symbol() == symbol)
            .cloned()
    }
}

impl MapResolver for TableStore {
    fn resolve(&self, request: &SubscriptionRequest) -> Option<Arc<MapTable>> {
        let symbol = &request.symbol;
        if symbol.market() != self.market {
            return None;
        }
        match self.maps.get(symbol.ticker()).filter(|t| t.symbol() == symbol) {
            Some(t) => Some(Arc::clone(t)),
            None => Some(Arc::new(MapTable::empty(symbol.clone()))),
        }
    }
}

/// `(TICKER, path)` for each `*.csv` in `dir`, sorted by ticker.
fn csv_files(dir: &Path) -> Result<Vec<(String, std::path::PathBuf)>> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "reference data directory missing; skipping");
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read dir failed: {}", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("read dir entry failed: {}", dir.display()))?
            .path();
        let is_csv = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            out.push((stem.to_ascii_uppercase(), path.clone()));
        }
    }
    out.sort();
    Ok(out)
}
