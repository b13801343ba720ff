//! Typed feed settings read from canonical config JSON (produced by mqk-config).

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use mqk_md::CalendarSpec;
use serde_json::Value;

use crate::provider::{build_providers, EventProvider, ProviderKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedSettings {
    /// Directory holding `<market>/factor_files` and `<market>/map_files`.
    pub data_root: PathBuf,
    pub market: String,
    pub calendar: CalendarSpec,
    /// Provider registration order.
    pub providers: Vec<ProviderKind>,
    /// Live only: refuse subscriptions whose map table misses the start date.
    pub require_map_coverage: bool,
}

impl FeedSettings {
    /// Build from canonical config JSON.
    ///
    /// Required:
    /// - data.root
    ///
    /// Optional:
    /// - data.market (default "usa")
    /// - calendar (default "nyse_weekdays")
    /// - providers (default [symbol_changed, split, dividend, delisting])
    /// - live.require_map_coverage (LIVE only; default true)
    pub fn from_config_json(cfg: &Value, live: bool) -> Result<Self> {
        let data_root = cfg
            .pointer("/data/root")
            .and_then(Value::as_str)
            .context("config missing data.root")?;

        let market = match cfg.pointer("/data/market") {
            None | Some(Value::Null) => "usa".to_string(),
            Some(v) => v
                .as_str()
                .context("data.market must be a string")?
                .trim()
                .to_ascii_lowercase(),
        };

        let calendar = match cfg.pointer("/calendar") {
            None | Some(Value::Null) => CalendarSpec::NyseWeekdays,
            Some(v) => {
                let s = v.as_str().context("calendar must be a string")?;
                CalendarSpec::parse(s).ok_or_else(|| anyhow!("unknown calendar '{s}'"))?
            }
        };

        let providers = match cfg.pointer("/providers") {
            None | Some(Value::Null) => ProviderKind::STANDARD.to_vec(),
            Some(Value::Array(items)) => {
                let mut kinds = Vec::with_capacity(items.len());
                for item in items {
                    let s = item.as_str().context("providers entries must be strings")?;
                    let kind =
                        ProviderKind::parse(s).ok_or_else(|| anyhow!("unknown provider '{s}'"))?;
                    if kinds.contains(&kind) {
                        return Err(anyhow!("provider '{}' listed twice", kind.as_str()));
                    }
                    kinds.push(kind);
                }
                kinds
            }
            Some(_) => return Err(anyhow!("providers must be a list")),
        };

        let require_map_coverage = if live {
            match cfg.pointer("/live/require_map_coverage") {
                None | Some(Value::Null) => true,
                Some(v) => v
                    .as_bool()
                    .context("live.require_map_coverage must be a bool")?,
            }
        } else {
            false
        };

        Ok(Self {
            data_root: PathBuf::from(data_root),
            market,
            calendar,
            providers,
            require_map_coverage,
        })
    }

    pub fn build_providers(&self) -> Vec<Box<dyn EventProvider>> {
        build_providers(&self.providers)
    }
}
