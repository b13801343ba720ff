//! Command handler modules for mqk-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod feed;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use mqk_auxdata::FeedSettings;
use mqk_config::{ConfigMode, LoadedConfig, UnusedKeyPolicy};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Parse a CLI `--mode` string into a [`ConfigMode`].
pub fn parse_config_mode(mode: &str) -> Result<ConfigMode> {
    ConfigMode::parse(mode)
        .with_context(|| format!("invalid --mode '{mode}'. expected one of: BACKTEST | LIVE"))
}

/// Parse a `--start` / `--end` date argument.
pub fn parse_date_arg(flag: &str, raw: &str) -> Result<NaiveDate> {
    mqk_md::ingest_csv::parse_date(raw)
        .with_context(|| format!("invalid --{flag} '{raw}'. expected YYYY-MM-DD"))
}

/// Load layered config, run the unused-key guard, and read feed settings.
pub fn load_feed_settings(
    config_paths: &[String],
    mode: ConfigMode,
    strict_keys: bool,
) -> Result<(LoadedConfig, FeedSettings)> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = mqk_config::load_layered_yaml(&path_refs)?;
    info!(config_hash = %loaded.config_hash, mode = mode.as_str(), "config loaded");

    let policy = if strict_keys {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = mqk_config::report_unused_keys(mode, &loaded.config_json, policy)?;
    for leaf in &report.unused_leaf_pointers {
        warn!(leaf = %leaf, "unused config key");
    }

    let settings = FeedSettings::from_config_json(&loaded.config_json, mode.is_live())
        .context("invalid feed settings")?;
    Ok((loaded, settings))
}
