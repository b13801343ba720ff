//! `mqk aux replay` scenario tests.
//!
//! Validates that:
//! - The replay prints one JSON object per line, aux events before the bar
//!   of the same date, with the split Warning priced at the prior close and
//!   the Occurred at the reference price.
//! - A zero reference price makes the command fail with
//!   CONFIG_ZERO_REFERENCE_PRICE after printing everything before it.
//! - LIVE mode refuses a symbol with no map coverage on the start date.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const MAP_CSV: &str = "date,old_ticker,new_ticker\n2000-01-03,XYZ,XYZ\n";

const BARS_CSV: &str = "date,close
2022-06-13,98
2022-06-14,99
2022-06-15,50
2022-06-16,51
2022-06-17,52
";

/// Writes `<dir>/data/usa/{factor_files,map_files}/xyz.csv`, a bar file and a
/// base config pointing at the data root. Returns (config path, bars path).
fn fixture(name: &str, factor_csv: &str) -> (PathBuf, PathBuf) {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join(name);
    let _ = fs::remove_dir_all(&dir);
    let data = dir.join("data");
    fs::create_dir_all(data.join("usa/factor_files")).unwrap();
    fs::create_dir_all(data.join("usa/map_files")).unwrap();
    fs::write(data.join("usa/factor_files/xyz.csv"), factor_csv).unwrap();
    fs::write(data.join("usa/map_files/xyz.csv"), MAP_CSV).unwrap();

    let bars = dir.join("bars.csv");
    fs::write(&bars, BARS_CSV).unwrap();

    let config = dir.join("base.yaml");
    fs::write(
        &config,
        format!(
            "data:\n  root: \"{}\"\n  market: usa\ncalendar: nyse_weekdays\n",
            data.display().to_string().replace('\\', "/")
        ),
    )
    .unwrap();
    (config, bars)
}

fn replay(config: &Path, bars: &Path, ticker: &str, extra: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("mqk").unwrap();
    cmd.args(["aux", "replay", "--config"])
        .arg(config)
        .args(["--ticker", ticker, "--start", "2022-06-13", "--end", "2022-06-17", "--bars"])
        .arg(bars)
        .args(extra);
    cmd
}

fn lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn replay_orders_aux_events_ahead_of_bars() {
    let (config, bars) = fixture(
        "cli_replay_ok",
        "date,price_factor,split_factor,reference_price\n2022-06-15,1,0.5,100\n",
    );
    let out = replay(&config, &bars, "xyz", &[]).assert().success().get_output().clone();
    let items = lines(&out.stdout);

    let summary: Vec<String> = items
        .iter()
        .map(|v| match v["item"].as_str().unwrap() {
            "aux" => format!(
                "{} {}/{}",
                v["date"].as_str().unwrap(),
                v["type"].as_str().unwrap(),
                v["phase"].as_str().unwrap()
            ),
            _ => format!("{} bar", v["date"].as_str().unwrap()),
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            "2022-06-13 bar",
            "2022-06-14 split/warning",
            "2022-06-14 bar",
            "2022-06-15 split/occurred",
            "2022-06-15 bar",
            "2022-06-16 bar",
            "2022-06-17 bar",
        ]
    );
    assert_eq!(items[1]["price"], "98.000000");
    assert_eq!(items[1]["split_factor"], "0.500000");
    assert_eq!(items[3]["price"], "100.000000");
    assert_eq!(items[3]["symbol"]["ticker"], "XYZ");
}

#[test]
fn zero_reference_price_fails_the_replay() {
    let (config, bars) = fixture(
        "cli_replay_zero_ref",
        "date,price_factor,split_factor,reference_price\n2022-06-15,1,0.5,0\n",
    );
    let out = replay(&config, &bars, "XYZ", &[])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_ZERO_REFERENCE_PRICE"))
        .stderr(predicate::str::contains("phase=split/occurred"))
        .get_output()
        .clone();

    // 06-13 bar, 06-14 warning, 06-14 bar made it out before the abort.
    let items = lines(&out.stdout);
    assert_eq!(items.len(), 3);
    assert_eq!(items[1]["phase"], "warning");
}

#[test]
fn live_mode_requires_map_coverage() {
    let (config, bars) = fixture(
        "cli_replay_live_unmapped",
        "date,price_factor,split_factor,reference_price\n2022-06-15,1,0.5,100\n",
    );
    replay(&config, &bars, "ABC", &["--mode", "LIVE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_NO_MAP_COVERAGE"));

    // Backtest tolerates it and simply emits bars.
    replay(&config, &bars, "ABC", &[])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"item\":\"aux\"").not());
}
