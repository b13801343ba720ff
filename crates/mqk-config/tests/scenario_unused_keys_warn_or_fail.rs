//! Unused config key scenario tests.
//!
//! Validates that:
//! 1) Unused keys are reported under `Warn` without an error.
//! 2) Unused keys fail under `Fail` with a `CONFIG_UNUSED_KEYS` message.
//! 3) Every key the feed settings read is considered consumed.
//! 4) Unused pointers come out in deterministic order.

use mqk_config::{load_layered_yaml_from_strings, report_unused_keys, ConfigMode, UnusedKeyPolicy};

const FULL_LIVE_YAML: &str = r#"
data:
  root: "/srv/refdata"
  market: "usa"
calendar: "always_on"
providers: ["split", "dividend"]
live:
  require_map_coverage: false
"#;

#[test]
fn warn_mode_reports_unused_keys_without_error() {
    let yaml = r#"
data:
  root: "/srv/refdata"
  source: "vendor_x"
unused_section:
  foo: 123
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let report =
        report_unused_keys(ConfigMode::Backtest, &loaded.config_json, UnusedKeyPolicy::Warn)
            .expect("warn mode must not error");

    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/data/source".to_string(), "/unused_section/foo".to_string()]
    );
    assert_eq!(report.mode, "BACKTEST");
}

#[test]
fn fail_mode_errors_on_unused_keys() {
    let yaml = r#"
data:
  root: "/srv/refdata"
unused_section:
  foo: 1
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let result = report_unused_keys(ConfigMode::Live, &loaded.config_json, UnusedKeyPolicy::Fail);

    let msg = format!("{:?}", result.err().unwrap());
    assert!(msg.contains("CONFIG_UNUSED_KEYS"), "got: {msg}");
    assert!(msg.contains("mode=LIVE"));
}

#[test]
fn full_live_config_is_clean() {
    let loaded = load_layered_yaml_from_strings(&[FULL_LIVE_YAML]).unwrap();
    let report =
        report_unused_keys(ConfigMode::Live, &loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean(), "unexpected unused keys: {:?}", report.unused_leaf_pointers);
}

#[test]
fn deterministic_unused_pointer_ordering() {
    let yaml = r#"
unused:
  b: 2
  a: 1
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let report =
        report_unused_keys(ConfigMode::Backtest, &loaded.config_json, UnusedKeyPolicy::Warn)
            .unwrap();
    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/unused/a".to_string(), "/unused/b".to_string()]
    );
}
