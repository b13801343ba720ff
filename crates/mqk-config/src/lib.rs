//! Layered YAML configuration for the auxiliary-event feed.
//!
//! Documents are deep-merged in order (later layers override earlier ones),
//! converted to JSON, serialized canonically and hashed. The hash identifies
//! the exact reference-data setup a replay ran with.

use std::fs;

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

mod consumption;

pub use consumption::{
    consumed_pointers_for_mode, report_unused_keys, ConfigMode, UnusedKeyPolicy, UnusedKeyReport,
};

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// SHA-256 of `canonical_json`, lowercase hex.
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::with_capacity(paths.len());
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }
    let doc_refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for (i, raw) in yaml_docs.iter().enumerate() {
        let v_yaml: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml in layer {i}"))?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Objects merge key by key; anything else (scalars, lists) is replaced
/// wholesale by the later layer. A `null` in a later layer clears the key.
fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

/// Compact serialization. `serde_json::Map` is a `BTreeMap` here (no
/// `preserve_order`), so object keys come out sorted at every depth.
fn canonicalize_json(v: &Value) -> Result<String> {
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layer_replaces_lists_and_merges_maps() {
        let base = "data: {root: /a, market: usa}\nproviders: [split, dividend]\n";
        let overlay = "data: {root: /b}\nproviders: [split]\n";
        let cfg = load_layered_yaml_from_strings(&[base, overlay]).unwrap();
        assert_eq!(
            cfg.canonical_json,
            r#"{"data":{"market":"usa","root":"/b"},"providers":["split"]}"#
        );
    }

    #[test]
    fn invalid_layer_is_named() {
        let err = load_layered_yaml_from_strings(&["a: 1", "b: [unclosed"]).unwrap_err();
        assert!(format!("{err:#}").contains("layer 1"));
    }
}
