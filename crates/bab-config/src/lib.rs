//! bab-config
//!
//! Layered YAML configuration for auction budget runs.
//!
//! - Documents are deep-merged in order (later documents override earlier).
//! - The merged tree is canonicalized to JSON and hashed (SHA-256 hex) so a
//!   run can record exactly which configuration it used.
//! - An unused-key guard reports leaf keys that no consumer reads, catching
//!   typos such as `use_budjet` that would otherwise silently fall back to a
//!   default.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use tracing::warn;

/// JSON pointers read by `bab_budget::BudgetSettings::from_config_json`.
/// A pointer also consumes everything below it.
pub const CONSUMED_POINTERS: &[&str] = &[
    "/auction/client_buy_id",
    "/auction/use_budget",
    "/auction/use_advertiser_adjacency",
    "/auction/short_spot_duration_secs",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Sorted, unique.
    pub consumed_prefixes: Vec<String>,
    /// Sorted, unique.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    report_unused_keys_with(CONSUMED_POINTERS, config_json, policy)
}

/// Same check against an explicit registry of consumed pointers.
pub fn report_unused_keys_with(
    consumed: &[&str],
    config_json: &Value,
    policy: UnusedKeyPolicy,
) -> Result<UnusedKeyReport> {
    let consumed_paths: Vec<Vec<String>> = consumed.iter().map(|p| pointer_tokens(p)).collect();

    let mut unused = Vec::new();
    let mut path = Vec::new();
    walk_unconsumed(config_json, &mut path, &consumed_paths, &mut unused);
    unused.sort();
    unused.dedup();

    let mut consumed_prefixes: Vec<String> = consumed_paths.iter().map(|t| join_pointer(t)).collect();
    consumed_prefixes.sort();
    consumed_prefixes.dedup();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };
    if report.is_clean() {
        return Ok(report);
    }

    let shown = &report.unused_leaf_pointers[..report.unused_leaf_pointers.len().min(12)];
    match policy {
        UnusedKeyPolicy::Fail => bail!(
            "CONFIG_UNUSED_KEYS: {} config key(s) are not read by the auction: {:?}",
            report.unused_leaf_pointers.len(),
            shown
        ),
        UnusedKeyPolicy::Warn => {
            warn!(count = report.unused_leaf_pointers.len(), keys = ?shown, "unused config keys");
            Ok(report)
        }
    }
}

/// Unescaped reference tokens of a pointer; `""` and `"/"` are the root.
fn pointer_tokens(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .filter(|t| !t.is_empty())
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect()
}

fn join_pointer(tokens: &[String]) -> String {
    if tokens.is_empty() {
        return "/".to_string();
    }
    tokens
        .iter()
        .map(|t| format!("/{}", t.replace('~', "~0").replace('/', "~1")))
        .collect()
}

/// Push the pointer of every leaf not under a consumed path.  Consumed
/// subtrees are skipped whole.
fn walk_unconsumed(
    v: &Value,
    path: &mut Vec<String>,
    consumed: &[Vec<String>],
    out: &mut Vec<String>,
) {
    if consumed.iter().any(|c| path.starts_with(c)) {
        return;
    }
    match v {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key.clone());
                walk_unconsumed(child, path, consumed, out);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                path.push(i.to_string());
                walk_unconsumed(child, path, consumed, out);
                path.pop();
            }
        }
        _ => out.push(join_pointer(path)),
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// SHA-256 hex of `canonical_json`.
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let docs = paths
        .iter()
        .map(|p| fs::read_to_string(p).with_context(|| format!("read config layer {p}")))
        .collect::<Result<Vec<_>>>()?;
    let docs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&docs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Default::default());
    for (i, raw) in yaml_docs.iter().enumerate() {
        let layer: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("config layer {i} is not valid yaml"))?;
        let layer = serde_json::to_value(layer)
            .with_context(|| format!("config layer {i} has no json form"))?;
        merge_into(&mut merged, layer);
    }

    // serde_json's default map keeps keys sorted, which makes this canonical.
    let canonical_json = serde_json::to_string(&merged).context("serialize merged config")?;
    let config_hash = hex::encode(Sha256::digest(canonical_json.as_bytes()));
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Objects merge key by key; anything else in `layer` replaces `base`.
fn merge_into(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base_map), Value::Object(layer_map)) => {
            for (key, value) in layer_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_into(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
