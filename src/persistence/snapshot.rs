//! Canonical snapshots for change detection
//!
//! A snapshot is the persistable draft rendered as JSON with bookkeeping keys
//! removed and object keys sorted at every depth, so two drafts that differ
//! only in ids or field insertion order produce the same string.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::serializer::serialize;
use crate::draft::OfferDraft;

/// Keys that never count as a content change
const BOOKKEEPING_KEYS: &[&str] = &["draft_id", "edit_target_id", "origin_status", "stripped"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 of the canonical string, for logs
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Short fingerprint prefix for log lines
    pub fn short(&self) -> String {
        self.fingerprint().chars().take(12).collect()
    }
}

pub fn snapshot(draft: &OfferDraft) -> Snapshot {
    let value = match serde_json::to_value(serialize(draft)) {
        Ok(Value::Object(mut map)) => {
            for key in BOOKKEEPING_KEYS {
                map.remove(*key);
            }
            canonicalize(Value::Object(map))
        }
        Ok(other) => canonicalize(other),
        Err(e) => {
            // Unreachable for OfferDraft; degrade to an always-different snapshot
            tracing::warn!(error = %e, "Failed to snapshot draft");
            return Snapshot(format!("unserializable:{e}"));
        }
    };
    Snapshot(value.to_string())
}

/// Whether `draft` differs from the `prior` baseline. No baseline counts as changed.
pub fn has_changed(draft: &OfferDraft, prior: Option<&Snapshot>) -> bool {
    match prior {
        None => true,
        Some(prior) => snapshot(draft) != *prior,
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, canonicalize(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
