//! Shallow, key-level comparison of two content payloads.
//!
//! Only the top level is inspected: a change anywhere inside a nested object
//! or array is reported as a single `modified` entry carrying the whole old
//! and new sub-values. Values are compared by their serialized JSON text.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// The status of a single key when comparing two payloads.
///
/// - `Added`     -- present only in the newer payload.
/// - `Removed`   -- present only in the older payload.
/// - `Changed`   -- present in both with different serialized values.
/// - `Unchanged` -- present in both with identical serialized values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

/// A key that exists on one side only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: Value,
}

/// A key present on both sides with a different value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifiedKey {
    pub key: String,
    pub old_value: Value,
    pub new_value: Value,
}

/// Result of [`compute_key_diff`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyDiff {
    pub added: Vec<KeyValue>,
    pub removed: Vec<KeyValue>,
    pub modified: Vec<ModifiedKey>,
}

impl KeyDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Classify one key given its value on each side.
///
/// Returns `None` when the key is absent from both.
pub fn classify_key(old: Option<&Value>, new: Option<&Value>) -> Option<DiffStatus> {
    match (old, new) {
        (Some(a), Some(b)) if a.to_string() == b.to_string() => Some(DiffStatus::Unchanged),
        (Some(_), Some(_)) => Some(DiffStatus::Changed),
        (Some(_), None) => Some(DiffStatus::Removed),
        (None, Some(_)) => Some(DiffStatus::Added),
        (None, None) => None,
    }
}

/// Top-level entries of a payload, in document order.
///
/// Objects yield their keys, arrays their indices, `null` nothing. Scalars
/// have no keys to compare and yield `None`.
fn top_level_entries(value: &Value) -> Option<Vec<(String, &Value)>> {
    match value {
        Value::Object(map) => Some(map.iter().map(|(k, v)| (k.clone(), v)).collect()),
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        ),
        Value::Null => Some(Vec::new()),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}

/// Compare two payloads key by key.
///
/// If either side is a scalar the result is empty. `removed` and `modified`
/// follow the order of the older payload, `added` the order of the newer one.
pub fn compute_key_diff(old: &Value, new: &Value) -> KeyDiff {
    let (Some(old_entries), Some(new_entries)) = (top_level_entries(old), top_level_entries(new))
    else {
        return KeyDiff::default();
    };

    let old_lookup: HashMap<&str, &Value> =
        old_entries.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    let new_lookup: HashMap<&str, &Value> =
        new_entries.iter().map(|(k, v)| (k.as_str(), *v)).collect();

    let mut diff = KeyDiff::default();

    for (key, old_value) in &old_entries {
        let new_value = new_lookup.get(key.as_str()).copied();
        match classify_key(Some(*old_value), new_value) {
            Some(DiffStatus::Removed) => diff.removed.push(KeyValue {
                key: key.clone(),
                value: (*old_value).clone(),
            }),
            Some(DiffStatus::Changed) => {
                if let Some(new_value) = new_value {
                    diff.modified.push(ModifiedKey {
                        key: key.clone(),
                        old_value: (*old_value).clone(),
                        new_value: new_value.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    for (key, new_value) in &new_entries {
        if !old_lookup.contains_key(key.as_str()) {
            diff.added.push(KeyValue {
                key: key.clone(),
                value: (*new_value).clone(),
            });
        }
    }

    diff
}
