//! Merge rules for advertiser profile blobs.
//!
//! Each sync run scrapes several channels in parallel and folds the results
//! into the advertiser's existing `profile` JSONB column. The rules are
//! deliberately conservative: a sync must never erase data a previous sync
//! (or a human) put there.
//!
//! - Objects merge per key, recursively.
//! - Arrays are a union: incoming elements are appended unless already
//!   present. Object elements are matched by an identity key (`id`, `url`,
//!   or `username`, first one present); matched pairs are merged in place.
//!   Non-object elements match by whole-value equality.
//! - Non-null incoming scalars overwrite.
//! - Incoming `null` never erases an existing value.

use serde_json::Value;

/// Keys that identify an object element inside a profile array, in lookup
/// order. Scraped collections (posts, linked accounts) carry at least one.
const IDENTITY_KEYS: [&str; 3] = ["id", "url", "username"];

/// Merge `incoming` into `existing` in place.
pub fn merge_profile(existing: &mut Value, incoming: &Value) {
    match (existing, incoming) {
        (Value::Object(base), Value::Object(update)) => {
            for (key, incoming_value) in update {
                if incoming_value.is_null() {
                    continue;
                }
                match base.entry(key.clone()) {
                    serde_json::map::Entry::Occupied(mut entry) => {
                        merge_profile(entry.get_mut(), incoming_value);
                    }
                    serde_json::map::Entry::Vacant(entry) => {
                        entry.insert(incoming_value.clone());
                    }
                }
            }
        }
        (Value::Array(base), Value::Array(update)) => merge_arrays(base, update),
        (existing, incoming) => {
            if !incoming.is_null() {
                *existing = incoming.clone();
            }
        }
    }
}

/// Union `update` into `base` with dedup.
fn merge_arrays(base: &mut Vec<Value>, update: &[Value]) {
    for incoming in update {
        if incoming.is_null() {
            continue;
        }
        match identity_of(incoming) {
            Some((key, id)) => {
                // Keyed object: merge into the matching element, else append.
                let matched = base
                    .iter_mut()
                    .find(|e| e.get(key).is_some_and(|v| v == id));
                match matched {
                    Some(existing) => merge_profile(existing, incoming),
                    None => base.push(incoming.clone()),
                }
            }
            None => {
                if !base.contains(incoming) {
                    base.push(incoming.clone());
                }
            }
        }
    }
}

/// The identity key/value of an object element, if it has one.
fn identity_of(value: &Value) -> Option<(&'static str, &Value)> {
    let obj = value.as_object()?;
    IDENTITY_KEYS
        .iter()
        .find_map(|&key| obj.get(key).filter(|v| !v.is_null()).map(|v| (key, v)))
}
