//! Order-preserving list reconciliation by stable id.

use std::collections::HashMap;

use canvas_types::{ChartMetric, ChecklistEntry, Item, SnapshotItem};
use serde_json::{Map, Value};

/// An entry with a stable string id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl<T: Keyed + ?Sized> Keyed for &T {
    fn key(&self) -> &str {
        (**self).key()
    }
}

impl Keyed for Item {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for SnapshotItem {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for ChecklistEntry {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for ChartMetric {
    fn key(&self) -> &str {
        &self.id
    }
}

// Raw incoming entries. Callers shape-check for a string `id` first.
impl Keyed for Map<String, Value> {
    fn key(&self) -> &str {
        self.get("id").and_then(Value::as_str).unwrap_or_default()
    }
}

/// Merge `incoming` into `cached` by id.
///
/// Output order is the cached order, with entries matched by id replaced by
/// `merge(cached, incoming)`, followed by unmatched incoming entries passed
/// through `adopt` in incoming order. When an id repeats in `incoming`, the
/// last occurrence wins but the first occurrence fixes its position. An
/// `excluded` id is dropped from both sides.
///
/// The id index lives only for the duration of the call.
pub fn merge_by_id<T, I>(
    cached: &[T],
    incoming: &[I],
    excluded: Option<&str>,
    merge: impl Fn(&T, &I) -> T,
    adopt: impl Fn(&I) -> T,
) -> Vec<T>
where
    T: Keyed + Clone,
    I: Keyed,
{
    let mut pending: HashMap<&str, &I> = HashMap::with_capacity(incoming.len());
    for entry in incoming {
        pending.insert(entry.key(), entry);
    }
    if let Some(id) = excluded {
        pending.remove(id);
    }

    let mut merged = Vec::with_capacity(cached.len() + pending.len());
    for prev in cached {
        if excluded == Some(prev.key()) {
            continue;
        }
        match pending.remove(prev.key()) {
            Some(next) => merged.push(merge(prev, next)),
            None => merged.push(prev.clone()),
        }
    }

    for entry in incoming {
        if let Some(next) = pending.remove(entry.key()) {
            merged.push(adopt(next));
        }
    }

    merged
}
