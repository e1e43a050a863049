//! Item-collection merge with deletion detection.

use canvas_types::{Item, SnapshotItem};
use tracing::debug;

use crate::keyed::merge_by_id;
use crate::payload::merge_item_data;
use crate::primitives::{deleted_id, prefer_non_empty};

/// Merge incoming items into the cached collection.
///
/// Cached order is preserved and new ids are appended in incoming order. If
/// `last_action` is a `deleted:<id>` tag, that id is removed even when the
/// incoming snapshot still carries it.
pub fn merge_items(cached: &[Item], incoming: &[SnapshotItem], last_action: &str) -> Vec<Item> {
    let deleted = deleted_id(last_action);
    if let Some(id) = deleted {
        debug!(id, "applying deletion tag");
    }

    let merged = merge_by_id(cached, incoming, deleted, merge_item, SnapshotItem::to_item);
    debug!(
        cached = cached.len(),
        incoming = incoming.len(),
        merged = merged.len(),
        "items merged"
    );
    merged
}

/// Merge one incoming item into its cached counterpart.
///
/// The incoming type tag wins when non-empty and selects the payload strategy;
/// name and subtitle prefer non-empty text.
pub fn merge_item(prev: &Item, next: &SnapshotItem) -> Item {
    let kind = next
        .kind
        .as_deref()
        .filter(|k| !k.is_empty())
        .unwrap_or(&prev.kind)
        .to_owned();
    let data = merge_item_data(&prev.data, &next.data, &kind);

    Item {
        id: prev.id.clone(),
        name: prefer_non_empty(next.name.as_deref(), &prev.name),
        subtitle: prefer_non_empty(next.subtitle.as_deref(), &prev.subtitle),
        kind,
        data,
    }
}
