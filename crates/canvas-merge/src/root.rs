use canvas_types::{RootState, Snapshot};
use tracing::debug;

use crate::items::merge_items;
use crate::primitives::prefer_non_empty;

/// Reconcile an incoming agent snapshot against the cached root state.
///
/// - Title, description and `last_action` prefer non-empty text.
/// - `items_created` is the max of both sides.
/// - Plan fields are agent-owned: any well-shaped incoming value replaces the
///   cached one, including an empty list or empty status.
/// - Items are merged only when the snapshot's `items` array is non-empty,
///   counting entries skipped for lacking an id. An empty or missing list
///   means "no item changes", so a deletion tag alone does not remove
///   anything.
pub fn merge_agent_state_snapshots(cached: &RootState, incoming: &Snapshot) -> RootState {
    let items = if incoming.items.is_empty() && incoming.dropped_items == 0 {
        cached.items.clone()
    } else {
        let tag = incoming
            .last_action
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(&cached.last_action);
        merge_items(&cached.items, &incoming.items, tag)
    };

    let merged = RootState {
        items,
        global_title: prefer_non_empty(incoming.global_title.as_deref(), &cached.global_title),
        global_description: prefer_non_empty(
            incoming.global_description.as_deref(),
            &cached.global_description,
        ),
        last_action: prefer_non_empty(incoming.last_action.as_deref(), &cached.last_action),
        items_created: cached
            .items_created
            .max(incoming.items_created.unwrap_or(0)),
        plan_steps: incoming
            .plan_steps
            .clone()
            .unwrap_or_else(|| cached.plan_steps.clone()),
        current_step_index: incoming
            .current_step_index
            .unwrap_or(cached.current_step_index),
        plan_status: incoming
            .plan_status
            .clone()
            .unwrap_or_else(|| cached.plan_status.clone()),
    };

    debug!(
        items = merged.items.len(),
        items_created = merged.items_created,
        last_action = %merged.last_action,
        "snapshot reconciled"
    );
    merged
}
