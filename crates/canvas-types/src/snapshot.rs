//! Sparse agent snapshots.
//!
//! A snapshot is whatever the agent sent after a turn: any field may be
//! missing, stale, or of the wrong JSON type. Decoding keeps only the fields
//! that have the expected shape, so "absent" and "mistyped" look the same to
//! the merge.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::TypeError;
use crate::item::{Item, ItemData};
use crate::plan::PlanStep;
use crate::shape::{counter_value, index_value, json_kind, str_field};
use crate::state::RootState;

/// An incoming item, payload not yet read by type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapshotItem {
    pub id: String,
    pub kind: Option<String>,
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub data: Map<String, Value>,
}

impl SnapshotItem {
    /// Read an item; `None` without a string `id`.
    pub fn from_map(map: &Map<String, Value>) -> Option<Self> {
        let owned = |key: &str| str_field(map, key).map(str::to_owned);
        Some(Self {
            id: str_field(map, "id")?.to_owned(),
            kind: owned("type"),
            name: owned("name"),
            subtitle: owned("subtitle"),
            data: map
                .get("data")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Adopt this item as-is, reading its payload by its own type tag.
    pub fn to_item(&self) -> Item {
        let kind = self.kind.clone().unwrap_or_default();
        let data = ItemData::from_map(&kind, &self.data);
        Item {
            id: self.id.clone(),
            kind,
            name: self.name.clone().unwrap_or_default(),
            subtitle: self.subtitle.clone().unwrap_or_default(),
            data,
        }
    }
}

impl From<&Item> for SnapshotItem {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            kind: Some(item.kind.clone()),
            name: Some(item.name.clone()),
            subtitle: Some(item.subtitle.clone()),
            data: item.data.to_map(),
        }
    }
}

/// A possibly-partial root state sent by the agent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Items with a string `id`, in incoming order.
    pub items: Vec<SnapshotItem>,
    /// Entries of the incoming `items` array that were skipped for lacking
    /// a string `id`. A non-zero count still marks the array as non-empty.
    pub dropped_items: usize,
    pub global_title: Option<String>,
    pub global_description: Option<String>,
    pub last_action: Option<String>,
    pub items_created: Option<u64>,
    pub plan_steps: Option<Vec<PlanStep>>,
    pub current_step_index: Option<i64>,
    pub plan_status: Option<String>,
}

impl Snapshot {
    /// Decode a snapshot from an already-parsed JSON value.
    ///
    /// Fails only when the top-level value is not an object.
    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        let map = value
            .as_object()
            .ok_or_else(|| TypeError::NotAnObject(json_kind(value)))?;
        let owned = |key: &str| str_field(map, key).map(str::to_owned);

        let entries = map.get("items").and_then(Value::as_array);
        let items: Vec<SnapshotItem> = entries
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .filter_map(SnapshotItem::from_map)
            .collect();
        let dropped_items = entries.map_or(0, Vec::len) - items.len();

        Ok(Self {
            items,
            dropped_items,
            global_title: owned("globalTitle"),
            global_description: owned("globalDescription"),
            last_action: owned("lastAction"),
            items_created: map
                .get("itemsCreated")
                .filter(|v| v.is_number())
                .map(counter_value),
            plan_steps: map
                .get("planSteps")
                .and_then(Value::as_array)
                .map(|steps| steps.iter().cloned().map(PlanStep::from).collect()),
            current_step_index: map.get("currentStepIndex").and_then(index_value),
            plan_status: owned("planStatus"),
        })
    }

    /// Parse and decode a snapshot from JSON text.
    pub fn from_json(text: &str) -> Result<Self, TypeError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| TypeError::Serialization(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Returns `true` if the snapshot carries no fields at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl From<&RootState> for Snapshot {
    fn from(state: &RootState) -> Self {
        Self {
            items: state.items.iter().map(SnapshotItem::from).collect(),
            dropped_items: 0,
            global_title: Some(state.global_title.clone()),
            global_description: Some(state.global_description.clone()),
            last_action: Some(state.last_action.clone()),
            items_created: Some(state.items_created),
            plan_steps: Some(state.plan_steps.clone()),
            current_step_index: Some(state.current_step_index),
            plan_status: Some(state.plan_status.clone()),
        }
    }
}

impl From<RootState> for Snapshot {
    fn from(state: RootState) -> Self {
        Self::from(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_decode_as_absent() {
        let snap = Snapshot::from_value(&json!({})).unwrap();
        assert!(snap.is_empty());
    }

    #[test]
    fn mistyped_fields_decode_as_absent() {
        let snap = Snapshot::from_value(&json!({
            "globalTitle": 42,
            "lastAction": null,
            "itemsCreated": "3",
            "planSteps": "none",
            "currentStepIndex": "0",
            "planStatus": false,
            "items": {"id": "1"}
        }))
        .unwrap();
        assert!(snap.is_empty());
    }

    #[test]
    fn empty_values_are_kept_distinct_from_absent() {
        let snap = Snapshot::from_value(&json!({
            "globalTitle": "",
            "planSteps": [],
            "planStatus": ""
        }))
        .unwrap();
        assert_eq!(snap.global_title.as_deref(), Some(""));
        assert_eq!(snap.plan_steps, Some(Vec::new()));
        assert_eq!(snap.plan_status.as_deref(), Some(""));
    }

    #[test]
    fn items_without_ids_are_dropped() {
        let snap = Snapshot::from_value(&json!({
            "items": [
                {"id": "1", "type": "note", "data": {"field1": "a"}},
                {"type": "note"},
                {"id": 2},
                "junk"
            ]
        }))
        .unwrap();
        assert_eq!(snap.items.len(), 1);
        assert_eq!(snap.dropped_items, 3);
        assert_eq!(snap.items[0].id, "1");
        assert_eq!(snap.items[0].kind.as_deref(), Some("note"));
        assert_eq!(snap.items[0].data.get("field1"), Some(&json!("a")));
    }

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(
            Snapshot::from_value(&json!([1, 2])).unwrap_err(),
            TypeError::NotAnObject("array")
        );
        assert!(matches!(
            Snapshot::from_json("{not json"),
            Err(TypeError::Serialization(_))
        ));
    }

    #[test]
    fn deserialize_goes_through_lenient_decoding() {
        let snap: Snapshot =
            serde_json::from_str(r#"{"itemsCreated": 4.0, "currentStepIndex": -1}"#).unwrap();
        assert_eq!(snap.items_created, Some(4));
        assert_eq!(snap.current_step_index, Some(-1));
    }

    #[test]
    fn full_state_converts_to_snapshot() {
        let mut state = RootState::new();
        state.items.push(Item::new("0001", "note", "Idea"));
        state.items_created = 1;

        let snap = Snapshot::from(&state);
        assert_eq!(snap.items.len(), 1);
        assert_eq!(snap.items[0].to_item(), state.items[0]);
        assert_eq!(snap.items_created, Some(1));
        assert_eq!(snap.current_step_index, Some(-1));
    }
}
