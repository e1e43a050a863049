//! Per-type payload merge.
//!
//! Each payload shape knows how to fold an incoming raw payload into itself
//! via [`Reconcile`]. [`merge_item_data`] picks the strategy from the item's
//! resolved type tag; unknown tags use the opaque key-by-key fallback.

use canvas_types::shape::{
    bool_field, coerce_to_string, counter_field, keyed_entries, str_field, string_list,
    CHECKLIST_KEYS, METRIC_KEYS,
};
use canvas_types::{
    ChartData, ChartMetric, ChecklistEntry, EntityData, ItemData, MetricValue, NoteData,
    ProjectData,
};
use serde_json::{Map, Value};

use crate::keyed::merge_by_id;
use crate::primitives::prefer_non_empty;

/// A payload that can absorb an incoming, possibly partial, raw payload.
pub trait Reconcile: Sized {
    /// The merged payload. `self` is the cached value and is left untouched.
    fn reconcile(&self, incoming: &Map<String, Value>) -> Self;
}

/// Merge an incoming raw payload into a cached one, dispatching on `kind`.
///
/// `kind` is the item's resolved type tag. If the cached payload was read as
/// a different type, it is re-read as `kind` first.
pub fn merge_item_data(cached: &ItemData, incoming: &Map<String, Value>, kind: &str) -> ItemData {
    match cached.for_kind(kind).as_ref() {
        ItemData::Project(data) => ItemData::Project(data.reconcile(incoming)),
        ItemData::Entity(data) => ItemData::Entity(data.reconcile(incoming)),
        ItemData::Note(data) => ItemData::Note(data.reconcile(incoming)),
        ItemData::Chart(data) => ItemData::Chart(data.reconcile(incoming)),
        ItemData::Opaque(data) => ItemData::Opaque(data.reconcile(incoming)),
    }
}

impl Reconcile for ProjectData {
    fn reconcile(&self, incoming: &Map<String, Value>) -> Self {
        let field4 = match incoming
            .get("field4")
            .and_then(|v| keyed_entries(v, CHECKLIST_KEYS))
        {
            Some(entries) => merge_by_id(
                &self.field4,
                &entries,
                None,
                |prev, next| ChecklistEntry {
                    id: prev.id.clone(),
                    text: prefer_non_empty(str_field(next, "text"), &prev.text),
                    done: bool_field(next, "done").unwrap_or(prev.done),
                    proposed: bool_field(next, "proposed").unwrap_or(prev.proposed),
                },
                |next| ChecklistEntry::from_map(next).unwrap_or_default(),
            ),
            None => self.field4.clone(),
        };

        Self {
            field1: prefer_non_empty(str_field(incoming, "field1"), &self.field1),
            field2: prefer_non_empty(str_field(incoming, "field2"), &self.field2),
            field3: prefer_non_empty(str_field(incoming, "field3"), &self.field3),
            field4,
            field4_id: self.field4_id.max(counter_field(incoming, "field4_id")),
        }
    }
}

impl Reconcile for EntityData {
    fn reconcile(&self, incoming: &Map<String, Value>) -> Self {
        Self {
            field1: prefer_non_empty(str_field(incoming, "field1"), &self.field1),
            field2: prefer_non_empty(str_field(incoming, "field2"), &self.field2),
            field3: replacement_list(incoming.get("field3")).unwrap_or_else(|| self.field3.clone()),
            field3_options: replacement_list(incoming.get("field3_options"))
                .unwrap_or_else(|| self.field3_options.clone()),
        }
    }
}

impl Reconcile for NoteData {
    fn reconcile(&self, incoming: &Map<String, Value>) -> Self {
        Self {
            field1: prefer_non_empty(str_field(incoming, "field1"), &self.field1),
        }
    }
}

impl Reconcile for ChartData {
    fn reconcile(&self, incoming: &Map<String, Value>) -> Self {
        let field1 = match incoming
            .get("field1")
            .and_then(|v| keyed_entries(v, METRIC_KEYS))
        {
            Some(entries) => merge_by_id(
                &self.field1,
                &entries,
                None,
                |prev, next| ChartMetric {
                    id: prev.id.clone(),
                    label: prefer_non_empty(str_field(next, "label"), &prev.label),
                    value: next
                        .get("value")
                        .and_then(MetricValue::from_value)
                        .unwrap_or(prev.value),
                },
                |next| ChartMetric::from_map(next).unwrap_or_default(),
            ),
            None => self.field1.clone(),
        };

        Self {
            field1,
            field1_id: self.field1_id.max(counter_field(incoming, "field1_id")),
        }
    }
}

/// Fallback for payloads of unknown types.
///
/// Only keys present in `incoming` are touched:
/// - strings prefer non-empty over the existing value read as text, so `""`
///   lands only where the existing value is absent or already blank;
/// - non-empty arrays replace, empty ones keep the existing value (or `[]`);
/// - numbers always replace;
/// - booleans, nulls and objects are ignored.
impl Reconcile for Map<String, Value> {
    fn reconcile(&self, incoming: &Map<String, Value>) -> Self {
        let mut out = self.clone();
        for (key, value) in incoming {
            match value {
                Value::String(s) => {
                    let existing = out.get(key).map(coerce_to_string).unwrap_or_default();
                    out.insert(key.clone(), Value::String(prefer_non_empty(Some(s), &existing)));
                }
                Value::Array(entries) if !entries.is_empty() => {
                    out.insert(key.clone(), value.clone());
                }
                Value::Array(_) => {
                    if out.get(key).map_or(true, Value::is_null) {
                        out.insert(key.clone(), Value::Array(Vec::new()));
                    }
                }
                Value::Number(_) => {
                    out.insert(key.clone(), value.clone());
                }
                Value::Null | Value::Bool(_) | Value::Object(_) => {}
            }
        }
        out
    }
}

/// A whole-list replacement: only an incoming array with at least one string
/// counts. Non-string elements are skipped.
fn replacement_list(value: Option<&Value>) -> Option<Vec<String>> {
    value.and_then(string_list).filter(|list| !list.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn project(value: Value) -> ProjectData {
        ProjectData::from_map(&raw(value))
    }

    fn chart(value: Value) -> ChartData {
        ChartData::from_map(&raw(value))
    }

    #[test]
    fn project_text_fields_prefer_non_empty() {
        let cached = project(json!({"field1": "scope", "field2": "Option A", "field3": "2024-05-01"}));
        let merged = cached.reconcile(&raw(json!({"field1": "", "field2": "Option B", "field3": 20240501})));
        assert_eq!(merged.field1, "scope");
        assert_eq!(merged.field2, "Option B");
        assert_eq!(merged.field3, "2024-05-01");
    }

    #[test]
    fn checklist_merges_by_id() {
        let cached = project(json!({
            "field4": [
                {"id": "1", "text": "draft brief", "done": false, "proposed": true},
                {"id": "2", "text": "review", "done": false, "proposed": false}
            ],
            "field4_id": 2
        }));
        let merged = cached.reconcile(&raw(json!({
            "field4": [
                {"id": "2", "text": "", "done": "yes"},
                {"id": "1", "text": "final brief", "done": true, "proposed": false},
                {"id": "3", "text": "ship"}
            ],
            "field4_id": 3
        })));

        assert_eq!(
            merged.field4,
            vec![
                ChecklistEntry { id: "1".into(), text: "final brief".into(), done: true, proposed: false },
                ChecklistEntry { id: "2".into(), text: "review".into(), done: false, proposed: false },
                ChecklistEntry { id: "3".into(), text: "ship".into(), done: false, proposed: false },
            ]
        );
        assert_eq!(merged.field4_id, 3);
    }

    #[test]
    fn malformed_checklist_keeps_cached() {
        let cached = project(json!({"field4": [{"id": "1", "text": "keep"}], "field4_id": 1}));
        for incoming in [
            json!({"field4": [{"id": "1"}]}),
            json!({"field4": "none"}),
            json!({"field4": [null]}),
            json!({}),
        ] {
            let merged = cached.reconcile(&raw(incoming));
            assert_eq!(merged.field4, cached.field4);
        }
    }

    #[test]
    fn project_counter_never_decreases() {
        let cached = project(json!({"field4_id": 5}));
        assert_eq!(cached.reconcile(&raw(json!({"field4_id": 2}))).field4_id, 5);
        assert_eq!(cached.reconcile(&raw(json!({"field4_id": "9"}))).field4_id, 5);
        assert_eq!(cached.reconcile(&raw(json!({"field4_id": 9}))).field4_id, 9);
    }

    #[test]
    fn entity_lists_replace_only_when_non_empty() {
        let cached = EntityData::from_map(&raw(json!({
            "field1": "Acme",
            "field3": ["Tag 1"],
            "field3_options": ["Tag 1", "Tag 2"]
        })));

        let unchanged = cached.reconcile(&raw(json!({"field3": [], "field3_options": "Tag 3"})));
        assert_eq!(unchanged, cached);

        let replaced = cached.reconcile(&raw(json!({"field3": ["Tag 2"], "field3_options": ["A", "B"]})));
        assert_eq!(replaced.field3, vec!["Tag 2"]);
        assert_eq!(replaced.field3_options, vec!["A", "B"]);
        assert_eq!(replaced.field1, "Acme");
    }

    #[test]
    fn entity_lists_without_strings_keep_cached() {
        let cached = EntityData::from_map(&raw(json!({
            "field3": ["Tag 1"],
            "field3_options": ["Tag 1", "Tag 2"]
        })));

        let unchanged = cached.reconcile(&raw(json!({"field3": [1], "field3_options": [null, {"x": 1}]})));
        assert_eq!(unchanged, cached);

        let filtered = cached.reconcile(&raw(json!({"field3": [1, "Tag 2"]})));
        assert_eq!(filtered.field3, vec!["Tag 2"]);
        assert_eq!(filtered.field3_options, cached.field3_options);
    }

    #[test]
    fn note_keeps_text_against_blank() {
        let cached = NoteData { field1: "draft".into() };
        assert_eq!(cached.reconcile(&raw(json!({"field1": " "}))).field1, "draft");
        assert_eq!(cached.reconcile(&raw(json!({"field1": "final"}))).field1, "final");
        assert_eq!(NoteData::default().reconcile(&raw(json!({}))).field1, "");
    }

    #[test]
    fn chart_values_accept_numbers_and_blank() {
        let cached = chart(json!({
            "field1": [
                {"id": "1", "label": "Reach", "value": 40},
                {"id": "2", "label": "Churn", "value": 10},
                {"id": "3", "label": "NPS", "value": 70}
            ],
            "field1_id": 3
        }));
        let merged = cached.reconcile(&raw(json!({
            "field1": [
                {"id": "1", "value": 55},
                {"id": "2", "label": "", "value": ""},
                {"id": "3", "value": "80"},
                {"id": "4", "label": "CSAT"}
            ],
            "field1_id": 1
        })));

        let values: Vec<_> = merged.field1.iter().map(|m| (m.label.as_str(), m.value)).collect();
        assert_eq!(
            values,
            vec![
                ("Reach", MetricValue::Number(55.0)),
                ("Churn", MetricValue::Blank),
                ("NPS", MetricValue::Number(70.0)),
                ("CSAT", MetricValue::Blank),
            ]
        );
        assert_eq!(merged.field1_id, 3);
    }

    #[test]
    fn opaque_fallback_rules() {
        let cached = raw(json!({
            "title": "kept",
            "count": 3,
            "tags": ["a"],
            "blank": null,
            "flag": true,
            "untouched": "yes"
        }));
        let merged = cached.reconcile(&raw(json!({
            "title": "",
            "count": "",
            "tags": [],
            "blank": [],
            "flag": false,
            "fresh": "",
            "list": [],
            "score": 1.5,
            "nested": {"x": 1}
        })));

        assert_eq!(
            Value::Object(merged),
            json!({
                "title": "kept",
                "count": "3",
                "tags": ["a"],
                "blank": [],
                "flag": true,
                "untouched": "yes",
                "fresh": "",
                "list": [],
                "score": 1.5
            })
        );
    }

    #[test]
    fn opaque_non_empty_values_replace() {
        let cached = raw(json!({"title": "old", "tags": ["a"], "count": 3}));
        let merged = cached.reconcile(&raw(json!({"title": "new", "tags": ["b", "c"], "count": 0})));
        assert_eq!(Value::Object(merged), json!({"title": "new", "tags": ["b", "c"], "count": 0}));
    }

    #[test]
    fn dispatch_follows_kind() {
        let cached = ItemData::Note(NoteData { field1: "text".into() });
        let incoming = raw(json!({"field4": [{"id": "1", "text": "step"}], "field4_id": 1}));

        let ItemData::Project(merged) = merge_item_data(&cached, &incoming, "project") else {
            panic!("expected project payload");
        };
        assert_eq!(merged.field1, "text");
        assert_eq!(merged.field4.len(), 1);
        assert_eq!(merged.field4_id, 1);

        let opaque = merge_item_data(&cached, &raw(json!({"extra": 2})), "board");
        assert_eq!(Value::Object(opaque.to_map()), json!({"field1": "text", "extra": 2}));
    }
}
