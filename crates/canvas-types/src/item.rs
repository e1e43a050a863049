use std::borrow::Cow;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::card::{default_data_for, CardType};
use crate::shape::{bool_field, counter_field, str_field, string_list};

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A single card on the canvas.
///
/// The `kind` tag (`type` on the wire) selects which [`ItemData`] variant the
/// payload is read as. Ids are immutable once created and unique within
/// [`crate::RootState::items`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawItem")]
pub struct Item {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub subtitle: String,
    pub data: ItemData,
}

impl Item {
    /// Create an item carrying the zero-value payload for `kind`.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        let kind = kind.into();
        let data = default_data_for(&kind);
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            subtitle: String::new(),
            data,
        }
    }

    /// The known card type of this item, if any.
    pub fn card_type(&self) -> Option<CardType> {
        CardType::parse(&self.kind)
    }
}

/// Wire shape of an item before its payload is read by type.
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawItem {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    name: String,
    subtitle: String,
    data: Value,
}

impl From<RawItem> for Item {
    fn from(raw: RawItem) -> Self {
        let data = ItemData::from_value(&raw.kind, &raw.data);
        Self {
            id: raw.id,
            kind: raw.kind,
            name: raw.name,
            subtitle: raw.subtitle,
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// ItemData
// ---------------------------------------------------------------------------

/// Polymorphic item payload, selected by the item's type tag.
///
/// Serializes as the bare payload object. Typed payloads carry only their
/// own fields; keys outside them are not kept. Payloads of unknown types are
/// kept verbatim in [`ItemData::Opaque`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemData {
    Project(ProjectData),
    Entity(EntityData),
    Note(NoteData),
    Chart(ChartData),
    Opaque(Map<String, Value>),
}

impl ItemData {
    /// Read a payload object as the variant selected by `kind`.
    pub fn from_map(kind: &str, map: &Map<String, Value>) -> Self {
        match CardType::parse(kind) {
            Some(CardType::Project) => Self::Project(ProjectData::from_map(map)),
            Some(CardType::Entity) => Self::Entity(EntityData::from_map(map)),
            Some(CardType::Note) => Self::Note(NoteData::from_map(map)),
            Some(CardType::Chart) => Self::Chart(ChartData::from_map(map)),
            None => Self::Opaque(map.clone()),
        }
    }

    /// Like [`Self::from_map`]; anything but an object reads as an empty payload.
    pub fn from_value(kind: &str, value: &Value) -> Self {
        match value.as_object() {
            Some(map) => Self::from_map(kind, map),
            None => Self::from_map(kind, &Map::new()),
        }
    }

    /// The known card type this payload was read as.
    pub fn card_type(&self) -> Option<CardType> {
        match self {
            Self::Project(_) => Some(CardType::Project),
            Self::Entity(_) => Some(CardType::Entity),
            Self::Note(_) => Some(CardType::Note),
            Self::Chart(_) => Some(CardType::Chart),
            Self::Opaque(_) => None,
        }
    }

    /// The payload as a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        if let Self::Opaque(map) = self {
            return map.clone();
        }
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// This payload re-read as the variant selected by `kind`.
    ///
    /// Borrows when the variant already matches; otherwise converts through
    /// the JSON form, so fields shared by both shapes carry over.
    pub fn for_kind(&self, kind: &str) -> Cow<'_, Self> {
        let target = CardType::parse(kind);
        if self.card_type() == target {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(Self::from_map(kind, &self.to_map()))
        }
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// Payload of a `project` card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProjectData {
    /// Free text.
    pub field1: String,
    /// Select: "Option A" | "Option B" | "Option C".
    pub field2: String,
    /// Date, `YYYY-MM-DD`.
    pub field3: String,
    /// Checklist.
    pub field4: Vec<ChecklistEntry>,
    /// Last allocated checklist id.
    pub field4_id: u64,
}

impl ProjectData {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            field1: owned_str(map, "field1"),
            field2: owned_str(map, "field2"),
            field3: owned_str(map, "field3"),
            field4: read_entries(map, "field4", ChecklistEntry::from_map),
            field4_id: counter_field(map, "field4_id"),
        }
    }
}

/// A checklist entry inside a project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChecklistEntry {
    pub id: String,
    pub text: String,
    pub done: bool,
    pub proposed: bool,
}

impl ChecklistEntry {
    /// Read an entry; `None` without a string `id`.
    pub fn from_map(map: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            id: str_field(map, "id")?.to_owned(),
            text: owned_str(map, "text"),
            done: bool_field(map, "done").unwrap_or(false),
            proposed: bool_field(map, "proposed").unwrap_or(false),
        })
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Payload of an `entity` card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EntityData {
    pub field1: String,
    pub field2: String,
    /// Selected tags, a subset of `field3_options`.
    pub field3: Vec<String>,
    /// Available tags.
    pub field3_options: Vec<String>,
}

impl EntityData {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            field1: owned_str(map, "field1"),
            field2: owned_str(map, "field2"),
            field3: map.get("field3").and_then(string_list).unwrap_or_default(),
            field3_options: map
                .get("field3_options")
                .and_then(string_list)
                .unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Note
// ---------------------------------------------------------------------------

/// Payload of a `note` card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NoteData {
    pub field1: String,
}

impl NoteData {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            field1: owned_str(map, "field1"),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

/// Payload of a `chart` card.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChartData {
    /// Metrics.
    pub field1: Vec<ChartMetric>,
    /// Last allocated metric id.
    pub field1_id: u64,
}

impl ChartData {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            field1: read_entries(map, "field1", ChartMetric::from_map),
            field1_id: counter_field(map, "field1_id"),
        }
    }
}

/// A single labelled value in a chart.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChartMetric {
    pub id: String,
    pub label: String,
    pub value: MetricValue,
}

impl ChartMetric {
    /// Read a metric; `None` without a string `id`.
    pub fn from_map(map: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            id: str_field(map, "id")?.to_owned(),
            label: owned_str(map, "label"),
            value: map
                .get("value")
                .and_then(MetricValue::from_value)
                .unwrap_or_default(),
        })
    }
}

/// A metric value: a number, or blank (`""` on the wire) when cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MetricValue {
    Number(f64),
    #[default]
    Blank,
}

impl MetricValue {
    /// Read a wire value. Only numbers and the empty string qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) if s.is_empty() => Some(Self::Blank),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Blank => None,
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Blank => serializer.serialize_str(""),
        }
    }
}

fn owned_str(map: &Map<String, Value>, key: &str) -> String {
    str_field(map, key).unwrap_or_default().to_owned()
}

fn read_entries<T>(
    map: &Map<String, Value>,
    key: &str,
    read: impl Fn(&Map<String, Value>) -> Option<T>,
) -> Vec<T> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_object)
                .filter_map(&read)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_payload_is_read_by_type() {
        let item: Item = serde_json::from_value(json!({
            "id": "0001",
            "type": "project",
            "name": "Launch",
            "subtitle": "",
            "data": {
                "field1": "scope",
                "field4": [{"id": "1", "text": "buy milk", "done": true}],
                "field4_id": 1
            }
        }))
        .unwrap();

        let ItemData::Project(project) = &item.data else {
            panic!("expected project payload, got {:?}", item.data);
        };
        assert_eq!(project.field1, "scope");
        assert_eq!(project.field4.len(), 1);
        assert!(project.field4[0].done);
        assert!(!project.field4[0].proposed);
        assert_eq!(project.field4_id, 1);
        assert_eq!(item.card_type(), Some(CardType::Project));
    }

    #[test]
    fn unknown_type_keeps_payload_verbatim() {
        let item: Item = serde_json::from_value(json!({
            "id": "9",
            "type": "kanban",
            "data": {"lanes": ["todo"], "wip": 3}
        }))
        .unwrap();
        assert_eq!(
            item.data,
            ItemData::Opaque(json!({"lanes": ["todo"], "wip": 3}).as_object().unwrap().clone())
        );
    }

    #[test]
    fn typed_payloads_keep_only_their_fields() {
        let extra = json!({"field1": "Acme", "field3": ["Tag 1"], "owner": "ops"});
        let entity = ItemData::from_value("entity", &extra);
        assert_eq!(
            serde_json::to_value(&entity).unwrap(),
            json!({"field1": "Acme", "field2": "", "field3": ["Tag 1"], "field3_options": []})
        );
        assert_eq!(ItemData::from_value("kanban", &extra).to_map().get("owner"), Some(&json!("ops")));
    }

    #[test]
    fn entries_without_string_ids_are_skipped() {
        let data = ChartData::from_map(
            json!({"field1": [{"id": "1", "label": "a", "value": 4}, {"label": "no id"}, 7]})
                .as_object()
                .unwrap(),
        );
        assert_eq!(data.field1.len(), 1);
        assert_eq!(data.field1[0].value, MetricValue::Number(4.0));
    }

    #[test]
    fn metric_value_wire_forms() {
        assert_eq!(MetricValue::from_value(&json!(12.5)), Some(MetricValue::Number(12.5)));
        assert_eq!(MetricValue::from_value(&json!("")), Some(MetricValue::Blank));
        assert_eq!(MetricValue::from_value(&json!("12")), None);
        assert_eq!(serde_json::to_value(MetricValue::Blank).unwrap(), json!(""));
        assert_eq!(serde_json::to_value(MetricValue::Number(3.0)).unwrap(), json!(3.0));
    }

    #[test]
    fn payload_serializes_bare() {
        let data = ItemData::Note(NoteData {
            field1: "hello".into(),
        });
        assert_eq!(serde_json::to_value(&data).unwrap(), json!({"field1": "hello"}));
    }

    #[test]
    fn for_kind_carries_shared_fields() {
        let note = ItemData::Note(NoteData {
            field1: "shared".into(),
        });
        assert!(matches!(note.for_kind("note"), Cow::Borrowed(_)));

        let project = note.for_kind("project");
        let ItemData::Project(project) = project.as_ref() else {
            panic!("expected project payload");
        };
        assert_eq!(project.field1, "shared");
        assert!(project.field4.is_empty());

        let opaque = note.for_kind("whiteboard");
        assert_eq!(opaque.to_map().get("field1"), Some(&json!("shared")));
    }
}
