use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;
use crate::item::{ChartData, EntityData, ItemData, NoteData, ProjectData};

/// Tags offered by a fresh entity card.
pub const DEFAULT_ENTITY_TAG_OPTIONS: [&str; 3] = ["Tag 1", "Tag 2", "Tag 3"];

/// The card types with a known payload shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Project,
    Entity,
    Note,
    Chart,
}

impl CardType {
    /// All known card types.
    pub const ALL: [Self; 4] = [Self::Project, Self::Entity, Self::Note, Self::Chart];

    /// The wire tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Entity => "entity",
            Self::Note => "note",
            Self::Chart => "chart",
        }
    }

    /// Parse a wire tag; `None` for unknown types.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// The zero-value payload for this card type.
    pub fn default_data(self) -> ItemData {
        match self {
            Self::Project => ItemData::Project(ProjectData::default()),
            Self::Entity => ItemData::Entity(EntityData {
                field3_options: DEFAULT_ENTITY_TAG_OPTIONS.map(String::from).to_vec(),
                ..Default::default()
            }),
            Self::Note => ItemData::Note(NoteData::default()),
            Self::Chart => ItemData::Chart(ChartData::default()),
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TypeError::UnknownCardType(s.to_string()))
    }
}

/// The zero-value payload for a type tag.
///
/// Unknown tags get a generic single-field payload, `{"field1": ""}`.
pub fn default_data_for(kind: &str) -> ItemData {
    match CardType::parse(kind) {
        Some(card) => card.default_data(),
        None => {
            let mut map = Map::new();
            map.insert("field1".into(), Value::String(String::new()));
            ItemData::Opaque(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_roundtrips_every_tag() {
        for card in CardType::ALL {
            assert_eq!(CardType::parse(card.as_str()), Some(card));
            assert_eq!(card.as_str().parse::<CardType>().unwrap(), card);
        }
        assert_eq!(CardType::parse("Project"), None);
    }

    #[test]
    fn from_str_reports_unknown_type() {
        let err = "kanban".parse::<CardType>().unwrap_err();
        assert_eq!(err, TypeError::UnknownCardType("kanban".into()));
    }

    #[test]
    fn default_payload_shapes() {
        assert_eq!(
            serde_json::to_value(default_data_for("project")).unwrap(),
            json!({"field1": "", "field2": "", "field3": "", "field4": [], "field4_id": 0})
        );
        assert_eq!(
            serde_json::to_value(default_data_for("entity")).unwrap(),
            json!({"field1": "", "field2": "", "field3": [], "field3_options": ["Tag 1", "Tag 2", "Tag 3"]})
        );
        assert_eq!(serde_json::to_value(default_data_for("note")).unwrap(), json!({"field1": ""}));
        assert_eq!(
            serde_json::to_value(default_data_for("chart")).unwrap(),
            json!({"field1": [], "field1_id": 0})
        );
    }

    #[test]
    fn unknown_type_gets_single_field_payload() {
        let data = default_data_for("timeline");
        assert!(matches!(data, ItemData::Opaque(_)));
        assert_eq!(serde_json::to_value(data).unwrap(), json!({"field1": ""}));
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        assert_eq!(serde_json::to_string(&CardType::Chart).unwrap(), "\"chart\"");
        let parsed: CardType = serde_json::from_str("\"entity\"").unwrap();
        assert_eq!(parsed, CardType::Entity);
    }
}
