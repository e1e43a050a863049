use std::path::Path;

use canvas_types::DEFAULT_ENTITY_TAG_OPTIONS;
use serde::{Deserialize, Serialize};

use crate::error::SdkResult;

/// Configuration for a canvas session.
///
/// Every field is optional in TOML; missing fields take the built-in values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tags offered by entity cards created through [`crate::CanvasAction::CreateItem`].
    pub entity_tag_options: Vec<String>,
    /// Zero-padded width of generated item ids (`4` gives `0001`).
    pub item_id_width: usize,
    /// When `true`, every ingest and action logs its diff summary at `info`.
    pub log_diffs: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            entity_tag_options: DEFAULT_ENTITY_TAG_OPTIONS.map(String::from).to_vec(),
            item_id_width: 4,
            log_diffs: false,
        }
    }
}

impl SessionConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Format an item sequence number as an item id.
    pub fn item_id(&self, seq: u64) -> String {
        format!("{seq:0width$}", width = self.item_id_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use std::io::Write;

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(SessionConfig::from_toml_str("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = SessionConfig::from_toml_str("item_id_width = 6\nlog_diffs = true\n").unwrap();
        assert_eq!(config.item_id_width, 6);
        assert!(config.log_diffs);
        assert_eq!(config.entity_tag_options, ["Tag 1", "Tag 2", "Tag 3"]);
    }

    #[test]
    fn item_ids_are_zero_padded() {
        let config = SessionConfig::default();
        assert_eq!(config.item_id(1), "0001");
        assert_eq!(config.item_id(12345), "12345");

        let unpadded = SessionConfig {
            item_id_width: 0,
            ..Default::default()
        };
        assert_eq!(unpadded.item_id(7), "7");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "entity_tag_options = [\"Hot\", \"Cold\"]").unwrap();

        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.entity_tag_options, ["Hot", "Cold"]);
        assert_eq!(config.item_id_width, 4);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = SessionConfig::from_toml_str("item_id_width = \"wide\"").unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SessionConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SdkError::Io(_)));
    }
}
