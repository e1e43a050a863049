use canvas_types::{CardType, TypeError};
use thiserror::Error;

/// Errors raised while applying a canvas action.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("item not found: {0}")]
    UnknownItem(String),

    #[error("item {item_id} is a {found:?} card, expected {expected}")]
    WrongCardType {
        item_id: String,
        expected: CardType,
        found: String,
    },

    #[error("index {index} out of range for item {item_id} ({len} entries)")]
    IndexOutOfRange {
        item_id: String,
        index: usize,
        len: usize,
    },

    #[error("checklist entry {entry:?} not found in item {item_id}")]
    UnknownEntry { item_id: String, entry: String },

    #[error("unknown card type: {0:?}")]
    UnknownCardType(String),

    #[error("{card} cards have no field{field} (expected 1..={max})")]
    FieldOutOfRange { card: CardType, field: u8, max: u8 },

    #[error("{0} is exhausted, no further ids can be issued")]
    CounterExhausted(&'static str),
}

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("action rejected: {0}")]
    Action(#[from] ActionError),

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] TypeError),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
