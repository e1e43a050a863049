use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;

/// Progress of a single plan step, for the tags this crate writes.
///
/// Steps received from the agent may carry other tags; those stay in the
/// step's raw value and read back as `None` from [`PlanStep::status`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
    Failed,
}

impl StepStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Blocked,
        Self::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
            Self::Failed => "failed",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == tag)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TypeError::UnknownStepStatus(s.to_string()))
    }
}

/// One step of the agent's plan.
///
/// Steps are agent-owned descriptors and are stored exactly as received,
/// whatever their shape. The accessors read the conventional
/// `{"title", "status", "note"}` object; the setters turn a non-object step
/// into one, keeping a bare string as its title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanStep(Value);

impl PlanStep {
    /// A pending step with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("title".into(), Value::String(title.into()));
        map.insert("status".into(), StepStatus::Pending.as_str().into());
        Self(Value::Object(map))
    }

    pub fn with_status(mut self, status: StepStatus) -> Self {
        self.set_status(status);
        self
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The step title: the `title` string of an object step, or the step
    /// itself when it is a bare string. Empty otherwise.
    pub fn title(&self) -> &str {
        match &self.0 {
            Value::String(title) => title.as_str(),
            other => other.get("title").and_then(Value::as_str).unwrap_or_default(),
        }
    }

    /// The raw `status` tag, known or not.
    pub fn status_tag(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    /// The status, if the tag is one this crate knows.
    pub fn status(&self) -> Option<StepStatus> {
        self.status_tag().and_then(StepStatus::parse)
    }

    pub fn note(&self) -> Option<&str> {
        self.0.get("note").and_then(Value::as_str)
    }

    pub fn set_status(&mut self, status: StepStatus) {
        self.insert("status", status.as_str().into());
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.insert("note", Value::String(note.into()));
    }

    fn insert(&mut self, key: &str, value: Value) {
        let mut map = match self.0.take() {
            Value::Object(map) => map,
            Value::String(title) => {
                let mut map = Map::new();
                map.insert("title".into(), Value::String(title));
                map
            }
            _ => Map::new(),
        };
        map.insert(key.into(), value);
        self.0 = Value::Object(map);
    }
}

impl From<Value> for PlanStep {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
