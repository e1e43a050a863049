use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::item::Item;
use crate::plan::PlanStep;

/// The entire reconciled canvas.
///
/// A root state is owned by the hosting application and replaced wholesale by
/// every merge. Field names are camelCase on the wire to match the agent's
/// shared state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RootState {
    /// Cards in display order. Ids are unique.
    pub items: Vec<Item>,
    pub global_title: String,
    pub global_description: String,
    /// Tag describing the most recent mutation, e.g. `deleted:0003`.
    pub last_action: String,
    /// Number of items ever created. Never decreases.
    pub items_created: u64,
    pub plan_steps: Vec<PlanStep>,
    /// Index into `plan_steps`, or -1 when no step is active.
    pub current_step_index: i64,
    pub plan_status: String,
}

impl Default for RootState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            global_title: String::new(),
            global_description: String::new(),
            last_action: String::new(),
            items_created: 0,
            plan_steps: Vec::new(),
            current_step_index: -1,
            plan_status: String::new(),
        }
    }
}

impl RootState {
    /// The initial, empty canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an item by id.
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Position of an item by id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// The active plan step, if `current_step_index` points at one.
    pub fn current_step(&self) -> Option<&PlanStep> {
        usize::try_from(self.current_step_index)
            .ok()
            .and_then(|index| self.plan_steps.get(index))
    }

    /// Returns `true` if the canvas holds anything worth showing.
    pub fn has_content(&self) -> bool {
        !self.items.is_empty()
            || !self.plan_steps.is_empty()
            || !self.global_title.trim().is_empty()
            || !self.global_description.trim().is_empty()
            || self.items_created > 0
    }
}

/// Returns `true` if a freshly loaded, untyped state has content.
///
/// Mirrors [`RootState::has_content`] for values that have not been decoded:
/// non-empty `items` or `planSteps`, a non-blank title or description, or a
/// finite positive `itemsCreated`.
pub fn is_non_empty_state(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    let non_empty_array = |key: &str| {
        map.get(key)
            .and_then(Value::as_array)
            .is_some_and(|a| !a.is_empty())
    };
    let non_blank = |key: &str| {
        map.get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    };
    let positive_count = map
        .get("itemsCreated")
        .and_then(Value::as_f64)
        .is_some_and(|n| n.is_finite() && n > 0.0);

    non_empty_array("items")
        || non_empty_array("planSteps")
        || non_blank("globalTitle")
        || non_blank("globalDescription")
        || positive_count
}
