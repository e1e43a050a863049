//! State-level diff: compare two canvas states.
//!
//! Items are matched by id. Root fields are compared one by one and reported
//! with their old and new JSON values.

use std::collections::HashMap;
use std::fmt;

use canvas_types::{Item, RootState};
use serde::Serialize;
use serde_json::Value;

/// The result of comparing two canvas states.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StateDiff {
    /// The list of state changes.
    pub changes: Vec<StateChange>,
}

impl StateDiff {
    /// Create an empty state diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of added items.
    pub fn additions(&self) -> usize {
        self.count(|c| matches!(c, StateChange::ItemAdded { .. }))
    }

    /// Number of removed items.
    pub fn removals(&self) -> usize {
        self.count(|c| matches!(c, StateChange::ItemRemoved { .. }))
    }

    /// Number of modified items.
    pub fn modifications(&self) -> usize {
        self.count(|c| matches!(c, StateChange::ItemModified { .. }))
    }

    /// Number of changed root fields.
    pub fn field_changes(&self) -> usize {
        self.count(|c| matches!(c, StateChange::FieldChanged { .. }))
    }

    /// Returns `true` if the given root field changed.
    pub fn touches(&self, field: RootField) -> bool {
        self.changes
            .iter()
            .any(|c| matches!(c, StateChange::FieldChanged { field: f, .. } if *f == field))
    }

    fn count(&self, pred: impl Fn(&StateChange) -> bool) -> usize {
        self.changes.iter().filter(|c| pred(c)).count()
    }
}

impl fmt::Display for StateDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} removed, {} modified, {} field(s) changed",
            self.additions(),
            self.removals(),
            self.modifications(),
            self.field_changes()
        )
    }
}

/// A single change between two canvas states.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StateChange {
    /// An item id appeared.
    ItemAdded { id: String, kind: String },
    /// An item id disappeared.
    ItemRemoved { id: String, kind: String },
    /// An item kept its id but some of its parts changed.
    ItemModified { id: String, parts: Vec<ItemPart> },
    /// A root field changed.
    FieldChanged {
        field: RootField,
        old: Value,
        new: Value,
    },
}

/// The parts of an item a modification can touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemPart {
    Type,
    Name,
    Subtitle,
    Data,
}

impl fmt::Display for ItemPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Type => "type",
            Self::Name => "name",
            Self::Subtitle => "subtitle",
            Self::Data => "data",
        })
    }
}

/// The non-item fields of a root state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RootField {
    GlobalTitle,
    GlobalDescription,
    LastAction,
    ItemsCreated,
    PlanSteps,
    CurrentStepIndex,
    PlanStatus,
}

impl RootField {
    /// The wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GlobalTitle => "globalTitle",
            Self::GlobalDescription => "globalDescription",
            Self::LastAction => "lastAction",
            Self::ItemsCreated => "itemsCreated",
            Self::PlanSteps => "planSteps",
            Self::CurrentStepIndex => "currentStepIndex",
            Self::PlanStatus => "planStatus",
        }
    }
}

impl fmt::Display for RootField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the diff between two canvas states.
///
/// Removed items are listed in `old` order, modified and added items in `new`
/// order, followed by root field changes.
pub fn diff_states(old: &RootState, new: &RootState) -> StateDiff {
    let old_by_id: HashMap<&str, &Item> = old.items.iter().map(|i| (i.id.as_str(), i)).collect();
    let new_by_id: HashMap<&str, &Item> = new.items.iter().map(|i| (i.id.as_str(), i)).collect();
    let mut changes = Vec::new();

    for item in &old.items {
        if !new_by_id.contains_key(item.id.as_str()) {
            changes.push(StateChange::ItemRemoved {
                id: item.id.clone(),
                kind: item.kind.clone(),
            });
        }
    }

    for item in &new.items {
        match old_by_id.get(item.id.as_str()) {
            Some(prev) => {
                let parts = changed_parts(prev, item);
                if !parts.is_empty() {
                    changes.push(StateChange::ItemModified {
                        id: item.id.clone(),
                        parts,
                    });
                }
            }
            None => changes.push(StateChange::ItemAdded {
                id: item.id.clone(),
                kind: item.kind.clone(),
            }),
        }
    }

    let mut field = |field: RootField, old_val: Value, new_val: Value| {
        if old_val != new_val {
            changes.push(StateChange::FieldChanged {
                field,
                old: old_val,
                new: new_val,
            });
        }
    };
    field(
        RootField::GlobalTitle,
        old.global_title.as_str().into(),
        new.global_title.as_str().into(),
    );
    field(
        RootField::GlobalDescription,
        old.global_description.as_str().into(),
        new.global_description.as_str().into(),
    );
    field(
        RootField::LastAction,
        old.last_action.as_str().into(),
        new.last_action.as_str().into(),
    );
    field(
        RootField::ItemsCreated,
        old.items_created.into(),
        new.items_created.into(),
    );
    field(
        RootField::PlanSteps,
        to_json(&old.plan_steps),
        to_json(&new.plan_steps),
    );
    field(
        RootField::CurrentStepIndex,
        old.current_step_index.into(),
        new.current_step_index.into(),
    );
    field(
        RootField::PlanStatus,
        old.plan_status.as_str().into(),
        new.plan_status.as_str().into(),
    );

    StateDiff { changes }
}

fn changed_parts(old: &Item, new: &Item) -> Vec<ItemPart> {
    let mut parts = Vec::new();
    if old.kind != new.kind {
        parts.push(ItemPart::Type);
    }
    if old.name != new.name {
        parts.push(ItemPart::Name);
    }
    if old.subtitle != new.subtitle {
        parts.push(ItemPart::Subtitle);
    }
    if old.data != new.data {
        parts.push(ItemPart::Data);
    }
    parts
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
