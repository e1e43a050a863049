//! Canvas actions: the edits the agent's frontend tools make to the canvas.
//!
//! Each action is applied to the current state and yields a new one with
//! `last_action` set to a tag naming the edit. Creation and deletion produce
//! `created:<id>` and `deleted:<id>`; the merge engine relies on the latter
//! to drop stale echoes of a removed item.

use canvas_types::{
    CardType, ChartData, ChartMetric, ChecklistEntry, EntityData, Item, ItemData, MetricValue,
    NoteData, ProjectData, RootState,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::ActionError;

/// Highest metric value a chart accepts.
pub const METRIC_MAX: f64 = 100.0;

/// A single canvas edit.
///
/// On the wire an action is a JSON object tagged by `"action"`, e.g.
/// `{"action": "set_note_text", "item_id": "0001", "text": "hello"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CanvasAction {
    CreateItem {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        name: String,
    },
    DeleteItem {
        item_id: String,
    },
    SetItemName {
        item_id: String,
        name: String,
    },
    SetItemSubtitle {
        item_id: String,
        subtitle: String,
    },
    SetGlobalTitle {
        title: String,
    },
    SetGlobalDescription {
        description: String,
    },

    // Note cards
    SetNoteText {
        item_id: String,
        text: String,
    },
    AppendNoteText {
        item_id: String,
        text: String,
        #[serde(default)]
        with_newline: bool,
    },
    ClearNoteText {
        item_id: String,
    },

    // Project cards
    SetProjectField {
        item_id: String,
        field: u8,
        value: String,
    },
    ClearProjectDate {
        item_id: String,
    },
    AddChecklistItem {
        item_id: String,
        #[serde(default)]
        text: String,
    },
    /// `checklist_id` matches an entry id first, then a 0-based index.
    SetChecklistItem {
        item_id: String,
        checklist_id: String,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        done: Option<bool>,
    },
    RemoveChecklistItem {
        item_id: String,
        checklist_id: String,
    },

    // Entity cards
    SetEntityField {
        item_id: String,
        field: u8,
        value: String,
    },
    AddEntityTag {
        item_id: String,
        tag: String,
    },
    RemoveEntityTag {
        item_id: String,
        tag: String,
    },

    // Chart cards
    AddChartMetric {
        item_id: String,
        #[serde(default)]
        label: String,
        #[serde(default)]
        value: Option<f64>,
    },
    SetChartMetricLabel {
        item_id: String,
        index: usize,
        label: String,
    },
    SetChartMetricValue {
        item_id: String,
        index: usize,
        value: f64,
    },
    ClearChartMetricValue {
        item_id: String,
        index: usize,
    },
    RemoveChartMetric {
        item_id: String,
        index: usize,
    },
}

impl CanvasAction {
    /// The wire name of the action.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateItem { .. } => "create_item",
            Self::DeleteItem { .. } => "delete_item",
            Self::SetItemName { .. } => "set_item_name",
            Self::SetItemSubtitle { .. } => "set_item_subtitle",
            Self::SetGlobalTitle { .. } => "set_global_title",
            Self::SetGlobalDescription { .. } => "set_global_description",
            Self::SetNoteText { .. } => "set_note_text",
            Self::AppendNoteText { .. } => "append_note_text",
            Self::ClearNoteText { .. } => "clear_note_text",
            Self::SetProjectField { .. } => "set_project_field",
            Self::ClearProjectDate { .. } => "clear_project_date",
            Self::AddChecklistItem { .. } => "add_checklist_item",
            Self::SetChecklistItem { .. } => "set_checklist_item",
            Self::RemoveChecklistItem { .. } => "remove_checklist_item",
            Self::SetEntityField { .. } => "set_entity_field",
            Self::AddEntityTag { .. } => "add_entity_tag",
            Self::RemoveEntityTag { .. } => "remove_entity_tag",
            Self::AddChartMetric { .. } => "add_chart_metric",
            Self::SetChartMetricLabel { .. } => "set_chart_metric_label",
            Self::SetChartMetricValue { .. } => "set_chart_metric_value",
            Self::ClearChartMetricValue { .. } => "clear_chart_metric_value",
            Self::RemoveChartMetric { .. } => "remove_chart_metric",
        }
    }

    /// The item this action targets, if any.
    pub fn item_id(&self) -> Option<&str> {
        match self {
            Self::CreateItem { .. } | Self::SetGlobalTitle { .. } | Self::SetGlobalDescription { .. } => {
                None
            }
            Self::DeleteItem { item_id }
            | Self::SetItemName { item_id, .. }
            | Self::SetItemSubtitle { item_id, .. }
            | Self::SetNoteText { item_id, .. }
            | Self::AppendNoteText { item_id, .. }
            | Self::ClearNoteText { item_id }
            | Self::SetProjectField { item_id, .. }
            | Self::ClearProjectDate { item_id }
            | Self::AddChecklistItem { item_id, .. }
            | Self::SetChecklistItem { item_id, .. }
            | Self::RemoveChecklistItem { item_id, .. }
            | Self::SetEntityField { item_id, .. }
            | Self::AddEntityTag { item_id, .. }
            | Self::RemoveEntityTag { item_id, .. }
            | Self::AddChartMetric { item_id, .. }
            | Self::SetChartMetricLabel { item_id, .. }
            | Self::SetChartMetricValue { item_id, .. }
            | Self::ClearChartMetricValue { item_id, .. }
            | Self::RemoveChartMetric { item_id, .. } => Some(item_id),
        }
    }
}

/// Apply an action to `state`, returning the edited state.
///
/// The input is never modified; on error nothing is applied.
pub fn apply_action(
    state: &RootState,
    action: &CanvasAction,
    config: &SessionConfig,
) -> Result<RootState, ActionError> {
    let mut next = state.clone();
    let tag = match action {
        CanvasAction::CreateItem { kind, name } => {
            let card = CardType::parse(kind).ok_or_else(|| ActionError::UnknownCardType(kind.clone()))?;
            let seq = next_id(next.items_created, "itemsCreated")?;
            let id = config.item_id(seq);
            let mut item = Item::new(id.clone(), card.as_str(), name.clone());
            if let ItemData::Entity(entity) = &mut item.data {
                entity.field3_options = config.entity_tag_options.clone();
            }
            next.items.push(item);
            next.items_created = seq;
            format!("created:{id}")
        }
        CanvasAction::DeleteItem { item_id } => {
            let pos = next
                .position(item_id)
                .ok_or_else(|| ActionError::UnknownItem(item_id.clone()))?;
            next.items.remove(pos);
            format!("deleted:{item_id}")
        }
        CanvasAction::SetItemName { item_id, name } => {
            item_mut(&mut next, item_id)?.name = name.clone();
            item_tag(action, item_id)
        }
        CanvasAction::SetItemSubtitle { item_id, subtitle } => {
            item_mut(&mut next, item_id)?.subtitle = subtitle.clone();
            item_tag(action, item_id)
        }
        CanvasAction::SetGlobalTitle { title } => {
            next.global_title = title.clone();
            action.name().to_owned()
        }
        CanvasAction::SetGlobalDescription { description } => {
            next.global_description = description.clone();
            action.name().to_owned()
        }

        CanvasAction::SetNoteText { item_id, text } => {
            note_mut(&mut next, item_id)?.field1 = text.clone();
            item_tag(action, item_id)
        }
        CanvasAction::AppendNoteText {
            item_id,
            text,
            with_newline,
        } => {
            let note = note_mut(&mut next, item_id)?;
            if *with_newline && !note.field1.is_empty() {
                note.field1.push('\n');
            }
            note.field1.push_str(text);
            item_tag(action, item_id)
        }
        CanvasAction::ClearNoteText { item_id } => {
            note_mut(&mut next, item_id)?.field1.clear();
            item_tag(action, item_id)
        }

        CanvasAction::SetProjectField {
            item_id,
            field,
            value,
        } => {
            let project = project_mut(&mut next, item_id)?;
            let slot = match *field {
                1 => &mut project.field1,
                2 => &mut project.field2,
                3 => &mut project.field3,
                n => return Err(field_out_of_range(CardType::Project, n, 3)),
            };
            *slot = value.clone();
            item_tag(action, item_id)
        }
        CanvasAction::ClearProjectDate { item_id } => {
            project_mut(&mut next, item_id)?.field3.clear();
            item_tag(action, item_id)
        }
        CanvasAction::AddChecklistItem { item_id, text } => {
            let project = project_mut(&mut next, item_id)?;
            project.field4_id = next_id(project.field4_id, "field4_id")?;
            project.field4.push(ChecklistEntry {
                id: project.field4_id.to_string(),
                text: text.clone(),
                done: false,
                proposed: false,
            });
            item_tag(action, item_id)
        }
        CanvasAction::SetChecklistItem {
            item_id,
            checklist_id,
            text,
            done,
        } => {
            let project = project_mut(&mut next, item_id)?;
            let pos = checklist_position(project, item_id, checklist_id)?;
            let entry = &mut project.field4[pos];
            if let Some(text) = text {
                entry.text = text.clone();
            }
            if let Some(done) = done {
                entry.done = *done;
            }
            item_tag(action, item_id)
        }
        CanvasAction::RemoveChecklistItem {
            item_id,
            checklist_id,
        } => {
            let project = project_mut(&mut next, item_id)?;
            let pos = checklist_position(project, item_id, checklist_id)?;
            project.field4.remove(pos);
            item_tag(action, item_id)
        }

        CanvasAction::SetEntityField {
            item_id,
            field,
            value,
        } => {
            let entity = entity_mut(&mut next, item_id)?;
            let slot = match *field {
                1 => &mut entity.field1,
                2 => &mut entity.field2,
                n => return Err(field_out_of_range(CardType::Entity, n, 2)),
            };
            *slot = value.clone();
            item_tag(action, item_id)
        }
        CanvasAction::AddEntityTag { item_id, tag } => {
            let entity = entity_mut(&mut next, item_id)?;
            if !entity.field3.contains(tag) {
                entity.field3.push(tag.clone());
            }
            item_tag(action, item_id)
        }
        CanvasAction::RemoveEntityTag { item_id, tag } => {
            entity_mut(&mut next, item_id)?.field3.retain(|t| t != tag);
            item_tag(action, item_id)
        }

        CanvasAction::AddChartMetric {
            item_id,
            label,
            value,
        } => {
            let chart = chart_mut(&mut next, item_id)?;
            chart.field1_id = next_id(chart.field1_id, "field1_id")?;
            chart.field1.push(ChartMetric {
                id: chart.field1_id.to_string(),
                label: label.clone(),
                value: value.map_or(MetricValue::Blank, clamp_metric),
            });
            item_tag(action, item_id)
        }
        CanvasAction::SetChartMetricLabel {
            item_id,
            index,
            label,
        } => {
            metric_mut(&mut next, item_id, *index)?.label = label.clone();
            item_tag(action, item_id)
        }
        CanvasAction::SetChartMetricValue {
            item_id,
            index,
            value,
        } => {
            metric_mut(&mut next, item_id, *index)?.value = clamp_metric(*value);
            item_tag(action, item_id)
        }
        CanvasAction::ClearChartMetricValue { item_id, index } => {
            metric_mut(&mut next, item_id, *index)?.value = MetricValue::Blank;
            item_tag(action, item_id)
        }
        CanvasAction::RemoveChartMetric { item_id, index } => {
            let chart = chart_mut(&mut next, item_id)?;
            check_index(item_id, *index, chart.field1.len())?;
            chart.field1.remove(*index);
            item_tag(action, item_id)
        }
    };

    debug!(action = action.name(), tag = %tag, "action applied");
    next.last_action = tag;
    Ok(next)
}

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

fn item_tag(action: &CanvasAction, item_id: &str) -> String {
    format!("{}:{item_id}", action.name())
}

fn item_mut<'a>(state: &'a mut RootState, item_id: &str) -> Result<&'a mut Item, ActionError> {
    state
        .items
        .iter_mut()
        .find(|i| i.id == item_id)
        .ok_or_else(|| ActionError::UnknownItem(item_id.to_owned()))
}

fn payload_mut<'a, T>(
    state: &'a mut RootState,
    item_id: &str,
    expected: CardType,
    pick: fn(&mut ItemData) -> Option<&mut T>,
) -> Result<&'a mut T, ActionError> {
    let item = item_mut(state, item_id)?;
    let found = item.kind.clone();
    pick(&mut item.data).ok_or(ActionError::WrongCardType {
        item_id: item_id.to_owned(),
        expected,
        found,
    })
}

fn note_mut<'a>(state: &'a mut RootState, item_id: &str) -> Result<&'a mut NoteData, ActionError> {
    payload_mut(state, item_id, CardType::Note, |data| match data {
        ItemData::Note(note) => Some(note),
        _ => None,
    })
}

fn project_mut<'a>(
    state: &'a mut RootState,
    item_id: &str,
) -> Result<&'a mut ProjectData, ActionError> {
    payload_mut(state, item_id, CardType::Project, |data| match data {
        ItemData::Project(project) => Some(project),
        _ => None,
    })
}

fn entity_mut<'a>(
    state: &'a mut RootState,
    item_id: &str,
) -> Result<&'a mut EntityData, ActionError> {
    payload_mut(state, item_id, CardType::Entity, |data| match data {
        ItemData::Entity(entity) => Some(entity),
        _ => None,
    })
}

fn chart_mut<'a>(state: &'a mut RootState, item_id: &str) -> Result<&'a mut ChartData, ActionError> {
    payload_mut(state, item_id, CardType::Chart, |data| match data {
        ItemData::Chart(chart) => Some(chart),
        _ => None,
    })
}

fn metric_mut<'a>(
    state: &'a mut RootState,
    item_id: &str,
    index: usize,
) -> Result<&'a mut ChartMetric, ActionError> {
    let chart = chart_mut(state, item_id)?;
    check_index(item_id, index, chart.field1.len())?;
    Ok(&mut chart.field1[index])
}

/// Resolve a checklist reference: an entry id, else a 0-based index.
fn checklist_position(
    project: &ProjectData,
    item_id: &str,
    checklist_id: &str,
) -> Result<usize, ActionError> {
    if let Some(pos) = project.field4.iter().position(|e| e.id == checklist_id) {
        return Ok(pos);
    }
    match checklist_id.parse::<usize>() {
        Ok(index) => {
            check_index(item_id, index, project.field4.len())?;
            Ok(index)
        }
        Err(_) => Err(ActionError::UnknownEntry {
            item_id: item_id.to_owned(),
            entry: checklist_id.to_owned(),
        }),
    }
}

fn check_index(item_id: &str, index: usize, len: usize) -> Result<(), ActionError> {
    if index < len {
        Ok(())
    } else {
        Err(ActionError::IndexOutOfRange {
            item_id: item_id.to_owned(),
            index,
            len,
        })
    }
}

fn field_out_of_range(card: CardType, field: u8, max: u8) -> ActionError {
    ActionError::FieldOutOfRange { card, field, max }
}

fn clamp_metric(value: f64) -> MetricValue {
    MetricValue::Number(value.clamp(0.0, METRIC_MAX))
}

/// The id after `counter`, or an error once the counter is at its maximum.
fn next_id(counter: u64, name: &'static str) -> Result<u64, ActionError> {
    counter.checked_add(1).ok_or(ActionError::CounterExhausted(name))
}
