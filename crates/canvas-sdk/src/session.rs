use canvas_diff::{diff_states, StateDiff};
use canvas_merge::merge_agent_state_snapshots;
use canvas_types::{CardType, RootState, Snapshot, StepStatus};
use tracing::{debug, info, warn};

use crate::actions::{apply_action, CanvasAction};
use crate::config::SessionConfig;
use crate::error::SdkResult;
use crate::plan;

/// A hosting session: owns the cached canvas state and folds every agent
/// snapshot and local edit into it, one at a time.
///
/// All mutation goes through `&mut self`, so snapshots are merged in the
/// order they are handed in.
#[derive(Clone, Debug, Default)]
pub struct CanvasSession {
    state: RootState,
    config: SessionConfig,
    ingested: u64,
}

impl CanvasSession {
    /// Start a session on the initial (empty) canvas.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_state(RootState::new(), config)
    }

    /// Start a session from an existing canvas state.
    pub fn with_state(state: RootState, config: SessionConfig) -> Self {
        Self {
            state,
            config,
            ingested: 0,
        }
    }

    /// The current cached state.
    pub fn state(&self) -> &RootState {
        &self.state
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Number of snapshots merged so far.
    pub fn ingested(&self) -> u64 {
        self.ingested
    }

    /// Returns `true` if the cached canvas holds anything worth showing.
    pub fn has_content(&self) -> bool {
        self.state.has_content()
    }

    /// Consume the session, returning the cached state.
    pub fn into_state(self) -> RootState {
        self.state
    }

    /// Merge an agent snapshot into the cached state.
    pub fn ingest(&mut self, snapshot: &Snapshot) -> StateDiff {
        if snapshot.dropped_items > 0 {
            warn!(dropped = snapshot.dropped_items, "snapshot items without a string id skipped");
        }
        for item in &snapshot.items {
            if let Some(kind) = item.kind.as_deref().filter(|k| !k.is_empty()) {
                if CardType::parse(kind).is_none() {
                    warn!(id = %item.id, kind, "unknown card type, payload kept as-is");
                }
            }
        }

        let merged = merge_agent_state_snapshots(&self.state, snapshot);
        self.ingested += 1;
        self.commit(merged, "snapshot")
    }

    /// Decode a JSON snapshot and merge it.
    pub fn ingest_json(&mut self, text: &str) -> SdkResult<StateDiff> {
        let snapshot = Snapshot::from_json(text)?;
        Ok(self.ingest(&snapshot))
    }

    /// Apply a local canvas edit.
    pub fn apply(&mut self, action: &CanvasAction) -> SdkResult<StateDiff> {
        let next = apply_action(&self.state, action, &self.config)?;
        Ok(self.commit(next, action.name()))
    }

    /// Start a new plan. See [`plan::set_plan`].
    pub fn set_plan<S: AsRef<str>>(&mut self, titles: &[S]) -> StateDiff {
        let next = plan::set_plan(&self.state, titles);
        self.commit(next, "set_plan")
    }

    /// Update one plan step. Returns `None` when `index` is out of range.
    pub fn update_plan_progress(
        &mut self,
        index: usize,
        status: StepStatus,
        note: Option<&str>,
    ) -> Option<StateDiff> {
        let next = plan::update_plan_progress(&self.state, index, status, note)?;
        Some(self.commit(next, "update_plan_progress"))
    }

    /// Mark the whole plan completed.
    pub fn complete_plan(&mut self) -> StateDiff {
        let next = plan::complete_plan(&self.state);
        self.commit(next, "complete_plan")
    }

    fn commit(&mut self, next: RootState, source: &str) -> StateDiff {
        let diff = diff_states(&self.state, &next);
        if self.config.log_diffs {
            info!(source, changes = diff.len(), summary = %diff, "canvas updated");
        } else {
            debug!(source, changes = diff.len(), "canvas updated");
        }
        self.state = next;
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use canvas_diff::{RootField, StateChange};
    use canvas_types::ItemData;
    use serde_json::json;

    fn session() -> CanvasSession {
        CanvasSession::new(SessionConfig::default())
    }

    fn create(session: &mut CanvasSession, kind: &str) -> String {
        session
            .apply(&CanvasAction::CreateItem {
                kind: kind.into(),
                name: kind.into(),
            })
            .unwrap();
        session.state().items.last().unwrap().id.clone()
    }

    #[test]
    fn new_session_is_empty() {
        let session = session();
        assert!(!session.has_content());
        assert_eq!(session.state(), &RootState::new());
        assert_eq!(session.ingested(), 0);
    }

    #[test]
    fn ingest_reports_what_changed() {
        let mut session = session();
        let diff = session
            .ingest_json(r#"{"items": [{"id": "0001", "type": "note", "name": "Hi"}], "itemsCreated": 1}"#)
            .unwrap();

        assert_eq!(diff.additions(), 1);
        assert!(diff.touches(RootField::ItemsCreated));
        assert!(session.has_content());
        assert_eq!(session.ingested(), 1);
    }

    #[test]
    fn snapshots_fold_in_order() {
        let mut session = session();
        session.ingest_json(r#"{"globalTitle": "first"}"#).unwrap();
        session.ingest_json(r#"{"globalTitle": "second"}"#).unwrap();
        session.ingest_json(r#"{"globalTitle": ""}"#).unwrap();
        assert_eq!(session.state().global_title, "second");
        assert_eq!(session.ingested(), 3);
    }

    #[test]
    fn local_delete_beats_stale_echo() {
        let mut session = session();
        let keep = create(&mut session, "note");
        let gone = create(&mut session, "note");
        session.apply(&CanvasAction::DeleteItem { item_id: gone.clone() }).unwrap();

        // The agent has not seen the deletion yet and echoes both items.
        let stale = Snapshot::from_value(&json!({
            "items": [
                {"id": keep, "type": "note", "data": {"field1": "kept"}},
                {"id": gone, "type": "note", "data": {"field1": "zombie"}}
            ]
        }))
        .unwrap();
        let diff = session.ingest(&stale);

        let ids: Vec<&str> = session.state().items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, [keep.as_str()]);
        assert_eq!(diff.additions(), 0);
        assert_eq!(diff.modifications(), 1);
    }

    #[test]
    fn unknown_card_type_is_kept_opaque() {
        let mut session = session();
        session
            .ingest_json(r#"{"items": [{"id": "x", "type": "kanban", "data": {"lanes": 3}}]}"#)
            .unwrap();
        assert_eq!(
            session.state().items[0].data,
            ItemData::Opaque(json!({"lanes": 3}).as_object().unwrap().clone())
        );
    }

    #[test]
    fn rejected_action_leaves_state_alone() {
        let mut session = session();
        create(&mut session, "note");
        let before = session.state().clone();

        let err = session
            .apply(&CanvasAction::SetChartMetricValue {
                item_id: "0001".into(),
                index: 0,
                value: 5.0,
            })
            .unwrap_err();
        assert!(matches!(err, SdkError::Action(_)));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let mut session = session();
        assert!(matches!(session.ingest_json("[1, 2]"), Err(SdkError::Snapshot(_))));
        assert!(matches!(session.ingest_json("{"), Err(SdkError::Snapshot(_))));
        assert_eq!(session.ingested(), 0);
    }

    #[test]
    fn plan_lifecycle() {
        let mut session = session();
        let diff = session.set_plan(&["research", "write"]);
        assert!(diff.touches(RootField::PlanSteps));

        assert!(session.update_plan_progress(5, StepStatus::Completed, None).is_none());
        session.update_plan_progress(0, StepStatus::Completed, None).unwrap();
        session.update_plan_progress(1, StepStatus::InProgress, None).unwrap();
        assert_eq!(session.state().current_step_index, 1);

        let diff = session.complete_plan();
        assert_eq!(session.state().plan_status, "completed");
        assert!(diff.changes.contains(&StateChange::FieldChanged {
            field: RootField::PlanStatus,
            old: json!("in_progress"),
            new: json!("completed"),
        }));
    }

    #[test]
    fn into_state_hands_back_the_canvas() {
        let mut session = CanvasSession::with_state(RootState::new(), SessionConfig::default());
        create(&mut session, "project");
        let state = session.into_state();
        assert_eq!(state.items_created, 1);
        assert_eq!(state.last_action, "created:0001");
    }
}
