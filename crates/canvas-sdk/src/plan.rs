//! Plan tracking: the agent's step list, current step and overall status.

use canvas_types::{PlanStep, RootState, StepStatus};
use tracing::debug;

/// Start a new plan from step titles.
///
/// The first step starts `in_progress`; the rest are `pending`. An empty
/// title list clears the plan.
pub fn set_plan<S: AsRef<str>>(state: &RootState, titles: &[S]) -> RootState {
    let mut next = state.clone();
    next.plan_steps = titles.iter().map(|t| PlanStep::new(t.as_ref())).collect();
    match next.plan_steps.first_mut() {
        Some(first) => {
            first.set_status(StepStatus::InProgress);
            next.current_step_index = 0;
            next.plan_status = StepStatus::InProgress.to_string();
        }
        None => {
            next.current_step_index = -1;
            next.plan_status = String::new();
        }
    }
    debug!(steps = next.plan_steps.len(), "plan set");
    next
}

/// Update one step's status and optional note.
///
/// Returns `None` when `index` is out of range. Marking a step
/// `in_progress` makes it the current step. The overall status is then
/// recomputed: any failed step fails the plan, else any step in progress
/// keeps it in progress, else a fully completed plan is completed and points
/// at its last step. Otherwise the overall status is left as it was.
pub fn update_plan_progress(
    state: &RootState,
    index: usize,
    status: StepStatus,
    note: Option<&str>,
) -> Option<RootState> {
    if index >= state.plan_steps.len() {
        debug!(index, steps = state.plan_steps.len(), "plan step out of range");
        return None;
    }

    let mut next = state.clone();
    let step = &mut next.plan_steps[index];
    step.set_status(status);
    if let Some(note) = note.filter(|n| !n.is_empty()) {
        step.set_note(note);
    }

    if status == StepStatus::InProgress {
        next.current_step_index = index as i64;
    }
    // Raw tags, so steps the agent marked with unknown statuses never count
    // as completed.
    let tags: Vec<Option<&str>> = next.plan_steps.iter().map(PlanStep::status_tag).collect();
    let is = |tag: &Option<&str>, status: StepStatus| *tag == Some(status.as_str());
    if tags.iter().any(|t| is(t, StepStatus::Failed)) {
        next.plan_status = StepStatus::Failed.to_string();
    } else if tags.iter().any(|t| is(t, StepStatus::InProgress)) {
        next.plan_status = StepStatus::InProgress.to_string();
    } else if tags.iter().all(|t| is(t, StepStatus::Completed)) {
        next.plan_status = StepStatus::Completed.to_string();
        next.current_step_index = tags.len() as i64 - 1;
    }

    debug!(index, status = %status, plan_status = %next.plan_status, "plan step updated");
    Some(next)
}

/// Mark every step and the plan itself completed.
pub fn complete_plan(state: &RootState) -> RootState {
    let mut next = state.clone();
    for step in &mut next.plan_steps {
        step.set_status(StepStatus::Completed);
    }
    next.plan_status = StepStatus::Completed.to_string();
    next.current_step_index = next.plan_steps.len() as i64 - 1;
    next
}
