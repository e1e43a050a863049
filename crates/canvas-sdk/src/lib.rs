//! Host-side SDK for canvas state sync.
//!
//! The main entry point for applications that embed the canvas. A
//! [`CanvasSession`] owns the cached state, merges agent snapshots into it
//! sequentially, and applies local edits and plan updates.
//!
//! # Key Types
//!
//! - [`CanvasSession`] -- Cached canvas state plus the operations that change it
//! - [`CanvasAction`] -- A single canvas edit, as issued by the frontend tools
//! - [`SessionConfig`] -- TOML-loadable session settings
//! - [`SdkError`] / [`ActionError`] -- Error types

pub mod actions;
pub mod config;
pub mod error;
pub mod plan;
pub mod session;

pub use actions::{apply_action, CanvasAction, METRIC_MAX};
pub use config::SessionConfig;
pub use error::{ActionError, SdkError, SdkResult};
pub use plan::{complete_plan, set_plan, update_plan_progress};
pub use session::CanvasSession;

// Re-export key types
pub use canvas_diff::{diff_states, RootField, StateChange, StateDiff};
pub use canvas_merge::merge_agent_state_snapshots;
pub use canvas_types::{CardType, Item, ItemData, PlanStep, RootState, Snapshot, StepStatus};
