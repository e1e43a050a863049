//! Foundation types for canvas state sync.
//!
//! This crate provides the data model shared by the reconciliation engine,
//! the diff engine, and the hosting session. Every other canvas crate depends
//! on `canvas-types`.
//!
//! # Key Types
//!
//! - [`RootState`] -- The authoritative canvas: items, global text, plan tracking
//! - [`Item`] -- A single card with an id, a type tag, and a typed payload
//! - [`ItemData`] -- Closed set of payload variants plus an opaque fallback
//! - [`CardType`] -- The known card types and their zero-value payloads
//! - [`PlanStep`] / [`StepStatus`] -- Agent-owned plan tracking
//! - [`Snapshot`] -- Sparse, leniently decoded agent state awaiting a merge

pub mod card;
pub mod error;
pub mod item;
pub mod plan;
pub mod shape;
pub mod snapshot;
pub mod state;

pub use card::{default_data_for, CardType, DEFAULT_ENTITY_TAG_OPTIONS};
pub use error::TypeError;
pub use item::{
    ChartData, ChartMetric, ChecklistEntry, EntityData, Item, ItemData, MetricValue, NoteData,
    ProjectData,
};
pub use plan::{PlanStep, StepStatus};
pub use snapshot::{Snapshot, SnapshotItem};
pub use state::{is_non_empty_state, RootState};
