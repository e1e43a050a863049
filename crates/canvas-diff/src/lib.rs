//! Diff engine for canvas state sync.
//!
//! Compares two [`RootState`](canvas_types::RootState) values and reports
//! which items were added, removed, or modified and which root fields
//! changed. The host uses it to see what a merge actually did.
//!
//! # Key Types
//!
//! - [`StateDiff`] / [`StateChange`] -- Structural diff between two canvas states
//! - [`RootField`] -- The non-item fields of the root state
//! - [`ItemPart`] -- Which part of a kept item changed

pub mod state_diff;

pub use state_diff::{diff_states, ItemPart, RootField, StateChange, StateDiff};
