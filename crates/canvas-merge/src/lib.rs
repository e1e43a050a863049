//! Reconciliation engine for canvas state sync.
//!
//! The agent sends a possibly-partial [`Snapshot`] after every turn. The
//! engine folds it into the cached [`RootState`] instead of overwriting it:
//! untouched fields are kept, counters only move forward, item order is
//! stable, and deletions arrive through the `deleted:<id>` action tag.
//!
//! Every function here is pure. Inputs are borrowed and never mutated; the
//! result is a freshly allocated state.
//!
//! # Quick Start
//!
//! ```rust
//! use canvas_merge::merge_agent_state_snapshots;
//! use canvas_types::{Item, RootState, Snapshot};
//! use serde_json::json;
//!
//! let mut cached = RootState::new();
//! cached.items.push(Item::new("0001", "note", "Idea"));
//! cached.items_created = 1;
//!
//! let incoming = Snapshot::from_value(&json!({
//!     "items": [{"id": "0001", "type": "note", "data": {"field1": "draft"}}],
//!     "itemsCreated": 0
//! }))
//! .unwrap();
//!
//! let merged = merge_agent_state_snapshots(&cached, &incoming);
//! assert_eq!(merged.items_created, 1);
//! assert_eq!(merged.items[0].name, "Idea");
//! ```

pub mod items;
pub mod keyed;
pub mod payload;
pub mod primitives;
pub mod root;

pub use items::{merge_item, merge_items};
pub use keyed::{merge_by_id, Keyed};
pub use payload::{merge_item_data, Reconcile};
pub use primitives::{deleted_id, prefer_non_empty, DELETED_PREFIX};
pub use root::merge_agent_state_snapshots;

pub use canvas_types::{RootState, Snapshot};
