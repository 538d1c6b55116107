//! Idlerealm Admin - Balance edit engine
//!
//! The admin console edits the game's balance tables (realms, resources,
//! factories, skills, unlock costs, endgame requirements). This crate holds
//! the engine behind it, independent of any UI or transport:
//!
//! - **Entity descriptors** - one schema per table driving payload
//!   normalization and local list updates
//! - **Pending edits** - typed-in values kept apart from canonical rows
//! - **Diffs** - text-normalized before/after per field
//! - **Optimistic saves** - apply first, roll back on failure
//! - **Query sync** - admin view state mirrored in the URL
//!
//! ## Saving a row
//!
//! ```rust
//! use idlerealm_admin::{AdminState, EntityKind, ListPage, Row, RowStatus};
//! use idlerealm_core::ValueMap;
//!
//! let mut state = AdminState::new();
//! let mut realm = Row::new(1, ValueMap::new());
//! realm.set("code", "FOREST");
//! realm.set("name", "Forest");
//! state.load(EntityKind::Realms, ListPage { items: vec![realm], total: 1 });
//!
//! state.update_field(EntityKind::Realms, 1, "costMultiplier", "1.25");
//! assert_eq!(state.row_status(EntityKind::Realms, 1), RowStatus::Dirty);
//!
//! let pending = state.begin_save(EntityKind::Realms, 1).unwrap();
//! // ... send `pending.payload` to the backend ...
//! state.finish_save(pending, Ok(None)).unwrap();
//! assert_eq!(state.row_status(EntityKind::Realms, 1), RowStatus::Clean);
//! ```

pub mod api;
pub mod diff;
pub mod editor;
pub mod edits;
pub mod entity;
mod error;
pub mod notice;
pub mod optimistic;
pub mod query;
mod row;
pub mod state;

pub use api::{AdminApi, ApiError, ListPage, ListQuery};
pub use diff::{row_diffs, FieldDiff};
pub use editor::{
    BalanceEditor, BatchOutcome, BatchReport, Confirmation, CreateOutcome, DeleteOutcome, Operator, SaveOutcome,
};
pub use edits::EditTable;
pub use entity::{EntityDescriptor, EntityKind, FieldKind};
pub use error::{Error, Result};
pub use notice::{Notice, NoticeLevel};
pub use optimistic::OptimisticUpdate;
pub use query::{AdminTab, AdminViewState, QuerySync, SortDir};
pub use row::{Row, RowKey};
pub use state::{AdminState, PendingSave, RowStatus};
