//! Admin application state
//!
//! `AdminState` owns one canonical table per entity kind, the side table of
//! pending edits, and the per-row Saving / RolledBack markers. Every table
//! mutation is a whole-table replacement.
//!
//! Saves are two-phase so the async editor can await the backend in between:
//!
//! ```text
//! begin_save   Dirty -> Saving   (optimistic row applied)
//! finish_save  Saving -> Clean     on success (edits cleared)
//!              Saving -> RolledBack on failure (prior row restored, edits kept)
//! ```

use crate::api::{ApiError, ListPage};
use crate::diff::{row_diffs, FieldDiff};
use crate::edits::EditTable;
use crate::entity::EntityKind;
use crate::notice;
use crate::optimistic::OptimisticUpdate;
use crate::row::{Row, RowKey};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use idlerealm_core::{Value, ValueMap};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Edit lifecycle of one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Clean,
    Dirty,
    Saving,
    /// Last save failed and was undone; edits are still pending
    RolledBack,
}

/// Cached rows of one kind
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    pub rows: Vec<Row>,
    pub total: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// A save between `begin_save` and `finish_save`
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub update: OptimisticUpdate,
    /// Normalized body for the update request
    pub payload: ValueMap,
    pub diffs: Vec<FieldDiff>,
}

impl PendingSave {
    pub fn key(&self) -> RowKey {
        self.update.key()
    }
}

/// Canonical tables plus edit bookkeeping
#[derive(Debug, Default)]
pub struct AdminState {
    tables: IndexMap<EntityKind, EntityTable>,
    edits: EditTable,
    saving: HashSet<RowKey>,
    rolled_back: HashSet<RowKey>,
}

impl AdminState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a table with a freshly fetched page
    pub fn load(&mut self, kind: EntityKind, page: ListPage) {
        let table = self.tables.entry(kind).or_default();
        table.rows = page.items;
        table.total = page.total;
        table.loaded_at = Some(Utc::now());
    }

    pub fn table(&self, kind: EntityKind) -> Option<&EntityTable> {
        self.tables.get(&kind)
    }

    /// Cached rows of a kind, empty until loaded
    pub fn rows(&self, kind: EntityKind) -> &[Row] {
        self.tables.get(&kind).map_or(&[], |t| t.rows.as_slice())
    }

    pub fn row(&self, kind: EntityKind, id: u64) -> Option<&Row> {
        self.rows(kind).iter().find(|r| r.id == id)
    }

    pub fn edits(&self) -> &EditTable {
        &self.edits
    }

    /// Record a typed value; no coercion happens here
    pub fn update_field(&mut self, kind: EntityKind, id: u64, field: impl Into<String>, value: impl Into<Value>) {
        let key = RowKey::new(kind, id);
        self.edits.update_field(key, field, value);
        self.rolled_back.remove(&key);
    }

    /// Throw away a row's pending edits
    pub fn discard(&mut self, kind: EntityKind, id: u64) {
        let key = RowKey::new(kind, id);
        self.edits.discard(&key);
        self.rolled_back.remove(&key);
    }

    /// The row as it would look with its pending edits
    pub fn merged_row(&self, kind: EntityKind, id: u64) -> Option<Row> {
        let row = self.row(kind, id)?;
        Some(match self.edits.patch(&RowKey::new(kind, id)) {
            Some(patch) => row.merged(patch),
            None => row.clone(),
        })
    }

    /// Field diffs of a row against its pending edits
    ///
    /// Edits to columns outside the kind's schema are never sent, so they
    /// never count as a change.
    pub fn diffs(&self, kind: EntityKind, id: u64) -> Vec<FieldDiff> {
        match self.row(kind, id) {
            Some(row) => schema_diffs(kind, row, self.edits.patch(&RowKey::new(kind, id))),
            None => Vec::new(),
        }
    }

    pub fn is_saving(&self, kind: EntityKind, id: u64) -> bool {
        self.saving.contains(&RowKey::new(kind, id))
    }

    pub fn row_status(&self, kind: EntityKind, id: u64) -> RowStatus {
        let key = RowKey::new(kind, id);
        if self.saving.contains(&key) {
            RowStatus::Saving
        } else if self.rolled_back.contains(&key) {
            RowStatus::RolledBack
        } else if self.diffs(kind, id).is_empty() {
            RowStatus::Clean
        } else {
            RowStatus::Dirty
        }
    }

    /// Rows of a kind with a non-empty diff, in table order, skipping rows
    /// already being saved
    pub fn dirty_rows(&self, kind: EntityKind) -> Vec<(RowKey, Vec<FieldDiff>)> {
        self.rows(kind)
            .iter()
            .filter(|row| !self.is_saving(kind, row.id))
            .filter_map(|row| {
                let key = RowKey::new(kind, row.id);
                let diffs = schema_diffs(kind, row, self.edits.patch(&key));
                (!diffs.is_empty()).then_some((key, diffs))
            })
            .collect()
    }

    /// Start a save: mark the row Saving and apply the optimistic row
    pub fn begin_save(&mut self, kind: EntityKind, id: u64) -> Result<PendingSave> {
        let key = RowKey::new(kind, id);
        if self.saving.contains(&key) {
            return Err(Error::AlreadySaving(key.to_string()));
        }

        let rows = self.rows(kind);
        let position = rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::RowNotFound(key.to_string()))?;
        let prior = &rows[position];

        let patch = match self.edits.patch(&key) {
            Some(patch) if !patch.is_empty() => patch,
            _ => return Err(Error::NothingToSave(key.to_string())),
        };
        let diffs = schema_diffs(kind, prior, Some(patch));
        if diffs.is_empty() {
            return Err(Error::NothingToSave(key.to_string()));
        }

        let payload = kind.descriptor().normalize(&prior.merged(patch).fields);
        let next = prior.merged(&payload);
        let update = OptimisticUpdate::new(key, position, prior.clone(), next);

        let applied = update.apply(rows);
        self.tables.entry(kind).or_default().rows = applied;
        self.saving.insert(key);
        self.rolled_back.remove(&key);

        Ok(PendingSave {
            update,
            payload,
            diffs,
        })
    }

    /// Settle a save with the backend's answer
    ///
    /// The Saving marker is cleared whatever the outcome. On failure the
    /// prior row is restored and the pending edits survive.
    pub fn finish_save(
        &mut self,
        pending: PendingSave,
        outcome: std::result::Result<Option<Row>, ApiError>,
    ) -> Result<()> {
        let key = pending.key();
        self.saving.remove(&key);

        match outcome {
            Ok(stored) => {
                self.edits.discard(&key);
                self.rolled_back.remove(&key);
                if let Some(stored) = stored {
                    let table = self.tables.entry(key.kind).or_default();
                    table.rows = key.kind.descriptor().apply_local(&table.rows, stored);
                }
                Ok(())
            }
            Err(err) => {
                let table = self.tables.entry(key.kind).or_default();
                table.rows = pending.update.rollback(&table.rows);
                self.rolled_back.insert(key);
                Err(Error::Remote(err))
            }
        }
    }

    /// Empty create form for a kind
    pub fn new_draft(&self, kind: EntityKind) -> ValueMap {
        kind.descriptor().defaults()
    }

    /// Normalize and check a create draft against required fields and the
    /// cached rows' uniqueness key
    pub fn validate_create(&self, kind: EntityKind, draft: &ValueMap) -> Result<ValueMap> {
        let descriptor = kind.descriptor();
        let payload = descriptor.normalize(draft);

        let missing = descriptor.missing_required(&payload);
        if !missing.is_empty() {
            return Err(Error::MissingFields(missing));
        }

        if let Some(wanted) = descriptor.unique_key_of(&payload) {
            let taken = self
                .rows(kind)
                .iter()
                .any(|row| descriptor.unique_key_of(&row.fields).as_ref() == Some(&wanted));
            if taken {
                let message = match kind {
                    EntityKind::RealmUnlockCosts => notice::UNLOCK_COST_EXISTS,
                    _ => notice::ENTRY_EXISTS,
                };
                return Err(Error::Duplicate(message.to_string()));
            }
        }

        Ok(payload)
    }

    /// Add a row the backend just created
    pub fn insert_created(&mut self, kind: EntityKind, row: Row) {
        let table = self.tables.entry(kind).or_default();
        table.rows = kind.descriptor().apply_local(&table.rows, row);
        table.total += 1;
    }

    /// Drop a row the backend just deleted
    pub fn remove_deleted(&mut self, kind: EntityKind, id: u64) {
        let key = RowKey::new(kind, id);
        let table = self.tables.entry(kind).or_default();
        let before = table.rows.len();
        table.rows = kind.descriptor().remove_local(&table.rows, id);
        if table.rows.len() < before {
            table.total = table.total.saturating_sub(1);
        }
        self.edits.discard(&key);
        self.rolled_back.remove(&key);
    }
}

fn schema_diffs(kind: EntityKind, row: &Row, patch: Option<&ValueMap>) -> Vec<FieldDiff> {
    let descriptor = kind.descriptor();
    let mut diffs = row_diffs(row, patch);
    diffs.retain(|diff| descriptor.field(&diff.field).is_some());
    diffs
}
