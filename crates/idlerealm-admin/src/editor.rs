//! Async entry points of the balance editor
//!
//! [`BalanceEditor`] drives [`AdminState`] against an [`AdminApi`] and talks
//! to the operator through the [`Operator`] seam. No entry point returns an
//! error: every failure is logged, surfaced as a [`Notice`] and reported in
//! the returned outcome.

use crate::api::{AdminApi, ListQuery};
use crate::diff::FieldDiff;
use crate::entity::EntityKind;
use crate::notice::{self, Notice};
use crate::row::{Row, RowKey};
use crate::state::AdminState;
use crate::Error;
use idlerealm_core::{Value, ValueMap};
use std::fmt;
use tracing::{debug, error, info, warn};

/// What the operator is asked to approve
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    Save { key: RowKey, diffs: Vec<FieldDiff> },
    BatchSave { rows: Vec<(RowKey, Vec<FieldDiff>)> },
    Delete { key: RowKey },
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confirmation::Save { key, diffs } => {
                writeln!(f, "Enregistrer {key} ?")?;
                for diff in diffs {
                    writeln!(f, "  {diff}")?;
                }
                Ok(())
            }
            Confirmation::BatchSave { rows } => {
                writeln!(f, "Enregistrer {} ligne(s) ?", rows.len())?;
                for (key, diffs) in rows {
                    writeln!(f, "{key}")?;
                    for diff in diffs {
                        writeln!(f, "  {diff}")?;
                    }
                }
                Ok(())
            }
            Confirmation::Delete { key } => writeln!(f, "Supprimer définitivement {key} ?"),
        }
    }
}

/// The UI side of the editor
pub trait Operator {
    /// Ask for approval; `false` cancels the operation
    fn confirm(&mut self, request: &Confirmation) -> bool;

    fn notify(&mut self, notice: &Notice);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved,
    NoChanges,
    Cancelled,
    AlreadySaving,
    Failed(Error),
}

/// Per-row results of a batch save
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub saved: Vec<RowKey>,
    pub failed: Vec<RowKey>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    NoChanges,
    Cancelled,
    Completed(BatchReport),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    Failed(Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(Row),
    /// Rejected locally, no request sent
    Invalid(Error),
    Failed(Error),
}

/// Balance editor bound to a backend and an operator
pub struct BalanceEditor<A, O> {
    api: A,
    operator: O,
    state: AdminState,
}

impl<A: AdminApi, O: Operator> BalanceEditor<A, O> {
    pub fn new(api: A, operator: O) -> Self {
        Self {
            api,
            operator,
            state: AdminState::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    pub fn state(&self) -> &AdminState {
        &self.state
    }

    /// Reload one table; returns whether it succeeded
    pub async fn refresh(&mut self, kind: EntityKind, query: &ListQuery) -> bool {
        match self.api.list(kind, query).await {
            Ok(page) => {
                debug!(%kind, rows = page.items.len(), total = page.total, "table loaded");
                self.state.load(kind, page);
                true
            }
            Err(err) => {
                warn!(%kind, status = ?err.status, "failed to load table: {err}");
                self.operator
                    .notify(&Notice::error(err.message_or(notice::LOAD_FAILED)));
                false
            }
        }
    }

    pub fn update_field(&mut self, kind: EntityKind, id: u64, field: &str, value: impl Into<Value>) {
        self.state.update_field(kind, id, field, value);
    }

    pub fn discard(&mut self, kind: EntityKind, id: u64) {
        self.state.discard(kind, id);
    }

    /// Preview the row's diffs, ask for confirmation, then commit
    pub async fn request_save(&mut self, kind: EntityKind, id: u64) -> SaveOutcome {
        if self.state.is_saving(kind, id) {
            debug!(%kind, id, "save already in flight");
            return SaveOutcome::AlreadySaving;
        }

        let diffs = self.state.diffs(kind, id);
        if diffs.is_empty() {
            self.operator.notify(&Notice::info(notice::NOTHING_TO_SAVE));
            return SaveOutcome::NoChanges;
        }

        let request = Confirmation::Save {
            key: RowKey::new(kind, id),
            diffs,
        };
        if !self.operator.confirm(&request) {
            return SaveOutcome::Cancelled;
        }

        self.save_row(kind, id).await
    }

    /// Commit a row without asking
    pub async fn save_row(&mut self, kind: EntityKind, id: u64) -> SaveOutcome {
        let pending = match self.state.begin_save(kind, id) {
            Ok(pending) => pending,
            Err(Error::NothingToSave(_)) => {
                self.operator.notify(&Notice::info(notice::NOTHING_TO_SAVE));
                return SaveOutcome::NoChanges;
            }
            Err(Error::AlreadySaving(_)) => {
                self.operator.notify(&Notice::info(notice::SAVE_IN_PROGRESS));
                return SaveOutcome::AlreadySaving;
            }
            Err(err) => {
                warn!(%kind, id, "cannot start save: {err}");
                self.operator.notify(&Notice::error(notice::SAVE_FAILED));
                return SaveOutcome::Failed(err);
            }
        };

        debug!(%kind, id, fields = pending.diffs.len(), "saving row");
        let result = self.api.update(kind, id, &pending.payload).await;

        match self.state.finish_save(pending, result) {
            Ok(()) => {
                info!(%kind, id, "row saved");
                self.operator.notify(&Notice::success(notice::SAVED));
                SaveOutcome::Saved
            }
            Err(err) => {
                error!(%kind, id, "save failed, row rolled back: {err}");
                let message = match &err {
                    Error::Remote(remote) => remote.message_or(notice::SAVE_FAILED).to_string(),
                    _ => notice::SAVE_FAILED.to_string(),
                };
                self.operator.notify(&Notice::error(message));
                SaveOutcome::Failed(err)
            }
        }
    }

    /// Save every dirty row of a kind after one aggregated confirmation
    ///
    /// Rows are committed one at a time. A failing row rolls back on its own
    /// and does not stop the rest.
    pub async fn request_batch_save(&mut self, kind: EntityKind) -> BatchOutcome {
        let rows = self.state.dirty_rows(kind);
        if rows.is_empty() {
            self.operator.notify(&Notice::info(notice::NOTHING_TO_SAVE));
            return BatchOutcome::NoChanges;
        }

        let keys: Vec<RowKey> = rows.iter().map(|(key, _)| *key).collect();
        if !self.operator.confirm(&Confirmation::BatchSave { rows }) {
            return BatchOutcome::Cancelled;
        }

        let mut report = BatchReport::default();
        for key in keys {
            match self.save_row(key.kind, key.id).await {
                SaveOutcome::Saved => report.saved.push(key),
                SaveOutcome::Failed(_) => report.failed.push(key),
                other => debug!(%key, ?other, "batch row skipped"),
            }
        }

        info!(%kind, saved = report.saved.len(), failed = report.failed.len(), "batch save finished");
        let summary = if report.is_complete() {
            Notice::success(format!("{} ligne(s) enregistrée(s).", report.saved.len()))
        } else {
            Notice::warning(format!(
                "{} ligne(s) enregistrée(s), {} en échec.",
                report.saved.len(),
                report.failed.len()
            ))
        };
        self.operator.notify(&summary);

        BatchOutcome::Completed(report)
    }

    /// Delete a row once the backend confirms it
    pub async fn request_delete(&mut self, kind: EntityKind, id: u64) -> DeleteOutcome {
        let key = RowKey::new(kind, id);
        if !self.operator.confirm(&Confirmation::Delete { key }) {
            return DeleteOutcome::Cancelled;
        }

        match self.api.delete(kind, id).await {
            Ok(()) => {
                info!(%kind, id, "row deleted");
                self.state.remove_deleted(kind, id);
                self.operator.notify(&Notice::success(notice::DELETED));
                DeleteOutcome::Deleted
            }
            Err(err) => {
                error!(%kind, id, "delete failed: {err}");
                self.operator
                    .notify(&Notice::error(err.message_or(notice::DELETE_FAILED)));
                DeleteOutcome::Failed(Error::Remote(err))
            }
        }
    }

    /// Empty create form for a kind
    pub fn new_draft(&self, kind: EntityKind) -> ValueMap {
        self.state.new_draft(kind)
    }

    /// Validate a draft locally, then create it
    pub async fn request_create(&mut self, kind: EntityKind, draft: &ValueMap) -> CreateOutcome {
        let payload = match self.state.validate_create(kind, draft) {
            Ok(payload) => payload,
            Err(err) => {
                debug!(%kind, "create rejected locally: {err}");
                let message = match &err {
                    Error::MissingFields(fields) => {
                        format!("{} : {}", notice::MISSING_FIELDS, fields.join(", "))
                    }
                    other => other.to_string(),
                };
                self.operator.notify(&Notice::warning(message));
                return CreateOutcome::Invalid(err);
            }
        };

        match self.api.create(kind, &payload).await {
            Ok(row) => {
                info!(%kind, id = row.id, "row created");
                self.state.insert_created(kind, row.clone());
                self.operator.notify(&Notice::success(notice::CREATED));
                CreateOutcome::Created(row)
            }
            Err(err) => {
                error!(%kind, "create failed: {err}");
                self.operator
                    .notify(&Notice::error(err.message_or(notice::CREATE_FAILED)));
                CreateOutcome::Failed(Error::Remote(err))
            }
        }
    }
}
