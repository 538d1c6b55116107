//! Optimistic row updates
//!
//! A save replaces the canonical row before the backend confirms it. The
//! update captures the exact prior row at creation time, so rolling back
//! never has to look anything up again.
//!
//! Both directions are pure: they take the current table and return a new
//! one, never mutating rows in place.

use crate::row::{Row, RowKey};

/// An `{apply, rollback}` pair for one row
#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticUpdate {
    key: RowKey,
    /// Position of the row when the update was prepared
    position: usize,
    prior: Row,
    next: Row,
}

impl OptimisticUpdate {
    /// Prepare an update of `prior` (found at `position`) to `next`
    pub fn new(key: RowKey, position: usize, prior: Row, next: Row) -> Self {
        Self {
            key,
            position,
            prior,
            next,
        }
    }

    /// Table with the row replaced by its post-edit version
    pub fn apply(&self, rows: &[Row]) -> Vec<Row> {
        self.replace(rows, &self.next)
    }

    /// Table with the row restored to the snapshot taken at prepare time
    ///
    /// If the row vanished meanwhile (e.g. a refresh dropped it), the snapshot
    /// is reinserted at its original position.
    pub fn rollback(&self, rows: &[Row]) -> Vec<Row> {
        self.replace(rows, &self.prior)
    }

    fn replace(&self, rows: &[Row], with: &Row) -> Vec<Row> {
        let mut table = rows.to_vec();
        match table.iter().position(|r| r.id == self.key.id) {
            Some(index) => table[index] = with.clone(),
            None => table.insert(self.position.min(table.len()), with.clone()),
        }
        table
    }

    pub fn key(&self) -> RowKey {
        self.key
    }

    /// The row as it was before the update
    pub fn prior(&self) -> &Row {
        &self.prior
    }

    /// The row as the update writes it
    pub fn next(&self) -> &Row {
        &self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use idlerealm_core::ValueMap;

    fn named(id: u64, name: &str) -> Row {
        let mut row = Row::new(id, ValueMap::new());
        row.set("name", name);
        row
    }

    #[test]
    fn test_apply_then_rollback() {
        let rows = vec![named(1, "a"), named(2, "b"), named(3, "c")];
        let update = OptimisticUpdate::new(
            RowKey::new(EntityKind::Realms, 2),
            1,
            rows[1].clone(),
            named(2, "B"),
        );

        let applied = update.apply(&rows);
        assert_eq!(applied[1], named(2, "B"));
        assert_eq!(applied[0], rows[0]);

        let restored = update.rollback(&applied);
        assert_eq!(restored, rows);
    }

    #[test]
    fn test_rollback_reinserts_missing_row() {
        let rows = vec![named(1, "a"), named(2, "b"), named(3, "c")];
        let update = OptimisticUpdate::new(
            RowKey::new(EntityKind::Realms, 2),
            1,
            rows[1].clone(),
            named(2, "B"),
        );

        let without = vec![named(1, "a"), named(3, "c")];
        assert_eq!(update.rollback(&without), rows);
    }
}
