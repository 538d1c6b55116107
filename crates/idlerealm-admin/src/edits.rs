//! Pending field edits, kept apart from canonical rows
//!
//! Each dirty row owns a patch of the columns the operator touched. Values
//! are stored exactly as typed; coercion waits until a save is committed so
//! intermediate text never blocks input.

use crate::entity::EntityKind;
use crate::row::RowKey;
use idlerealm_core::{Value, ValueMap};
use indexmap::IndexMap;

/// Side table of pending edits keyed by `"{type}:{id}"`
#[derive(Debug, Clone, Default)]
pub struct EditTable {
    pending: IndexMap<RowKey, ValueMap>,
}

impl EditTable {
    /// Create an empty edit table
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one field value into the row's patch
    pub fn update_field(&mut self, key: RowKey, field: impl Into<String>, value: impl Into<Value>) {
        self.pending
            .entry(key)
            .or_default()
            .insert(field.into(), value.into());
    }

    /// The pending patch for a row, if any
    pub fn patch(&self, key: &RowKey) -> Option<&ValueMap> {
        self.pending.get(key)
    }

    /// Drop a row's pending edits, returning them
    pub fn discard(&mut self, key: &RowKey) -> Option<ValueMap> {
        self.pending.shift_remove(key)
    }

    /// Does the row have an entry at all?
    pub fn contains(&self, key: &RowKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Keys with pending edits for one table, in edit order
    pub fn keys_for(&self, kind: EntityKind) -> impl Iterator<Item = &RowKey> + '_ {
        self.pending.keys().filter(move |k| k.kind == kind)
    }

    /// Number of rows with pending edits
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if no row has pending edits
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending edit
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_merges_fields() {
        let mut edits = EditTable::new();
        let key = RowKey::new(EntityKind::Factories, 4);

        edits.update_field(key, "baseCost", "12");
        edits.update_field(key, "name", "Smelter");
        edits.update_field(key, "baseCost", "15");

        let patch = edits.patch(&key).unwrap();
        assert_eq!(patch.len(), 2);
        assert_eq!(patch.get("baseCost"), Some(&Value::from("15")));
    }

    #[test]
    fn test_keys_for_kind() {
        let mut edits = EditTable::new();
        edits.update_field(RowKey::new(EntityKind::Skills, 1), "name", "a");
        edits.update_field(RowKey::new(EntityKind::Realms, 1), "name", "b");
        edits.update_field(RowKey::new(EntityKind::Skills, 2), "name", "c");

        let ids: Vec<u64> = edits.keys_for(EntityKind::Skills).map(|k| k.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_discard() {
        let mut edits = EditTable::new();
        let key = RowKey::new(EntityKind::Realms, 1);
        edits.update_field(key, "name", "x");
        assert!(edits.discard(&key).is_some());
        assert!(!edits.contains(&key));
        assert!(edits.is_empty());
    }
}
