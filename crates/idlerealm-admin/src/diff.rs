//! Field-level diffs between a canonical row and its pending edits

use crate::row::Row;
use idlerealm_core::{Value, ValueMap};
use serde::Serialize;
use std::fmt;

/// One changed column, as shown in the save confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub field: String,
    pub before: String,
    pub after: String,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?} -> {:?}", self.field, self.before, self.after)
    }
}

/// Diffs for every patched column whose text form actually changed
///
/// A patch that returns a column to its canonical value yields no entry.
pub fn row_diffs(row: &Row, patch: Option<&ValueMap>) -> Vec<FieldDiff> {
    let Some(patch) = patch else {
        return Vec::new();
    };

    patch
        .iter()
        .filter_map(|(field, edited)| {
            let before = row.get(field).map(Value::to_text).unwrap_or_default();
            let after = edited.to_text();
            (before != after).then(|| FieldDiff {
                field: field.clone(),
                before,
                after,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        let mut row = Row::new(1, ValueMap::new());
        row.set("name", "Mine");
        row.set("baseCost", 10i64);
        row
    }

    #[test]
    fn test_no_patch_no_diff() {
        assert!(row_diffs(&row(), None).is_empty());
    }

    #[test]
    fn test_changed_fields_reported() {
        let mut patch = ValueMap::new();
        patch.insert("baseCost".into(), Value::from("12.5"));
        patch.insert("name".into(), Value::from("Mine"));

        let diffs = row_diffs(&row(), Some(&patch));
        assert_eq!(
            diffs,
            vec![FieldDiff {
                field: "baseCost".into(),
                before: "10".into(),
                after: "12.5".into(),
            }]
        );
    }

    #[test]
    fn test_text_normalized_equality() {
        let mut patch = ValueMap::new();
        patch.insert("baseCost".into(), Value::Float(10.0));
        assert!(row_diffs(&row(), Some(&patch)).is_empty());

        patch.insert("baseCost".into(), Value::from("10"));
        assert!(row_diffs(&row(), Some(&patch)).is_empty());
    }

    #[test]
    fn test_new_column_from_null() {
        let mut patch = ValueMap::new();
        patch.insert("description".into(), Value::from(""));
        assert!(row_diffs(&row(), Some(&patch)).is_empty());

        patch.insert("description".into(), Value::from("Deep"));
        assert_eq!(row_diffs(&row(), Some(&patch)).len(), 1);
    }
}
