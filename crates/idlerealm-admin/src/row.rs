//! Canonical admin rows and their edit keys

use crate::entity::EntityKind;
use crate::{Error, Result};
use idlerealm_core::{Value, ValueMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of an admin table as returned by the backend
///
/// Apart from `id`, columns stay loosely typed; the entity descriptor decides
/// how they are coerced on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: u64,
    #[serde(flatten)]
    pub fields: ValueMap,
}

impl Row {
    /// Create a row
    pub fn new(id: u64, fields: ValueMap) -> Self {
        Self { id, fields }
    }

    /// Get a column value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a column value
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// A copy of this row with `patch` laid over its columns
    pub fn merged(&self, patch: &ValueMap) -> Row {
        let mut merged = self.clone();
        for (field, value) in patch {
            merged.fields.insert(field.clone(), value.clone());
        }
        merged
    }
}

/// Identifies a row across tables, rendered as `"{type}:{id}"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub kind: EntityKind,
    pub id: u64,
}

impl RowKey {
    pub fn new(kind: EntityKind, id: u64) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.slug(), self.id)
    }
}

impl FromStr for RowKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, id) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidRowKey(s.to_string()))?;
        let id = id.parse().map_err(|_| Error::InvalidRowKey(s.to_string()))?;
        Ok(RowKey::new(kind.parse()?, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_key_format() {
        let key = RowKey::new(EntityKind::RealmUnlockCosts, 12);
        assert_eq!(key.to_string(), "realm-unlock-costs:12");
        assert_eq!("realm-unlock-costs:12".parse::<RowKey>().unwrap(), key);
        assert!("factories".parse::<RowKey>().is_err());
        assert!("widgets:1".parse::<RowKey>().is_err());
    }

    #[test]
    fn test_row_flattens_fields() {
        let row: Row = serde_json::from_str(r#"{"id": 3, "name": "Mine", "baseCost": 15}"#).unwrap();
        assert_eq!(row.id, 3);
        assert_eq!(row.get("baseCost"), Some(&Value::Int(15)));
        assert!(row.get("id").is_none());
    }

    #[test]
    fn test_merged_leaves_original_untouched() {
        let mut row = Row::new(1, ValueMap::new());
        row.set("name", "Mine");
        let mut patch = ValueMap::new();
        patch.insert("name".into(), Value::from("Deep mine"));

        let merged = row.merged(&patch);
        assert_eq!(merged.get("name"), Some(&Value::from("Deep mine")));
        assert_eq!(row.get("name"), Some(&Value::from("Mine")));
    }
}
