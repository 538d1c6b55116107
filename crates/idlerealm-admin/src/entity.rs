//! Entity descriptors for admin-editable tables
//!
//! Every editable table registers one [`EntityDescriptor`]: its field schema,
//! create defaults, required fields and uniqueness key. Payload shaping and
//! local list updates dispatch through the descriptor instead of per-type
//! conditionals.

use crate::row::Row;
use crate::{Error, Result};
use idlerealm_core::{Value, ValueMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An admin-editable table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Realms,
    Resources,
    Factories,
    Skills,
    RealmUnlockCosts,
    EndgameRequirements,
}

impl EntityKind {
    /// All kinds, in admin tab order
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Realms,
        EntityKind::Resources,
        EntityKind::Factories,
        EntityKind::Skills,
        EntityKind::RealmUnlockCosts,
        EntityKind::EndgameRequirements,
    ];

    /// Stable slug used in edit keys and REST paths
    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::Realms => "realms",
            EntityKind::Resources => "resources",
            EntityKind::Factories => "factories",
            EntityKind::Skills => "skills",
            EntityKind::RealmUnlockCosts => "realm-unlock-costs",
            EntityKind::EndgameRequirements => "endgame-requirements",
        }
    }

    /// The registered descriptor for this kind
    pub fn descriptor(&self) -> &'static EntityDescriptor {
        match self {
            EntityKind::Realms => &REALMS,
            EntityKind::Resources => &RESOURCES,
            EntityKind::Factories => &FACTORIES,
            EntityKind::Skills => &SKILLS,
            EntityKind::RealmUnlockCosts => &REALM_UNLOCK_COSTS,
            EntityKind::EndgameRequirements => &ENDGAME_REQUIREMENTS,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

/// How a column is coerced when a draft is normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed text
    Text,
    /// Numeric-or-null
    Number,
    /// Boolean stored as 0/1
    Flag,
    /// Foreign key, numeric-or-null
    Ref,
}

/// Value a create draft starts with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    /// Empty text for text columns, null otherwise
    Empty,
    Number(f64),
    Flag(bool),
    Text(&'static str),
}

/// One column of an editable table
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: FieldDefault,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        default: FieldDefault::Empty,
    }
}

const fn field_or(name: &'static str, kind: FieldKind, default: FieldDefault) -> FieldSpec {
    FieldSpec { name, kind, default }
}

impl FieldSpec {
    /// Coerce a raw (possibly typed-in) value for this column
    pub fn normalize(&self, value: &Value) -> Value {
        match self.kind {
            FieldKind::Text => match value {
                Value::Null => Value::Null,
                other => Value::String(other.to_text().trim().to_string()),
            },
            FieldKind::Number | FieldKind::Ref => value
                .as_number_or_null()
                .map_or(Value::Null, Value::from_number),
            FieldKind::Flag => Value::Int(i64::from(value.as_flag())),
        }
    }

    fn default_value(&self) -> Value {
        match (self.default, self.kind) {
            (FieldDefault::Empty, FieldKind::Text) => Value::String(String::new()),
            (FieldDefault::Empty, _) => Value::Null,
            (FieldDefault::Number(n), _) => Value::from_number(n),
            (FieldDefault::Flag(b), _) => Value::Int(i64::from(b)),
            (FieldDefault::Text(s), _) => Value::String(s.to_string()),
        }
    }
}

/// Schema and behavior of one editable table
pub struct EntityDescriptor {
    pub kind: EntityKind,
    pub fields: &'static [FieldSpec],
    /// Must be non-empty before a create is sent
    pub required: &'static [&'static str],
    /// Columns that must be unique together among cached rows
    pub unique_key: &'static [&'static str],
    /// Kind-specific fix-ups applied after column coercion
    pub finish: Option<fn(&mut ValueMap)>,
}

impl fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("kind", &self.kind)
            .field("fields", &self.fields)
            .field("required", &self.required)
            .field("unique_key", &self.unique_key)
            .finish_non_exhaustive()
    }
}

impl EntityDescriptor {
    /// Look up a column
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Draft for the create form
    pub fn defaults(&self) -> ValueMap {
        self.fields
            .iter()
            .map(|f| (f.name.to_string(), f.default_value()))
            .collect()
    }

    /// Shape a draft into the payload sent to the backend
    ///
    /// Only schema columns present in the draft are kept.
    pub fn normalize(&self, draft: &ValueMap) -> ValueMap {
        let mut payload: ValueMap = self
            .fields
            .iter()
            .filter_map(|f| draft.get(f.name).map(|v| (f.name.to_string(), f.normalize(v))))
            .collect();
        if let Some(finish) = self.finish {
            finish(&mut payload);
        }
        payload
    }

    /// Required columns that are null or blank in a normalized payload
    pub fn missing_required(&self, payload: &ValueMap) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|name| payload.get(*name).map_or(true, |v| v.to_text().is_empty()))
            .collect()
    }

    /// Text-normalized uniqueness key, `None` when the table has none
    pub fn unique_key_of(&self, values: &ValueMap) -> Option<Vec<String>> {
        if self.unique_key.is_empty() {
            return None;
        }
        Some(
            self.unique_key
                .iter()
                .map(|name| values.get(*name).map(Value::to_text).unwrap_or_default())
                .collect(),
        )
    }

    /// Replace the row with the same id, or append it
    pub fn apply_local(&self, rows: &[Row], row: Row) -> Vec<Row> {
        let mut next = rows.to_vec();
        match next.iter().position(|r| r.id == row.id) {
            Some(index) => next[index] = row,
            None => next.push(row),
        }
        next
    }

    /// Drop the row with `id`
    pub fn remove_local(&self, rows: &[Row], id: u64) -> Vec<Row> {
        rows.iter().filter(|r| r.id != id).cloned().collect()
    }
}

fn uppercase_effect_type(payload: &mut ValueMap) {
    if let Some(Value::String(effect)) = payload.get_mut("effectType") {
        *effect = effect.to_ascii_uppercase();
    }
}

use FieldKind::{Flag, Number, Ref, Text};

static REALMS: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Realms,
    fields: &[
        field("code", Text),
        field("name", Text),
        field("description", Text),
        field_or("sortOrder", Number, FieldDefault::Number(0.0)),
        field_or("isDefaultUnlocked", Flag, FieldDefault::Flag(false)),
        field_or("costMultiplier", Number, FieldDefault::Number(1.0)),
        field_or("productionMultiplier", Number, FieldDefault::Number(1.0)),
    ],
    required: &["code", "name"],
    unique_key: &["code"],
    finish: None,
};

static RESOURCES: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Resources,
    fields: &[
        field("code", Text),
        field("name", Text),
        field("realmId", Ref),
        field_or("sortOrder", Number, FieldDefault::Number(0.0)),
    ],
    required: &["code", "name"],
    unique_key: &["code"],
    finish: None,
};

static FACTORIES: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Factories,
    fields: &[
        field("code", Text),
        field("name", Text),
        field("realmId", Ref),
        field("resourceId", Ref),
        field_or("baseProduction", Number, FieldDefault::Number(1.0)),
        field_or("baseCost", Number, FieldDefault::Number(10.0)),
        field_or("unlockOrder", Number, FieldDefault::Number(0.0)),
    ],
    required: &["name", "realmId", "resourceId"],
    unique_key: &[],
    finish: None,
};

static SKILLS: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Skills,
    fields: &[
        field("code", Text),
        field("name", Text),
        field_or("effectType", Text, FieldDefault::Text("PROD_MULTIPLIER")),
        field_or("effectValue", Number, FieldDefault::Number(0.0)),
        field_or("maxLevel", Number, FieldDefault::Number(1.0)),
        field_or("baseCost", Number, FieldDefault::Number(100.0)),
        field("realmId", Ref),
    ],
    required: &["code", "name", "effectType"],
    unique_key: &["code"],
    finish: Some(uppercase_effect_type),
};

static REALM_UNLOCK_COSTS: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::RealmUnlockCosts,
    fields: &[
        field("targetRealmId", Ref),
        field("resourceId", Ref),
        field("amount", Number),
    ],
    required: &["targetRealmId", "resourceId", "amount"],
    unique_key: &["targetRealmId", "resourceId"],
    finish: None,
};

static ENDGAME_REQUIREMENTS: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::EndgameRequirements,
    fields: &[
        field("resourceId", Ref),
        field("amount", Number),
        field("description", Text),
    ],
    required: &["resourceId", "amount"],
    unique_key: &[],
    finish: None,
};
