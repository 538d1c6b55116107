//! Identity types for game objects
//!
//! Every backend table uses a numeric primary key; each gets its own newtype so
//! a factory id can never be passed where a realm id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create a new ID
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw ID value
            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, ":{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Identifier of a realm (themed game zone)
    RealmId,
    "realm"
);
define_id!(
    /// Identifier of a resource type
    ResourceId,
    "resource"
);
define_id!(
    /// Identifier of a factory
    FactoryId,
    "factory"
);
define_id!(
    /// Identifier of a skill
    SkillId,
    "skill"
);
