//! Idlerealm Core - Game data model and formula engine
//!
//! This crate provides the pieces every other idlerealm crate builds on:
//! - Typed identifiers for realms, resources, factories and skills
//! - Dynamic row values (`Value`, `ValueMap`) mirroring backend JSON rows
//! - Player-side snapshots (`Factory`, `Skill`, `Realm`, `PlayerState`)
//! - The formula engine: upgrade cost, production, bulk affordability
//! - Active-realm view helpers used by the player screen
//!
//! ## Formula Engine
//!
//! All formulas are pure functions of their inputs. Calling them twice with
//! the same snapshots yields bit-identical results:
//!
//! ```rust
//! use idlerealm_core::{formula, Factory, FactoryId, RealmId, ResourceId};
//!
//! let mut mine = Factory::new(FactoryId::new(1), RealmId::new(1), ResourceId::new(1));
//! mine.base_cost = 10.0;
//! mine.base_production = 1.0;
//! mine.level = 1;
//!
//! let cost = formula::next_upgrade_cost(&mine, &[]);
//! assert!((cost - 11.8).abs() < 1e-9);
//! assert_eq!(formula::current_production(&mine, &[]), 1.0);
//! ```

mod error;
pub mod formula;
mod identity;
mod model;
mod value;
pub mod view;

pub use error::{Error, Result};
pub use formula::UpgradeMode;
pub use identity::{FactoryId, RealmId, ResourceId, SkillId};
pub use model::{EffectType, Factory, PlayerState, Realm, RealmUnlockCost, Resource, Skill};
pub use value::{Value, ValueMap};
