//! Player-side game state snapshots
//!
//! These mirror the profile payload returned by the backend. Field names use
//! the backend's camelCase convention on the wire.

use crate::{FactoryId, RealmId, ResourceId, SkillId};
use serde::{Deserialize, Serialize};

fn one() -> f64 {
    1.0
}

/// A resource and the player's stock of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub resource_id: ResourceId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    /// Current stock
    #[serde(default)]
    pub amount: f64,
    /// Cumulative amount ever produced
    #[serde(default)]
    pub lifetime_amount: f64,
    #[serde(default)]
    pub realm_id: Option<RealmId>,
}

/// A per-realm production unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factory {
    pub factory_id: FactoryId,
    pub realm_id: RealmId,
    pub resource_id: ResourceId,
    #[serde(default)]
    pub name: String,
    /// 0 means locked
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub base_production: f64,
    #[serde(default)]
    pub base_cost: f64,
    /// Reveal sequence among locked factories of a realm
    #[serde(default)]
    pub unlock_order: u32,
    #[serde(default = "one")]
    pub realm_cost_multiplier: f64,
    #[serde(default = "one")]
    pub realm_production_multiplier: f64,
}

impl Factory {
    /// Create a locked factory with neutral realm multipliers
    pub fn new(factory_id: FactoryId, realm_id: RealmId, resource_id: ResourceId) -> Self {
        Self {
            factory_id,
            realm_id,
            resource_id,
            name: String::new(),
            level: 0,
            base_production: 0.0,
            base_cost: 0.0,
            unlock_order: 0,
            realm_cost_multiplier: 1.0,
            realm_production_multiplier: 1.0,
        }
    }

    /// Is this factory still locked?
    pub fn is_locked(&self) -> bool {
        self.level == 0
    }
}

/// What a skill modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectType {
    /// Lowers factory upgrade cost (negative `effect_value`)
    CostReduction,
    /// Multiplies production of matching factories
    ProdMultiplier,
    /// Multiplies production of every matching factory, stacked separately
    GlobalMultiplier,
    /// Any effect this client does not know about; contributes nothing
    #[serde(other)]
    Unknown,
}

/// A levelable modifier, global or scoped to one realm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub skill_id: SkillId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub max_level: u32,
    pub effect_type: EffectType,
    /// Per-level additive contribution
    #[serde(default)]
    pub effect_value: f64,
    /// `None` applies the effect to every realm
    #[serde(default)]
    pub realm_id: Option<RealmId>,
    #[serde(default)]
    pub base_cost: f64,
}

impl Skill {
    /// Create a level-0 skill
    pub fn new(skill_id: SkillId, effect_type: EffectType, effect_value: f64) -> Self {
        Self {
            skill_id,
            code: String::new(),
            name: String::new(),
            level: 0,
            max_level: 0,
            effect_type,
            effect_value,
            realm_id: None,
            base_cost: 0.0,
        }
    }

    /// Does this skill's effect reach factories of `realm`?
    pub fn applies_to(&self, realm: RealmId) -> bool {
        self.realm_id.map_or(true, |scope| scope == realm)
    }
}

/// A themed game zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Realm {
    pub realm_id: RealmId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_unlocked: bool,
    #[serde(default)]
    pub is_default_unlocked: bool,
    /// Exactly one realm should be active per player
    #[serde(default)]
    pub is_active: bool,
}

/// Resource amount required to unlock a realm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmUnlockCost {
    pub target_realm_id: RealmId,
    pub resource_id: ResourceId,
    pub amount: f64,
}

/// Everything the player view polls from the profile endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub factories: Vec<Factory>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub realms: Vec<Realm>,
    #[serde(default)]
    pub realm_unlock_costs: Vec<RealmUnlockCost>,
}

impl PlayerState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stock of a resource (0 when unknown)
    pub fn amount_of(&self, resource_id: ResourceId) -> f64 {
        self.resources
            .iter()
            .find(|r| r.resource_id == resource_id)
            .map_or(0.0, |r| r.amount)
    }

    /// Look up a factory
    pub fn factory(&self, factory_id: FactoryId) -> Option<&Factory> {
        self.factories.iter().find(|f| f.factory_id == factory_id)
    }

    /// Look up a skill
    pub fn skill(&self, skill_id: SkillId) -> Option<&Skill> {
        self.skills.iter().find(|s| s.skill_id == skill_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_defaults_from_json() {
        let factory: Factory = serde_json::from_str(
            r#"{"factoryId": 1, "realmId": 2, "resourceId": 3, "level": 4, "baseCost": 10}"#,
        )
        .unwrap();
        assert_eq!(factory.level, 4);
        assert_eq!(factory.base_cost, 10.0);
        assert_eq!(factory.realm_cost_multiplier, 1.0);
        assert_eq!(factory.realm_production_multiplier, 1.0);
    }

    #[test]
    fn test_unknown_effect_type() {
        let skill: Skill =
            serde_json::from_str(r#"{"skillId": 1, "effectType": "LUCK_BOOST", "effectValue": 0.5}"#)
                .unwrap();
        assert_eq!(skill.effect_type, EffectType::Unknown);
    }

    #[test]
    fn test_skill_scope() {
        let mut skill = Skill::new(SkillId::new(1), EffectType::ProdMultiplier, 0.1);
        assert!(skill.applies_to(RealmId::new(5)));
        skill.realm_id = Some(RealmId::new(2));
        assert!(skill.applies_to(RealmId::new(2)));
        assert!(!skill.applies_to(RealmId::new(5)));
    }

    #[test]
    fn test_player_state_ron() {
        let ron_str = r#"
        (
            resources: [(resourceId: 1, code: "gold", name: "Gold", amount: 250.0)],
            factories: [(factoryId: 1, realmId: 1, resourceId: 1, level: 2, baseCost: 10.0)],
        )
        "#;
        let state: PlayerState = ron::from_str(ron_str).unwrap();
        assert_eq!(state.amount_of(ResourceId::new(1)), 250.0);
        assert_eq!(state.amount_of(ResourceId::new(9)), 0.0);
        assert!(state.factory(FactoryId::new(1)).is_some());
    }
}
