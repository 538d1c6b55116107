//! Incremental cost and production formulas
//!
//! Closed-form, deterministic functions evaluated on every player-view
//! refresh. Bulk purchases are simulated level by level with the exact same
//! single-level cost function, so a previewed price always matches what an
//! upgrade would deduct.
//!
//! - cost: `base_cost * 1.18^level * cost_multiplier * realm_cost_multiplier`
//! - production: `base_production * 1.12^(level - 1) * prod * global * realm * milestones`

use crate::{EffectType, Error, Factory, Result, Skill};
use std::fmt;
use std::str::FromStr;

/// Geometric cost growth per factory level
pub const COST_GROWTH: f64 = 1.18;

/// Geometric production growth per factory level
pub const PRODUCTION_GROWTH: f64 = 1.12;

/// Floor of the cost multiplier (cost reduction never exceeds 90%)
pub const MIN_COST_MULTIPLIER: f64 = 0.1;

/// Geometric cost growth per skill level
pub const SKILL_COST_GROWTH: f64 = 1.5;

/// (level step, multiplier) pairs, compounded independently
pub const MILESTONES: [(u32, f64); 3] = [(50, 2.0), (100, 3.0), (250, 5.0)];

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Sum of `effect_value * level` over leveled skills of one type reaching `factory`
fn effect_sum(factory: &Factory, skills: &[Skill], effect_type: EffectType) -> f64 {
    skills
        .iter()
        .filter(|s| s.effect_type == effect_type && s.level > 0 && s.applies_to(factory.realm_id))
        .map(|s| finite_or_zero(s.effect_value) * s.level as f64)
        .sum()
}

/// Effective cost multiplier from cost-reduction skills, clamped to [`MIN_COST_MULTIPLIER`]
pub fn cost_multiplier(factory: &Factory, skills: &[Skill]) -> f64 {
    let multiplier = 1.0 + effect_sum(factory, skills, EffectType::CostReduction);
    multiplier.max(MIN_COST_MULTIPLIER)
}

/// Stepped production bonus: `2^(level/50) * 3^(level/100) * 5^(level/250)`
pub fn milestone_bonus(level: u32) -> f64 {
    MILESTONES
        .iter()
        .map(|&(step, factor)| factor.powi((level / step) as i32))
        .product()
}

/// Cost of buying the next level of `factory`
///
/// Returns `0` when the factory has no positive base cost.
pub fn next_upgrade_cost(factory: &Factory, skills: &[Skill]) -> f64 {
    let base_cost = finite_or_zero(factory.base_cost);
    if base_cost <= 0.0 {
        return 0.0;
    }
    let next_level = factory.level as f64 + 1.0;
    base_cost
        * COST_GROWTH.powf(next_level - 1.0)
        * cost_multiplier(factory, skills)
        * finite_or_zero(factory.realm_cost_multiplier)
}

/// Production per second of `factory` at its current level
///
/// A locked (`level == 0`) or non-productive factory always yields exactly `0`.
pub fn current_production(factory: &Factory, skills: &[Skill]) -> f64 {
    let base_production = finite_or_zero(factory.base_production);
    if factory.level == 0 || base_production <= 0.0 {
        return 0.0;
    }

    let prod_multiplier = 1.0 + effect_sum(factory, skills, EffectType::ProdMultiplier);
    let global_multiplier = 1.0 + effect_sum(factory, skills, EffectType::GlobalMultiplier);
    let base_with_level = base_production * PRODUCTION_GROWTH.powf(factory.level as f64 - 1.0);

    base_with_level
        * prod_multiplier
        * global_multiplier
        * finite_or_zero(factory.realm_production_multiplier)
        * milestone_bonus(factory.level)
}

/// Successive single-level costs starting at the factory's current level
fn upgrade_costs<'a>(factory: &Factory, skills: &'a [Skill]) -> impl Iterator<Item = f64> + 'a {
    let mut simulated = factory.clone();
    std::iter::from_fn(move || {
        let cost = next_upgrade_cost(&simulated, skills);
        simulated.level = simulated.level.saturating_add(1);
        Some(cost)
    })
}

/// Total price of `count` sequential purchases
pub fn bulk_upgrade_cost(factory: &Factory, skills: &[Skill], count: u32) -> f64 {
    upgrade_costs(factory, skills).take(count as usize).sum()
}

/// How many levels `balance` can buy, bounded by `mode`
///
/// Stops at the first level whose cost is non-finite, non-positive or no
/// longer covered by what is left of the balance.
pub fn affordable_upgrades(factory: &Factory, skills: &[Skill], balance: f64, mode: UpgradeMode) -> u32 {
    let cap = mode.target();
    let mut spent = 0.0;
    let mut count = 0u32;

    for cost in upgrade_costs(factory, skills) {
        if cap.is_some_and(|cap| count >= cap) {
            break;
        }
        if !(cost.is_finite() && cost > 0.0 && spent + cost <= balance) {
            break;
        }
        spent += cost;
        count += 1;
    }
    count
}

/// Cost of the next skill level, `None` once maxed or when the skill is free
pub fn skill_next_cost(skill: &Skill) -> Option<f64> {
    let base_cost = finite_or_zero(skill.base_cost);
    if skill.level >= skill.max_level || base_cost <= 0.0 {
        return None;
    }
    Some(base_cost * SKILL_COST_GROWTH.powf(skill.level as f64))
}

/// Bulk purchase target selected in the player view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UpgradeMode {
    #[default]
    One,
    Ten,
    Hundred,
    /// As many levels as the balance allows
    Max,
}

impl UpgradeMode {
    /// Level cap for this mode, `None` for unbounded
    pub fn target(&self) -> Option<u32> {
        match self {
            UpgradeMode::One => Some(1),
            UpgradeMode::Ten => Some(10),
            UpgradeMode::Hundred => Some(100),
            UpgradeMode::Max => None,
        }
    }
}

impl FromStr for UpgradeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1" => Ok(UpgradeMode::One),
            "10" => Ok(UpgradeMode::Ten),
            "100" => Ok(UpgradeMode::Hundred),
            "MAX" => Ok(UpgradeMode::Max),
            _ => Err(Error::InvalidUpgradeMode(s.to_string())),
        }
    }
}

impl fmt::Display for UpgradeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            Some(n) => write!(f, "{}", n),
            None => write!(f, "MAX"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FactoryId, RealmId, ResourceId, SkillId};

    fn forge(level: u32) -> Factory {
        let mut factory = Factory::new(FactoryId::new(1), RealmId::new(1), ResourceId::new(1));
        factory.level = level;
        factory.base_cost = 10.0;
        factory.base_production = 1.0;
        factory
    }

    fn skill(effect_type: EffectType, value: f64, level: u32) -> Skill {
        let mut skill = Skill::new(SkillId::new(level as u64), effect_type, value);
        skill.level = level;
        skill.max_level = 100;
        skill
    }

    #[test]
    fn test_cost_at_level_zero() {
        assert_eq!(next_upgrade_cost(&forge(0), &[]), 10.0);
    }

    #[test]
    fn test_cost_zero_base() {
        let mut factory = forge(5);
        factory.base_cost = 0.0;
        assert_eq!(next_upgrade_cost(&factory, &[]), 0.0);
        factory.base_cost = f64::NAN;
        assert_eq!(next_upgrade_cost(&factory, &[]), 0.0);
    }

    #[test]
    fn test_cost_reduction_floor() {
        let skills = vec![skill(EffectType::CostReduction, -0.5, 3)];
        assert_eq!(cost_multiplier(&forge(1), &skills), MIN_COST_MULTIPLIER);
        assert_eq!(next_upgrade_cost(&forge(0), &skills), 10.0 * MIN_COST_MULTIPLIER);
    }

    #[test]
    fn test_cost_reduction_respects_realm_scope() {
        let mut scoped = skill(EffectType::CostReduction, -0.1, 2);
        scoped.realm_id = Some(RealmId::new(9));
        assert_eq!(cost_multiplier(&forge(1), &[scoped.clone()]), 1.0);

        scoped.realm_id = Some(RealmId::new(1));
        assert!((cost_multiplier(&forge(1), &[scoped]) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_realm_cost_multiplier() {
        let mut factory = forge(0);
        factory.realm_cost_multiplier = 2.5;
        assert_eq!(next_upgrade_cost(&factory, &[]), 25.0);
    }

    #[test]
    fn test_production_zero_when_locked() {
        let mut factory = forge(0);
        factory.base_production = 1000.0;
        assert_eq!(current_production(&factory, &[skill(EffectType::ProdMultiplier, 1.0, 5)]), 0.0);
    }

    #[test]
    fn test_production_zero_when_unproductive() {
        let mut factory = forge(10);
        factory.base_production = 0.0;
        assert_eq!(current_production(&factory, &[]), 0.0);
    }

    #[test]
    fn test_production_level_one() {
        assert_eq!(current_production(&forge(1), &[]), 1.0);
    }

    #[test]
    fn test_production_multipliers_stack() {
        let skills = vec![
            skill(EffectType::ProdMultiplier, 0.25, 2),
            skill(EffectType::GlobalMultiplier, 0.5, 2),
            skill(EffectType::CostReduction, -0.1, 2),
            skill(EffectType::ProdMultiplier, 10.0, 0),
        ];
        // (1 + 0.5) * (1 + 1.0)
        assert_eq!(current_production(&forge(1), &skills), 3.0);
    }

    #[test]
    fn test_milestones() {
        assert_eq!(milestone_bonus(49), 1.0);
        assert_eq!(milestone_bonus(50), 2.0);
        assert_eq!(milestone_bonus(100), 12.0);
        assert_eq!(milestone_bonus(250), 2f64.powi(5) * 9.0 * 5.0);
        assert_eq!(milestone_bonus(300), 8640.0);
    }

    #[test]
    fn test_milestone_regression_level_300() {
        let factory = forge(300);
        let expected = 1.12f64.powf(299.0) * 8640.0;
        assert_eq!(current_production(&factory, &[]), expected);
    }

    #[test]
    fn test_affordable_modes() {
        let factory = forge(0);
        // 10 + 11.8 + 13.924 = 35.724
        assert_eq!(affordable_upgrades(&factory, &[], 36.0, UpgradeMode::Max), 3);
        assert_eq!(affordable_upgrades(&factory, &[], 36.0, UpgradeMode::One), 1);
        assert_eq!(affordable_upgrades(&factory, &[], 9.99, UpgradeMode::Max), 0);
        assert_eq!(affordable_upgrades(&factory, &[], 1e300, UpgradeMode::Ten), 10);
    }

    #[test]
    fn test_affordable_free_factory() {
        let mut factory = forge(0);
        factory.base_cost = 0.0;
        assert_eq!(affordable_upgrades(&factory, &[], 1000.0, UpgradeMode::Max), 0);
    }

    #[test]
    fn test_bulk_cost_matches_single_purchases() {
        let factory = forge(3);
        let skills = vec![skill(EffectType::CostReduction, -0.05, 4)];
        let mut expected = 0.0;
        let mut simulated = factory.clone();
        for _ in 0..5 {
            expected += next_upgrade_cost(&simulated, &skills);
            simulated.level += 1;
        }
        assert_eq!(bulk_upgrade_cost(&factory, &skills, 5), expected);
    }

    #[test]
    fn test_skill_next_cost() {
        let mut s = skill(EffectType::ProdMultiplier, 0.1, 2);
        s.base_cost = 100.0;
        assert_eq!(skill_next_cost(&s), Some(225.0));
        s.level = s.max_level;
        assert_eq!(skill_next_cost(&s), None);
    }

    #[test]
    fn test_upgrade_mode_parse() {
        assert_eq!("max".parse::<UpgradeMode>().unwrap(), UpgradeMode::Max);
        assert_eq!("10".parse::<UpgradeMode>().unwrap(), UpgradeMode::Ten);
        assert!("7".parse::<UpgradeMode>().is_err());
        assert_eq!(UpgradeMode::Hundred.to_string(), "100");
    }
}
