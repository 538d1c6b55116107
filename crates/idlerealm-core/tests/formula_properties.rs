//! Property-based tests for the formula engine.
//!
//! Generates random factories and skill sets, then checks the invariants the
//! player view relies on: monotone costs, the cost-reduction floor, the
//! locked-factory zero, and price consistency of bulk purchases.

use idlerealm_core::formula::{
    affordable_upgrades, bulk_upgrade_cost, cost_multiplier, current_production, next_upgrade_cost,
    MIN_COST_MULTIPLIER,
};
use idlerealm_core::{EffectType, Factory, FactoryId, RealmId, ResourceId, Skill, SkillId, UpgradeMode};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_factory() -> impl Strategy<Value = Factory> {
    (0u32..400, 0.1f64..1e6, 0.1f64..1e4, 0.1f64..10.0, 0.1f64..10.0, 1u64..4).prop_map(
        |(level, base_cost, base_production, cost_mult, prod_mult, realm)| {
            let mut factory = Factory::new(FactoryId::new(1), RealmId::new(realm), ResourceId::new(1));
            factory.level = level;
            factory.base_cost = base_cost;
            factory.base_production = base_production;
            factory.realm_cost_multiplier = cost_mult;
            factory.realm_production_multiplier = prod_mult;
            factory
        },
    )
}

fn arb_skill() -> impl Strategy<Value = Skill> {
    (
        prop_oneof![
            Just(EffectType::CostReduction),
            Just(EffectType::ProdMultiplier),
            Just(EffectType::GlobalMultiplier),
        ],
        -0.5f64..0.5,
        0u32..20,
        proptest::option::of(1u64..4),
    )
        .prop_map(|(effect_type, effect_value, level, realm)| {
            let mut skill = Skill::new(SkillId::new(1), effect_type, effect_value);
            skill.level = level;
            skill.max_level = 20;
            skill.realm_id = realm.map(RealmId::new);
            skill
        })
}

fn arb_skills() -> impl Strategy<Value = Vec<Skill>> {
    proptest::collection::vec(arb_skill(), 0..6)
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn cost_is_strictly_increasing_in_level(factory in arb_factory(), skills in arb_skills()) {
        let mut next = factory.clone();
        next.level += 1;
        prop_assert!(next_upgrade_cost(&factory, &skills) < next_upgrade_cost(&next, &skills));
    }

    #[test]
    fn cost_multiplier_never_below_floor(factory in arb_factory(), skills in arb_skills()) {
        prop_assert!(cost_multiplier(&factory, &skills) >= MIN_COST_MULTIPLIER);
    }

    #[test]
    fn heavy_cost_reduction_clamps_exactly(factory in arb_factory(), level in 10u32..50) {
        let mut skill = Skill::new(SkillId::new(1), EffectType::CostReduction, -0.2);
        skill.level = level;
        prop_assert_eq!(cost_multiplier(&factory, &[skill]), MIN_COST_MULTIPLIER);
    }

    #[test]
    fn locked_factory_produces_nothing(factory in arb_factory(), skills in arb_skills()) {
        let mut locked = factory;
        locked.level = 0;
        prop_assert_eq!(current_production(&locked, &skills), 0.0);
    }

    #[test]
    fn production_is_deterministic(factory in arb_factory(), skills in arb_skills()) {
        let a = current_production(&factory, &skills);
        let b = current_production(&factory, &skills);
        prop_assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn affordable_count_is_price_consistent(
        factory in arb_factory(),
        skills in arb_skills(),
        balance in 0.0f64..1e9,
    ) {
        let count = affordable_upgrades(&factory, &skills, balance, UpgradeMode::Max);
        let spent = bulk_upgrade_cost(&factory, &skills, count);
        prop_assert!(spent <= balance);

        let mut after = factory.clone();
        after.level += count;
        let next_cost = next_upgrade_cost(&after, &skills);
        prop_assert!(spent + next_cost > balance);
    }

    #[test]
    fn capped_modes_never_exceed_target(
        factory in arb_factory(),
        skills in arb_skills(),
        balance in 0.0f64..1e12,
    ) {
        prop_assert!(affordable_upgrades(&factory, &skills, balance, UpgradeMode::One) <= 1);
        prop_assert!(affordable_upgrades(&factory, &skills, balance, UpgradeMode::Ten) <= 10);
        let max = affordable_upgrades(&factory, &skills, balance, UpgradeMode::Max);
        let hundred = affordable_upgrades(&factory, &skills, balance, UpgradeMode::Hundred);
        prop_assert_eq!(hundred, max.min(100));
    }
}
