//! Active-realm view of a player state
//!
//! The player screen only shows what belongs to the active realm (plus global
//! items). Locked factories are revealed one at a time in `unlock_order`.

use crate::formula;
use crate::{Factory, PlayerState, Realm, RealmId, Resource, ResourceId, Skill};
use indexmap::IndexMap;

/// The realm currently flagged active
pub fn active_realm(state: &PlayerState) -> Option<&Realm> {
    state.realms.iter().find(|r| r.is_active)
}

/// Unlocked factories of the active realm, then the next locked one to reveal
pub fn visible_factories(state: &PlayerState) -> Vec<&Factory> {
    let Some(realm) = active_realm(state) else {
        return Vec::new();
    };

    let in_realm = state.factories.iter().filter(|f| f.realm_id == realm.realm_id);
    let (mut visible, locked): (Vec<&Factory>, Vec<&Factory>) = in_realm.partition(|f| !f.is_locked());

    if let Some(next) = locked.into_iter().min_by_key(|f| (f.unlock_order, f.factory_id)) {
        visible.push(next);
    }
    visible.sort_by_key(|f| (f.unlock_order, f.factory_id));
    visible
}

/// Global skills plus those scoped to the active realm
pub fn visible_skills(state: &PlayerState) -> Vec<&Skill> {
    let active = active_realm(state).map(|r| r.realm_id);
    state
        .skills
        .iter()
        .filter(|s| in_scope(s.realm_id, active))
        .collect()
}

/// Global resources plus those belonging to the active realm
pub fn visible_resources(state: &PlayerState) -> Vec<&Resource> {
    let active = active_realm(state).map(|r| r.realm_id);
    state
        .resources
        .iter()
        .filter(|r| in_scope(r.realm_id, active))
        .collect()
}

fn in_scope(item_realm: Option<RealmId>, active: Option<RealmId>) -> bool {
    match item_realm {
        None => true,
        Some(realm) => Some(realm) == active,
    }
}

/// Production per second for each resource, across every realm
pub fn production_by_resource(state: &PlayerState) -> IndexMap<ResourceId, f64> {
    let mut totals: IndexMap<ResourceId, f64> = IndexMap::new();
    for factory in &state.factories {
        let produced = formula::current_production(factory, &state.skills);
        *totals.entry(factory.resource_id).or_insert(0.0) += produced;
    }
    totals
}

/// Does the player hold every resource amount required to unlock `realm_id`?
///
/// A realm without unlock costs is always affordable.
pub fn can_afford_realm_unlock(state: &PlayerState, realm_id: RealmId) -> bool {
    state
        .realm_unlock_costs
        .iter()
        .filter(|c| c.target_realm_id == realm_id)
        .all(|c| state.amount_of(c.resource_id) >= c.amount)
}
