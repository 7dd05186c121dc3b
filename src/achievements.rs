//! Achievement evaluation against the committed state.

use crate::catalog::{Catalog, Condition, Metric};
use crate::model::GameState;

pub fn metric_value(state: &GameState, metric: Metric) -> i64 {
    let c = &state.counters;
    let widen = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
    match metric {
        Metric::BuildingsPlaced => widen(c.total_buildings_placed),
        Metric::Population => state.resources.population,
        Metric::MoneyEarned => widen(c.total_money_earned),
        Metric::MaterialsProduced => widen(c.total_materials_produced),
        Metric::ParksBuilt => widen(c.parks_built),
        Metric::PowerPlantsBuilt => widen(c.power_plants_built),
        Metric::Money => state.resources.money,
    }
}

pub fn is_met(state: &GameState, condition: Condition) -> bool {
    metric_value(state, condition.metric) >= condition.at_least
}

/// Ids of achievements whose condition holds but which are still locked,
/// in ascending id order.
pub fn pending_unlocks(state: &GameState, catalog: &Catalog) -> Vec<u32> {
    catalog
        .achievements()
        .iter()
        .filter(|def| !state.is_unlocked(def.id) && is_met(state, def.condition))
        .map(|def| def.id)
        .collect()
}

/// Progress toward a condition as a fraction in `0.0..=1.0`.
pub fn progress(state: &GameState, condition: Condition) -> f64 {
    if condition.at_least <= 0 {
        return 1.0;
    }
    (metric_value(state, condition.metric) as f64 / condition.at_least as f64).clamp(0.0, 1.0)
}
