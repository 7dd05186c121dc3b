//! Per-tick production from placed buildings.
//!
//! Base production is integral but multipliers are real-valued. Each field
//! is summed as `f64` across all buildings and the per-tick total is then
//! truncated toward zero, once, so the rounding never compounds per
//! building.

use crate::catalog::Catalog;
use crate::model::{GameState, PlacedBuilding, ResourceDelta};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Output {
    pub money: f64,
    pub materials: f64,
    pub population: f64,
}

impl Output {
    fn add(&mut self, other: Output) {
        self.money += other.money;
        self.materials += other.materials;
        self.population += other.population;
    }

    fn truncate(self) -> ResourceDelta {
        ResourceDelta {
            money: self.money.trunc() as i64,
            materials: self.materials.trunc() as i64,
            population: self.population.trunc() as i64,
        }
    }
}

/// What one building yields per tick at its current level. Unknown types
/// yield nothing.
pub fn building_output(building: &PlacedBuilding, catalog: &Catalog) -> Output {
    let Some(ty) = catalog.building(building.type_id) else {
        return Output::default();
    };
    let mult = ty.multiplier(building.level);
    let p = ty.production;
    Output {
        money: p.money as f64 * mult,
        materials: p.materials as f64 * mult,
        population: p.population as f64 * mult,
    }
}

/// Aggregate delta for one tick, or `None` when nothing is produced.
pub fn tick_delta(state: &GameState, catalog: &Catalog) -> Option<ResourceDelta> {
    let mut total = Output::default();
    for building in &state.buildings {
        total.add(building_output(building, catalog));
    }
    let delta = total.truncate();
    (!delta.is_zero()).then_some(delta)
}
