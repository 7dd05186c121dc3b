//! Core data model and the game-state reducer.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use yew::Reducible;

use crate::catalog::{self, Catalog, TrackedCounter};
use crate::config::GameConfig;

pub const MAX_LEVEL: u8 = 2;
pub const UPGRADE_SCORE_BONUS: u64 = 100;
pub const ACHIEVEMENT_SCORE_BONUS: u64 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// A change to every resource at once. Absent fields in serialized form
/// read as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceDelta {
    pub money: i64,
    pub materials: i64,
    pub population: i64,
}

impl ResourceDelta {
    pub fn is_zero(&self) -> bool {
        self.money == 0 && self.materials == 0 && self.population == 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub money: i64,
    pub population: i64,
    pub materials: i64,
}

impl Resources {
    pub fn apply(&mut self, delta: ResourceDelta) {
        self.money = self.money.saturating_add(delta.money);
        self.materials = self.materials.saturating_add(delta.materials);
        self.population = self.population.saturating_add(delta.population);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub u64);

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b-{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedBuilding {
    pub id: BuildingId,
    /// Key into the catalog; the type itself is resolved on demand.
    pub type_id: u32,
    pub position: Position,
    pub level: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStatus {
    pub id: u32,
    pub unlocked: bool,
}

/// Lifetime counters. Every field only ever grows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Counters {
    pub total_money_earned: u64,
    pub total_materials_produced: u64,
    pub total_buildings_placed: u64,
    pub parks_built: u64,
    pub power_plants_built: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub resources: Resources,
    /// Placement order.
    pub buildings: Vec<PlacedBuilding>,
    pub selected_building_type: Option<u32>,
    pub grid_size: GridSize,
    pub is_day: bool,
    /// Mirrors the catalog, ascending id.
    pub achievements: Vec<AchievementStatus>,
    pub score: u64,
    pub city_name: String,
    pub counters: Counters,
    pub next_building_id: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameAction {
    PlaceBuilding { type_id: u32, x: i32, y: i32 },
    UpgradeBuilding { building_id: BuildingId },
    ApplyResourceDelta(ResourceDelta),
    SelectBuildingType(Option<u32>),
    ToggleDayNight,
    UnlockAchievement { achievement_id: u32 },
    SetCityName(String),
}

/// Why an action left the state untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    UnknownBuildingType(u32),
    InsufficientResources { needed: ResourceDelta, available: Resources },
    TileOccupied(Position),
    OutOfBounds(Position),
    UnknownBuilding(BuildingId),
    MaxLevel(BuildingId),
    UnknownAchievement(u32),
    AlreadyUnlocked(u32),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnknownBuildingType(id) => write!(f, "unknown building type {id}"),
            Rejection::InsufficientResources { needed, available } => write!(
                f,
                "not enough resources: need {} money / {} materials, have {} / {}",
                needed.money, needed.materials, available.money, available.materials
            ),
            Rejection::TileOccupied(p) => write!(f, "tile ({}, {}) is already occupied", p.x, p.y),
            Rejection::OutOfBounds(p) => write!(f, "tile ({}, {}) is outside the city", p.x, p.y),
            Rejection::UnknownBuilding(id) => write!(f, "no building with id {id}"),
            Rejection::MaxLevel(id) => write!(f, "building {id} is already at max level"),
            Rejection::UnknownAchievement(id) => write!(f, "unknown achievement {id}"),
            Rejection::AlreadyUnlocked(id) => write!(f, "achievement {id} is already unlocked"),
        }
    }
}

impl std::error::Error for Rejection {}

impl GameState {
    pub fn new(config: &GameConfig, catalog: &Catalog) -> Self {
        Self {
            resources: config.starting_resources,
            buildings: Vec::new(),
            selected_building_type: None,
            grid_size: config.grid_size,
            is_day: true,
            achievements: catalog
                .achievements()
                .iter()
                .map(|a| AchievementStatus {
                    id: a.id,
                    unlocked: false,
                })
                .collect(),
            score: 0,
            city_name: config.city_name.clone(),
            counters: Counters::default(),
            next_building_id: 1,
        }
    }

    pub fn building_at(&self, pos: Position) -> Option<&PlacedBuilding> {
        self.buildings.iter().find(|b| b.position == pos)
    }

    pub fn building(&self, id: BuildingId) -> Option<&PlacedBuilding> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn is_unlocked(&self, achievement_id: u32) -> bool {
        self.achievements
            .iter()
            .any(|a| a.id == achievement_id && a.unlocked)
    }

    /// Computes the successor state without touching `self`.
    pub fn try_apply(&self, action: &GameAction, catalog: &Catalog) -> Result<GameState, Rejection> {
        match action {
            GameAction::PlaceBuilding { type_id, x, y } => {
                let ty = catalog
                    .building(*type_id)
                    .ok_or(Rejection::UnknownBuildingType(*type_id))?;
                if self.resources.money < ty.cost.money
                    || self.resources.materials < ty.cost.materials
                {
                    return Err(Rejection::InsufficientResources {
                        needed: ResourceDelta {
                            money: ty.cost.money,
                            materials: ty.cost.materials,
                            population: 0,
                        },
                        available: self.resources,
                    });
                }
                let position = Position { x: *x, y: *y };
                if !self.grid_size.contains(position) {
                    return Err(Rejection::OutOfBounds(position));
                }
                if self.building_at(position).is_some() {
                    return Err(Rejection::TileOccupied(position));
                }
                let mut new = self.clone();
                new.resources.money -= ty.cost.money;
                new.resources.materials -= ty.cost.materials;
                new.buildings.push(PlacedBuilding {
                    id: BuildingId(new.next_building_id),
                    type_id: ty.id,
                    position,
                    level: 1,
                });
                new.next_building_id += 1;
                new.counters.total_buildings_placed += 1;
                match ty.counter {
                    Some(TrackedCounter::Parks) => new.counters.parks_built += 1,
                    Some(TrackedCounter::PowerPlants) => new.counters.power_plants_built += 1,
                    None => {}
                }
                new.score = new.score.saturating_add(ty.placement_score());
                Ok(new)
            }
            GameAction::UpgradeBuilding { building_id } => {
                let idx = self
                    .buildings
                    .iter()
                    .position(|b| b.id == *building_id)
                    .ok_or(Rejection::UnknownBuilding(*building_id))?;
                let building = &self.buildings[idx];
                let tier = catalog
                    .building(building.type_id)
                    .and_then(|ty| ty.next_tier(building.level))
                    .ok_or(Rejection::MaxLevel(*building_id))?;
                if self.resources.money < tier.cost {
                    return Err(Rejection::InsufficientResources {
                        needed: ResourceDelta {
                            money: tier.cost,
                            ..ResourceDelta::default()
                        },
                        available: self.resources,
                    });
                }
                let mut new = self.clone();
                new.buildings[idx].level += 1;
                new.resources.money -= tier.cost;
                new.score = new.score.saturating_add(UPGRADE_SCORE_BONUS);
                Ok(new)
            }
            GameAction::ApplyResourceDelta(delta) => {
                let mut new = self.clone();
                new.resources.apply(*delta);
                // Lifetime totals track production, not net balance.
                new.counters.total_money_earned = new
                    .counters
                    .total_money_earned
                    .saturating_add(delta.money.max(0) as u64);
                new.counters.total_materials_produced = new
                    .counters
                    .total_materials_produced
                    .saturating_add(delta.materials.max(0) as u64);
                Ok(new)
            }
            GameAction::SelectBuildingType(type_id) => {
                let mut new = self.clone();
                new.selected_building_type = *type_id;
                Ok(new)
            }
            GameAction::ToggleDayNight => {
                let mut new = self.clone();
                new.is_day = !new.is_day;
                Ok(new)
            }
            GameAction::UnlockAchievement { achievement_id } => {
                let def = catalog
                    .achievement(*achievement_id)
                    .ok_or(Rejection::UnknownAchievement(*achievement_id))?;
                let idx = self
                    .achievements
                    .iter()
                    .position(|a| a.id == *achievement_id)
                    .ok_or(Rejection::UnknownAchievement(*achievement_id))?;
                if self.achievements[idx].unlocked {
                    return Err(Rejection::AlreadyUnlocked(*achievement_id));
                }
                let mut new = self.clone();
                new.achievements[idx].unlocked = true;
                new.score = new.score.saturating_add(ACHIEVEMENT_SCORE_BONUS);
                new.resources.apply(def.reward);
                Ok(new)
            }
            GameAction::SetCityName(name) => {
                let mut new = self.clone();
                new.city_name = name.clone();
                Ok(new)
            }
        }
    }
}

/// Applies `action`, handing back the very same `Rc` when it is rejected so
/// callers can detect no-ops with `Rc::ptr_eq`.
pub fn apply(state: Rc<GameState>, action: &GameAction, catalog: &Catalog) -> Rc<GameState> {
    match state.try_apply(action, catalog) {
        Ok(next) => Rc::new(next),
        Err(_) => state,
    }
}

impl Reducible for GameState {
    type Action = GameAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        apply(self, &action, catalog::global())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Rc<GameState> {
        Rc::new(GameState::new(&GameConfig::default(), catalog::global()))
    }

    fn step(state: Rc<GameState>, action: GameAction) -> Rc<GameState> {
        apply(state, &action, catalog::global())
    }

    fn place(type_id: u32, x: i32, y: i32) -> GameAction {
        GameAction::PlaceBuilding { type_id, x, y }
    }

    fn rich(state: Rc<GameState>) -> Rc<GameState> {
        step(
            state,
            GameAction::ApplyResourceDelta(ResourceDelta {
                money: 100_000,
                materials: 100_000,
                population: 0,
            }),
        )
    }

    #[test]
    fn fresh_state_matches_defaults() {
        let s = fresh();
        assert_eq!(
            s.resources,
            Resources {
                money: 500,
                population: 0,
                materials: 200
            }
        );
        assert!(s.buildings.is_empty());
        assert!(s.is_day);
        assert_eq!(s.score, 0);
        assert_eq!(s.city_name, "My City");
        assert_eq!(s.achievements.len(), 8);
        assert!(s.achievements.iter().all(|a| !a.unlocked));
    }

    #[test]
    fn place_deducts_cost_and_scores_production() {
        let s = step(fresh(), place(1, 0, 0));
        assert_eq!(
            s.resources,
            Resources {
                money: 400,
                population: 0,
                materials: 150
            }
        );
        assert_eq!(s.buildings.len(), 1);
        let b = &s.buildings[0];
        assert_eq!(b.level, 1);
        assert_eq!(b.type_id, 1);
        assert_eq!(b.position, Position { x: 0, y: 0 });
        assert_eq!(s.counters.total_buildings_placed, 1);
        assert_eq!(s.score, 5);
    }

    #[test]
    fn unaffordable_placement_returns_same_rc() {
        let s = fresh();
        // Shopping Mall costs 1000 money.
        let after = step(s.clone(), place(4, 1, 1));
        assert!(Rc::ptr_eq(&s, &after));
    }

    #[test]
    fn insufficient_materials_alone_rejects() {
        let s = step(
            fresh(),
            GameAction::ApplyResourceDelta(ResourceDelta {
                money: 10_000,
                materials: -200,
                population: 0,
            }),
        );
        let err = s.try_apply(&place(1, 0, 0), catalog::global()).unwrap_err();
        assert!(matches!(err, Rejection::InsufficientResources { .. }));
    }

    #[test]
    fn unknown_type_and_occupied_tile_are_rejected() {
        let s = step(fresh(), place(1, 3, 3));
        let cat = catalog::global();
        assert_eq!(
            s.try_apply(&place(99, 0, 0), cat),
            Err(Rejection::UnknownBuildingType(99))
        );
        assert_eq!(
            s.try_apply(&place(1, 3, 3), cat),
            Err(Rejection::TileOccupied(Position { x: 3, y: 3 }))
        );
    }

    #[test]
    fn out_of_grid_placement_is_rejected() {
        let s = fresh();
        let cat = catalog::global();
        for (x, y) in [(-1, 0), (0, -1), (20, 0), (0, 20)] {
            assert_eq!(
                s.try_apply(&place(1, x, y), cat),
                Err(Rejection::OutOfBounds(Position { x, y }))
            );
        }
        assert!(s.try_apply(&place(1, 19, 19), cat).is_ok());
    }

    #[test]
    fn tracked_counters_follow_catalog() {
        let s = rich(fresh());
        let s = step(s, place(8, 0, 0));
        let s = step(s, place(7, 1, 0));
        let s = step(s, place(8, 2, 0));
        assert_eq!(s.counters.parks_built, 2);
        assert_eq!(s.counters.power_plants_built, 1);
        assert_eq!(s.counters.total_buildings_placed, 3);
    }

    #[test]
    fn building_ids_are_unique() {
        let s = rich(fresh());
        let s = step(s, place(1, 0, 0));
        let s = step(s, place(1, 1, 0));
        assert_ne!(s.buildings[0].id, s.buildings[1].id);
        assert_eq!(s.buildings[0].id.to_string(), "b-1");
    }

    #[test]
    fn upgrade_increments_level_once_and_stops_at_max() {
        let s = rich(step(fresh(), place(1, 0, 0)));
        let id = s.buildings[0].id;
        let money = s.resources.money;
        let score = s.score;
        let s = step(s, GameAction::UpgradeBuilding { building_id: id });
        assert_eq!(s.buildings[0].level, 2);
        assert_eq!(s.resources.money, money - 500);
        assert_eq!(s.score, score + UPGRADE_SCORE_BONUS);

        let again = s.try_apply(&GameAction::UpgradeBuilding { building_id: id }, catalog::global());
        assert_eq!(again, Err(Rejection::MaxLevel(id)));
    }

    #[test]
    fn upgrade_needs_enough_money() {
        let s = step(fresh(), place(1, 0, 0));
        let id = s.buildings[0].id;
        // 400 money left, level 2 costs 500.
        let after = step(s.clone(), GameAction::UpgradeBuilding { building_id: id });
        assert!(Rc::ptr_eq(&s, &after));
        let missing = s.try_apply(
            &GameAction::UpgradeBuilding {
                building_id: BuildingId(42),
            },
            catalog::global(),
        );
        assert_eq!(missing, Err(Rejection::UnknownBuilding(BuildingId(42))));
    }

    #[test]
    fn resource_delta_tracks_only_positive_production() {
        let s = step(
            fresh(),
            GameAction::ApplyResourceDelta(ResourceDelta {
                money: 30,
                materials: -20,
                population: 4,
            }),
        );
        assert_eq!(s.resources.money, 530);
        assert_eq!(s.resources.materials, 180);
        assert_eq!(s.resources.population, 4);
        assert_eq!(s.counters.total_money_earned, 30);
        assert_eq!(s.counters.total_materials_produced, 0);
    }

    #[test]
    fn selection_accepts_unknown_types() {
        let s = step(fresh(), GameAction::SelectBuildingType(Some(77)));
        assert_eq!(s.selected_building_type, Some(77));
        let s = step(s, GameAction::SelectBuildingType(None));
        assert_eq!(s.selected_building_type, None);
    }

    #[test]
    fn toggle_day_night_only_flips_flag() {
        let s = fresh();
        let t = step(s.clone(), GameAction::ToggleDayNight);
        assert!(!t.is_day);
        assert_eq!(t.resources, s.resources);
        assert!(step(t, GameAction::ToggleDayNight).is_day);
    }

    #[test]
    fn unlock_is_idempotent() {
        let s = step(
            fresh(),
            GameAction::UnlockAchievement { achievement_id: 2 },
        );
        assert!(s.is_unlocked(2));
        assert_eq!(s.score, ACHIEVEMENT_SCORE_BONUS);
        assert_eq!(s.resources.materials, 300);
        let again = step(s.clone(), GameAction::UnlockAchievement { achievement_id: 2 });
        assert!(Rc::ptr_eq(&s, &again));
        assert_eq!(
            s.try_apply(&GameAction::UnlockAchievement { achievement_id: 2 }, catalog::global()),
            Err(Rejection::AlreadyUnlocked(2))
        );
    }

    #[test]
    fn unlock_unknown_achievement_is_rejected() {
        let s = fresh();
        let after = step(s.clone(), GameAction::UnlockAchievement { achievement_id: 40 });
        assert!(Rc::ptr_eq(&s, &after));
    }

    #[test]
    fn reward_does_not_count_as_production() {
        let s = step(fresh(), GameAction::UnlockAchievement { achievement_id: 8 });
        assert_eq!(s.resources.money, 1500);
        assert_eq!(s.counters.total_money_earned, 0);
    }

    #[test]
    fn city_name_is_stored_verbatim() {
        let s = step(fresh(), GameAction::SetCityName("  New Avalon ".into()));
        assert_eq!(s.city_name, "  New Avalon ");
        let s = step(s, GameAction::SetCityName(String::new()));
        assert_eq!(s.city_name, "");
    }

    #[test]
    fn accepted_actions_leave_input_untouched() {
        let s = fresh();
        let before = (*s).clone();
        let _ = step(s.clone(), place(1, 0, 0));
        assert_eq!(*s, before);
    }

    #[test]
    fn reducible_uses_global_catalog() {
        let s = fresh().reduce(place(3, 2, 2));
        assert_eq!(s.buildings.len(), 1);
        assert_eq!(s.resources.money, 300);
    }
}
