//! Snapshot format and the key-value stores it is written to.
//!
//! Decoding is deliberately forgiving: a snapshot that is not JSON at all is
//! an error, but inside a readable snapshot every field that is missing or
//! malformed falls back to the fresh-game value, and individual buildings
//! that cannot be restored are dropped.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{Catalog, TrackedCounter};
use crate::config::GameConfig;
use crate::model::{
    AchievementStatus, BuildingId, Counters, GameState, MAX_LEVEL, PlacedBuilding, Position,
    Resources,
};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum PersistError {
    /// The host has no usable storage (no window, or storage disabled).
    Unavailable,
    Storage(String),
    Encode(String),
    Corrupt(String),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Unavailable => write!(f, "storage is unavailable"),
            PersistError::Storage(msg) => write!(f, "storage error: {msg}"),
            PersistError::Encode(msg) => write!(f, "could not encode snapshot: {msg}"),
            PersistError::Corrupt(msg) => write!(f, "corrupt snapshot: {msg}"),
        }
    }
}

impl std::error::Error for PersistError {}

fn first_level() -> u8 {
    1
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedBuilding {
    pub type_id: u32,
    pub x: i32,
    pub y: i32,
    #[serde(default = "first_level")]
    pub level: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub resources: Resources,
    pub buildings: Vec<SavedBuilding>,
    pub achievements: Vec<AchievementStatus>,
    pub score: u64,
    pub city_name: String,
    pub counters: Counters,
    pub is_day: bool,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            resources: state.resources,
            buildings: state
                .buildings
                .iter()
                .map(|b| SavedBuilding {
                    type_id: b.type_id,
                    x: b.position.x,
                    y: b.position.y,
                    level: b.level,
                })
                .collect(),
            achievements: state.achievements.clone(),
            score: state.score,
            city_name: state.city_name.clone(),
            counters: state.counters,
            is_day: state.is_day,
        }
    }

    pub fn encode(&self) -> Result<String, PersistError> {
        serde_json::to_string(self).map_err(|e| PersistError::Encode(e.to_string()))
    }

    /// Reads a snapshot, taking any absent or unreadable field from
    /// `fallback`.
    pub fn decode(raw: &str, fallback: &Snapshot) -> Result<Self, PersistError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| PersistError::Corrupt(e.to_string()))?;
        let Value::Object(obj) = value else {
            return Err(PersistError::Corrupt("snapshot is not an object".into()));
        };

        let resources = match obj.get("resources") {
            Some(Value::Object(r)) => Resources {
                money: field(r, "money", fallback.resources.money),
                population: field(r, "population", fallback.resources.population),
                materials: field(r, "materials", fallback.resources.materials),
            },
            Some(_) => {
                log::warn!("snapshot field `resources` is not an object; using defaults");
                fallback.resources
            }
            None => fallback.resources,
        };

        Ok(Self {
            version: field(&obj, "version", SNAPSHOT_VERSION),
            resources,
            buildings: elements(&obj, "buildings", &fallback.buildings),
            achievements: elements(&obj, "achievements", &fallback.achievements),
            score: field(&obj, "score", fallback.score),
            city_name: field(&obj, "city_name", fallback.city_name.clone()),
            counters: field(&obj, "counters", fallback.counters),
            is_day: field(&obj, "is_day", fallback.is_day),
        })
    }

    /// Rebuilds a game state. Buildings with unknown types, off-grid or
    /// colliding positions are skipped; levels are clamped to the valid range.
    pub fn restore(self, config: &GameConfig, catalog: &Catalog) -> GameState {
        let mut state = GameState::new(config, catalog);
        state.resources = self.resources;
        state.score = self.score;
        state.city_name = self.city_name;
        state.is_day = self.is_day;

        let mut occupied = HashSet::new();
        let mut parks = 0;
        let mut power_plants = 0;
        for saved in self.buildings {
            let Some(ty) = catalog.building(saved.type_id) else {
                log::warn!("dropping saved building of unknown type {}", saved.type_id);
                continue;
            };
            let position = Position {
                x: saved.x,
                y: saved.y,
            };
            if !state.grid_size.contains(position) || !occupied.insert(position) {
                log::warn!("dropping saved building at ({}, {})", saved.x, saved.y);
                continue;
            }
            match ty.counter {
                Some(TrackedCounter::Parks) => parks += 1,
                Some(TrackedCounter::PowerPlants) => power_plants += 1,
                None => {}
            }
            state.buildings.push(PlacedBuilding {
                id: BuildingId(state.next_building_id),
                type_id: ty.id,
                position,
                level: saved.level.clamp(1, MAX_LEVEL),
            });
            state.next_building_id += 1;
        }

        for saved in &self.achievements {
            if let Some(status) = state.achievements.iter_mut().find(|a| a.id == saved.id) {
                status.unlocked = saved.unlocked;
            }
        }

        // Counters never fall below what the restored city itself proves.
        let mut counters = self.counters;
        counters.total_buildings_placed = counters
            .total_buildings_placed
            .max(state.buildings.len() as u64);
        counters.parks_built = counters.parks_built.max(parks);
        counters.power_plants_built = counters.power_plants_built.max(power_plants);
        state.counters = counters;
        state
    }
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str, fallback: T) -> T {
    match obj.get(key) {
        None => fallback,
        Some(v) => T::deserialize(v).unwrap_or_else(|e| {
            log::warn!("snapshot field `{key}` unreadable ({e}); using default");
            fallback
        }),
    }
}

fn elements<T: DeserializeOwned + Clone>(obj: &Map<String, Value>, key: &str, fallback: &[T]) -> Vec<T> {
    match obj.get(key) {
        None => fallback.to_vec(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match T::deserialize(v) {
                Ok(item) => Some(item),
                Err(e) => {
                    log::warn!("skipping unreadable entry in `{key}`: {e}");
                    None
                }
            })
            .collect(),
        Some(_) => {
            log::warn!("snapshot field `{key}` is not a list; using default");
            fallback.to_vec()
        }
    }
}

pub trait SnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn save(&self, key: &str, value: &str) -> Result<(), PersistError>;
    fn clear(&self, key: &str) -> Result<(), PersistError>;
}

/// Browser `localStorage`.
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

impl LocalStorageStore {
    pub fn open() -> Result<Self, PersistError> {
        let window = web_sys::window().ok_or(PersistError::Unavailable)?;
        let storage = window
            .local_storage()
            .map_err(|e| PersistError::Storage(format!("{e:?}")))?
            .ok_or(PersistError::Unavailable)?;
        Ok(Self { storage })
    }
}

impl SnapshotStore for LocalStorageStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.storage
            .get_item(key)
            .map_err(|e| PersistError::Storage(format!("{e:?}")))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistError::Storage(format!("{e:?}")))
    }

    fn clear(&self, key: &str) -> Result<(), PersistError> {
        self.storage
            .remove_item(key)
            .map_err(|e| PersistError::Storage(format!("{e:?}")))
    }
}

/// In-memory store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.insert(key, value);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), PersistError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Loads the saved game under `config.storage_key`, or a fresh one when
/// nothing usable is stored.
pub fn load_or_default(store: &dyn SnapshotStore, config: &GameConfig, catalog: &Catalog) -> GameState {
    let fresh = GameState::new(config, catalog);
    let raw = match store.load(&config.storage_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            log::info!("no saved game found; starting fresh");
            return fresh;
        }
        Err(e) => {
            log::warn!("could not read saved game: {e}");
            return fresh;
        }
    };
    match Snapshot::decode(&raw, &Snapshot::capture(&fresh)) {
        Ok(snapshot) => {
            let state = snapshot.restore(config, catalog);
            log::info!(
                "restored `{}` with {} buildings",
                state.city_name,
                state.buildings.len()
            );
            state
        }
        Err(e) => {
            log::warn!("discarding saved game: {e}");
            fresh
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::model::{GameAction, ResourceDelta, apply};

    fn played() -> GameState {
        let cat = catalog::global();
        let mut s = Rc::new(GameState::new(&GameConfig::default(), cat));
        let actions = [
            GameAction::ApplyResourceDelta(ResourceDelta {
                money: 3_000,
                materials: 1_000,
                population: 12,
            }),
            GameAction::PlaceBuilding { type_id: 1, x: 0, y: 0 },
            GameAction::PlaceBuilding { type_id: 8, x: 4, y: 2 },
            GameAction::UnlockAchievement { achievement_id: 1 },
            GameAction::SetCityName("Riverside".into()),
            GameAction::ToggleDayNight,
        ];
        for a in &actions {
            s = apply(s, a, cat);
        }
        let id = s.buildings[0].id;
        s = apply(s, &GameAction::UpgradeBuilding { building_id: id }, cat);
        (*s).clone()
    }

    fn fallback() -> Snapshot {
        Snapshot::capture(&GameState::new(&GameConfig::default(), catalog::global()))
    }

    #[test]
    fn round_trip_is_stable() {
        let cat = catalog::global();
        let config = GameConfig::default();
        let first = Snapshot::capture(&played());
        let raw = first.encode().unwrap();
        let restored = Snapshot::decode(&raw, &fallback()).unwrap().restore(&config, cat);
        let second = Snapshot::capture(&restored);
        assert_eq!(first, second);
        assert_eq!(raw, second.encode().unwrap());
    }

    #[test]
    fn restore_keeps_upgrade_levels_and_replaces_resources() {
        let cat = catalog::global();
        let original = played();
        let raw = Snapshot::capture(&original).encode().unwrap();
        let restored = Snapshot::decode(&raw, &fallback())
            .unwrap()
            .restore(&GameConfig::default(), cat);
        assert_eq!(restored.resources, original.resources);
        assert_eq!(restored.buildings[0].level, 2);
        assert_eq!(restored.city_name, "Riverside");
        assert!(!restored.is_day);
        assert!(restored.is_unlocked(1));
        assert_eq!(restored.counters.parks_built, 1);
    }

    #[test]
    fn not_json_is_corrupt() {
        assert!(matches!(
            Snapshot::decode("{{{", &fallback()),
            Err(PersistError::Corrupt(_))
        ));
        assert!(matches!(
            Snapshot::decode("[1,2]", &fallback()),
            Err(PersistError::Corrupt(_))
        ));
    }

    #[test]
    fn missing_and_bad_fields_fall_back() {
        let raw = r#"{
            "resources": {"money": 900, "materials": "lots"},
            "score": "high",
            "city_name": "Oldtown",
            "buildings": [{"type_id": 3, "x": 1, "y": 1}, {"type_id": "x"}, 5]
        }"#;
        let snap = Snapshot::decode(raw, &fallback()).unwrap();
        assert_eq!(snap.resources.money, 900);
        assert_eq!(snap.resources.materials, 200);
        assert_eq!(snap.resources.population, 0);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.city_name, "Oldtown");
        assert!(snap.is_day);
        assert_eq!(
            snap.buildings,
            vec![SavedBuilding {
                type_id: 3,
                x: 1,
                y: 1,
                level: 1
            }]
        );
        assert_eq!(snap.achievements.len(), 8);
    }

    #[test]
    fn restore_drops_unplaceable_buildings_and_clamps_levels() {
        let mut snap = fallback();
        snap.buildings = vec![
            SavedBuilding { type_id: 1, x: 0, y: 0, level: 9 },
            SavedBuilding { type_id: 1, x: 0, y: 0, level: 1 },
            SavedBuilding { type_id: 99, x: 1, y: 0, level: 1 },
            SavedBuilding { type_id: 7, x: 50, y: 0, level: 1 },
            SavedBuilding { type_id: 7, x: 2, y: 0, level: 0 },
        ];
        let s = snap.restore(&GameConfig::default(), catalog::global());
        assert_eq!(s.buildings.len(), 2);
        assert_eq!(s.buildings[0].level, MAX_LEVEL);
        assert_eq!(s.buildings[1].level, 1);
        assert_eq!(s.counters.total_buildings_placed, 2);
        assert_eq!(s.counters.power_plants_built, 1);
        assert_ne!(s.buildings[0].id, s.buildings[1].id);
    }

    #[test]
    fn unknown_achievement_ids_are_ignored() {
        let mut snap = fallback();
        snap.achievements = vec![
            AchievementStatus { id: 3, unlocked: true },
            AchievementStatus { id: 77, unlocked: true },
        ];
        let s = snap.restore(&GameConfig::default(), catalog::global());
        assert!(s.is_unlocked(3));
        assert_eq!(s.achievements.len(), 8);
        assert_eq!(s.achievements.iter().filter(|a| a.unlocked).count(), 1);
    }

    #[test]
    fn load_or_default_handles_every_store_state() {
        let cat = catalog::global();
        let config = GameConfig::default();
        let store = MemoryStore::new();
        assert_eq!(
            load_or_default(&store, &config, cat),
            GameState::new(&config, cat)
        );

        store.insert(&config.storage_key, "garbage");
        assert_eq!(
            load_or_default(&store, &config, cat),
            GameState::new(&config, cat)
        );

        let raw = Snapshot::capture(&played()).encode().unwrap();
        store.save(&config.storage_key, &raw).unwrap();
        assert_eq!(load_or_default(&store, &config, cat).city_name, "Riverside");

        store.clear(&config.storage_key).unwrap();
        assert!(store.get(&config.storage_key).is_none());
    }
}
