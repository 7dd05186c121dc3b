//! Static building and achievement definitions.
//!
//! The catalog ships as `assets/catalog.json`, embedded at compile time and
//! validated once when first accessed. An invalid catalog is a fatal
//! configuration error: the game refuses to start rather than run with
//! inconsistent reference data.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::model::{MAX_LEVEL, ResourceDelta};

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

static GLOBAL: LazyLock<Catalog> = LazyLock::new(|| match Catalog::builtin() {
    Ok(catalog) => catalog,
    Err(e) => {
        log::error!("built-in catalog rejected: {e}");
        panic!("invalid built-in catalog: {e}");
    }
});

/// The process-wide catalog. Panics on first access if the embedded data
/// fails validation.
pub fn global() -> &'static Catalog {
    &GLOBAL
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Residential,
    Commercial,
    Industrial,
    Utility,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Residential => "Residential",
            Category::Commercial => "Commercial",
            Category::Industrial => "Industrial",
            Category::Utility => "Utility",
        }
    }
}

/// Cumulative counter a building type feeds when placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedCounter {
    Parks,
    PowerPlants,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub money: i64,
    pub materials: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

/// One row of an upgrade table. Entry `i` describes level `i + 1`; `cost` is
/// the money needed to reach this level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTier {
    pub level: u8,
    pub cost: i64,
    pub multiplier: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingType {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub category: Category,
    pub cost: Cost,
    #[serde(default)]
    pub production: ResourceDelta,
    pub footprint: Footprint,
    #[serde(default)]
    pub counter: Option<TrackedCounter>,
    #[serde(default)]
    pub upgrade_levels: Vec<UpgradeTier>,
}

impl BuildingType {
    /// Production multiplier at `level`; 1.0 when the table has no entry.
    pub fn multiplier(&self, level: u8) -> f64 {
        usize::from(level)
            .checked_sub(1)
            .and_then(|i| self.upgrade_levels.get(i))
            .map_or(1.0, |tier| tier.multiplier)
    }

    /// The tier reached by upgrading from `level`, if any.
    pub fn next_tier(&self, level: u8) -> Option<&UpgradeTier> {
        if level >= MAX_LEVEL {
            return None;
        }
        self.upgrade_levels.get(usize::from(level))
    }

    /// One-time score bonus granted on placement.
    pub fn placement_score(&self) -> u64 {
        let p = self.production;
        (p.money.max(0) + p.materials.max(0) + p.population.max(0)) as u64
    }
}

/// Quantity an achievement threshold is measured against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    BuildingsPlaced,
    Population,
    MoneyEarned,
    MaterialsProduced,
    ParksBuilt,
    PowerPlantsBuilt,
    Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub metric: Metric,
    pub at_least: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub condition: Condition,
    #[serde(default)]
    pub reward: ResourceDelta,
}

#[derive(Debug)]
pub enum CatalogError {
    /// The JSON did not parse or a required field is missing.
    Parse(String),
    DuplicateBuildingId(u32),
    DuplicateAchievementId(u32),
    EmptyName { id: u32 },
    NegativeCost { id: u32 },
    NegativeProduction { id: u32 },
    NegativeReward { id: u32 },
    EmptyFootprint { id: u32 },
    BadUpgradeTable { id: u32, reason: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Parse(msg) => write!(f, "catalog parse error: {msg}"),
            CatalogError::DuplicateBuildingId(id) => write!(f, "duplicate building type id {id}"),
            CatalogError::DuplicateAchievementId(id) => write!(f, "duplicate achievement id {id}"),
            CatalogError::EmptyName { id } => write!(f, "entry {id} has an empty name"),
            CatalogError::NegativeCost { id } => write!(f, "building type {id} has a negative cost"),
            CatalogError::NegativeProduction { id } => {
                write!(f, "building type {id} has negative production")
            }
            CatalogError::NegativeReward { id } => write!(f, "achievement {id} has a negative reward"),
            CatalogError::EmptyFootprint { id } => {
                write!(f, "building type {id} has a zero-sized footprint")
            }
            CatalogError::BadUpgradeTable { id, reason } => {
                write!(f, "building type {id} upgrade table: {reason}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e.to_string())
    }
}

#[derive(Deserialize)]
struct RawCatalog {
    buildings: Vec<BuildingType>,
    achievements: Vec<AchievementDef>,
}

/// Validated lookup tables, both sorted by ascending id.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    buildings: Vec<BuildingType>,
    achievements: Vec<AchievementDef>,
}

impl Catalog {
    pub fn new(
        mut buildings: Vec<BuildingType>,
        mut achievements: Vec<AchievementDef>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for b in &buildings {
            if !seen.insert(b.id) {
                return Err(CatalogError::DuplicateBuildingId(b.id));
            }
            validate_building(b)?;
        }
        let mut seen = HashSet::new();
        for a in &achievements {
            if !seen.insert(a.id) {
                return Err(CatalogError::DuplicateAchievementId(a.id));
            }
            if a.name.trim().is_empty() {
                return Err(CatalogError::EmptyName { id: a.id });
            }
            let r = a.reward;
            if r.money < 0 || r.materials < 0 || r.population < 0 {
                return Err(CatalogError::NegativeReward { id: a.id });
            }
        }
        buildings.sort_by_key(|b| b.id);
        achievements.sort_by_key(|a| a.id);
        Ok(Self {
            buildings,
            achievements,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let parsed: RawCatalog = serde_json::from_str(raw)?;
        Self::new(parsed.buildings, parsed.achievements)
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        let catalog = Self::from_json(BUILTIN_CATALOG)?;
        log::debug!(
            "catalog loaded: {} building types, {} achievements",
            catalog.buildings.len(),
            catalog.achievements.len()
        );
        Ok(catalog)
    }

    pub fn building(&self, id: u32) -> Option<&BuildingType> {
        self.buildings
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|i| &self.buildings[i])
    }

    pub fn buildings(&self) -> &[BuildingType] {
        &self.buildings
    }

    pub fn achievement(&self, id: u32) -> Option<&AchievementDef> {
        self.achievements
            .binary_search_by_key(&id, |a| a.id)
            .ok()
            .map(|i| &self.achievements[i])
    }

    pub fn achievements(&self) -> &[AchievementDef] {
        &self.achievements
    }
}

fn validate_building(b: &BuildingType) -> Result<(), CatalogError> {
    if b.name.trim().is_empty() {
        return Err(CatalogError::EmptyName { id: b.id });
    }
    if b.cost.money < 0 || b.cost.materials < 0 {
        return Err(CatalogError::NegativeCost { id: b.id });
    }
    let p = b.production;
    if p.money < 0 || p.materials < 0 || p.population < 0 {
        return Err(CatalogError::NegativeProduction { id: b.id });
    }
    if b.footprint.width == 0 || b.footprint.height == 0 {
        return Err(CatalogError::EmptyFootprint { id: b.id });
    }
    let bad = |reason: String| CatalogError::BadUpgradeTable { id: b.id, reason };
    if b.upgrade_levels.len() > usize::from(MAX_LEVEL) {
        return Err(bad(format!(
            "{} tiers exceed max level {MAX_LEVEL}",
            b.upgrade_levels.len()
        )));
    }
    for (i, tier) in b.upgrade_levels.iter().enumerate() {
        if usize::from(tier.level) != i + 1 {
            return Err(bad(format!("tier {} is numbered {}", i + 1, tier.level)));
        }
        if tier.cost < 0 {
            return Err(bad(format!("level {} has a negative cost", tier.level)));
        }
        if !tier.multiplier.is_finite() || tier.multiplier <= 0.0 {
            return Err(bad(format!("level {} multiplier {}", tier.level, tier.multiplier)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house(id: u32) -> BuildingType {
        BuildingType {
            id,
            name: "House".into(),
            description: String::new(),
            icon: String::new(),
            category: Category::Residential,
            cost: Cost {
                money: 10,
                materials: 5,
            },
            production: ResourceDelta {
                population: 1,
                ..ResourceDelta::default()
            },
            footprint: Footprint {
                width: 1,
                height: 1,
            },
            counter: None,
            upgrade_levels: vec![
                UpgradeTier {
                    level: 1,
                    cost: 0,
                    multiplier: 1.0,
                },
                UpgradeTier {
                    level: 2,
                    cost: 50,
                    multiplier: 1.5,
                },
            ],
        }
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.buildings().len(), 8);
        assert_eq!(catalog.achievements().len(), 8);
        let house = catalog.building(1).unwrap();
        assert_eq!(house.name, "Basic House");
        assert_eq!(house.cost, Cost { money: 100, materials: 50 });
        assert_eq!(house.production.population, 5);
        assert_eq!(catalog.building(8).unwrap().counter, Some(TrackedCounter::Parks));
        assert_eq!(
            catalog.building(7).unwrap().counter,
            Some(TrackedCounter::PowerPlants)
        );
        assert!(catalog.building(9).is_none());
    }

    #[test]
    fn builtin_covers_all_categories() {
        let catalog = global();
        for cat in [
            Category::Residential,
            Category::Commercial,
            Category::Industrial,
            Category::Utility,
        ] {
            assert!(catalog.buildings().iter().any(|b| b.category == cat));
        }
    }

    #[test]
    fn duplicate_building_ids_are_rejected() {
        let err = Catalog::new(vec![house(1), house(1)], Vec::new()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateBuildingId(1)));
    }

    #[test]
    fn negative_cost_is_rejected() {
        let mut b = house(3);
        b.cost.materials = -1;
        let err = Catalog::new(vec![b], Vec::new()).unwrap_err();
        assert!(matches!(err, CatalogError::NegativeCost { id: 3 }));
    }

    #[test]
    fn misnumbered_upgrade_table_is_rejected() {
        let mut b = house(2);
        b.upgrade_levels[1].level = 3;
        let err = Catalog::new(vec![b], Vec::new()).unwrap_err();
        assert!(matches!(err, CatalogError::BadUpgradeTable { id: 2, .. }));
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let raw = r#"{"buildings":[{"id":1,"name":"X"}],"achievements":[]}"#;
        assert!(matches!(Catalog::from_json(raw), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn lookups_are_sorted_by_id() {
        let catalog = Catalog::new(vec![house(5), house(2)], Vec::new()).unwrap();
        let ids: Vec<u32> = catalog.buildings().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 5]);
        assert_eq!(catalog.building(5).unwrap().id, 5);
    }

    #[test]
    fn multiplier_defaults_to_one() {
        let mut b = house(1);
        assert_eq!(b.multiplier(1), 1.0);
        assert_eq!(b.multiplier(2), 1.5);
        assert_eq!(b.multiplier(0), 1.0);
        b.upgrade_levels.clear();
        assert_eq!(b.multiplier(2), 1.0);
        assert!(b.next_tier(1).is_none());
    }

    #[test]
    fn next_tier_stops_at_max_level() {
        let b = house(1);
        assert_eq!(b.next_tier(1).map(|t| t.cost), Some(50));
        assert!(b.next_tier(MAX_LEVEL).is_none());
    }
}
