//! Session tunables.
//!
//! Everything here has a default matching the shipped game; a JSON override
//! may supply any subset of fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{GridSize, Resources};

pub const DEFAULT_STORAGE_KEY: &str = "cityBuilderSave";
pub const CONFIG_STORAGE_KEY: &str = "cityBuilderConfig";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_resources: Resources,
    pub grid_size: GridSize,
    pub city_name: String,
    /// Production tick period.
    pub production_interval_ms: u64,
    pub day_night_interval_ms: u64,
    /// How often the browser host samples elapsed time.
    pub heartbeat_ms: u32,
    /// Upper bound on firings per timer in one `advance` call, so a tab
    /// waking from a long sleep does not replay hours of ticks.
    pub max_catch_up: u32,
    pub storage_key: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_resources: Resources {
                money: 500,
                population: 0,
                materials: 200,
            },
            grid_size: GridSize {
                width: 20,
                height: 20,
            },
            city_name: "My City".to_string(),
            production_interval_ms: 5_000,
            day_night_interval_ms: 30_000,
            heartbeat_ms: 250,
            max_catch_up: 12,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(String),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Invalid(what) => write!(f, "invalid config: {what}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GameConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: GameConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size.width == 0 || self.grid_size.height == 0 {
            return Err(ConfigError::Invalid("grid must be at least 1x1"));
        }
        if self.production_interval_ms == 0 || self.day_night_interval_ms == 0 {
            return Err(ConfigError::Invalid("timer intervals must be non-zero"));
        }
        if self.heartbeat_ms == 0 {
            return Err(ConfigError::Invalid("heartbeat must be non-zero"));
        }
        if self.storage_key.is_empty() {
            return Err(ConfigError::Invalid("storage key must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = GameConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.production_interval_ms, 5_000);
        assert_eq!(c.day_night_interval_ms, 30_000);
        assert_eq!(c.storage_key, "cityBuilderSave");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let c = GameConfig::from_json(r#"{"production_interval_ms": 1000, "city_name": "Tiny"}"#)
            .unwrap();
        assert_eq!(c.production_interval_ms, 1000);
        assert_eq!(c.city_name, "Tiny");
        assert_eq!(c.grid_size, GridSize { width: 20, height: 20 });
        assert_eq!(c.starting_resources.money, 500);
    }

    #[test]
    fn zero_interval_is_invalid() {
        let err = GameConfig::from_json(r#"{"day_night_interval_ms": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            GameConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
