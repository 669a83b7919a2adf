use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::location::{BoundingBox, Coordinate};
use crate::sampler::SearchStrategy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a game session.
///
/// Every field has a default, so a config file only needs to list what it
/// changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Region locations are drawn from
    pub bounds: BoundingBox,
    /// Where the guess map starts, and where the guess pin is reset to
    pub default_center: Coordinate,
    pub zoom: u8,
    /// Countdown length, in ticks
    pub time_limit: u32,
    pub tick_interval_ms: u64,
    /// How far from a drawn point imagery may be
    pub search_radius_m: f64,
    /// Extra sampling attempts after the first one fails
    pub max_retries: u32,
    pub strategy: SearchStrategy,
    /// Screen padding used when framing the reveal
    pub frame_padding: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::TOKYO,
            default_center: Coordinate {
                lat: 35.709,
                lng: 139.732,
            },
            zoom: 14,
            time_limit: 120,
            tick_interval_ms: 1000,
            search_radius_m: 500.0,
            max_retries: 3,
            strategy: SearchStrategy::NearestStation,
            frame_padding: 24,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Total sampling attempts per round
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_limit == 0 {
            return Err(ConfigError::Invalid("time_limit must be positive".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be positive".into(),
            ));
        }
        if !self.search_radius_m.is_finite() || self.search_radius_m <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "search_radius_m must be a positive distance, got {}",
                self.search_radius_m
            )));
        }
        if !self.default_center.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "default_center {} is not a valid coordinate",
                self.default_center
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.max_attempts(), 4);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = GameConfig::from_json_str(r#"{ "time_limit": 60, "strategy": "direct" }"#)
            .unwrap();

        assert_eq!(config.time_limit, 60);
        assert_eq!(config.strategy, SearchStrategy::Direct);
        assert_eq!(config.bounds, BoundingBox::TOKYO);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "time_limit": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "search_radius_m": -1.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str(
                r#"{ "bounds": { "north": 1.0, "south": 2.0, "east": 3.0, "west": 1.0 } }"#
            ),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(&path, r#"{ "zoom": 12 }"#).unwrap();

        assert_eq!(GameConfig::load(&path).unwrap().zoom, 12);
        assert!(matches!(
            GameConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
