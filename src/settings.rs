//! Level rule constants
//!
//! Difficulty follows a fixed rule; these values only set its constants.
//! Defaults match `crate::consts`.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Level;

/// Errors raised while loading a [`GameConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Game rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Tubes on level 1, including the spare empty tube
    pub initial_tube_count: usize,
    /// Balls per tube on level 1
    pub initial_capacity: usize,
    /// Tube count after which a win wraps back to level 1
    pub max_tube_count: usize,
    /// Pause before a won or lost board is rebuilt
    pub outcome_delay_ms: u32,
    /// Serialized boards kept for repetition checks
    pub history_len: usize,
    /// Consecutive repeats that end the run
    pub repeat_limit: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_tube_count: INITIAL_TUBE_COUNT,
            initial_capacity: INITIAL_CAPACITY,
            max_tube_count: MAX_TUBE_COUNT,
            outcome_delay_ms: OUTCOME_DELAY_MS,
            history_len: HISTORY_LEN,
            repeat_limit: REPEAT_LIMIT,
        }
    }
}

impl GameConfig {
    pub fn initial_level(&self) -> Level {
        Level::new(self.initial_tube_count, self.initial_capacity)
    }

    /// Parse and validate; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_tube_count < 2 {
            return Err(ConfigError::Invalid(format!(
                "initial_tube_count must be at least 2, got {}",
                self.initial_tube_count
            )));
        }
        if self.initial_capacity == 0 {
            return Err(ConfigError::Invalid(
                "initial_capacity must be positive".to_string(),
            ));
        }
        if self.max_tube_count < self.initial_tube_count {
            return Err(ConfigError::Invalid(format!(
                "max_tube_count ({}) is below initial_tube_count ({})",
                self.max_tube_count, self.initial_tube_count
            )));
        }
        if self.history_len == 0 {
            return Err(ConfigError::Invalid(
                "history_len must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.initial_level(), Level::new(4, 8));
        assert_eq!(config.max_tube_count, 10);
        assert_eq!(config.outcome_delay_ms, 400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "max_tube_count": 6 }"#).unwrap();
        assert_eq!(config.max_tube_count, 6);
        assert_eq!(config.initial_tube_count, 4);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            GameConfig::from_json(r#"{ "initial_tube_count": 1 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{ "max_tube_count": 3 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
