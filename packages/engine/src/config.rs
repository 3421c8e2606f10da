use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogSettings;

use diag_algo::text::DEFAULT_FUZZY_CUTOFF;
use diag_algo::{
    AbilityScale, SelectionPolicy, DEFAULT_ABILITY_LEVELS, DEFAULT_DIFFICULTY,
    DEFAULT_IDEAL_DIFFICULTY, DEFAULT_MASTERY_THRESHOLD, DEFAULT_MAX_ATTEMPTS, MAX_DIFFICULTY,
    MIN_DIFFICULTY,
};

const DEFAULT_MAX_BATCH_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Tunables of the diagnostic engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub ability_levels: usize,
    pub mastery_threshold: f64,
    pub max_attempts: u32,
    pub ideal_difficulty: f64,
    pub fuzzy_cutoff: f64,
    /// Difficulty given to concepts created by the resolver
    pub default_difficulty: f64,
    /// Upper bound on `count` for next-concept batches
    pub max_batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ability_levels: DEFAULT_ABILITY_LEVELS,
            mastery_threshold: DEFAULT_MASTERY_THRESHOLD,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            ideal_difficulty: DEFAULT_IDEAL_DIFFICULTY,
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
            default_difficulty: DEFAULT_DIFFICULTY,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(val) = env_parse("DIAG_ABILITY_LEVELS") {
            config.ability_levels = val;
        }
        if let Some(val) = env_parse("DIAG_MASTERY_THRESHOLD") {
            config.mastery_threshold = val;
        }
        if let Some(val) = env_parse("DIAG_MAX_ATTEMPTS") {
            config.max_attempts = val;
        }
        if let Some(val) = env_parse("DIAG_IDEAL_DIFFICULTY") {
            config.ideal_difficulty = val;
        }
        if let Some(val) = env_parse("DIAG_FUZZY_CUTOFF") {
            config.fuzzy_cutoff = val;
        }
        if let Some(val) = env_parse("DIAG_DEFAULT_DIFFICULTY") {
            config.default_difficulty = val;
        }
        if let Some(val) = env_parse("DIAG_MAX_BATCH") {
            config.max_batch_size = val;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ability_levels < 2 {
            return Err(ConfigError::Invalid {
                field: "ability_levels",
                reason: format!("must be at least 2, got {}", self.ability_levels),
            });
        }
        if !(self.mastery_threshold > 0.0 && self.mastery_threshold <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "mastery_threshold",
                reason: format!("must be in (0, 1], got {}", self.mastery_threshold),
            });
        }
        if !(0.0..=1.0).contains(&self.ideal_difficulty) {
            return Err(ConfigError::Invalid {
                field: "ideal_difficulty",
                reason: format!("must be in [0, 1], got {}", self.ideal_difficulty),
            });
        }
        if !(0.0..=1.0).contains(&self.fuzzy_cutoff) {
            return Err(ConfigError::Invalid {
                field: "fuzzy_cutoff",
                reason: format!("must be in [0, 1], got {}", self.fuzzy_cutoff),
            });
        }
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.default_difficulty) {
            return Err(ConfigError::Invalid {
                field: "default_difficulty",
                reason: format!(
                    "must be in [{MIN_DIFFICULTY}, {MAX_DIFFICULTY}], got {}",
                    self.default_difficulty
                ),
            });
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "max_batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn scale(&self) -> Result<AbilityScale, ConfigError> {
        AbilityScale::new(self.ability_levels).map_err(|e| ConfigError::Invalid {
            field: "ability_levels",
            reason: e.to_string(),
        })
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            mastery_threshold: self.mastery_threshold,
            max_attempts: self.max_attempts,
            ideal_difficulty: self.ideal_difficulty,
        }
    }
}

/// Process-level settings for the driver binary
#[derive(Debug, Clone)]
pub struct Config {
    pub logging: LogSettings,
    /// Optional JSON catalog loaded once at startup
    pub concepts_file: Option<PathBuf>,
    pub engine: EngineConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let concepts_file = std::env::var("CONCEPTS_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Self {
            logging: LogSettings::from_env(),
            concepts_file,
            engine: EngineConfig::from_env(),
        }
    }
}
