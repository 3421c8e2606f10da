//! Common Types and Constants
//!
//! Shared data structures used across all algorithm modules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::sanitize::clamp_difficulty;

// ==================== Constants ====================

/// Number of ability levels on the default scale
pub const DEFAULT_ABILITY_LEVELS: usize = 10;

/// Smallest admissible question / concept difficulty
pub const MIN_DIFFICULTY: f64 = 0.1;

/// Largest admissible question / concept difficulty
pub const MAX_DIFFICULTY: f64 = 0.9;

/// Difficulty used when none (or an unusable one) is supplied
pub const DEFAULT_DIFFICULTY: f64 = 0.5;

/// Expected mastery at or above which a concept is considered learned
pub const DEFAULT_MASTERY_THRESHOLD: f64 = 0.85;

/// Concepts probed more often than this are no longer selected
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Difficulty the selection policy prefers among equally weak concepts
pub const DEFAULT_IDEAL_DIFFICULTY: f64 = 0.5;

/// Tolerance for the probability-sum invariant
pub const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-12;

// ==================== Response Types ====================

/// Observed outcome of a single question
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
    /// Learner declined to answer; carries no evidence
    Unsure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Correct => "correct",
            Outcome::Incorrect => "incorrect",
            Outcome::Unsure => "unsure",
        }
    }

    /// Whether this outcome changes the belief state
    pub fn is_evidence(&self) -> bool {
        !matches!(self, Outcome::Unsure)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an outcome string is not recognised
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOutcomeError(pub String);

impl fmt::Display for ParseOutcomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown outcome '{}', expected correct, incorrect or unsure",
            self.0
        )
    }
}

impl std::error::Error for ParseOutcomeError {}

impl FromStr for Outcome {
    type Err = ParseOutcomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "correct" => Ok(Outcome::Correct),
            "incorrect" => Ok(Outcome::Incorrect),
            "unsure" => Ok(Outcome::Unsure),
            _ => Err(ParseOutcomeError(s.to_string())),
        }
    }
}

// ==================== Concept Types ====================

/// Catalog metadata for one concept
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptRecord {
    /// Stable unique identifier
    pub key: String,
    pub title: String,
    pub description: String,
    /// Intrinsic difficulty in [0.1, 0.9]
    #[serde(default = "default_difficulty")]
    pub difficulty: f64,
    /// Umbrella category the concept was filed under, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

fn default_difficulty() -> f64 {
    DEFAULT_DIFFICULTY
}

impl ConceptRecord {
    /// Validating constructor: clamps difficulty and fills an empty title from the key.
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        difficulty: f64,
    ) -> Self {
        let key = key.into();
        let mut title = title.into();
        if title.trim().is_empty() {
            title = key.clone();
        }
        Self {
            key,
            title,
            description: description.into(),
            difficulty: clamp_difficulty(difficulty).value,
            group: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        self.group = if group.trim().is_empty() {
            None
        } else {
            Some(group)
        };
        self
    }
}
