use serde::Serialize;

use diag_algo::sanitize::{clamp_difficulty, DifficultyFix};
use diag_algo::Outcome;

use crate::error::Result;

/// A validated learner response, ready for the belief update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEvent {
    pub concept: String,
    pub outcome: Outcome,
    /// Always within [0.1, 0.9]
    pub difficulty: f64,
}

impl ResponseEvent {
    pub fn new(concept: impl Into<String>, outcome: Outcome, difficulty: f64) -> Self {
        let concept = concept.into();
        let check = clamp_difficulty(difficulty);
        match check.applied {
            Some(DifficultyFix::Clamped { original }) => {
                tracing::warn!(
                    concept = %concept,
                    original,
                    clamped = check.value,
                    "question difficulty out of range, clamping"
                );
            }
            Some(DifficultyFix::Defaulted) => {
                tracing::warn!(
                    concept = %concept,
                    default = check.value,
                    "question difficulty not a number, using default"
                );
            }
            None => {}
        }
        Self {
            concept,
            outcome,
            difficulty: check.value,
        }
    }

    /// Build from wire values; the outcome is matched case-insensitively
    pub fn parse(concept: impl Into<String>, outcome: &str, difficulty: f64) -> Result<Self> {
        let outcome: Outcome = outcome.parse()?;
        Ok(Self::new(concept, outcome, difficulty))
    }
}
