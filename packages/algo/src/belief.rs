//! Belief State
//!
//! Discrete probability mass over the ability scale for one (user, concept)
//! pair, plus the attempt counters that the selection policy reads.

use serde::{Deserialize, Serialize};

use crate::scale::AbilityScale;
use crate::types::NORMALIZATION_TOLERANCE;

/// One ability level and the probability assigned to it
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeliefPoint {
    #[serde(rename = "a")]
    pub ability: f64,
    #[serde(rename = "p")]
    pub probability: f64,
}

impl BeliefPoint {
    pub fn new(ability: f64, probability: f64) -> Self {
        Self {
            ability,
            probability,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    /// One point per scale level, in scale order
    #[serde(rename = "belief")]
    pub distribution: Vec<BeliefPoint>,
    /// Non-unsure responses observed
    pub attempts: u32,
    #[serde(rename = "correct")]
    pub correct_count: u32,
}

impl BeliefState {
    /// Fresh state with the uniform prior and zeroed counters
    pub fn uniform(scale: &AbilityScale) -> Self {
        Self {
            distribution: scale.uniform_points(),
            attempts: 0,
            correct_count: 0,
        }
    }

    /// Probability-weighted mean ability
    pub fn expected_mastery(&self) -> f64 {
        self.distribution
            .iter()
            .map(|p| p.ability * p.probability)
            .sum()
    }

    pub fn total_probability(&self) -> f64 {
        self.distribution.iter().map(|p| p.probability).sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.total_probability() - 1.0).abs() <= NORMALIZATION_TOLERANCE
    }
}
