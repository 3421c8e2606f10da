//! Ability Scale
//!
//! Fixed discretization of learner ability into N evenly spaced levels in [0, 1).
//! Level `i` sits at `i / N`, so N = 10 yields {0.0, 0.1, ..., 0.9}.

use serde::Serialize;
use std::fmt;

use crate::belief::BeliefPoint;
use crate::types::DEFAULT_ABILITY_LEVELS;

/// Error returned for a scale with fewer than two levels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleSizeError(pub usize);

impl fmt::Display for ScaleSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability scale needs at least 2 levels, got {}", self.0)
    }
}

impl std::error::Error for ScaleSizeError {}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AbilityScale {
    levels: Vec<f64>,
}

impl Default for AbilityScale {
    fn default() -> Self {
        Self::evenly_spaced(DEFAULT_ABILITY_LEVELS)
    }
}

impl AbilityScale {
    pub fn new(size: usize) -> Result<Self, ScaleSizeError> {
        if size < 2 {
            return Err(ScaleSizeError(size));
        }
        Ok(Self::evenly_spaced(size))
    }

    fn evenly_spaced(size: usize) -> Self {
        let levels = (0..size).map(|i| i as f64 / size as f64).collect();
        Self { levels }
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false: construction guarantees at least two levels
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Uniform prior: every level gets 1/N
    pub fn uniform_points(&self) -> Vec<BeliefPoint> {
        let p = 1.0 / self.levels.len() as f64;
        self.levels
            .iter()
            .map(|&ability| BeliefPoint::new(ability, p))
            .collect()
    }
}
