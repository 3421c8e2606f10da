//! Data Sanitization
//!
//! Input validation and numerical stability utilities.
//!
//! Functions:
//! - Difficulty clamping
//! - Belief distribution diagnostics
//! - Distribution repair

use crate::belief::BeliefPoint;
use crate::scale::AbilityScale;
use crate::types::{DEFAULT_DIFFICULTY, EPSILON, MAX_DIFFICULTY, MIN_DIFFICULTY};

// ==================== Difficulty ====================

/// Correction applied to a difficulty value
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DifficultyFix {
    /// Value was outside [0.1, 0.9] and was pulled to the nearest bound
    Clamped { original: f64 },
    /// Value was not a finite number and was replaced by the default
    Defaulted,
}

/// Difficulty after sanitization
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyCheck {
    pub value: f64,
    pub applied: Option<DifficultyFix>,
}

/// Clamp a difficulty into [0.1, 0.9]; non-finite input maps to 0.5
pub fn clamp_difficulty(difficulty: f64) -> DifficultyCheck {
    if !difficulty.is_finite() {
        return DifficultyCheck {
            value: DEFAULT_DIFFICULTY,
            applied: Some(DifficultyFix::Defaulted),
        };
    }
    if difficulty < MIN_DIFFICULTY || difficulty > MAX_DIFFICULTY {
        return DifficultyCheck {
            value: difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY),
            applied: Some(DifficultyFix::Clamped {
                original: difficulty,
            }),
        };
    }
    DifficultyCheck {
        value: difficulty,
        applied: None,
    }
}

// ==================== Distribution ====================

/// Structural problem found in a stored belief distribution
#[derive(Clone, Debug, PartialEq)]
pub enum DistributionDefect {
    LengthMismatch { expected: usize, actual: usize },
    /// Point at `index` does not sit on the configured ability level
    AbilityMismatch { index: usize },
    /// Probability at `index` is NaN, infinite or negative
    InvalidProbability { index: usize },
    /// All probability mass is zero
    ZeroMass,
}

/// Diagnose a distribution against the scale it should be defined on
///
/// Returns `None` when every point is present, finite and non-negative with
/// non-zero total mass. The sum is not required to be exactly one: a prior kept
/// after a degenerate update is still usable.
pub fn diagnose_distribution(
    points: &[BeliefPoint],
    scale: &AbilityScale,
) -> Option<DistributionDefect> {
    if points.len() != scale.len() {
        return Some(DistributionDefect::LengthMismatch {
            expected: scale.len(),
            actual: points.len(),
        });
    }

    let mut total = 0.0;
    for (index, (point, level)) in points.iter().zip(scale.levels()).enumerate() {
        if (point.ability - level).abs() > 1e-9 {
            return Some(DistributionDefect::AbilityMismatch { index });
        }
        if !point.probability.is_finite() || point.probability < 0.0 {
            return Some(DistributionDefect::InvalidProbability { index });
        }
        total += point.probability;
    }

    if total <= EPSILON {
        return Some(DistributionDefect::ZeroMass);
    }
    None
}

/// Return a usable copy of `points`, falling back to the uniform prior on any defect
pub fn repair_distribution(
    points: &[BeliefPoint],
    scale: &AbilityScale,
) -> (Vec<BeliefPoint>, Option<DistributionDefect>) {
    match diagnose_distribution(points, scale) {
        None => (points.to_vec(), None),
        Some(defect) => (scale.uniform_points(), Some(defect)),
    }
}
