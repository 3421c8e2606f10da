//! Belief Update
//!
//! Bayesian posterior update over the discrete ability levels using a
//! one-parameter logistic item-response curve:
//!
//! `P(correct | a, d) = 1 / (1 + e^-(a - d))`
//!
//! The posterior is proportional to prior × likelihood. When every level gives
//! the observation zero likelihood the prior is kept unchanged and the update
//! is reported as degenerate.

use serde::{Deserialize, Serialize};

use crate::belief::{BeliefPoint, BeliefState};
use crate::types::Outcome;

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Result of applying one response to a belief state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeliefUpdate {
    pub state: BeliefState,
    /// Normalizing constant was zero (or not finite); prior distribution kept
    pub degenerate: bool,
    pub prior_mastery: f64,
    pub posterior_mastery: f64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BeliefUpdateEngine;

impl BeliefUpdateEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn p_correct(ability: f64, difficulty: f64) -> f64 {
        sigmoid(ability - difficulty)
    }

    /// Likelihood of `outcome` at a given ability level; unsure carries no evidence
    pub fn likelihood(outcome: Outcome, ability: f64, difficulty: f64) -> f64 {
        match outcome {
            Outcome::Correct => Self::p_correct(ability, difficulty),
            Outcome::Incorrect => 1.0 - Self::p_correct(ability, difficulty),
            Outcome::Unsure => 1.0,
        }
    }

    /// Posterior state after observing `outcome` on a question of `difficulty`
    pub fn update(&self, state: &BeliefState, outcome: Outcome, difficulty: f64) -> BeliefState {
        self.apply(state, outcome, difficulty).state
    }

    /// Same as [`update`](Self::update) but also reports degeneracy and mastery movement
    pub fn apply(&self, state: &BeliefState, outcome: Outcome, difficulty: f64) -> BeliefUpdate {
        let prior_mastery = state.expected_mastery();

        if !outcome.is_evidence() {
            return BeliefUpdate {
                state: state.clone(),
                degenerate: false,
                prior_mastery,
                posterior_mastery: prior_mastery,
            };
        }

        let unnormalized: Vec<BeliefPoint> = state
            .distribution
            .iter()
            .map(|point| {
                let likelihood = Self::likelihood(outcome, point.ability, difficulty);
                BeliefPoint::new(point.ability, point.probability * likelihood)
            })
            .collect();
        let z: f64 = unnormalized.iter().map(|p| p.probability).sum();

        let degenerate = !(z > 0.0 && z.is_finite());
        let distribution = if degenerate {
            state.distribution.clone()
        } else {
            unnormalized
                .into_iter()
                .map(|p| BeliefPoint::new(p.ability, p.probability / z))
                .collect()
        };

        let next = BeliefState {
            distribution,
            attempts: state.attempts.saturating_add(1),
            correct_count: if outcome == Outcome::Correct {
                state.correct_count.saturating_add(1)
            } else {
                state.correct_count
            },
        };
        let posterior_mastery = next.expected_mastery();

        BeliefUpdate {
            state: next,
            degenerate,
            prior_mastery,
            posterior_mastery,
        }
    }
}
