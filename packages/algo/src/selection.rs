//! Next-Concept Selection
//!
//! Filters out concepts the learner has mastered or that have been probed too
//! often, then ranks the rest lexicographically by
//! `(expected mastery, |difficulty - ideal|, attempts, key)`, all ascending.
//! Weakest concepts come first; among equally weak ones moderate difficulty is
//! preferred, then the less-probed concept.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::belief::BeliefState;
use crate::scale::AbilityScale;
use crate::types::{
    ConceptRecord, DEFAULT_IDEAL_DIFFICULTY, DEFAULT_MASTERY_THRESHOLD, DEFAULT_MAX_ATTEMPTS,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    /// Concepts at or above this expected mastery are skipped
    pub mastery_threshold: f64,
    /// Concepts with more attempts than this are skipped
    pub max_attempts: u32,
    /// Preferred concept difficulty
    pub ideal_difficulty: f64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            mastery_threshold: DEFAULT_MASTERY_THRESHOLD,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            ideal_difficulty: DEFAULT_IDEAL_DIFFICULTY,
        }
    }
}

/// A catalog concept scored for one learner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedConcept {
    pub key: String,
    pub expected_mastery: f64,
    pub difficulty: f64,
    /// Distance from the ideal difficulty
    pub difficulty_gap: f64,
    pub attempts: u32,
}

impl RankedConcept {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.expected_mastery
            .total_cmp(&other.expected_mastery)
            .then_with(|| self.difficulty_gap.total_cmp(&other.difficulty_gap))
            .then_with(|| self.attempts.cmp(&other.attempts))
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl SelectionPolicy {
    pub fn score(
        &self,
        record: &ConceptRecord,
        belief: Option<&BeliefState>,
        prior_mastery: f64,
    ) -> RankedConcept {
        let (expected_mastery, attempts) = match belief {
            Some(state) => (state.expected_mastery(), state.attempts),
            None => (prior_mastery, 0),
        };
        RankedConcept {
            key: record.key.clone(),
            expected_mastery,
            difficulty: record.difficulty,
            difficulty_gap: (record.difficulty - self.ideal_difficulty).abs(),
            attempts,
        }
    }

    pub fn is_eligible(&self, candidate: &RankedConcept) -> bool {
        candidate.expected_mastery < self.mastery_threshold
            && candidate.attempts <= self.max_attempts
    }

    /// Every eligible concept, best first
    ///
    /// Concepts without a recorded belief are scored with the uniform prior of `scale`.
    pub fn rank(
        &self,
        beliefs: &HashMap<String, BeliefState>,
        catalog: &BTreeMap<String, ConceptRecord>,
        scale: &AbilityScale,
    ) -> Vec<RankedConcept> {
        let prior_mastery = BeliefState::uniform(scale).expected_mastery();

        let mut eligible: Vec<RankedConcept> = catalog
            .par_iter()
            .map(|(key, record)| self.score(record, beliefs.get(key), prior_mastery))
            .filter(|candidate| self.is_eligible(candidate))
            .collect();

        eligible.sort_by(RankedConcept::rank_cmp);
        eligible
    }

    /// The first `k` eligible concepts; empty when nothing qualifies
    pub fn select_candidates(
        &self,
        beliefs: &HashMap<String, BeliefState>,
        catalog: &BTreeMap<String, ConceptRecord>,
        k: usize,
        scale: &AbilityScale,
    ) -> Vec<RankedConcept> {
        let mut ranked = self.rank(beliefs, catalog, scale);
        ranked.truncate(k);
        ranked
    }
}
