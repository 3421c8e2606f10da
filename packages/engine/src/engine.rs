use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use diag_algo::sanitize::{diagnose_distribution, repair_distribution, DistributionDefect};
use diag_algo::{
    AbilityScale, BeliefPoint, BeliefState, BeliefUpdateEngine, ConceptRecord, RankedConcept,
    SelectionPolicy,
};

use crate::catalog::{ConceptCatalog, InMemoryConceptCatalog};
use crate::config::{ConfigError, EngineConfig};
use crate::error::{DiagnosticError, Result};
use crate::event::ResponseEvent;
use crate::metrics::{EngineMetrics, EngineMetricsSnapshot};
use crate::question::{Question, QuestionRequest, QuestionSource};
use crate::resolver::{ConceptResolver, Resolution};
use crate::store::{BeliefStore, InMemoryBeliefStore};

/// Reply to a recorded response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseResult {
    pub concept_key: String,
    pub updated_belief: Vec<BeliefPoint>,
    pub attempts: u32,
    pub correct: u32,
    pub expected_mastery: f64,
}

/// One entry of a learner profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptProgress {
    pub belief: Vec<BeliefPoint>,
    pub attempts: u32,
    pub correct: u32,
}

impl From<BeliefState> for ConceptProgress {
    fn from(state: BeliefState) -> Self {
        Self {
            belief: state.distribution,
            attempts: state.attempts,
            correct: state.correct_count,
        }
    }
}

pub struct DiagnosticEngine {
    config: EngineConfig,
    scale: AbilityScale,
    policy: SelectionPolicy,
    updater: BeliefUpdateEngine,
    catalog: Arc<dyn ConceptCatalog>,
    store: Arc<dyn BeliefStore>,
    resolver: ConceptResolver,
    metrics: Arc<EngineMetrics>,
}

impl DiagnosticEngine {
    pub fn new(
        config: EngineConfig,
        catalog: Arc<dyn ConceptCatalog>,
        store: Arc<dyn BeliefStore>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let scale = config.scale()?;
        let metrics = Arc::new(EngineMetrics::new());
        let resolver = ConceptResolver::new(
            Arc::clone(&catalog),
            Arc::clone(&metrics),
            config.fuzzy_cutoff,
            config.default_difficulty,
        );

        Ok(Self {
            policy: config.selection_policy(),
            scale,
            updater: BeliefUpdateEngine::new(),
            catalog,
            store,
            resolver,
            metrics,
            config,
        })
    }

    /// Engine over in-memory stores, seeded with `catalog`
    pub fn in_memory(
        config: EngineConfig,
        catalog: InMemoryConceptCatalog,
    ) -> std::result::Result<Self, ConfigError> {
        let store = InMemoryBeliefStore::new(config.scale()?);
        Self::new(config, Arc::new(catalog), Arc::new(store))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scale(&self) -> &AbilityScale {
        &self.scale
    }

    pub fn metrics(&self) -> EngineMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn resolve(&self, name_or_key: &str) -> Resolution {
        self.resolver.resolve_detailed(name_or_key)
    }

    pub fn list_concepts(&self) -> BTreeMap<String, ConceptRecord> {
        self.catalog.snapshot()
    }

    // ==================== Responses ====================

    /// Parse wire values and record them; see [`record_event`](Self::record_event)
    pub fn record_response(
        &self,
        user_id: &str,
        concept: &str,
        outcome: &str,
        difficulty: f64,
    ) -> Result<ResponseResult> {
        let event = ResponseEvent::parse(concept, outcome, difficulty)?;
        self.record_event(user_id, &event)
    }

    pub fn record_event(&self, user_id: &str, event: &ResponseEvent) -> Result<ResponseResult> {
        validate_user_id(user_id)?;
        let concept_key = self.resolver.resolve(&event.concept);

        if !event.outcome.is_evidence() {
            self.metrics.record_response(true);
            let state = self.store.get_or_init(user_id, &concept_key);
            let state = self.repaired(user_id, &concept_key, state);
            tracing::debug!(user_id, concept = %concept_key, "unsure response, belief unchanged");
            return Ok(result_for(concept_key, state));
        }

        let mut degenerate = false;
        let (mut prior_mastery, mut posterior_mastery) = (0.0, 0.0);
        let state = self.store.modify(user_id, &concept_key, &mut |current: &BeliefState| {
            let current = self.repaired_for_update(user_id, &concept_key, current);
            let update = self.updater.apply(&current, event.outcome, event.difficulty);
            degenerate = update.degenerate;
            prior_mastery = update.prior_mastery;
            posterior_mastery = update.posterior_mastery;
            update.state
        });

        self.metrics.record_response(false);
        if degenerate {
            self.metrics.record_degenerate();
            tracing::warn!(
                user_id,
                concept = %concept_key,
                difficulty = event.difficulty,
                outcome = %event.outcome,
                "degenerate likelihood, prior kept"
            );
        }

        tracing::debug!(
            user_id,
            concept = %concept_key,
            outcome = %event.outcome,
            attempts = state.attempts,
            prior_mastery,
            posterior_mastery,
            "belief updated"
        );

        Ok(result_for(concept_key, state))
    }

    // ==================== Profiles ====================

    pub fn get_profile(&self, user_id: &str) -> Result<BTreeMap<String, ConceptProgress>> {
        let beliefs = self
            .store
            .snapshot(user_id)
            .ok_or_else(|| DiagnosticError::UserNotFound(user_id.to_string()))?;

        Ok(beliefs
            .into_iter()
            .map(|(key, state)| {
                let state = self.repaired(user_id, &key, state);
                (key, ConceptProgress::from(state))
            })
            .collect())
    }

    // ==================== Selection ====================

    pub fn select_next_concepts(&self, user_id: &str, count: usize) -> Result<Vec<String>> {
        Ok(self
            .ranked_concepts(user_id, count)?
            .into_iter()
            .map(|candidate| candidate.key)
            .collect())
    }

    /// Like [`select_next_concepts`](Self::select_next_concepts) but keeps the ranking scores
    pub fn ranked_concepts(&self, user_id: &str, count: usize) -> Result<Vec<RankedConcept>> {
        self.check_count(count)?;

        let beliefs: HashMap<String, BeliefState> = self
            .store
            .snapshot(user_id)
            .unwrap_or_default()
            .into_iter()
            .map(|(key, state)| {
                let state = self.repaired(user_id, &key, state);
                (key, state)
            })
            .collect();
        let catalog = self.catalog.snapshot();

        let ranked = self
            .policy
            .select_candidates(&beliefs, &catalog, count, &self.scale);

        if ranked.is_empty() {
            self.metrics.record_selection(false);
            tracing::info!(user_id, catalog_size = catalog.len(), "no eligible concept");
            return Err(DiagnosticError::NoEligibleConcept {
                user_id: user_id.to_string(),
            });
        }

        self.metrics.record_selection(true);
        Ok(ranked)
    }

    /// Select concepts and ask `source` for one question each
    ///
    /// Concepts whose generation fails are skipped; only a batch with no
    /// question at all is an error.
    pub fn next_questions(
        &self,
        user_id: &str,
        count: usize,
        source: &dyn QuestionSource,
    ) -> Result<Vec<Question>> {
        let keys = self.select_next_concepts(user_id, count)?;
        let mut questions = Vec::with_capacity(keys.len());

        for key in &keys {
            let Some(record) = self.catalog.get(key) else {
                continue;
            };
            let request = QuestionRequest {
                concept_key: record.key.clone(),
                title: record.title.clone(),
                description: record.description.clone(),
            };
            match source.generate(&request) {
                Ok(raw) => questions.push(Question::from_raw(raw, key)),
                Err(err) => {
                    self.metrics.record_question_failure();
                    tracing::warn!(
                        user_id,
                        concept = %key,
                        error = %err,
                        "question generation failed"
                    );
                }
            }
        }

        if questions.is_empty() {
            return Err(DiagnosticError::QuestionGenerationFailed(format!(
                "no question generated for {} selected concept(s)",
                keys.len()
            )));
        }
        Ok(questions)
    }

    fn check_count(&self, count: usize) -> Result<()> {
        if count == 0 || count > self.config.max_batch_size {
            return Err(DiagnosticError::InvalidInput(format!(
                "count must be between 1 and {}, got {count}",
                self.config.max_batch_size
            )));
        }
        Ok(())
    }

    fn repaired(&self, user_id: &str, concept_key: &str, mut state: BeliefState) -> BeliefState {
        let (distribution, defect) = repair_distribution(&state.distribution, &self.scale);
        if let Some(defect) = defect {
            tracing::warn!(
                user_id,
                concept = %concept_key,
                ?defect,
                "malformed belief distribution, reset to uniform"
            );
            state.distribution = distribution;
        }
        state
    }

    /// Repair before an update, except that a zero-mass prior is kept so the
    /// update reports it as degenerate
    fn repaired_for_update(
        &self,
        user_id: &str,
        concept_key: &str,
        state: &BeliefState,
    ) -> BeliefState {
        match diagnose_distribution(&state.distribution, &self.scale) {
            Some(DistributionDefect::ZeroMass) => state.clone(),
            _ => self.repaired(user_id, concept_key, state.clone()),
        }
    }
}

fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(DiagnosticError::InvalidInput(
            "user_id must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn result_for(concept_key: String, state: BeliefState) -> ResponseResult {
    ResponseResult {
        expected_mastery: state.expected_mastery(),
        concept_key,
        attempts: state.attempts,
        correct: state.correct_count,
        updated_belief: state.distribution,
    }
}
