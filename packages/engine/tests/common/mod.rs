#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use diag_algo::{AbilityScale, BeliefPoint, BeliefState, ConceptRecord};
use diag_engine::{
    DiagnosticEngine, EngineConfig, InMemoryBeliefStore, InMemoryConceptCatalog, QuestionRequest,
    QuestionSource, QuestionSourceError, RawQuestion,
};

pub fn concept(key: &str, difficulty: f64) -> ConceptRecord {
    ConceptRecord::new(key, key, format!("Concept: {key}"), difficulty)
}

pub fn engine() -> DiagnosticEngine {
    engine_with(vec![])
}

pub fn engine_with(records: Vec<ConceptRecord>) -> DiagnosticEngine {
    DiagnosticEngine::in_memory(
        EngineConfig::default(),
        InMemoryConceptCatalog::with_records(records),
    )
    .unwrap()
}

/// Engine plus a handle on its belief store, for planting states directly
pub fn engine_with_store(
    records: Vec<ConceptRecord>,
) -> (DiagnosticEngine, Arc<InMemoryBeliefStore>) {
    let config = EngineConfig::default();
    let store = Arc::new(InMemoryBeliefStore::new(config.scale().unwrap()));
    let engine = DiagnosticEngine::new(
        config,
        Arc::new(InMemoryConceptCatalog::with_records(records)),
        store.clone(),
    )
    .unwrap();
    (engine, store)
}

/// All mass on the scale level closest to `ability`
pub fn peaked_state(scale: &AbilityScale, ability: f64, attempts: u32) -> BeliefState {
    let nearest = scale
        .levels()
        .iter()
        .copied()
        .min_by(|a, b| (a - ability).abs().total_cmp(&(b - ability).abs()))
        .unwrap();
    BeliefState {
        distribution: scale
            .levels()
            .iter()
            .map(|&a| BeliefPoint::new(a, if a == nearest { 1.0 } else { 0.0 }))
            .collect(),
        attempts,
        correct_count: 0,
    }
}

pub fn assert_normalized(points: &[BeliefPoint]) {
    let total: f64 = points.iter().map(|p| p.probability).sum();
    assert!((total - 1.0).abs() < 1e-9, "probability mass {total}");
}

/// Question source that answers from a fixed template and fails for listed keys
pub struct ScriptedSource {
    failing: Vec<String>,
    sloppy: bool,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn well_formed() -> Self {
        Self {
            failing: Vec::new(),
            sloppy: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns payloads with a wrong concept, a bad answer and a missing field
    pub fn sloppy() -> Self {
        Self {
            sloppy: true,
            ..Self::well_formed()
        }
    }

    pub fn failing_on(keys: &[&str]) -> Self {
        Self {
            failing: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::well_formed()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QuestionSource for ScriptedSource {
    fn generate(&self, request: &QuestionRequest) -> Result<RawQuestion, QuestionSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&request.concept_key) {
            return Err(QuestionSourceError::Unavailable(format!(
                "scripted failure for {}",
                request.concept_key
            )));
        }

        if self.sloppy {
            return Ok(RawQuestion {
                concept: Some("Something Else".to_string()),
                question: Some(format!("Which statement about {} holds?", request.title)),
                option_a: Some("First".to_string()),
                option_b: None,
                correct_answer: Some("maybe".to_string()),
                explanation: Some(String::new()),
                difficulty: Some(serde_json::json!(1.4)),
            });
        }

        Ok(RawQuestion {
            concept: Some(request.concept_key.clone()),
            question: Some(format!("Which statement about {} holds?", request.title)),
            option_a: Some("First".to_string()),
            option_b: Some("Second".to_string()),
            correct_answer: Some("b".to_string()),
            explanation: Some(request.description.clone()),
            difficulty: Some(serde_json::json!(0.4)),
        })
    }
}
