use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time copy of [`EngineMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineMetricsSnapshot {
    pub responses_recorded: u64,
    pub unsure_responses: u64,
    pub degenerate_likelihoods: u64,
    pub concepts_created: u64,
    pub fuzzy_matches: u64,
    pub selections: u64,
    pub no_eligible: u64,
    pub question_failures: u64,
    pub last_response_at: Option<u64>,
}

/// Lock-free counters owned by one engine instance
#[derive(Debug, Default)]
pub struct EngineMetrics {
    responses_recorded: AtomicU64,
    unsure_responses: AtomicU64,
    degenerate_likelihoods: AtomicU64,
    concepts_created: AtomicU64,
    fuzzy_matches: AtomicU64,
    selections: AtomicU64,
    no_eligible: AtomicU64,
    question_failures: AtomicU64,
    last_response_at: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_response(&self, unsure: bool) {
        self.responses_recorded.fetch_add(1, Ordering::Relaxed);
        if unsure {
            self.unsure_responses.fetch_add(1, Ordering::Relaxed);
        }
        self.last_response_at.store(now_ms(), Ordering::Relaxed);
    }

    pub fn record_degenerate(&self) {
        self.degenerate_likelihoods.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_concept_created(&self) {
        self.concepts_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fuzzy_match(&self) {
        self.fuzzy_matches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_selection(&self, eligible: bool) {
        if eligible {
            self.selections.fetch_add(1, Ordering::Relaxed);
        } else {
            self.no_eligible.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_question_failure(&self) {
        self.question_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn degenerate_likelihoods(&self) -> u64 {
        self.degenerate_likelihoods.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        let last = self.last_response_at.load(Ordering::Relaxed);
        EngineMetricsSnapshot {
            responses_recorded: self.responses_recorded.load(Ordering::Relaxed),
            unsure_responses: self.unsure_responses.load(Ordering::Relaxed),
            degenerate_likelihoods: self.degenerate_likelihoods(),
            concepts_created: self.concepts_created.load(Ordering::Relaxed),
            fuzzy_matches: self.fuzzy_matches.load(Ordering::Relaxed),
            selections: self.selections.load(Ordering::Relaxed),
            no_eligible: self.no_eligible.load(Ordering::Relaxed),
            question_failures: self.question_failures.load(Ordering::Relaxed),
            last_response_at: if last == 0 { None } else { Some(last) },
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
