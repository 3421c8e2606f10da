use std::sync::Arc;

use serde::Serialize;

use diag_algo::text::{best_match, slugify, title_case};
use diag_algo::ConceptRecord;

use crate::catalog::ConceptCatalog;
use crate::metrics::EngineMetrics;

/// How a free-text name was turned into a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    Existing,
    Fuzzy,
    Created,
    /// Slug already present in the catalog
    SlugExisting,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub key: String,
    pub kind: ResolutionKind,
}

/// Maps user-supplied concept names onto catalog keys, creating records on a miss
pub struct ConceptResolver {
    catalog: Arc<dyn ConceptCatalog>,
    metrics: Arc<EngineMetrics>,
    fuzzy_cutoff: f64,
    default_difficulty: f64,
}

impl ConceptResolver {
    pub fn new(
        catalog: Arc<dyn ConceptCatalog>,
        metrics: Arc<EngineMetrics>,
        fuzzy_cutoff: f64,
        default_difficulty: f64,
    ) -> Self {
        Self {
            catalog,
            metrics,
            fuzzy_cutoff,
            default_difficulty,
        }
    }

    pub fn resolve(&self, name_or_key: &str) -> String {
        self.resolve_detailed(name_or_key).key
    }

    pub fn resolve_detailed(&self, name_or_key: &str) -> Resolution {
        if self.catalog.contains(name_or_key) {
            return Resolution {
                key: name_or_key.to_string(),
                kind: ResolutionKind::Existing,
            };
        }

        let keys = self.catalog.keys();
        if let Some(found) = best_match(
            name_or_key,
            keys.iter().map(String::as_str),
            self.fuzzy_cutoff,
        ) {
            self.metrics.record_fuzzy_match();
            if found.contenders > 1 {
                tracing::debug!(
                    input = %name_or_key,
                    key = %found.key,
                    contenders = found.contenders,
                    "several catalog keys matched, taking the closest"
                );
            }
            return Resolution {
                key: found.key,
                kind: ResolutionKind::Fuzzy,
            };
        }

        let key = slugify(name_or_key);
        let record = ConceptRecord::new(
            key.clone(),
            title_case(name_or_key),
            format!("User-derived concept: {name_or_key}"),
            self.default_difficulty,
        );

        if self.catalog.insert_if_absent(record) {
            self.metrics.record_concept_created();
            tracing::info!(input = %name_or_key, key = %key, "created concept");
            Resolution {
                key,
                kind: ResolutionKind::Created,
            }
        } else {
            Resolution {
                key,
                kind: ResolutionKind::SlugExisting,
            }
        }
    }
}
