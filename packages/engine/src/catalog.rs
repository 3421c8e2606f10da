//! Concept catalog
//!
//! The engine only needs lookup by key and an atomic insert-if-absent; any
//! durable backing store can implement [`ConceptCatalog`].

use std::collections::BTreeMap;
use std::path::Path;

use parking_lot::RwLock;
use serde::Deserialize;

use diag_algo::sanitize::clamp_difficulty;
use diag_algo::{ConceptRecord, DEFAULT_DIFFICULTY};

use crate::config::ConfigError;

pub trait ConceptCatalog: Send + Sync {
    fn get(&self, key: &str) -> Option<ConceptRecord>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Store `record` unless its key already exists. Returns whether it was inserted.
    ///
    /// Must be atomic per key: of two concurrent inserts for one key exactly one wins.
    fn insert_if_absent(&self, record: ConceptRecord) -> bool;

    fn keys(&self) -> Vec<String>;

    fn snapshot(&self) -> BTreeMap<String, ConceptRecord>;

    fn len(&self) -> usize {
        self.keys().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryConceptCatalog {
    records: RwLock<BTreeMap<String, ConceptRecord>>,
}

/// On-disk shape of one catalog entry; the key is the enclosing object's field name
#[derive(Debug, Deserialize)]
struct SeedEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    difficulty: Option<f64>,
    #[serde(default)]
    group: Option<String>,
}

impl InMemoryConceptCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = ConceptRecord>) -> Self {
        let catalog = Self::new();
        {
            let mut guard = catalog.records.write();
            for record in records {
                guard.entry(record.key.clone()).or_insert(record);
            }
        }
        catalog
    }

    /// Parse a JSON object of `key -> {title, description, difficulty, group}`
    pub fn from_json_str(json: &str, source: &Path) -> Result<Self, ConfigError> {
        let entries: BTreeMap<String, SeedEntry> =
            serde_json::from_str(json).map_err(|source_err| ConfigError::Parse {
                path: source.to_path_buf(),
                source: source_err,
            })?;

        let records = entries.into_iter().map(|(key, entry)| {
            let raw_difficulty = entry.difficulty.unwrap_or(DEFAULT_DIFFICULTY);
            if let Some(fix) = clamp_difficulty(raw_difficulty).applied {
                tracing::warn!(concept = %key, ?fix, "seed concept difficulty adjusted");
            }
            let description = entry
                .description
                .unwrap_or_else(|| format!("Concept: {key}"));
            let record = ConceptRecord::new(key.clone(), entry.title, description, raw_difficulty);
            match entry.group {
                Some(group) => record.with_group(group),
                None => record,
            }
        });

        Ok(Self::with_records(records))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        Self::from_json_str(&content, path)
    }
}

impl ConceptCatalog for InMemoryConceptCatalog {
    fn get(&self, key: &str) -> Option<ConceptRecord> {
        self.records.read().get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.records.read().contains_key(key)
    }

    fn insert_if_absent(&self, record: ConceptRecord) -> bool {
        let mut guard = self.records.write();
        if guard.contains_key(&record.key) {
            return false;
        }
        guard.insert(record.key.clone(), record);
        true
    }

    fn keys(&self) -> Vec<String> {
        self.records.read().keys().cloned().collect()
    }

    fn snapshot(&self) -> BTreeMap<String, ConceptRecord> {
        self.records.read().clone()
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }
}
