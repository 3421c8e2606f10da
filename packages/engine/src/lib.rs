//! Adaptive concept diagnostics
//!
//! Tracks, per learner and concept, a discrete belief over ability levels and
//! updates it from quiz responses. The engine resolves free-text concept names
//! onto a catalog, maintains the beliefs, and picks which concepts to probe next.
//!
//! ```
//! use diag_engine::{DiagnosticEngine, EngineConfig, InMemoryConceptCatalog};
//!
//! let catalog = InMemoryConceptCatalog::new();
//! let engine = DiagnosticEngine::in_memory(EngineConfig::default(), catalog)?;
//! let result = engine.record_response("learner-1", "Derivative Rule", "correct", 0.5)?;
//! assert_eq!(result.concept_key, "derivative_rule");
//! assert_eq!(engine.select_next_concepts("learner-1", 1)?, vec!["derivative_rule"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod event;
pub mod logging;
pub mod metrics;
pub mod question;
pub mod resolver;
pub mod store;

pub use catalog::{ConceptCatalog, InMemoryConceptCatalog};
pub use config::{Config, ConfigError, EngineConfig};
pub use engine::{ConceptProgress, DiagnosticEngine, ResponseResult};
pub use error::{DiagnosticError, Result};
pub use event::ResponseEvent;
pub use metrics::{EngineMetrics, EngineMetricsSnapshot};
pub use question::{
    AnswerOption, Question, QuestionRequest, QuestionSource, QuestionSourceError, RawQuestion,
};
pub use resolver::{ConceptResolver, Resolution, ResolutionKind};
pub use store::{BeliefStore, InMemoryBeliefStore};
