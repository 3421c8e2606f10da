//! # diag-algo - adaptive concept diagnostics core
//!
//! Pure Rust algorithms for estimating a learner's mastery of discrete
//! concepts and choosing what to probe next:
//!
//! - **Ability Scale** - fixed grid of ability levels in [0, 1)
//! - **Belief State** - per-concept probability mass over the grid
//! - **Belief Update** - Bayesian update with a logistic item-response likelihood
//! - **Selection Policy** - mastery / attempt filtering and lexicographic ranking
//!
//! ## Design
//!
//! - **Pure** - no I/O, no logging, no global state; identical inputs give identical outputs
//! - **Reusable** - the stateful service layer lives in `diag-engine`
//! - **Tested** - every module carries its own unit tests
//!
//! ## Modules
//!
//! - [`scale`] - ability levels
//! - [`belief`] - belief points and states
//! - [`update`] - posterior update
//! - [`selection`] - next-concept ranking
//! - [`text`] - slugs, title casing, fuzzy similarity
//! - [`sanitize`] - input clamping and distribution repair
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use diag_algo::{AbilityScale, BeliefState, BeliefUpdateEngine, Outcome};
//!
//! let scale = AbilityScale::default();
//! let prior = BeliefState::uniform(&scale);
//! let posterior = BeliefUpdateEngine::new().update(&prior, Outcome::Correct, 0.5);
//! assert!(posterior.expected_mastery() > prior.expected_mastery());
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod belief;
pub mod sanitize;
pub mod scale;
pub mod selection;
pub mod text;
pub mod types;
pub mod update;

// ============================================================================
// Re-exports
// ============================================================================

pub use belief::{BeliefPoint, BeliefState};
pub use scale::{AbilityScale, ScaleSizeError};
pub use selection::{RankedConcept, SelectionPolicy};
pub use types::*;
pub use update::{sigmoid, BeliefUpdate, BeliefUpdateEngine};
