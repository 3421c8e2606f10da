//! Question generation boundary
//!
//! A [`QuestionSource`] (typically backed by a language model) returns loosely
//! shaped [`RawQuestion`]s. [`Question::from_raw`] is the only place those are
//! turned into well-formed questions; every correction is logged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use diag_algo::sanitize::{clamp_difficulty, DifficultyFix};
use diag_algo::DEFAULT_DIFFICULTY;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuestionSourceError {
    #[error("question source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed question payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerOption {
    #[default]
    A,
    B,
}

impl AnswerOption {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "a" => Some(AnswerOption::A),
            "b" => Some(AnswerOption::B),
            _ => None,
        }
    }
}

/// What the source is asked to write a question about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionRequest {
    pub concept_key: String,
    pub title: String,
    pub description: String,
}

/// Unvalidated question payload as produced by a source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub option_a: Option<String>,
    #[serde(default)]
    pub option_b: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    /// Number, numeric string or garbage
    #[serde(default)]
    pub difficulty: Option<Value>,
}

/// Two-option multiple choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub concept: String,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub correct_answer: AnswerOption,
    pub explanation: String,
    pub difficulty: f64,
}

pub trait QuestionSource: Send + Sync {
    fn generate(&self, request: &QuestionRequest) -> Result<RawQuestion, QuestionSourceError>;
}

/// A JSON number, or a string holding one
pub(crate) fn numeric_difficulty(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_text(value: Option<String>, field: &str, concept: &str) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            tracing::warn!(concept = %concept, field, "question field missing");
            format!("Missing field: {field}")
        }
    }
}

impl Question {
    /// Sanitize a source payload for `expected_concept`
    pub fn from_raw(raw: RawQuestion, expected_concept: &str) -> Self {
        if let Some(reported) = raw.concept.as_deref() {
            if reported != expected_concept {
                tracing::warn!(
                    expected = %expected_concept,
                    reported = %reported,
                    "question concept mismatch, overriding"
                );
            }
        }

        let correct_answer = match raw.correct_answer.as_deref().and_then(AnswerOption::parse) {
            Some(answer) => answer,
            None => {
                tracing::warn!(
                    concept = %expected_concept,
                    value = ?raw.correct_answer,
                    "invalid correct answer, defaulting to a"
                );
                AnswerOption::A
            }
        };

        let difficulty = match raw.difficulty.as_ref().and_then(numeric_difficulty) {
            Some(value) => {
                let check = clamp_difficulty(value);
                match check.applied {
                    Some(DifficultyFix::Clamped { original }) => tracing::warn!(
                        concept = %expected_concept,
                        original,
                        "question difficulty out of range, clamping"
                    ),
                    Some(DifficultyFix::Defaulted) => tracing::warn!(
                        concept = %expected_concept,
                        "question difficulty not finite, using default"
                    ),
                    None => {}
                }
                check.value
            }
            None => {
                tracing::warn!(
                    concept = %expected_concept,
                    value = ?raw.difficulty,
                    "question difficulty missing or unparseable, using default"
                );
                DEFAULT_DIFFICULTY
            }
        };

        Self {
            concept: expected_concept.to_string(),
            question: required_text(raw.question, "question", expected_concept),
            option_a: required_text(raw.option_a, "option_a", expected_concept),
            option_b: required_text(raw.option_b, "option_b", expected_concept),
            correct_answer,
            explanation: required_text(raw.explanation, "explanation", expected_concept),
            difficulty,
        }
    }
}
