//! JSON-lines command protocol used by the `diag-engine` binary
//!
//! Each input line is one command object tagged by `op`; each reply is either
//! `{"ok": ...}` or `{"error": {"kind": ..., "message": ...}}`.

use serde::Deserialize;
use serde_json::{json, Value};

use diag_algo::DEFAULT_DIFFICULTY;

use crate::engine::DiagnosticEngine;
use crate::error::DiagnosticError;
use crate::question::numeric_difficulty;

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    RecordResponse {
        user_id: String,
        concept: String,
        #[serde(alias = "response")]
        outcome: String,
        /// Number or numeric string; absent or null means the default
        #[serde(default)]
        difficulty: Option<Value>,
    },
    GetProfile {
        user_id: String,
    },
    SelectNext {
        user_id: String,
        #[serde(default = "default_count")]
        count: usize,
    },
    ListConcepts,
    Metrics,
}

fn default_count() -> usize {
    1
}

fn difficulty_value(value: Option<&Value>) -> Result<f64, DiagnosticError> {
    match value {
        None => Ok(DEFAULT_DIFFICULTY),
        Some(value) => numeric_difficulty(value).ok_or_else(|| {
            DiagnosticError::InvalidInput(format!("difficulty must be a number, got {value}"))
        }),
    }
}

pub fn execute(engine: &DiagnosticEngine, command: Command) -> Result<Value, DiagnosticError> {
    let value = match command {
        Command::RecordResponse {
            user_id,
            concept,
            outcome,
            difficulty,
        } => {
            let difficulty = difficulty_value(difficulty.as_ref())?;
            json!(engine.record_response(&user_id, &concept, &outcome, difficulty)?)
        }
        Command::GetProfile { user_id } => json!(engine.get_profile(&user_id)?),
        Command::SelectNext { user_id, count } => {
            json!(engine.select_next_concepts(&user_id, count)?)
        }
        Command::ListConcepts => json!(engine.list_concepts()),
        Command::Metrics => json!(engine.metrics()),
    };
    Ok(value)
}

fn error_reply(kind: &str, message: String) -> Value {
    json!({ "error": { "kind": kind, "message": message } })
}

/// Parse and run one protocol line, always producing a reply
pub fn handle_line(engine: &DiagnosticEngine, line: &str) -> Value {
    let command: Command = match serde_json::from_str(line) {
        Ok(command) => command,
        Err(err) => {
            tracing::warn!(error = %err, "rejected malformed command");
            return error_reply("invalid_input", format!("malformed command: {err}"));
        }
    };

    match execute(engine, command) {
        Ok(value) => json!({ "ok": value }),
        Err(err) => error_reply(err.kind(), err.to_string()),
    }
}
