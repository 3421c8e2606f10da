use thiserror::Error;

/// Errors surfaced by the diagnostic engine to its callers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiagnosticError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("no eligible concept for user {user_id}")]
    NoEligibleConcept { user_id: String },
    #[error("question generation failed: {0}")]
    QuestionGenerationFailed(String),
}

impl DiagnosticError {
    /// Stable machine-readable name used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            DiagnosticError::InvalidInput(_) => "invalid_input",
            DiagnosticError::UserNotFound(_) => "user_not_found",
            DiagnosticError::NoEligibleConcept { .. } => "no_eligible_concept",
            DiagnosticError::QuestionGenerationFailed(_) => "question_generation_failed",
        }
    }
}

impl From<diag_algo::ParseOutcomeError> for DiagnosticError {
    fn from(err: diag_algo::ParseOutcomeError) -> Self {
        DiagnosticError::InvalidInput(err.to_string())
    }
}

impl From<diag_algo::ScaleSizeError> for DiagnosticError {
    fn from(err: diag_algo::ScaleSizeError) -> Self {
        DiagnosticError::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DiagnosticError>;
