//! Fatal adjudication errors.

use thiserror::Error;

/// Conditions that stop a game. Ordinary bad orders never produce these; they
/// come back as `INVALID` verdicts instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("resolution exceeded {limit} steps")]
    IterationBound { limit: usize },

    #[error("board invariant violated: {0}")]
    Invariant(String),
}

impl EngineError {
    pub const fn kind(&self) -> &'static str {
        match self {
            EngineError::IterationBound { .. } => "ITERATION_BOUND",
            EngineError::Invariant(_) => "INVARIANT",
        }
    }
}
