use thiserror::Error;
use validator::ValidationErrors;

use crate::state::state_machine::InvalidTransition;

/// Invariant violations raised by the scoring engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The game cannot be played with this configuration (no players, or
    /// totals and pending maps that disagree with the configured names).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A leader was requested while no totals are recorded.
    #[error("cannot compute standings without any recorded totals")]
    EmptyStandings,
}

/// Errors that can occur in session-level operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current phase.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Round input was addressed to a name that is not part of the game.
    #[error("unknown player `{0}`")]
    UnknownPlayer(String),
    /// The engine rejected the game or one of its rounds.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {}", err))
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}
