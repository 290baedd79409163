use thiserror::Error;

use crate::state::round::Outcome;

/// High-level phases a game session can be in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamePhase {
    /// No game is running; nothing is offered for resume from this session.
    Idle,
    /// Rounds are being entered.
    Playing {
        /// Round currently being entered.
        round: u32,
    },
    /// The target was reached and the result awaits acknowledgement.
    Finished {
        /// Best player under the configured direction.
        winner: String,
        /// Worst player under the configured direction.
        loser: String,
    },
    /// The player abandoned the game.
    Canceled,
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A new or resumed game starts at `round`.
    Start {
        /// First round to enter.
        round: u32,
    },
    /// A round was committed with the given outcome.
    RoundEnded(Outcome),
    /// The player dismissed the final result.
    Acknowledge,
    /// The player abandoned the game.
    Cancel,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: GamePhase,
    /// The event that cannot be applied from this phase.
    pub event: GameEvent,
}

/// State machine replacing the per-screen boolean flags of a game session.
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    phase: GamePhase,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self {
            phase: GamePhase::Idle,
        }
    }
}

impl SessionStateMachine {
    /// Create a new state machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> &GamePhase {
        &self.phase
    }

    /// Whether round inputs and `end_round` are currently allowed.
    pub fn accepts_rounds(&self) -> bool {
        matches!(self.phase, GamePhase::Playing { .. })
    }

    /// Apply `event`, returning the new phase.
    pub fn apply(&mut self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        Ok(self.phase.clone())
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = match (self.phase.clone(), event) {
            (GamePhase::Idle, GameEvent::Start { round }) => GamePhase::Playing { round },
            (GamePhase::Playing { .. }, GameEvent::RoundEnded(Outcome::Continuing { round })) => {
                GamePhase::Playing { round }
            }
            (
                GamePhase::Playing { .. },
                GameEvent::RoundEnded(Outcome::Finished { winner, loser }),
            ) => GamePhase::Finished { winner, loser },
            (GamePhase::Finished { .. }, GameEvent::Acknowledge) => GamePhase::Idle,
            (GamePhase::Playing { .. } | GamePhase::Finished { .. }, GameEvent::Cancel) => {
                GamePhase::Canceled
            }
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
