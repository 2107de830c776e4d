//! Engine state

use super::TransitionError;

/// Where the engine is in the current turn
///
/// `turn` numbers increase with every accepted submission, so outcomes that
/// belong to an earlier turn can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// Ready for a new turn
    #[default]
    Idle,

    /// Request in flight
    Sending { turn: u64 },

    /// Reply received, characters being revealed into the last message
    Revealing { turn: u64 },

    /// Session torn down; nothing is accepted any more
    Closed,
}

impl EngineState {
    /// True for the whole busy window, dispatch through reveal
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, EngineState::Sending { .. } | EngineState::Revealing { .. })
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, EngineState::Closed)
    }

    /// The turn being worked on, if any
    #[must_use]
    pub fn current_turn(&self) -> Option<u64> {
        match self {
            EngineState::Sending { turn } | EngineState::Revealing { turn } => Some(*turn),
            EngineState::Idle | EngineState::Closed => None,
        }
    }

    /// Whether a new turn may start now
    ///
    /// # Errors
    ///
    /// [`TransitionError::Busy`] while a turn is in progress,
    /// [`TransitionError::Closed`] after teardown.
    pub fn accepts_submit(&self) -> Result<(), TransitionError> {
        match self {
            EngineState::Idle => Ok(()),
            EngineState::Sending { .. } | EngineState::Revealing { .. } => {
                Err(TransitionError::Busy)
            }
            EngineState::Closed => Err(TransitionError::Closed),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Sending { .. } => "sending",
            EngineState::Revealing { .. } => "revealing",
            EngineState::Closed => "closed",
        }
    }
}
