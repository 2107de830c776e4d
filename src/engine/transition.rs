//! Pure state transition function
//!
//! Given the same state and event this always produces the same result and
//! performs no I/O; the controller carries out the returned effects.

use super::{EngineState, Effect, Event};
use crate::remote::{DispatchError, TurnRequest};
use thiserror::Error;

/// Shown in place of the text when only an image was sent
pub const IMAGE_PLACEHOLDER: &str = "Image uploaded";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: EngineState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: EngineState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A turn is already in progress")]
    Busy,
    #[error("Session is closed")]
    Closed,
    #[error("Nothing to send")]
    EmptyDraft,
    #[error("Ignoring outcome for turn {turn} while {state}")]
    StaleOutcome { turn: u64, state: &'static str },
}

/// Pure transition function
///
/// # Errors
///
/// Rejects submissions outside `Idle` and outcomes that do not belong to
/// the current turn.
pub fn transition(state: &EngineState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Teardown
        // ============================================================
        (EngineState::Closed, Event::Teardown) => Ok(TransitionResult::new(EngineState::Closed)),

        (_, Event::Teardown) => {
            Ok(TransitionResult::new(EngineState::Closed).with_effect(Effect::CancelInFlight))
        }

        // ============================================================
        // Submission
        // ============================================================
        (state, Event::Submit { turn, draft }) => {
            state.accepts_submit()?;
            if draft.is_empty() {
                return Err(TransitionError::EmptyDraft);
            }

            let shown = if draft.text.trim().is_empty() {
                IMAGE_PLACEHOLDER.to_string()
            } else {
                draft.text.clone()
            };
            let attachment = draft.attachment.clone();

            Ok(TransitionResult::new(EngineState::Sending { turn })
                .with_effect(Effect::append_user(shown, attachment))
                .with_effect(Effect::Dispatch {
                    turn,
                    request: TurnRequest::from(draft),
                }))
        }

        // ============================================================
        // Dispatch outcome
        // ============================================================
        (EngineState::Sending { turn: current }, Event::ReplyReceived { turn, reply })
            if *current == turn =>
        {
            match reply.into_text() {
                // Empty message first so the reveal has a target
                Ok(text) => Ok(TransitionResult::new(EngineState::Revealing { turn })
                    .with_effect(Effect::append_assistant(String::new()))
                    .with_effect(Effect::StartReveal { turn, text })),
                Err(error) => Ok(report_failure(&error)),
            }
        }

        (EngineState::Sending { turn: current }, Event::DispatchFailed { turn, error })
            if *current == turn =>
        {
            Ok(report_failure(&error))
        }

        // ============================================================
        // Reveal
        // ============================================================
        (EngineState::Revealing { turn: current }, Event::RevealFinished { turn })
            if *current == turn =>
        {
            Ok(TransitionResult::new(EngineState::Idle))
        }

        // Late or mismatched outcomes
        (
            state,
            Event::ReplyReceived { turn, .. }
            | Event::DispatchFailed { turn, .. }
            | Event::RevealFinished { turn },
        ) => Err(TransitionError::StaleOutcome {
            turn,
            state: state.name(),
        }),
    }
}

fn report_failure(error: &DispatchError) -> TransitionResult {
    TransitionResult::new(EngineState::Idle).with_effect(Effect::append_assistant(error.user_message()))
}
