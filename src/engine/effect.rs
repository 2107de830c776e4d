//! Effects produced by state transitions

use crate::remote::TurnRequest;
use crate::session::{Attachment, Message};

/// Work for the controller to carry out after a transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Append a message to the session log
    AppendMessage { message: Message },

    /// Send the turn to the endpoint (spawns a background task)
    Dispatch { turn: u64, request: TurnRequest },

    /// Reveal `text` into the message appended just before
    StartReveal { turn: u64, text: String },

    /// Abandon the in-flight request and stop any reveal
    CancelInFlight,
}

impl Effect {
    pub fn append_user(text: impl Into<String>, attachment: Option<Attachment>) -> Self {
        Effect::AppendMessage {
            message: Message::user(text, attachment),
        }
    }

    pub fn append_assistant(text: impl Into<String>) -> Self {
        Effect::AppendMessage {
            message: Message::assistant(text),
        }
    }
}
