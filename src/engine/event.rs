//! Events that drive the engine

use crate::remote::{AssistantReply, DispatchError};
use crate::session::Draft;

/// Inputs to [`transition`](super::transition)
#[derive(Debug, Clone)]
pub enum Event {
    /// The user submitted a draft, already taken from the store
    Submit { turn: u64, draft: Draft },

    /// The endpoint answered
    ReplyReceived { turn: u64, reply: AssistantReply },

    /// The request failed before a usable answer arrived
    DispatchFailed { turn: u64, error: DispatchError },

    /// The reveal loop wrote the last character
    RevealFinished { turn: u64 },

    /// The conversation view is going away
    Teardown,
}
