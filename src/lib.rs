//! Veterinary assistant chat client
//!
//! A session controller that owns the message log, dispatches user turns to
//! a remote assistant endpoint, and reveals replies one character at a time.
//! Presentation layers drive it through [`ChatController`] and render the
//! snapshots published by the session store.

pub mod config;
pub mod engine;
pub mod remote;
pub mod session;
pub mod telemetry;

pub use config::ClientConfig;
pub use engine::{ChatController, EngineState, SubmitRejected};
pub use remote::{AssistantClient, AssistantReply, DispatchError, HttpAssistantClient, TurnRequest};
pub use session::{
    Attachment, Change, Draft, Message, MessageLog, Role, SessionStore, SessionUpdate, Species,
    StoreError,
};
