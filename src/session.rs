//! Session store: the message log and the draft being composed

mod draft;
mod message;
mod store;

#[cfg(test)]
mod proptests;

pub use draft::{Draft, Species, UnknownSpecies};
pub use message::{Attachment, AttachmentError, Message, MessageLog, Role};
pub use store::{Change, SessionStore, SessionUpdate, StoreError};
