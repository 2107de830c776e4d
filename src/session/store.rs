//! Shared session store
//!
//! Holds the append-only message log and the draft. Every mutation is
//! followed, under the same lock, by a snapshot sent to each subscriber, so
//! observers see every change in the order it happened.

use super::{Attachment, Draft, Message, MessageLog, Species};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// What happened to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Appended { index: usize },
    TextUpdated { index: usize },
    DraftUpdated,
}

/// Notification sent to observers after every mutation
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub change: Change,
    pub messages: MessageLog,
    pub draft: Draft,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Message index {index} is not the last message (log has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Message {index} was written by the user and cannot be edited")]
    ImmutableMessage { index: usize },
}

#[derive(Debug, Default)]
struct Inner {
    messages: Vec<Message>,
    draft: Draft,
    subscribers: Vec<mpsc::UnboundedSender<SessionUpdate>>,
}

impl Inner {
    fn publish(&mut self, change: Change) {
        if self.subscribers.is_empty() {
            return;
        }
        let update = SessionUpdate {
            change,
            messages: Arc::from(self.messages.as_slice()),
            draft: self.draft.clone(),
        };
        // Receivers that were dropped fall out here
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }
}

/// Handle to a conversation's log and draft
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<Inner>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with an assistant greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let store = Self::new();
        store.append_message(Message::assistant(greeting));
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message and return its index
    pub fn append_message(&self, message: Message) -> usize {
        let mut inner = self.lock();
        inner.messages.push(message);
        let index = inner.messages.len() - 1;
        inner.publish(Change::Appended { index });
        index
    }

    /// Replace the text of the last message
    ///
    /// # Errors
    ///
    /// [`StoreError::IndexOutOfRange`] if `index` is not the last message,
    /// [`StoreError::ImmutableMessage`] if that message is the user's.
    pub fn update_message_text(&self, index: usize, text: impl Into<String>) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let len = inner.messages.len();
        let target = match inner.messages.last_mut() {
            Some(last) if len.checked_sub(1) == Some(index) => last,
            _ => return Err(StoreError::IndexOutOfRange { index, len }),
        };
        if target.is_user() {
            return Err(StoreError::ImmutableMessage { index });
        }
        target.text = text.into();
        inner.publish(Change::TextUpdated { index });
        Ok(())
    }

    fn edit_draft(&self, edit: impl FnOnce(&mut Draft)) {
        let mut inner = self.lock();
        edit(&mut inner.draft);
        inner.publish(Change::DraftUpdated);
    }

    pub fn set_draft_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.edit_draft(|draft| draft.text = text);
    }

    pub fn set_draft_species(&self, species: Species) {
        self.edit_draft(|draft| draft.species = species);
    }

    pub fn set_draft_attachment(&self, attachment: Option<Attachment>) {
        self.edit_draft(|draft| draft.attachment = attachment);
    }

    /// Read the draft and reset it in one step, returning what it held
    pub fn snapshot_clear_draft(&self) -> Draft {
        let mut inner = self.lock();
        let cleared = inner.draft.cleared();
        let taken = std::mem::replace(&mut inner.draft, cleared);
        inner.publish(Change::DraftUpdated);
        taken
    }

    /// Like [`snapshot_clear_draft`](Self::snapshot_clear_draft), but leaves
    /// an empty draft untouched and returns `None`
    pub fn take_draft_if_ready(&self) -> Option<Draft> {
        let mut inner = self.lock();
        if inner.draft.is_empty() {
            return None;
        }
        let cleared = inner.draft.cleared();
        let taken = std::mem::replace(&mut inner.draft, cleared);
        inner.publish(Change::DraftUpdated);
        Some(taken)
    }

    #[must_use]
    pub fn messages(&self) -> MessageLog {
        Arc::from(self.lock().messages.as_slice())
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.lock().draft.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<Message> {
        self.lock().messages.last().cloned()
    }

    /// Subscribe to every later mutation
    ///
    /// Updates queue without bound until read; none are skipped. The
    /// receiver closes once the store is gone.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(tx);
        rx
    }

    /// Updates as a `Stream`
    #[must_use]
    pub fn update_stream(&self) -> UnboundedReceiverStream<SessionUpdate> {
        UnboundedReceiverStream::new(self.subscribe())
    }
}
