//! Request and reply types for the assistant endpoint

use super::DispatchError;
use crate::session::{Attachment, Draft, Species};
use serde::Deserialize;

/// One user turn as sent to the endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    /// Raw draft text; may be empty when only an image is sent
    pub message: String,
    pub species: Species,
    pub attachment: Option<Attachment>,
}

impl From<Draft> for TurnRequest {
    fn from(draft: Draft) -> Self {
        Self {
            message: draft.text,
            species: draft.species,
            attachment: draft.attachment,
        }
    }
}

/// Body of a successful response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssistantReply {
    #[serde(default)]
    pub response: Option<String>,
}

impl AssistantReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
        }
    }

    /// A reply with no `response` field, like `{}`
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The reply text, or `UnrecognizedResponse` when it is missing or empty
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnrecognizedResponse`] if there is no text.
    pub fn into_text(self) -> Result<String, DispatchError> {
        match self.response {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(DispatchError::UnrecognizedResponse),
        }
    }
}
