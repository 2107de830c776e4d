//! Dispatch failure taxonomy

use thiserror::Error;

pub const UNRECOGNIZED_RESPONSE_TEXT: &str = "Sorry, I could not understand the response.";
pub const REMOTE_ERROR_FALLBACK: &str = "Unable to process your request.";
pub const CONNECTION_ERROR_TEXT: &str = "Error connecting to the server.";
pub const UNEXPECTED_ERROR_TEXT: &str = "An unexpected error occurred.";

/// Why a turn produced no revealable reply
///
/// `Display` carries diagnostic detail for logs; [`user_message`] is the
/// text that lands in the conversation.
///
/// [`user_message`]: DispatchError::user_message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The request succeeded but carried no usable `response`
    #[error("Reply did not contain a response")]
    UnrecognizedResponse,

    /// The endpoint answered with an error status
    #[error("Endpoint returned HTTP {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    RemoteApplication { status: u16, message: Option<String> },

    /// No response arrived (connect failure, DNS, timeout, dropped body)
    #[error("Transport failure: {detail}")]
    Transport { detail: String },

    /// Anything else while building or issuing the request
    #[error("Unexpected failure: {detail}")]
    Unexpected { detail: String },
}

impl DispatchError {
    pub fn remote(status: u16, message: Option<String>) -> Self {
        Self::RemoteApplication {
            status,
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    pub fn unexpected(detail: impl Into<String>) -> Self {
        Self::Unexpected {
            detail: detail.into(),
        }
    }

    /// Classify a non-success response from its status and body
    ///
    /// The body's `message` field is used when present, then `error`.
    pub fn from_error_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|parsed| {
                ["message", "error"]
                    .iter()
                    .find_map(|key| parsed.get(*key).and_then(|v| v.as_str()).map(str::to_string))
            });
        Self::remote(status, message)
    }

    /// Text appended to the conversation for this failure
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UnrecognizedResponse => UNRECOGNIZED_RESPONSE_TEXT.to_string(),
            Self::RemoteApplication { message, .. } => {
                format!("Error: {}", message.as_deref().unwrap_or(REMOTE_ERROR_FALLBACK))
            }
            Self::Transport { .. } => CONNECTION_ERROR_TEXT.to_string(),
            Self::Unexpected { .. } => UNEXPECTED_ERROR_TEXT.to_string(),
        }
    }

    /// Short name for structured logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnrecognizedResponse => "unrecognized_response",
            Self::RemoteApplication { .. } => "remote_application",
            Self::Transport { .. } => "transport",
            Self::Unexpected { .. } => "unexpected",
        }
    }
}
