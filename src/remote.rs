//! Remote assistant endpoint
//!
//! One trait seam over the endpoint so the engine can be driven by the HTTP
//! client in production and by mocks in tests.

mod error;
mod http;
mod types;

pub use error::DispatchError;
pub use http::HttpAssistantClient;
pub use types::{AssistantReply, TurnRequest};

use async_trait::async_trait;
use std::sync::Arc;

/// Sends one user turn and returns the assistant's reply
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Issue a single request; no retries
    async fn send_turn(&self, request: &TurnRequest) -> Result<AssistantReply, DispatchError>;

    /// Where requests go, for logs
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: AssistantClient + ?Sized> AssistantClient for Arc<T> {
    async fn send_turn(&self, request: &TurnRequest) -> Result<AssistantReply, DispatchError> {
        (**self).send_turn(request).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for assistant clients
pub struct LoggingClient {
    inner: Arc<dyn AssistantClient>,
}

impl LoggingClient {
    pub fn new(inner: Arc<dyn AssistantClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AssistantClient for LoggingClient {
    async fn send_turn(&self, request: &TurnRequest) -> Result<AssistantReply, DispatchError> {
        let start = std::time::Instant::now();
        let result = self.inner.send_turn(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    species = %request.species,
                    has_image = request.attachment.is_some(),
                    reply_chars = reply.response.as_deref().map_or(0, |r| r.chars().count()),
                    "Assistant request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    kind = e.kind(),
                    error = %e,
                    "Assistant request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
