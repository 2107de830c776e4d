//! Multipart HTTP client for the assistant endpoint

use super::{AssistantClient, AssistantReply, DispatchError, TurnRequest};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

/// Posts each turn as `multipart/form-data` with `message`, `species` and
/// an optional `image` part
pub struct HttpAssistantClient {
    client: Client,
    endpoint: String,
}

impl HttpAssistantClient {
    /// # Errors
    ///
    /// Returns [`DispatchError::Unexpected`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DispatchError::unexpected(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    fn build_form(request: &TurnRequest) -> Result<Form, DispatchError> {
        let mut form = Form::new()
            .text("message", request.message.clone())
            .text("species", request.species.as_str());

        if let Some(attachment) = &request.attachment {
            let part = Part::bytes(attachment.data().to_vec())
                .file_name(attachment.file_name().to_string())
                .mime_str(attachment.media_type())
                .map_err(|e| {
                    DispatchError::unexpected(format!("Invalid attachment media type: {e}"))
                })?;
            form = form.part("image", part);
        }

        Ok(form)
    }

    fn classify_send_error(e: &reqwest::Error) -> DispatchError {
        if e.is_builder() {
            DispatchError::unexpected(format!("Failed to build request: {e}"))
        } else if e.is_timeout() {
            DispatchError::transport(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            DispatchError::transport(format!("Connection failed: {e}"))
        } else {
            DispatchError::transport(format!("Request failed: {e}"))
        }
    }
}

#[async_trait]
impl AssistantClient for HttpAssistantClient {
    async fn send_turn(&self, request: &TurnRequest) -> Result<AssistantReply, DispatchError> {
        let form = Self::build_form(request)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::classify_send_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DispatchError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(DispatchError::from_error_body(status.as_u16(), &body));
        }

        // A body that is not the expected object is treated like `{}`
        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not parse assistant reply");
            AssistantReply::empty()
        }))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
