use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::json;
use tracing::debug;

use super::traits::ChatApi;
use super::types::{ApiErrorBody, MessageResponse, StartConversationResponse};
use crate::chat::ImageAttachment;
use crate::constants::{MESSAGE_PATH, RESET_CONVERSATION_PATH, START_CONVERSATION_PATH};
use crate::utils::{PatouError, Result};

/// reqwest-backed implementation of the chatbot API
pub struct HttpChatApi {
    client: Client,
    base_url: String,
}

impl HttpChatApi {
    /// Create a client against `base_url` (e.g. `http://127.0.0.1:5000`)
    /// with a per-request timeout
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success response to `PatouError::Api`, pulling the server's
    /// JSON error body into the debug log when one is present.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if let Ok(body) = response.json::<ApiErrorBody>().await {
            debug!("server error body: {}", body.error);
        }
        Err(PatouError::Api(status.as_u16()))
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn start_conversation(&self) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint(START_CONVERSATION_PATH))
            .json(&json!({}))
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body: StartConversationResponse = response.json().await?;
        Ok(body.conversation_id)
    }

    async fn reset_conversation(&self, conversation_id: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint(RESET_CONVERSATION_PATH))
            .json(&json!({ "conversation_id": conversation_id }))
            .send()
            .await?;

        // Response body is unused; only the status matters
        Self::check_status(response).await?;
        Ok(())
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> Result<String> {
        let mut form = Form::new()
            .text("message", text.to_string())
            .text("conversation_id", conversation_id.to_string());

        if let Some(image) = image {
            let part = Part::bytes(image.bytes.to_vec())
                .file_name(image.file_name.clone())
                .mime_str(image.mime_type())
                .map_err(|e| PatouError::InvalidImage(e.to_string()))?;
            form = form.part("image", part);
        }

        let response = self
            .client
            .post(self.endpoint(MESSAGE_PATH))
            .multipart(form)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body: MessageResponse = response.json().await?;
        Ok(body.response)
    }
}
