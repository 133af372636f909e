use async_trait::async_trait;

use crate::chat::ImageAttachment;
use crate::utils::Result;

/// Client-side view of the chatbot server's conversation API.
///
/// The controller only talks to the server through this trait, which keeps
/// the conversation logic testable without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Ask the server for a fresh conversation and return its id
    async fn start_conversation(&self) -> Result<String>;

    /// Reset the server-side history of an existing conversation
    async fn reset_conversation(&self, conversation_id: &str) -> Result<()>;

    /// Submit one user message (text and optional image) and return the
    /// bot's reply text
    async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> Result<String>;
}
