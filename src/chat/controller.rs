use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::message::{ImageAttachment, Message};
use super::store::ConversationStore;
use crate::api::ChatApi;
use crate::constants::{FALLBACK_REPLY_CONNECTION, FALLBACK_REPLY_UNAVAILABLE};
use crate::utils::Result;

/// Owns all conversation state and is the only mutation entry point for it.
///
/// The controller tracks the conversation store, the active conversation,
/// the visible transcript, and the image selected for the next send. It
/// talks to the server exclusively through the [`ChatApi`] seam, so the
/// whole thing runs under test with a mocked API and no UI attached.
pub struct ChatController {
    api: Arc<dyn ChatApi>,
    store: ConversationStore,
    active: Option<String>,
    transcript: Vec<Message>,
    pending_image: Option<ImageAttachment>,
    sending: bool,
}

/// How a send concluded, from the caller's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// Nothing to send: blank input with no image, or no active conversation
    Skipped,
    /// The server replied and the reply is in the transcript
    Replied,
    /// A fallback bot message was substituted for the reply
    Fallback,
}

/// What came back from the server for one dispatched message
#[derive(Debug)]
pub struct SendOutcome {
    conversation_id: String,
    reply: ReplyKind,
}

#[derive(Debug)]
enum ReplyKind {
    Text(String),
    /// The server answered with a non-success status
    Unavailable,
    /// The request never completed
    ConnectionLost,
}

/// An optimistically-applied user message waiting on its network round trip.
///
/// Produced by [`ChatController::begin_send`]; holds its own API handle so
/// the controller stays free (and renderable) while the request is in
/// flight. Resolving never touches controller state.
pub struct PendingSend {
    api: Arc<dyn ChatApi>,
    conversation_id: String,
    text: String,
    image: Option<ImageAttachment>,
}

impl PendingSend {
    /// Perform the network exchange and classify the result
    pub async fn resolve(self) -> SendOutcome {
        let reply = match self
            .api
            .send_message(&self.conversation_id, &self.text, self.image)
            .await
        {
            Ok(text) => ReplyKind::Text(text),
            Err(err) if err.is_api_reported() => {
                warn!("server could not answer: {err}");
                ReplyKind::Unavailable
            }
            Err(err) => {
                warn!("message could not be delivered: {err}");
                ReplyKind::ConnectionLost
            }
        };
        SendOutcome {
            conversation_id: self.conversation_id,
            reply,
        }
    }
}

impl ChatController {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            store: ConversationStore::new(),
            active: None,
            transcript: Vec::new(),
            pending_image: None,
            sending: false,
        }
    }

    // ---- Conversation lifecycle -------------------------------------------

    /// Ask the server for a new conversation, make it active and clear the
    /// transcript. On failure nothing changes locally; the error is logged
    /// and never shown as more than a missing conversation.
    pub async fn start_new_conversation(&mut self) {
        match self.api.start_conversation().await {
            Ok(id) => {
                debug!("started conversation {id}");
                self.store.insert_new(&id);
                self.active = Some(id);
                self.transcript.clear();
            }
            Err(err) => warn!("failed to start a new conversation: {err}"),
        }
    }

    /// Reset the active conversation's server-side history, then clear its
    /// local messages. No-op without an active conversation.
    ///
    /// On failure local messages are left untouched, even though the server
    /// may already have reset its side; the inconsistency is accepted and
    /// logged rather than repaired.
    pub async fn reset_conversation(&mut self) {
        let Some(id) = self.active.clone() else {
            return;
        };
        match self.api.reset_conversation(&id).await {
            Ok(()) => {
                self.store.clear(&id);
                self.transcript.clear();
            }
            Err(err) => warn!("failed to reset conversation {id}: {err}"),
        }
    }

    /// Make `id` the active conversation and show its stored messages.
    ///
    /// An unknown id is a defined fallback, not an error: the pointer moves
    /// and the transcript comes up empty. The store entry materializes when
    /// the first send targets it.
    pub fn select_conversation(&mut self, id: &str) {
        self.active = Some(id.to_string());
        self.transcript = self
            .store
            .messages(id)
            .map(|m| m.to_vec())
            .unwrap_or_default();
    }

    /// Remove `id` from the store. If it was active, the active pointer and
    /// the transcript are cleared too.
    pub fn delete_conversation(&mut self, id: &str) {
        self.store.remove(id);
        if self.active.as_deref() == Some(id) {
            self.active = None;
            self.transcript.clear();
        }
    }

    // ---- Message dispatch -------------------------------------------------

    /// Apply the optimistic half of a send and hand back the request to
    /// dispatch.
    ///
    /// Returns `None` when there is nothing to send (blank text with no
    /// pending image) or nowhere to send it (no active conversation). The
    /// pending image is consumed here, so it is cleared no matter how the
    /// exchange ends.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() && self.pending_image.is_none() {
            return None;
        }
        let Some(conversation_id) = self.active.clone() else {
            debug!("send ignored: no active conversation");
            return None;
        };

        let image = self.pending_image.take();
        let user_message = Message::user(text, image.clone());
        self.transcript.push(user_message.clone());
        self.store.push(&conversation_id, user_message);
        self.sending = true;

        Some(PendingSend {
            api: self.api.clone(),
            conversation_id,
            text: text.to_string(),
            image,
        })
    }

    /// Apply the outcome of a resolved send: append the bot reply (real or
    /// fallback) and leave the sending state. Runs on every exit path, so a
    /// dispatched message is never left without a paired response.
    pub fn finish_send(&mut self, outcome: SendOutcome) -> SendStatus {
        let (bot_text, status) = match outcome.reply {
            ReplyKind::Text(text) => (text, SendStatus::Replied),
            ReplyKind::Unavailable => (FALLBACK_REPLY_UNAVAILABLE.to_string(), SendStatus::Fallback),
            ReplyKind::ConnectionLost => {
                (FALLBACK_REPLY_CONNECTION.to_string(), SendStatus::Fallback)
            }
        };

        let bot_message = Message::bot(bot_text);
        self.store.push(&outcome.conversation_id, bot_message.clone());
        // The user may have switched or deleted the conversation mid-flight
        if self.active.as_deref() == Some(outcome.conversation_id.as_str()) {
            self.transcript.push(bot_message);
        }
        self.sending = false;
        status
    }

    /// One-call send used by tests and non-interactive mode
    pub async fn send_message(&mut self, text: &str) -> SendStatus {
        match self.begin_send(text) {
            Some(pending) => {
                let outcome = pending.resolve().await;
                self.finish_send(outcome)
            }
            None => SendStatus::Skipped,
        }
    }

    // ---- Pending image ----------------------------------------------------

    /// Load an image from disk and keep it for the next send
    pub fn attach_image(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let image = ImageAttachment::load(path)?;
        debug!("attached image {} ({} bytes)", image.file_name, image.len());
        self.pending_image = Some(image);
        Ok(())
    }

    pub fn clear_pending_image(&mut self) {
        self.pending_image = None;
    }

    pub fn pending_image_name(&self) -> Option<&str> {
        self.pending_image.as_ref().map(|i| i.file_name.as_str())
    }

    // ---- Read accessors ----------------------------------------------------

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn conversation_ids(&self) -> Vec<String> {
        self.store.ids().map(|id| id.to_string()).collect()
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockChatApi;
    use crate::chat::message::Sender;
    use crate::utils::PatouError;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    fn controller_with(api: MockChatApi) -> ChatController {
        ChatController::new(Arc::new(api))
    }

    /// Controller with one active conversation "c1" and no further
    /// expectations on the start endpoint
    async fn controller_with_active(mut api: MockChatApi) -> ChatController {
        api.expect_start_conversation()
            .times(1)
            .returning(|| Ok("c1".to_string()));
        let mut controller = controller_with(api);
        controller.start_new_conversation().await;
        controller
    }

    fn transcript_texts(controller: &ChatController) -> Vec<(Sender, String)> {
        controller
            .transcript()
            .iter()
            .map(|m| (m.sender, m.text().to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_start_new_conversation_activates_fresh_empty_thread() {
        let api = MockChatApi::new();
        let controller = controller_with_active(api).await;

        assert_eq!(controller.active_id(), Some("c1"));
        assert!(controller.transcript().is_empty());
        assert_eq!(controller.conversation_ids(), vec!["c1"]);
        assert_eq!(controller.store().messages("c1"), Some(&[][..]));
    }

    #[tokio::test]
    async fn test_start_new_conversation_failure_changes_nothing() {
        let mut api = MockChatApi::new();
        api.expect_start_conversation()
            .times(1)
            .returning(|| Err(PatouError::Api(500)));
        let mut controller = controller_with(api);

        controller.start_new_conversation().await;

        assert_eq!(controller.active_id(), None);
        assert!(controller.transcript().is_empty());
        assert!(controller.conversation_ids().is_empty());
    }

    #[tokio::test]
    async fn test_send_empty_without_image_is_noop() {
        // No expectation on send_message: any call would panic the mock
        let api = MockChatApi::new();
        let mut controller = controller_with_active(api).await;

        let status = controller.send_message("   ").await;

        assert_eq!(status, SendStatus::Skipped);
        assert!(controller.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_send_without_active_conversation_is_noop() {
        let api = MockChatApi::new();
        let mut controller = controller_with(api);

        let status = controller.send_message("bonjour").await;

        assert_eq!(status, SendStatus::Skipped);
        assert!(controller.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_send_success_appends_user_then_bot() {
        let mut api = MockChatApi::new();
        api.expect_send_message()
            .times(1)
            .withf(|id, text, image| id == "c1" && text == "hello" && image.is_none())
            .returning(|_, _, _| Ok("hi".to_string()));
        let mut controller = controller_with_active(api).await;

        let status = controller.send_message("hello").await;

        assert_eq!(status, SendStatus::Replied);
        assert_eq!(
            transcript_texts(&controller),
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::Bot, "hi".to_string()),
            ]
        );
        assert_eq!(controller.store().messages("c1").unwrap().len(), 2);
        assert!(!controller.is_sending());
    }

    #[tokio::test]
    async fn test_send_api_failure_appends_unavailable_fallback() {
        let mut api = MockChatApi::new();
        api.expect_send_message()
            .times(1)
            .returning(|_, _, _| Err(PatouError::Api(500)));
        let mut controller = controller_with_active(api).await;

        let status = controller.send_message("hello").await;

        assert_eq!(status, SendStatus::Fallback);
        assert_eq!(
            transcript_texts(&controller),
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::Bot, FALLBACK_REPLY_UNAVAILABLE.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_send_transport_failure_appends_connection_fallback() {
        let mut api = MockChatApi::new();
        api.expect_send_message().times(1).returning(|_, _, _| {
            Err(PatouError::Io(std::io::Error::other("connection refused")))
        });
        let mut controller = controller_with_active(api).await;

        let status = controller.send_message("hello").await;

        assert_eq!(status, SendStatus::Fallback);
        assert_eq!(
            controller.transcript().last().unwrap().text(),
            FALLBACK_REPLY_CONNECTION
        );
    }

    #[tokio::test]
    async fn test_optimistic_update_is_visible_while_in_flight() {
        let mut api = MockChatApi::new();
        api.expect_send_message()
            .times(1)
            .returning(|_, _, _| Ok("hi".to_string()));
        let mut controller = controller_with_active(api).await;

        let pending = controller.begin_send("hello").expect("send should start");

        // User message appears before the request resolves
        assert_eq!(controller.transcript().len(), 1);
        assert!(controller.is_sending());

        let outcome = pending.resolve().await;
        controller.finish_send(outcome);

        assert_eq!(controller.transcript().len(), 2);
        assert!(!controller.is_sending());
    }

    #[tokio::test]
    async fn test_pending_image_is_sent_and_consumed_even_on_failure() {
        let mut api = MockChatApi::new();
        api.expect_send_message()
            .times(1)
            .withf(|_, _, image| {
                image.as_ref().map(|i| i.file_name.as_str()) == Some("chien.png")
            })
            .returning(|_, _, _| Err(PatouError::Api(500)));
        let mut controller = controller_with_active(api).await;

        controller.pending_image = Some(ImageAttachment {
            file_name: "chien.png".to_string(),
            bytes: Bytes::from_static(b"png"),
        });

        controller.send_message("regarde").await;

        assert_eq!(controller.pending_image_name(), None);
        // The optimistic user message kept its image
        assert!(controller.transcript()[0].image.is_some());
    }

    #[tokio::test]
    async fn test_image_only_send_is_allowed() {
        let mut api = MockChatApi::new();
        api.expect_send_message()
            .times(1)
            .withf(|_, text, image| text.is_empty() && image.is_some())
            .returning(|_, _, _| Ok("quel beau chien".to_string()));
        let mut controller = controller_with_active(api).await;

        controller.pending_image = Some(ImageAttachment {
            file_name: "chien.png".to_string(),
            bytes: Bytes::from_static(b"png"),
        });

        let status = controller.send_message("").await;

        assert_eq!(status, SendStatus::Replied);
        assert_eq!(controller.transcript().len(), 2);
        assert_eq!(controller.transcript()[0].text, None);
    }

    #[tokio::test]
    async fn test_select_restores_stored_messages_exactly() {
        let mut api = MockChatApi::new();
        api.expect_start_conversation()
            .times(2)
            .returning({
                let mut next = 0;
                move || {
                    next += 1;
                    Ok(format!("c{next}"))
                }
            });
        api.expect_send_message()
            .times(1)
            .returning(|_, _, _| Ok("hi".to_string()));
        let mut controller = controller_with(api);

        controller.start_new_conversation().await;
        controller.send_message("hello").await;
        let stored = controller.transcript().to_vec();

        controller.start_new_conversation().await;
        assert!(controller.transcript().is_empty());

        controller.select_conversation("c1");

        assert_eq!(controller.active_id(), Some("c1"));
        assert_eq!(controller.transcript(), stored.as_slice());
    }

    #[tokio::test]
    async fn test_select_unknown_id_yields_empty_transcript() {
        let api = MockChatApi::new();
        let mut controller = controller_with_active(api).await;

        controller.select_conversation("ghost");

        assert_eq!(controller.active_id(), Some("ghost"));
        assert!(controller.transcript().is_empty());
        // No store entry until something is sent there
        assert!(!controller.store().contains("ghost"));
    }

    #[tokio::test]
    async fn test_delete_active_clears_pointer_and_transcript() {
        let mut api = MockChatApi::new();
        api.expect_send_message()
            .times(1)
            .returning(|_, _, _| Ok("hi".to_string()));
        let mut controller = controller_with_active(api).await;
        controller.send_message("hello").await;

        controller.delete_conversation("c1");

        assert_eq!(controller.active_id(), None);
        assert!(controller.transcript().is_empty());
        assert!(controller.conversation_ids().is_empty());
    }

    #[tokio::test]
    async fn test_delete_other_conversation_leaves_active_alone() {
        let mut api = MockChatApi::new();
        api.expect_start_conversation()
            .times(2)
            .returning({
                let mut next = 0;
                move || {
                    next += 1;
                    Ok(format!("c{next}"))
                }
            });
        api.expect_send_message()
            .times(1)
            .returning(|_, _, _| Ok("hi".to_string()));
        let mut controller = controller_with(api);

        controller.start_new_conversation().await;
        controller.start_new_conversation().await;
        controller.send_message("hello").await;

        controller.delete_conversation("c1");

        assert_eq!(controller.active_id(), Some("c2"));
        assert_eq!(controller.transcript().len(), 2);
        assert_eq!(controller.conversation_ids(), vec!["c2"]);
    }

    #[tokio::test]
    async fn test_reset_clears_local_messages_on_success() {
        let mut api = MockChatApi::new();
        api.expect_send_message()
            .times(1)
            .returning(|_, _, _| Ok("hi".to_string()));
        api.expect_reset_conversation()
            .times(1)
            .withf(|id| id == "c1")
            .returning(|_| Ok(()));
        let mut controller = controller_with_active(api).await;
        controller.send_message("hello").await;

        controller.reset_conversation().await;

        assert!(controller.transcript().is_empty());
        assert_eq!(controller.store().messages("c1"), Some(&[][..]));
        // The conversation itself survives a reset
        assert_eq!(controller.active_id(), Some("c1"));
    }

    #[tokio::test]
    async fn test_reset_failure_leaves_local_messages_unchanged() {
        let mut api = MockChatApi::new();
        api.expect_send_message()
            .times(1)
            .returning(|_, _, _| Ok("hi".to_string()));
        api.expect_reset_conversation()
            .times(1)
            .returning(|_| Err(PatouError::Api(404)));
        let mut controller = controller_with_active(api).await;
        controller.send_message("hello").await;

        controller.reset_conversation().await;

        assert_eq!(controller.transcript().len(), 2);
        assert_eq!(controller.store().messages("c1").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_without_active_conversation_is_noop() {
        let api = MockChatApi::new();
        let mut controller = controller_with(api);

        controller.reset_conversation().await;

        assert_eq!(controller.active_id(), None);
    }

    #[tokio::test]
    async fn test_reply_lands_in_store_when_user_switched_mid_flight() {
        let mut api = MockChatApi::new();
        api.expect_send_message()
            .times(1)
            .returning(|_, _, _| Ok("hi".to_string()));
        let mut controller = controller_with_active(api).await;

        let pending = controller.begin_send("hello").unwrap();
        controller.select_conversation("elsewhere");
        let outcome = pending.resolve().await;
        controller.finish_send(outcome);

        // Reply went to c1's history, not the visible transcript
        assert_eq!(controller.store().messages("c1").unwrap().len(), 2);
        assert!(controller.transcript().is_empty());
    }
}
