use std::collections::HashMap;

use super::message::Message;

/// In-memory map from conversation id to its ordered message list.
///
/// Ids are server-assigned. Insertion order is tracked separately so the
/// sidebar can list conversations in the order they were created. All state
/// is session-local and lost on exit.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, Vec<Message>>,
    order: Vec<String>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an empty conversation under `id`.
    ///
    /// Re-inserting an existing id keeps its messages and its position.
    pub fn insert_new(&mut self, id: &str) {
        if !self.conversations.contains_key(id) {
            self.conversations.insert(id.to_string(), Vec::new());
            self.order.push(id.to_string());
        }
    }

    /// Append a message to a conversation, materializing the entry if the
    /// id is not yet known (happens after selecting an unknown id).
    pub fn push(&mut self, id: &str, message: Message) {
        if !self.conversations.contains_key(id) {
            self.insert_new(id);
        }
        if let Some(messages) = self.conversations.get_mut(id) {
            messages.push(message);
        }
    }

    /// Clear a conversation's messages, keeping the entry. Returns false
    /// when the id is unknown.
    pub fn clear(&mut self, id: &str) -> bool {
        match self.conversations.get_mut(id) {
            Some(messages) => {
                messages.clear();
                true
            }
            None => false,
        }
    }

    /// Remove a conversation entirely. Returns false when the id is unknown.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.conversations.remove(id).is_some();
        self.order.retain(|known| known != id);
        removed
    }

    /// Messages stored under `id`, if any
    pub fn messages(&self, id: &str) -> Option<&[Message]> {
        self.conversations.get(id).map(|m| m.as_slice())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.conversations.contains_key(id)
    }

    /// Conversation ids in creation order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|id| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
