use serde::Deserialize;

// Response structures for the chatbot server's JSON bodies

#[derive(Debug, Deserialize)]
pub struct StartConversationResponse {
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub response: String,
}

/// Error body the server attaches to non-success statuses. Parsed on a
/// best-effort basis for log detail only.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}
