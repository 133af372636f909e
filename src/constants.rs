/// Constants module to avoid magic numbers and strings in the codebase

// Network Configuration
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 120;

// API endpoint paths on the chatbot server
pub const START_CONVERSATION_PATH: &str = "/api/start_conversation";
pub const RESET_CONVERSATION_PATH: &str = "/api/reset_conversation";
pub const MESSAGE_PATH: &str = "/api/message";

// Fallback bot replies, shown when the real response cannot be obtained.
// The wording matches the chatbot service and is deliberately French.
pub const FALLBACK_REPLY_UNAVAILABLE: &str = "Désolé, je n'ai pas pu répondre.";
pub const FALLBACK_REPLY_CONNECTION: &str = "Erreur de connexion au serveur.";

// Attachments
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024; // 10 MB

// UI Configuration
pub const UI_REFRESH_INTERVAL_MS: u64 = 50;
pub const UI_SCROLL_LINES: u16 = 3;
pub const UI_DEFAULT_VIEWPORT_HEIGHT: u16 = 20;
