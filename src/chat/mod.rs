// Gateway module for conversation state and dispatch
// All external access must go through this gateway

mod controller;
mod message;
mod store;

pub use controller::{ChatController, PendingSend, SendOutcome, SendStatus};
pub use message::{ImageAttachment, Message, Sender};
pub use store::ConversationStore;
