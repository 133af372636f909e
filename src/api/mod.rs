// Gateway module for the chatbot server API
// All external access must go through this gateway

mod http;
mod traits;
mod types;

pub use http::HttpChatApi;
pub use traits::ChatApi;

#[cfg(test)]
pub use traits::MockChatApi;
