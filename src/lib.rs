pub mod api;
pub mod app;
pub mod chat;
pub mod cli;
pub mod constants;
pub mod tui;
pub mod utils;

pub use api::{ChatApi, HttpChatApi};
pub use app::{load_config, Config};
pub use chat::{ChatController, SendStatus};
pub use tui::run_ui;
pub use utils::PatouError;
