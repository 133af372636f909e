// Gateway module for the terminal UI

mod app;
mod input;
mod markdown;
mod render;
mod ui;

pub use app::{Focus, InputMode, TuiApp, ViewSnapshot};
pub use ui::run_ui;
