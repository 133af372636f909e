use std::sync::Arc;
use tokio::sync::Mutex;

use crate::app::UIConfig;
use crate::chat::{ChatController, Message};
use crate::constants::UI_DEFAULT_VIEWPORT_HEIGHT;

/// Which pane receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Sidebar,
}

/// What the input bar is currently collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal chat message
    Message,
    /// Path of an image to attach to the next message
    ImagePath,
}

/// Render-side copy of the controller state.
///
/// The controller lives behind a mutex that a network task may hold across
/// its await; rendering always works from the last snapshot instead of
/// blocking on the lock.
#[derive(Debug, Clone, Default)]
pub struct ViewSnapshot {
    pub transcript: Vec<Message>,
    pub conversation_ids: Vec<String>,
    pub active_id: Option<String>,
    pub sending: bool,
    pub pending_image: Option<String>,
}

/// Terminal UI state
pub struct TuiApp {
    /// Conversation state, shared with spawned network tasks
    pub controller: Arc<Mutex<ChatController>>,
    /// Last observed controller state, used for rendering
    pub snapshot: ViewSnapshot,
    /// User input buffer
    pub input: String,
    pub mode: InputMode,
    pub focus: Focus,
    /// Cursor position in the sidebar conversation list
    pub selected: usize,
    /// Is the app running?
    pub running: bool,
    /// A network task is in flight; input affordances are disabled
    pub busy: bool,
    /// Scroll offset from the bottom of the chat view
    pub scroll_offset: u16,
    /// Show the conversation sidebar
    pub show_sidebar: bool,
    /// Render bot replies as markdown
    pub render_markdown: bool,
    /// Status message
    pub status_message: Option<String>,
}

impl TuiApp {
    pub fn new(controller: Arc<Mutex<ChatController>>, ui: &UIConfig) -> Self {
        Self {
            controller,
            snapshot: ViewSnapshot::default(),
            input: String::new(),
            mode: InputMode::Message,
            focus: Focus::Input,
            selected: 0,
            running: true,
            busy: false,
            scroll_offset: 0,
            show_sidebar: ui.show_sidebar,
            render_markdown: ui.render_markdown,
            status_message: None,
        }
    }

    /// Refresh the render snapshot if the controller lock is free.
    /// While a task holds the lock the previous snapshot stays on screen.
    pub fn refresh_snapshot(&mut self) {
        if let Ok(controller) = self.controller.try_lock() {
            self.snapshot = ViewSnapshot {
                transcript: controller.transcript().to_vec(),
                conversation_ids: controller.conversation_ids(),
                active_id: controller.active_id().map(|id| id.to_string()),
                sending: controller.is_sending(),
                pending_image: controller.pending_image_name().map(|n| n.to_string()),
            };
        }
        self.clamp_selection();
    }

    /// Conversation id under the sidebar cursor
    pub fn selected_conversation(&self) -> Option<&str> {
        self.snapshot
            .conversation_ids
            .get(self.selected)
            .map(|id| id.as_str())
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        self.selected += 1;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let count = self.snapshot.conversation_ids.len();
        if count == 0 {
            self.selected = 0;
        } else if self.selected >= count {
            self.selected = count - 1;
        }
    }

    /// Clear the input buffer
    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Toggle sidebar visibility
    pub fn toggle_sidebar(&mut self) {
        self.show_sidebar = !self.show_sidebar;
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Scroll chat view up, clamped to the rendered line count
    pub fn scroll_up(&mut self, amount: u16) {
        let mut total_lines = 0u16;
        for msg in &self.snapshot.transcript {
            // Sender line, content lines, image line, separator
            total_lines += 1;
            total_lines += msg.text().lines().count() as u16;
            if msg.image.is_some() {
                total_lines += 1;
            }
            total_lines += 1;
        }
        if self.snapshot.sending {
            total_lines += 1;
        }

        let max_scroll = total_lines.saturating_sub(UI_DEFAULT_VIEWPORT_HEIGHT);
        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(max_scroll);
    }

    /// Scroll chat view down
    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    /// Jump back to the live end of the transcript
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }
}
