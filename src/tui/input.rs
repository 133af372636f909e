use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::Focus;

/// What a key press asks the application to do
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Submit,
    Insert(char),
    Delete,
    Cancel,
    Quit,
    NewConversation,
    ResetConversation,
    AttachImage,
    ToggleSidebar,
    SwitchFocus,
    SelectPrev,
    SelectNext,
    SelectConversation,
    DeleteConversation,
    ScrollUp,
    ScrollDown,
    None,
}

/// Map a key event to an action, depending on which pane has focus
pub fn handle_key(key: KeyEvent, focus: Focus) -> InputAction {
    // Global shortcuts work regardless of focus
    if key.modifiers == KeyModifiers::CONTROL {
        return match key.code {
            KeyCode::Char('c') => InputAction::Quit,
            KeyCode::Char('n') => InputAction::NewConversation,
            KeyCode::Char('r') => InputAction::ResetConversation,
            KeyCode::Char('o') => InputAction::AttachImage,
            KeyCode::Char('b') => InputAction::ToggleSidebar,
            _ => InputAction::None,
        };
    }

    match key.code {
        KeyCode::Tab => InputAction::SwitchFocus,
        KeyCode::PageUp => InputAction::ScrollUp,
        KeyCode::PageDown => InputAction::ScrollDown,
        KeyCode::Esc => InputAction::Cancel,
        _ => match focus {
            Focus::Input => match key.code {
                KeyCode::Enter => InputAction::Submit,
                KeyCode::Char(c) => InputAction::Insert(c),
                KeyCode::Backspace => InputAction::Delete,
                _ => InputAction::None,
            },
            Focus::Sidebar => match key.code {
                KeyCode::Up => InputAction::SelectPrev,
                KeyCode::Down => InputAction::SelectNext,
                KeyCode::Enter => InputAction::SelectConversation,
                KeyCode::Char('d') | KeyCode::Delete => InputAction::DeleteConversation,
                KeyCode::Char('q') => InputAction::Quit,
                _ => InputAction::None,
            },
        },
    }
}
