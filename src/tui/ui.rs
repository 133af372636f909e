use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use super::app::{Focus, InputMode, TuiApp};
use super::input::{handle_key, InputAction};
use super::render::{render_ui, short_id};
use crate::chat::ChatController;
use crate::constants::{UI_REFRESH_INTERVAL_MS, UI_SCROLL_LINES};

/// Signal from a spawned network task back to the UI loop
enum UiEvent {
    TaskDone,
}

/// Lifecycle calls that run on their own task
enum LifecycleOp {
    StartConversation,
    ResetConversation,
}

/// Run the terminal UI
pub async fn run_ui(mut app: TuiApp) -> Result<()> {
    // Check if we have an interactive terminal
    if !crossterm::tty::IsTty::is_tty(&io::stdout()) {
        eprintln!("Patou requires an interactive terminal.");
        eprintln!("For scripted use, try: patou --message \"...\"");
        return Err(anyhow::anyhow!("No interactive terminal available"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let (tx, mut rx) = mpsc::channel::<UiEvent>(16);

    // Open a first conversation right away so the user can type immediately
    app.busy = true;
    spawn_lifecycle(
        app.controller.clone(),
        tx.clone(),
        LifecycleOp::StartConversation,
    );

    let res = run_app(&mut terminal, &mut app, tx, &mut rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
    tx: mpsc::Sender<UiEvent>,
    rx: &mut mpsc::Receiver<UiEvent>,
) -> Result<()> {
    loop {
        // Collect finished network tasks before drawing
        while let Ok(UiEvent::TaskDone) = rx.try_recv() {
            app.busy = false;
        }

        app.refresh_snapshot();
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(std::time::Duration::from_millis(UI_REFRESH_INTERVAL_MS))? {
            if let Event::Key(key) = event::read()? {
                let action = handle_key(key, app.focus);
                apply_action(app, action, &tx);
            }
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}

/// Apply one mapped input action to the application
fn apply_action(app: &mut TuiApp, action: InputAction, tx: &mpsc::Sender<UiEvent>) {
    match action {
        InputAction::Quit => app.quit(),
        InputAction::SwitchFocus => {
            app.focus = match app.focus {
                Focus::Input => Focus::Sidebar,
                Focus::Sidebar => Focus::Input,
            };
        }
        InputAction::ToggleSidebar => app.toggle_sidebar(),
        InputAction::ScrollUp => app.scroll_up(UI_SCROLL_LINES),
        InputAction::ScrollDown => app.scroll_down(UI_SCROLL_LINES),
        InputAction::Cancel => {
            app.mode = InputMode::Message;
            app.clear_input();
            app.clear_status();
        }
        InputAction::Insert(c) => {
            if app.focus == Focus::Input {
                app.input.push(c);
            }
        }
        InputAction::Delete => {
            app.input.pop();
        }
        InputAction::SelectPrev => app.select_prev(),
        InputAction::SelectNext => app.select_next(),
        InputAction::NewConversation => {
            if !app.busy {
                app.busy = true;
                spawn_lifecycle(
                    app.controller.clone(),
                    tx.clone(),
                    LifecycleOp::StartConversation,
                );
            }
        }
        InputAction::ResetConversation => {
            if !app.busy {
                app.busy = true;
                spawn_lifecycle(
                    app.controller.clone(),
                    tx.clone(),
                    LifecycleOp::ResetConversation,
                );
            }
        }
        InputAction::AttachImage => {
            app.mode = InputMode::ImagePath;
            app.focus = Focus::Input;
            app.clear_input();
        }
        InputAction::SelectConversation => {
            if let Some(id) = app.selected_conversation().map(String::from) {
                if let Ok(mut controller) = app.controller.try_lock() {
                    controller.select_conversation(&id);
                }
                app.focus = Focus::Input;
                app.scroll_to_bottom();
            }
        }
        InputAction::DeleteConversation => {
            if let Some(id) = app.selected_conversation().map(String::from) {
                if let Ok(mut controller) = app.controller.try_lock() {
                    controller.delete_conversation(&id);
                }
                app.set_status(format!("Conversation supprimée ({})", short_id(&id)));
            }
        }
        InputAction::Submit => submit(app, tx),
        InputAction::None => {}
    }
}

/// Handle Enter in the input bar, for both input modes
fn submit(app: &mut TuiApp, tx: &mpsc::Sender<UiEvent>) {
    match app.mode {
        InputMode::ImagePath => {
            let path = app.input.trim().to_string();
            app.mode = InputMode::Message;
            app.clear_input();
            if path.is_empty() {
                return;
            }
            let attached = match app.controller.try_lock() {
                Ok(mut controller) => controller.attach_image(&path).map_err(|e| e.to_string()),
                Err(_) => Err("occupé, réessayez".to_string()),
            };
            match attached {
                Ok(()) => app.set_status(format!("Image jointe : {path}")),
                Err(err) => app.set_status(format!("Image refusée : {err}")),
            }
        }
        InputMode::Message => {
            if app.busy {
                app.set_status("Envoi en cours...");
                return;
            }
            let text = app.input.clone();
            let pending = match app.controller.try_lock() {
                Ok(mut controller) => controller.begin_send(&text),
                Err(_) => None,
            };
            let Some(pending) = pending else {
                return;
            };

            app.clear_input();
            app.clear_status();
            app.scroll_to_bottom();
            app.busy = true;

            let controller = app.controller.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = pending.resolve().await;
                controller.lock().await.finish_send(outcome);
                let _ = tx.send(UiEvent::TaskDone).await;
            });
        }
    }
}

/// Run a conversation lifecycle call on its own task, pinging the UI when done
fn spawn_lifecycle(
    controller: Arc<Mutex<ChatController>>,
    tx: mpsc::Sender<UiEvent>,
    op: LifecycleOp,
) {
    tokio::spawn(async move {
        {
            let mut controller = controller.lock().await;
            match op {
                LifecycleOp::StartConversation => controller.start_new_conversation().await,
                LifecycleOp::ResetConversation => controller.reset_conversation().await,
            }
        }
        let _ = tx.send(UiEvent::TaskDone).await;
    });
}
