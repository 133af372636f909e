use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{Focus, InputMode, TuiApp};
use super::markdown::render_markdown;
use crate::chat::Sender;

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Main content
                Constraint::Length(3), // Input
                Constraint::Length(1), // Status bar
            ]
            .as_ref(),
        )
        .split(frame.area());

    render_header(frame, chunks[0], app);

    // Split main content area
    let content_chunks = if app.show_sidebar {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(40)].as_ref())
            .split(chunks[1])
    } else {
        std::rc::Rc::new([Rect::default(), chunks[1]])
    };

    if app.show_sidebar {
        render_sidebar(frame, content_chunks[0], app);
    }

    render_chat(frame, content_chunks[1], app);
    render_input(frame, chunks[2], app);
    render_status_bar(frame, chunks[3], app);
}

/// Render the header
fn render_header(frame: &mut Frame, area: Rect, app: &TuiApp) {
    let active = match &app.snapshot.active_id {
        Some(id) => short_id(id),
        None => "aucune conversation".to_string(),
    };

    let header_text = vec![Line::from(vec![
        Span::styled("🐾 ", Style::default().fg(Color::Cyan)),
        Span::styled(
            "Patou",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Conseiller animalier | "),
        Span::styled(active, Style::default().fg(Color::Green)),
    ])];

    let header = Paragraph::new(header_text)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(header, area);
}

/// Render the sidebar with the conversation list
fn render_sidebar(frame: &mut Frame, area: Rect, app: &TuiApp) {
    let mut items = Vec::new();

    for (idx, id) in app.snapshot.conversation_ids.iter().enumerate() {
        let is_active = app.snapshot.active_id.as_deref() == Some(id.as_str());
        let is_selected = app.focus == Focus::Sidebar && idx == app.selected;

        let mut style = Style::default().fg(Color::White);
        if is_active {
            style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
        }
        if is_selected {
            style = style.bg(Color::Rgb(50, 50, 70));
        }

        let marker = if is_active { "● " } else { "  " };
        items.push(ListItem::new(Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Green)),
            Span::styled(format!("Conversation {} ", idx + 1), style),
            Span::styled(short_id(id), Style::default().fg(Color::DarkGray)),
        ])));
    }

    if items.is_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            "Ctrl+N : nouvelle conversation",
            Style::default().fg(Color::DarkGray),
        ))));
    }

    let border_style = if app.focus == Focus::Sidebar {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let list = List::new(items).block(
        Block::default()
            .title("Conversations")
            .borders(Borders::ALL)
            .border_style(border_style),
    );

    frame.render_widget(list, area);
}

/// Render the chat transcript
fn render_chat(frame: &mut Frame, area: Rect, app: &TuiApp) {
    let mut lines: Vec<Line> = Vec::new();

    for msg in &app.snapshot.transcript {
        let (name, color) = match msg.sender {
            Sender::User => ("Vous", Color::Blue),
            Sender::Bot => ("Patou", Color::Green),
        };

        lines.push(Line::from(Span::styled(
            format!("[{}]", name),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));

        if msg.sender == Sender::Bot && app.render_markdown {
            lines.extend(render_markdown(msg.text()));
        } else {
            for line in msg.text().lines() {
                lines.push(Line::from(line.to_string()));
            }
        }

        if let Some(image) = &msg.image {
            lines.push(Line::from(Span::styled(
                format!("🖼  {}", image.file_name),
                Style::default().fg(Color::Magenta),
            )));
        }

        lines.push(Line::from(""));
    }

    if app.snapshot.sending {
        lines.push(Line::from(Span::styled(
            "Envoi...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    // Keep the view pinned to the bottom, offset by the user's scroll
    let viewport = area.height.saturating_sub(2);
    let total = lines.len() as u16;
    let top = total
        .saturating_sub(viewport)
        .saturating_sub(app.scroll_offset);

    let chat = Paragraph::new(lines)
        .block(
            Block::default()
                .title("Messages")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false })
        .scroll((top, 0));

    frame.render_widget(chat, area);
}

/// Render the input bar
fn render_input(frame: &mut Frame, area: Rect, app: &TuiApp) {
    let title = match app.mode {
        InputMode::Message => "Message (Entrée pour envoyer)",
        InputMode::ImagePath => "Chemin de l'image (Entrée pour joindre, Échap pour annuler)",
    };

    let mut spans = vec![Span::raw(app.input.as_str())];
    if app.focus == Focus::Input {
        spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
    }

    let mut line = Line::from(spans);
    if app.input.is_empty() && app.mode == InputMode::Message {
        line = Line::from(Span::styled(
            "Tapez votre message",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let border_style = if app.focus == Focus::Input {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input = Paragraph::new(line).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style),
    );

    frame.render_widget(input, area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &TuiApp) {
    let line = if let Some(status) = &app.status_message {
        Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        let mut spans = vec![Span::styled(
            "Ctrl+N nouvelle | Ctrl+R réinitialiser | Ctrl+O image | Tab panneau | Ctrl+C quitter",
            Style::default().fg(Color::DarkGray),
        )];
        if let Some(image) = &app.snapshot.pending_image {
            spans.push(Span::styled(
                format!("  🖼 {}", image),
                Style::default().fg(Color::Magenta),
            ));
        }
        if app.snapshot.sending || app.busy {
            spans.push(Span::styled(
                "  Envoi...",
                Style::default().fg(Color::Yellow),
            ));
        }
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// First chunk of a server-assigned uuid, enough to tell threads apart.
/// Counts chars, not bytes, so arbitrary id strings never split mid-char.
pub(super) fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}
