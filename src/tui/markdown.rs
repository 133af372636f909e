use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Render a bot reply's markdown into styled ratatui lines.
///
/// Supports the subset the chatbot actually produces: headings, emphasis,
/// inline and fenced code, bullet lists and blockquotes. Anything else
/// degrades to plain text.
pub fn render_markdown(input: &str) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut renderer = LineBuilder::default();
    for event in Parser::new_ext(input, options) {
        renderer.handle(event);
    }
    renderer.finish()
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    in_code_block: bool,
    list_depth: usize,
}

impl LineBuilder {
    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    for line in text.lines() {
                        self.lines.push(Line::from(Span::styled(
                            line.to_string(),
                            Style::default().fg(Color::Gray),
                        )));
                    }
                } else {
                    let style = self.style();
                    self.spans.push(Span::styled(text.to_string(), style));
                }
            }
            Event::Code(code) => {
                self.spans.push(Span::styled(
                    format!(" {} ", code),
                    Style::default().fg(Color::Yellow).bg(Color::Rgb(40, 40, 40)),
                ));
            }
            Event::SoftBreak | Event::HardBreak => self.flush(),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag) {
        let style = match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                let style = heading_style(level);
                self.spans.push(Span::styled("» ", style));
                style
            }
            Tag::Emphasis => self.style().add_modifier(Modifier::ITALIC),
            Tag::Strong => self.style().add_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.style().add_modifier(Modifier::CROSSED_OUT),
            Tag::CodeBlock(kind) => {
                self.flush();
                self.in_code_block = true;
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.lines.push(Line::from(vec![
                    Span::styled("```", Style::default().fg(Color::DarkGray)),
                    Span::styled(lang, Style::default().fg(Color::Magenta)),
                ]));
                Style::default().fg(Color::Gray)
            }
            Tag::List(_) => {
                self.flush();
                self.list_depth += 1;
                self.style()
            }
            Tag::Item => {
                let indent = "  ".repeat(self.list_depth.saturating_sub(1));
                self.spans.push(Span::raw(indent));
                self.spans
                    .push(Span::styled("• ", Style::default().fg(Color::Yellow)));
                self.style()
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.spans
                    .push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
            }
            _ => self.style(),
        };
        self.styles.push(style);
    }

    fn end(&mut self, tag: TagEnd) {
        self.styles.pop();
        match tag {
            TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::Item | TagEnd::BlockQuote(_) => {
                self.flush()
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.lines.push(Line::from(Span::styled(
                    "```",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            TagEnd::List(_) => {
                self.list_depth = self.list_depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        self.lines
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    let color = match level {
        HeadingLevel::H1 => Color::Cyan,
        HeadingLevel::H2 => Color::Blue,
        _ => Color::Green,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_plain_paragraph_is_one_line() {
        let lines = render_markdown("Donnez-lui de l'eau fraîche.");
        assert_eq!(rendered_text(&lines), vec!["Donnez-lui de l'eau fraîche."]);
    }

    #[test]
    fn test_list_items_get_bullets() {
        let lines = render_markdown("- croquettes\n- pâtée");
        let text = rendered_text(&lines);
        assert_eq!(text, vec!["• croquettes", "• pâtée"]);
    }

    #[test]
    fn test_code_block_is_fenced() {
        let lines = render_markdown("```\nmiaou\n```");
        let text = rendered_text(&lines);
        assert_eq!(text, vec!["```", "miaou", "```"]);
    }

    #[test]
    fn test_heading_gets_marker() {
        let lines = render_markdown("# Alimentation");
        assert_eq!(rendered_text(&lines), vec!["» Alimentation"]);
    }
}
