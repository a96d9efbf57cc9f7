pub mod overlay;
pub mod screen;

use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::{
    app::{App, Overlay, Status},
    input::TextInput,
    model::MIN_DRAFT_CHARS,
};

pub const HORIZONTAL_MARGIN: u16 = 3;
pub const VERTICAL_MARGIN: u16 = 1;

pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn heading() -> Style {
    bold().fg(Color::Cyan)
}

pub fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub fn hint() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

pub fn accent() -> Style {
    Style::default().fg(Color::Yellow)
}

/// Render the whole frame: the phase's screen, any overlay, then the status line
pub fn draw(app: &mut App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    let screen = screen::current_screen(app.phase());
    screen.render(app, f, chunks[0]);

    match app.overlay {
        Overlay::None => {}
        Overlay::PromptDetails => overlay::render_prompt_details(app, f),
        Overlay::History => overlay::render_history(app, f),
    }

    if let Some(status) = &app.status {
        let (text, style) = match status {
            Status::Info(text) => (text.as_str(), Style::default().fg(Color::Green)),
            Status::Error(text) => (text.as_str(), bold().fg(Color::Red)),
        };
        let line = Paragraph::new(Span::styled(text.to_string(), style));
        f.render_widget(line, chunks[1]);
    }
}

/// Field contents with an underlined caret; masked fields show bullets
pub fn field_text(input: &TextInput, masked: bool) -> Text<'static> {
    let (before, after) = input.split_at_cursor();
    let (before, after) = if masked {
        (mask(before), mask(after))
    } else {
        (before.to_string(), after.to_string())
    };

    let caret_style = Style::default().add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
    let mut after_chars = after.chars();
    let (caret, rest) = match after_chars.next() {
        Some('\n') | None => (" ".to_string(), after.clone()),
        Some(c) => (c.to_string(), after_chars.as_str().to_string()),
    };

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut before_lines = before.split('\n').map(str::to_string).collect::<Vec<_>>();
    let current = before_lines.pop().unwrap_or_default();
    lines.extend(before_lines.into_iter().map(Line::from));

    let mut rest_lines = rest.split('\n').map(str::to_string);
    let tail = rest_lines.next().unwrap_or_default();
    lines.push(Line::from(vec![
        Span::raw(current),
        Span::styled(caret, caret_style),
        Span::raw(tail),
    ]));
    lines.extend(rest_lines.map(Line::from));

    Text::from(lines)
}

fn mask(s: &str) -> String {
    "•".repeat(s.chars().count())
}

/// "123 characters" with a reminder of the minimum until it is reached
pub fn draft_count_label(chars: usize) -> String {
    if chars < MIN_DRAFT_CHARS {
        format!("{chars} characters (at least {MIN_DRAFT_CHARS} to submit)")
    } else {
        format!("{chars} characters")
    }
}

/// Cut `s` to at most `max_width` terminal columns, marking the cut with "..."
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let first_line = s.lines().next().unwrap_or_default();
    let mut width = 0;
    let mut out = String::new();
    for c in first_line.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width {
            out.push_str("...");
            return out;
        }
        width += w;
        out.push(c);
    }
    if first_line.len() < s.trim_end().len() {
        out.push_str("...");
    }
    out
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

/// A rectangle of `percent_x` by `percent_y` centered in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
