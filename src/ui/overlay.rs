use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{accent, bold, centered_rect, dim, heading, hint};
use crate::{app::App, guide::guide_for};

fn modal_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(format!(" {title} "), heading()))
        .title_bottom(Span::styled(" (esc) close / (up/down) scroll ", hint()))
}

/// Prompt details: material, task and hint
pub fn render_prompt_details(app: &App, f: &mut Frame) {
    let Some(prompt) = app.coach.prompt() else {
        return;
    };
    let area = centered_rect(80, 80, f.area());

    let mut lines = vec![
        Line::from(Span::styled(prompt.title.clone(), bold())),
        Line::from(""),
    ];
    lines.extend(prompt.material.lines().map(|l| Line::from(l.to_string())));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("writing task", accent())));
    lines.push(Line::from(prompt.question.clone()));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(format!("hint: {}", prompt.guidance), dim())));

    let body = Paragraph::new(lines)
        .block(modal_block("prompt"))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    f.render_widget(Clear, area);
    f.render_widget(body, area);
}

/// Every reviewed paragraph so far, read-only
pub fn render_history(app: &App, f: &mut Frame) {
    let area = centered_rect(85, 85, f.area());
    let reviews = app.coach.essay().reviews();

    let mut lines = Vec::new();
    if reviews.is_empty() {
        lines.push(Line::from(Span::styled(
            "No paragraphs finished yet. Start writing!",
            dim(),
        )));
    }
    for (idx, review) in reviews.iter().enumerate() {
        let title = guide_for(idx)
            .map(|g| g.title.to_string())
            .unwrap_or_else(|| format!("Paragraph {}", idx + 1));
        if idx > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(title, bold())));
        lines.push(Line::from(Span::styled("draft", accent())));
        lines.extend(
            review
                .original
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), dim()))),
        );
        lines.push(Line::from(Span::styled("critique", accent())));
        lines.extend(review.critique.lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::from(Span::styled("refined", accent())));
        lines.extend(review.refined.lines().map(|l| {
            Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Green)))
        }));
    }

    let body = Paragraph::new(lines)
        .block(modal_block("history"))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    f.render_widget(Clear, area);
    f.render_widget(body, area);
}
