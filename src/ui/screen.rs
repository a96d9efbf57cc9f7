use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use webbrowser::Browser;

use super::{
    accent, bold, dim, draft_count_label, field_text, format_elapsed, heading, hint,
    truncate_to_width, HORIZONTAL_MARGIN, VERTICAL_MARGIN,
};
use crate::{
    app::App,
    coach::Phase,
    credential::mask_key,
    guide::{guide_for, PARAGRAPH_COUNT},
    inflight::Request,
    model::{draft_len, is_submittable},
};

/// A UI Screen boundary: renders one phase into `area`
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect);
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::AccessControl => Box::new(AccessScreen),
        Phase::Welcome => Box::new(WelcomeScreen),
        Phase::ApiKeyEntry => Box::new(ApiKeyScreen),
        Phase::GeneratingPrompt => Box::new(GeneratingScreen),
        Phase::ReadingPrompt => Box::new(ReadingScreen),
        Phase::Writing => Box::new(WritingScreen),
        Phase::ReviewingParagraph => Box::new(ReviewScreen),
        Phase::GenerationFailed => Box::new(FailureScreen),
        Phase::Completed => Box::new(CompletedScreen),
    }
}

fn padded(area: Rect) -> Rect {
    Layout::default()
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(0)])
        .split(area)[0]
}

fn titled(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(format!(" {title} "), heading()))
}

fn legend(text: &str) -> Paragraph<'static> {
    Paragraph::new(Span::styled(text.to_string(), hint()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

/// Vertically centered box of `height` rows for the small form screens
fn form_area(area: Rect, height: u16) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(15),
            Constraint::Percentage(70),
            Constraint::Percentage(15),
        ])
        .split(rows[1])[1]
}

pub struct AccessScreen;

impl Screen for AccessScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let form = form_area(area, 9);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .split(form);

        let title = Paragraph::new(Span::styled("essay coach", heading()))
            .alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        let explain = Paragraph::new("This coach is locked. Enter the passcode you were given.")
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(explain, chunks[1]);

        let field = Paragraph::new(field_text(&app.passcode, false)).block(titled("passcode"));
        f.render_widget(field, chunks[2]);

        f.render_widget(legend("(enter) unlock / (esc)ape"), chunks[3]);
    }
}

pub struct WelcomeScreen;

impl Screen for WelcomeScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let form = form_area(area, 16);
        let key_line = match app.coach.credentials().effective_key() {
            Some(key) => Line::from(Span::styled(format!("API key {}", mask_key(key)), dim())),
            None => Line::from(Span::styled(
                "no API key yet; you will be asked for one",
                dim(),
            )),
        };

        let lines = vec![
            Line::from(Span::styled("essay coach", heading())),
            Line::from(""),
            Line::from(
                "Practise the long-form essay section of the exam: a fresh prompt, \
                 a five-paragraph structure to follow, and a coach that critiques \
                 and polishes every paragraph you write.",
            ),
            Line::from(""),
            Line::from(Span::styled("  * suggested time: 50 minutes", accent())),
            Line::from(Span::styled("  * prompts modelled on recent exam papers", accent())),
            Line::from(Span::styled("  * instant critique and a refined rewrite", accent())),
            Line::from(Span::styled("  * a closing reflection to keep what you learned", accent())),
            Line::from(""),
            key_line,
            Line::from(""),
            Line::from(Span::styled("(enter) begin / (esc)ape", hint())),
        ];

        let welcome = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(welcome, form);
    }
}

pub struct ApiKeyScreen;

impl Screen for ApiKeyScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let form = form_area(area, 11);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .split(form);

        let title = Paragraph::new(Span::styled("API key", heading())).alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        let explain = Paragraph::new(
            "Enter your own API key for the language model service. \
             It stays in memory for this run only and is never written to disk.",
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(explain, chunks[1]);

        let field = Paragraph::new(field_text(&app.api_key, !app.reveal_key)).block(titled("key"));
        f.render_widget(field, chunks[2]);

        let keys = if Browser::is_available() {
            "(enter) confirm / (tab) show or hide / (ctrl+b) back / (ctrl+o) get a key / (esc)ape"
        } else {
            "(enter) confirm / (tab) show or hide / (ctrl+b) back / (esc)ape"
        };
        f.render_widget(legend(keys), chunks[3]);
    }
}

pub struct GeneratingScreen;

impl Screen for GeneratingScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let form = form_area(area, 3);
        let elapsed = app
            .coach
            .pending_for()
            .map(format_elapsed)
            .unwrap_or_default();
        let lines = vec![
            Line::from(Span::styled(
                format!("{} drafting a fresh exam prompt", app.spinner()),
                bold(),
            )),
            Line::from(""),
            Line::from(Span::styled(elapsed, dim())),
        ];
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), form);
    }
}

pub struct ReadingScreen;

impl Screen for ReadingScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let Some(prompt) = app.coach.prompt() else {
            return;
        };
        let area = padded(area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(5),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(prompt.title.clone(), heading()))
            .alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        let material = Paragraph::new(prompt.material.clone())
            .block(titled("reading material"))
            .wrap(Wrap { trim: false })
            .scroll((app.scroll, 0));
        f.render_widget(material, chunks[1]);

        let task = Paragraph::new(vec![
            Line::from(prompt.question.clone()),
            Line::from(Span::styled(format!("hint: {}", prompt.guidance), dim())),
        ])
        .block(titled("writing task"))
        .wrap(Wrap { trim: true });
        f.render_widget(task, chunks[2]);

        f.render_widget(
            legend("(enter) start writing / (up/down) scroll / (esc)ape"),
            chunks[3],
        );
    }
}

pub struct WritingScreen;

impl Screen for WritingScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let essay = app.coach.essay();
        let index = essay.current_index();
        let area = padded(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);

        let mut guide_lines = vec![Line::from(Span::styled(
            format!("paragraph {} of {PARAGRAPH_COUNT}", index + 1),
            dim(),
        ))];
        if let Some(guide) = guide_for(index) {
            guide_lines.push(Line::from(Span::styled(guide.title, bold())));
            guide_lines.push(Line::from(""));
            guide_lines.push(Line::from(guide.description));
            guide_lines.push(Line::from(""));
            guide_lines.push(Line::from(vec![
                Span::styled("goal: ", accent()),
                Span::raw(guide.goal),
            ]));
        }
        if !essay.reviews().is_empty() {
            guide_lines.push(Line::from(""));
            guide_lines.push(Line::from(Span::styled("written so far", bold())));
            for (i, review) in essay.reviews().iter().enumerate() {
                let preview = truncate_to_width(&review.refined, 28);
                guide_lines.push(Line::from(Span::styled(
                    format!("{}. {preview}", i + 1),
                    dim(),
                )));
            }
        }
        let guide = Paragraph::new(guide_lines)
            .block(titled("guide"))
            .wrap(Wrap { trim: true });
        f.render_widget(guide, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(columns[1]);

        let busy = app.coach.is_busy();
        let draft_text = if busy {
            Text::styled(app.draft.text().to_string(), dim())
        } else {
            field_text(&app.draft, false)
        };
        let editor = Paragraph::new(draft_text)
            .block(titled("your draft"))
            .wrap(Wrap { trim: false });
        f.render_widget(editor, right[0]);

        let count_style = if is_submittable(app.draft.text()) {
            Style::default().fg(Color::Green)
        } else {
            dim()
        };
        let status_line = if busy {
            let waited = app.coach.pending_for().map(format_elapsed).unwrap_or_default();
            Line::from(Span::styled(
                format!("{} the coach is analysing your paragraph {waited}", app.spinner()),
                accent(),
            ))
        } else {
            let label = draft_count_label(draft_len(app.draft.text()));
            Line::from(Span::styled(label, count_style))
        };
        f.render_widget(Paragraph::new(status_line), right[1]);

        let keys = if essay.reviews().is_empty() {
            "(ctrl+s) submit / (enter) new line / (f1) prompt / (esc)ape"
        } else {
            "(ctrl+s) submit / (enter) new line / (f1) prompt / (f2) history / (esc)ape"
        };
        f.render_widget(legend(keys), right[2]);
    }
}

pub struct ReviewScreen;

impl Screen for ReviewScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let essay = app.coach.essay();
        let Some(review) = essay.latest_review() else {
            return;
        };
        let area = padded(area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let title = guide_for(essay.current_index())
            .map(|g| g.title)
            .unwrap_or("paragraph");
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(title, heading()),
                Span::styled(format!("   {} words", review.word_count), dim()),
            ])),
            rows[0],
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(columns[0]);

        let original = Paragraph::new(Text::styled(review.original.clone(), dim()))
            .block(titled("your draft"))
            .wrap(Wrap { trim: false });
        f.render_widget(original, left[0]);

        let critique = Paragraph::new(review.critique.clone())
            .block(titled("coach's critique"))
            .wrap(Wrap { trim: false })
            .scroll((app.scroll, 0));
        f.render_widget(critique, left[1]);

        let refined = Paragraph::new(Text::styled(
            review.refined.clone(),
            Style::default().fg(Color::Green),
        ))
        .block(titled("refined version"))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
        f.render_widget(refined, columns[1]);

        let keys = if essay.is_last_paragraph() {
            "(enter) finish the essay / (up/down) scroll / (f1) prompt / (f2) history / (esc)ape"
        } else {
            "(enter) next paragraph / (up/down) scroll / (f1) prompt / (f2) history / (esc)ape"
        };
        f.render_widget(legend(keys), rows[2]);
    }
}

pub struct FailureScreen;

impl Screen for FailureScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let form = form_area(area, 9);
        let (what, error) = match app.coach.failure() {
            Some(failure) => {
                let what = match &failure.request {
                    Request::Prompt => "Generating the exam prompt failed.".to_string(),
                    Request::Review { index, .. } => {
                        format!("Reviewing paragraph {} failed.", index + 1)
                    }
                };
                (what, failure.error.to_string())
            }
            None => ("The last request failed.".to_string(), String::new()),
        };

        let lines = vec![
            Line::from(Span::styled("something went wrong", heading().fg(Color::Red))),
            Line::from(""),
            Line::from(what),
            Line::from(Span::styled(error, dim())),
            Line::from(""),
            Line::from("Your work so far is safe. Try again, or step back and continue."),
            Line::from(""),
            Line::from(Span::styled("(r)etry / (d)ismiss / (esc)ape", hint())),
        ];
        let body = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(body, form);
    }
}

pub struct CompletedScreen;

impl Screen for CompletedScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        let essay = app.coach.essay();
        let area = padded(area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        let title = app
            .coach
            .prompt()
            .map(|p| format!("essay complete: {}", p.title))
            .unwrap_or_else(|| "essay complete".to_string());
        f.render_widget(
            Paragraph::new(Span::styled(title, heading())).alignment(Alignment::Center),
            rows[0],
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let original = Paragraph::new(join_paragraphs(essay.drafts().iter().map(String::as_str)))
            .block(titled("your drafts"))
            .wrap(Wrap { trim: false })
            .scroll((app.scroll, 0));
        f.render_widget(original, columns[0]);

        let refined = Paragraph::new(join_paragraphs(essay.refined_essay().into_iter()))
            .style(Style::default().fg(Color::Green))
            .block(titled("refined essay"))
            .wrap(Wrap { trim: false })
            .scroll((app.scroll, 0));
        f.render_widget(refined, columns[1]);

        let keys = match app.coach.reflection() {
            None => {
                let field = Paragraph::new(field_text(&app.reflection, false))
                    .block(titled("reflection: what will you do differently next time?"));
                f.render_widget(field, rows[2]);
                "(enter) save reflection / (esc)ape"
            }
            Some(reflection) => {
                let saved = Paragraph::new(reflection.to_string())
                    .block(titled("reflection"))
                    .wrap(Wrap { trim: true });
                f.render_widget(saved, rows[2]);
                "(s)ave practice record / (n)ew exercise / (up/down) scroll / (esc)ape"
            }
        };
        f.render_widget(legend(keys), rows[3]);
    }
}

fn join_paragraphs<'a>(paragraphs: impl Iterator<Item = &'a str>) -> Text<'static> {
    let mut lines = Vec::new();
    for paragraph in paragraphs {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(paragraph.lines().map(|l| Line::from(l.to_string())));
    }
    Text::from(lines)
}
