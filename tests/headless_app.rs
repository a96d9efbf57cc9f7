// Headless integration: drives the App with key events and renders every
// phase into a ratatui TestBackend, without a TTY.
mod common;

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use essay_coach::{
    app::{App, Control, Overlay, Status},
    generator::GeneratorError,
    runtime::{ChannelEventSource, CoachEvent, FixedTicker, Runner},
    ui, Phase,
};
use ratatui::{backend::TestBackend, Terminal};
use tempfile::tempdir;

use common::{coach, Scripted, WAIT};

fn press(app: &mut App, code: KeyCode) -> Control {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn ctrl(app: &mut App, c: char) -> Control {
    app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

/// Tick until the outstanding call settles
fn settle(app: &mut App) {
    let deadline = std::time::Instant::now() + WAIT;
    while app.coach.is_busy() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(2));
        app.on_tick();
    }
    app.on_tick();
    assert!(!app.coach.is_busy(), "generator call never settled");
}

fn screen_text(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
    terminal.draw(|f| ui::draw(app, f)).unwrap();
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|c| c.symbol())
        .collect()
}

fn new_app(generator: Arc<Scripted>, env_key: Option<&str>) -> App {
    App::new(coach(generator, env_key), std::env::temp_dir())
}

#[test]
fn full_session_through_the_keyboard() {
    let dir = tempdir().unwrap();
    let mut app = App::new(
        coach(Arc::new(Scripted::default()), None),
        dir.path().to_path_buf(),
    );
    assert!(screen_text(&mut app).contains("passcode"));

    type_text(&mut app, "wrong");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.phase(), Phase::AccessControl);
    assert_eq!(app.status, Some(Status::Error("incorrect passcode".into())));
    assert!(app.passcode.is_empty());

    type_text(&mut app, " Emma2025 ");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.phase(), Phase::Welcome);
    assert!(app.status.is_none());

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.phase(), Phase::ApiKeyEntry);
    type_text(&mut app, "sk-secret-1234");
    let masked = screen_text(&mut app);
    assert!(!masked.contains("sk-secret"));
    press(&mut app, KeyCode::Tab);
    assert!(screen_text(&mut app).contains("sk-secret-1234"));
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.phase(), Phase::GeneratingPrompt);
    assert!(app.api_key.is_empty());

    settle(&mut app);
    assert_eq!(app.phase(), Phase::ReadingPrompt);
    assert!(screen_text(&mut app).contains("The Lamp Left On"));

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.phase(), Phase::Writing);

    for n in 1..=5 {
        type_text(&mut app, "short");
        ctrl(&mut app, 's');
        assert_eq!(app.phase(), Phase::Writing);
        assert!(matches!(app.status, Some(Status::Error(_))));
        assert!(!app.coach.is_busy());

        type_text(&mut app, &format!(" but now paragraph {n} is long enough"));
        ctrl(&mut app, 's');
        settle(&mut app);
        assert_eq!(app.phase(), Phase::ReviewingParagraph);
        assert!(app.draft.is_empty());
        assert!(screen_text(&mut app).contains(&format!("refined {n}")));

        press(&mut app, KeyCode::Enter);
    }

    assert_eq!(app.phase(), Phase::Completed);
    assert_eq!(app.coach.essay().reviews().len(), 5);

    // export is only offered once a reflection is saved
    press(&mut app, KeyCode::Char('s'));
    assert!(app.last_export.is_none());
    assert_eq!(app.reflection.text(), "s");
    press(&mut app, KeyCode::Backspace);
    type_text(&mut app, "Plan before writing.");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.coach.reflection(), Some("Plan before writing."));

    press(&mut app, KeyCode::Char('s'));
    let exported = app.last_export.clone().expect("record was not saved");
    assert!(exported.starts_with(dir.path()));
    let record = std::fs::read_to_string(&exported).unwrap();
    assert!(record.contains("Plan before writing."));

    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.phase(), Phase::Welcome);
    assert!(app.reflection.is_empty());
    assert!(app.last_export.is_none());
    assert!(app.coach.credentials().has_user_key());
}

#[test]
fn overlays_open_and_close() {
    let mut app = new_app(Arc::new(Scripted::default()), Some("k"));
    type_text(&mut app, "emma2025");
    press(&mut app, KeyCode::Enter);

    // nothing to show yet
    press(&mut app, KeyCode::F(1));
    assert_eq!(app.overlay, Overlay::None);

    press(&mut app, KeyCode::Enter);
    settle(&mut app);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.phase(), Phase::Writing);

    press(&mut app, KeyCode::F(2));
    assert_eq!(app.overlay, Overlay::None, "no history before the first review");

    press(&mut app, KeyCode::F(1));
    assert_eq!(app.overlay, Overlay::PromptDetails);
    assert!(screen_text(&mut app).contains("Start from a concrete image."));

    // keys go to the overlay, not the draft
    type_text(&mut app, "abc");
    assert!(app.draft.is_empty());
    assert_eq!(press(&mut app, KeyCode::Esc), Control::Continue);
    assert_eq!(app.overlay, Overlay::None);

    type_text(&mut app, "A first paragraph that is long enough.");
    ctrl(&mut app, 's');
    settle(&mut app);
    press(&mut app, KeyCode::F(2));
    assert_eq!(app.overlay, Overlay::History);
    assert!(screen_text(&mut app).contains("critique 1"));
    press(&mut app, KeyCode::F(2));
    assert_eq!(app.overlay, Overlay::None);
}

#[test]
fn failed_review_can_be_dismissed_and_draft_restored() {
    let generator = Arc::new(Scripted::with_script(vec![
        None,
        Some(GeneratorError::EmptyResponse),
    ]));
    let mut app = new_app(generator, Some("k"));
    type_text(&mut app, "emma2025");
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Enter);
    settle(&mut app);
    press(&mut app, KeyCode::Enter);

    type_text(&mut app, "A paragraph the coach will choke on.");
    ctrl(&mut app, 's');
    settle(&mut app);
    assert_eq!(app.phase(), Phase::GenerationFailed);
    assert!(screen_text(&mut app).contains("Reviewing paragraph 1 failed."));

    press(&mut app, KeyCode::Char('d'));
    assert_eq!(app.phase(), Phase::Writing);
    assert_eq!(app.draft.text(), "A paragraph the coach will choke on.");

    ctrl(&mut app, 's');
    settle(&mut app);
    assert_eq!(app.phase(), Phase::ReviewingParagraph);
}

#[test]
fn paste_goes_into_the_active_field() {
    let mut app = new_app(Arc::new(Scripted::default()), Some("k"));
    app.handle_paste("emma2025\n");
    assert_eq!(app.passcode.text(), "emma2025 ");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.phase(), Phase::Welcome);

    // the welcome screen has no field
    app.handle_paste("ignored");
    assert!(app.passcode.text().starts_with("emma2025"));
}

#[test]
fn key_entry_goes_back_without_quitting() {
    let generator = Arc::new(Scripted::default());
    let mut app = new_app(generator.clone(), None);
    type_text(&mut app, "emma2025");
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.phase(), Phase::ApiKeyEntry);
    assert!(screen_text(&mut app).contains("(ctrl+b) back"));

    // backspace edits while there is text, then leaves on an empty field
    type_text(&mut app, "ab");
    press(&mut app, KeyCode::Backspace);
    assert_eq!(app.phase(), Phase::ApiKeyEntry);
    assert_eq!(app.api_key.text(), "a");
    press(&mut app, KeyCode::Backspace);
    assert_eq!(app.phase(), Phase::ApiKeyEntry);
    assert_eq!(press(&mut app, KeyCode::Backspace), Control::Continue);
    assert_eq!(app.phase(), Phase::Welcome);

    press(&mut app, KeyCode::Enter);
    type_text(&mut app, "half-typed");
    assert_eq!(ctrl(&mut app, 'b'), Control::Continue);
    assert_eq!(app.phase(), Phase::Welcome);
    assert!(app.api_key.is_empty());
    assert!(!app.coach.credentials().has_key());
    assert_eq!(generator.calls(), 0);
}

#[test]
fn count_ignores_trailing_blank_lines() {
    let mut app = new_app(Arc::new(Scripted::default()), Some("k"));
    type_text(&mut app, "emma2025");
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Enter);
    settle(&mut app);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.phase(), Phase::Writing);

    type_text(&mut app, "abc");
    for _ in 0..8 {
        press(&mut app, KeyCode::Enter);
    }
    assert_eq!(app.draft.char_count(), 11);
    assert!(screen_text(&mut app).contains("3 characters (at least 10 to submit)"));

    ctrl(&mut app, 's');
    assert_eq!(app.phase(), Phase::Writing);
    assert!(matches!(app.status, Some(Status::Error(_))));
}

#[test]
fn escape_and_ctrl_c_quit() {
    let mut app = new_app(Arc::new(Scripted::default()), None);
    assert_eq!(press(&mut app, KeyCode::Esc), Control::Quit);
    assert_eq!(ctrl(&mut app, 'c'), Control::Quit);
}

#[test]
fn runner_feeds_keys_into_the_app() {
    let (tx, rx) = mpsc::channel();
    for c in "EMMA2025".chars() {
        tx.send(CoachEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
            .unwrap();
    }
    tx.send(CoachEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
        .unwrap();

    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    let mut app = new_app(Arc::new(Scripted::default()), None);

    for _ in 0..50u32 {
        match runner.step() {
            CoachEvent::Key(key) => {
                app.handle_key(key);
            }
            CoachEvent::Paste(text) => app.handle_paste(&text),
            CoachEvent::Tick => app.on_tick(),
            CoachEvent::Resize => {}
        }
        if app.phase() == Phase::Welcome {
            break;
        }
    }

    assert_eq!(app.phase(), Phase::Welcome);
}

#[test]
fn every_phase_renders() {
    let generator = Arc::new(Scripted::with_script(vec![Some(GeneratorError::WorkerGone)]));
    let mut app = new_app(generator, Some("k"));
    assert!(screen_text(&mut app).contains("essay coach"));

    type_text(&mut app, "emma2025");
    press(&mut app, KeyCode::Enter);
    assert!(screen_text(&mut app).contains("(enter) begin"));

    press(&mut app, KeyCode::Enter);
    assert!(!screen_text(&mut app).trim().is_empty());
    settle(&mut app);
    assert_eq!(app.phase(), Phase::GenerationFailed);
    assert!(screen_text(&mut app).contains("Generating the exam prompt failed."));

    press(&mut app, KeyCode::Char('r'));
    settle(&mut app);
    assert_eq!(app.phase(), Phase::ReadingPrompt);
    assert!(screen_text(&mut app).contains("reading material"));

    press(&mut app, KeyCode::Enter);
    let writing = screen_text(&mut app);
    assert!(writing.contains("paragraph 1 of 5"));
    assert!(writing.contains("at least 10 to submit"));
}
