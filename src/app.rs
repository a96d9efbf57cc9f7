use std::path::PathBuf;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};
use webbrowser::Browser;

use crate::coach::{Coach, CoachError, Phase};
use crate::input::TextInput;

/// Where to get a key for the default endpoint
pub const KEY_SIGNUP_URL: &str = "https://aistudio.google.com/app/apikey";

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    PromptDetails,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Everything the UI needs: the coach plus the text fields and view state around it
pub struct App {
    pub coach: Coach,
    pub export_dir: PathBuf,
    pub passcode: TextInput,
    pub api_key: TextInput,
    pub draft: TextInput,
    pub reflection: TextInput,
    pub reveal_key: bool,
    pub overlay: Overlay,
    pub status: Option<Status>,
    pub scroll: u16,
    pub spinner_frame: usize,
    pub last_export: Option<PathBuf>,
    seen_phase: Phase,
}

impl App {
    pub fn new(coach: Coach, export_dir: PathBuf) -> Self {
        let seen_phase = coach.phase();
        Self {
            coach,
            export_dir,
            passcode: TextInput::single_line(),
            api_key: TextInput::single_line(),
            draft: TextInput::multi_line(),
            reflection: TextInput::single_line(),
            reveal_key: false,
            overlay: Overlay::None,
            status: None,
            scroll: 0,
            spinner_frame: 0,
            last_export: None,
            seen_phase,
        }
    }

    pub fn phase(&self) -> Phase {
        self.coach.phase()
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER[self.spinner_frame % SPINNER.len()]
    }

    /// Advance animations and settle any finished generator call
    pub fn on_tick(&mut self) {
        if self.coach.is_busy() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
        if self.coach.poll() {
            self.after_action();
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.overlay != Overlay::None {
            return;
        }
        if let Some(field) = self.active_field() {
            field.insert_str(text);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        if self.overlay != Overlay::None {
            self.handle_overlay_key(key);
            return Control::Continue;
        }

        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::F(1) => {
                if self.coach.prompt().is_some() {
                    self.open_overlay(Overlay::PromptDetails);
                }
                return Control::Continue;
            }
            KeyCode::F(2) => {
                if !self.coach.essay().reviews().is_empty() {
                    self.open_overlay(Overlay::History);
                }
                return Control::Continue;
            }
            _ => {}
        }

        match self.phase() {
            Phase::AccessControl => self.on_access_key(key),
            Phase::Welcome => {
                if key.code == KeyCode::Enter {
                    let result = self.coach.start_session();
                    self.report(result);
                }
            }
            Phase::ApiKeyEntry => self.on_api_key_key(key),
            Phase::GeneratingPrompt => {}
            Phase::ReadingPrompt => match key.code {
                KeyCode::Enter => {
                    let result = self.coach.begin_writing();
                    self.report(result);
                }
                _ => self.on_scroll_key(key),
            },
            Phase::Writing => self.on_writing_key(key),
            Phase::ReviewingParagraph => match key.code {
                KeyCode::Enter | KeyCode::Right => {
                    let result = self.coach.advance();
                    self.report(result);
                }
                _ => self.on_scroll_key(key),
            },
            Phase::GenerationFailed => match key.code {
                KeyCode::Char('r') | KeyCode::Enter => {
                    let result = self.coach.retry();
                    self.report(result);
                }
                KeyCode::Char('d') | KeyCode::Backspace => {
                    let result = self.coach.dismiss_failure();
                    self.report(result);
                }
                _ => {}
            },
            Phase::Completed => self.on_completed_key(key),
        }

        Control::Continue
    }

    fn open_overlay(&mut self, overlay: Overlay) {
        self.overlay = overlay;
        self.scroll = 0;
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::F(1) | KeyCode::F(2) => {
                self.overlay = Overlay::None;
                self.scroll = 0;
            }
            _ => self.on_scroll_key(key),
        }
    }

    fn on_scroll_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
    }

    fn on_access_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            let attempt = self.passcode.text().to_string();
            let result = self.coach.submit_passcode(&attempt);
            if result.is_err() {
                self.passcode.clear();
            }
            self.report(result);
        } else {
            edit_field(&mut self.passcode, key);
        }
    }

    fn on_api_key_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => {
                let entered = self.api_key.text().to_string();
                let result = self.coach.submit_api_key(&entered);
                if result.is_ok() {
                    self.api_key.clear();
                }
                self.report(result);
            }
            KeyCode::Tab => self.reveal_key = !self.reveal_key,
            KeyCode::Char('b') if ctrl => self.leave_key_entry(),
            KeyCode::Backspace if self.api_key.is_empty() => self.leave_key_entry(),
            KeyCode::Char('o') if ctrl => self.open_signup_page(),
            _ => edit_field(&mut self.api_key, key),
        }
    }

    fn leave_key_entry(&mut self) {
        self.api_key.clear();
        self.reveal_key = false;
        let result = self.coach.leave_key_entry();
        self.report(result);
    }

    fn open_signup_page(&mut self) {
        if Browser::is_available() && webbrowser::open(KEY_SIGNUP_URL).is_ok() {
            self.status = Some(Status::Info("opened the key page in your browser".into()));
        } else {
            self.status = Some(Status::Info(format!("get a key at {KEY_SIGNUP_URL}")));
        }
    }

    fn on_writing_key(&mut self, key: KeyEvent) {
        // the draft is frozen while its review is in flight
        if self.coach.is_busy() {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('s') if ctrl => self.submit_draft(),
            KeyCode::Enter if alt || ctrl => self.submit_draft(),
            KeyCode::Enter => self.draft.insert('\n'),
            _ => edit_field(&mut self.draft, key),
        }
    }

    fn submit_draft(&mut self) {
        let draft = self.draft.text().to_string();
        let result = self.coach.submit_paragraph(&draft);
        if result.is_ok() {
            self.status = Some(Status::Info("the coach is reading your paragraph".into()));
        } else {
            self.report(result);
        }
    }

    fn on_completed_key(&mut self, key: KeyEvent) {
        if self.coach.reflection().is_none() {
            if key.code == KeyCode::Enter {
                let text = self.reflection.text().to_string();
                let result = self.coach.set_reflection(&text);
                self.report(result);
            } else {
                edit_field(&mut self.reflection, key);
            }
            return;
        }

        match key.code {
            KeyCode::Char('s') => self.export(),
            KeyCode::Char('n') => {
                let result = self.coach.reset();
                self.report(result);
            }
            _ => self.on_scroll_key(key),
        }
    }

    fn export(&mut self) {
        let today = Local::now().date_naive();
        match self.coach.export(&self.export_dir, today) {
            Ok(path) => {
                self.status = Some(Status::Info(format!("saved {}", path.display())));
                self.last_export = Some(path);
            }
            Err(err) => {
                warn!(%err, "export failed");
                self.status = Some(Status::Error(err.to_string()));
            }
        }
    }

    /// The text field keystrokes go to in the current phase, if any
    fn active_field(&mut self) -> Option<&mut TextInput> {
        match self.coach.phase() {
            Phase::AccessControl => Some(&mut self.passcode),
            Phase::ApiKeyEntry => Some(&mut self.api_key),
            Phase::Writing if !self.coach.is_busy() => Some(&mut self.draft),
            Phase::Completed if self.coach.reflection().is_none() => Some(&mut self.reflection),
            _ => None,
        }
    }

    fn report(&mut self, result: Result<(), CoachError>) {
        match result {
            Ok(()) => {
                self.status = None;
                self.after_action();
            }
            Err(err) => {
                info!(%err, phase = %self.coach.phase(), "action refused");
                self.status = Some(Status::Error(err.to_string()));
            }
        }
    }

    /// Bring view state in line with a phase change
    fn after_action(&mut self) {
        let phase = self.coach.phase();
        if phase == self.seen_phase {
            return;
        }
        let left = self.seen_phase;
        self.seen_phase = phase;
        self.scroll = 0;
        self.overlay = Overlay::None;
        self.status = None;

        match phase {
            Phase::ReviewingParagraph => self.draft.clear(),
            Phase::Writing if left == Phase::GenerationFailed => {
                if let Some(draft) = self.coach.take_returned_draft() {
                    self.draft.set(&draft);
                }
            }
            Phase::Welcome if left == Phase::Completed => {
                self.draft.clear();
                self.reflection.clear();
                self.last_export = None;
            }
            _ => {}
        }
    }
}

fn edit_field(field: &mut TextInput, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char(c) if !ctrl => field.insert(c),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.move_left(),
        KeyCode::Right => field.move_right(),
        KeyCode::Home => field.move_home(),
        KeyCode::End => field.move_end(),
        _ => {}
    }
}
