use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use essay_coach::{
    access::AccessGate,
    app::{App, Control},
    app_dirs::AppDirs,
    coach::Coach,
    config::{Config, ConfigStore, FileConfigStore},
    credential::CredentialScope,
    generator::ChatGenerator,
    logging,
    runtime::{CoachEvent, CoachEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    ui,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tracing::info;

const TICK_RATE_MS: u64 = 100;

/// guided essay-writing coach with paragraph-by-paragraph critique
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A guided essay-writing coach: generates an exam-style prompt, walks you through five structured paragraphs and has a language model critique and refine each one. Settings passed here are remembered; API keys never are."
)]
pub struct Cli {
    /// base URL of an OpenAI-compatible chat completions API
    #[clap(long)]
    base_url: Option<String>,

    /// model name to request
    #[clap(short = 'm', long)]
    model: Option<String>,

    /// seconds to wait for the generator before giving up
    #[clap(short = 't', long)]
    timeout_secs: Option<u64>,

    /// language the coach writes prompts and reviews in
    #[clap(short = 'l', long)]
    language: Option<String>,

    /// directory practice records are saved to
    #[clap(short = 'o', long)]
    export_dir: Option<PathBuf>,

    /// file to write logs to (defaults to the app state directory)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold explicit flags over the stored config
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(language) = &self.language {
            config.language = language.clone();
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = Some(dir.clone());
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    logging::init_file_logging(&log_path)?;

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    if let Err(err) = store.save(&config) {
        tracing::warn!(%err, path = %store.path().display(), "could not save config");
    }
    info!(model = %config.model, base_url = %config.base_url, "starting essay coach");

    let generator = ChatGenerator::new(config.chat_settings())?;
    let coach = Coach::new(
        Arc::new(generator),
        AccessGate::new(config.access_code.clone()),
        CredentialScope::from_env(),
    );
    let mut app = App::new(coach, config.resolved_export_dir());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    // restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    info!("essay coach exited");
    result
}

fn start_tui<B: Backend, E: CoachEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            CoachEvent::Tick => {
                let was_busy = app.coach.is_busy();
                app.on_tick();
                // keep the spinner moving and pick up finished calls
                if was_busy {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
            CoachEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            CoachEvent::Paste(text) => {
                app.handle_paste(&text);
                terminal.draw(|f| ui::draw(app, f))?;
            }
            CoachEvent::Key(key) => {
                if app.handle_key(key) == Control::Quit {
                    break;
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
        }
    }

    Ok(())
}
