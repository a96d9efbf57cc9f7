//! Terminal input and the UI clock, merged into one stream of [`CoachEvent`]s.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// What the main loop reacts to
#[derive(Clone, Debug)]
pub enum CoachEvent {
    Key(KeyEvent),
    Paste(String),
    Resize,
    /// no input arrived within one tick interval
    Tick,
}

pub trait CoachEventSource: Send + 'static {
    /// Next event, or `RecvTimeoutError::Timeout` once `timeout` passes quietly
    fn recv_timeout(&self, timeout: Duration) -> Result<CoachEvent, RecvTimeoutError>;
}

/// Events fed through a channel. Tests push scripted input into the sender.
pub struct ChannelEventSource {
    rx: Receiver<CoachEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<CoachEvent>) -> Self {
        Self { rx }
    }
}

impl CoachEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CoachEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Map a crossterm event to ours; focus, mouse and key releases are dropped
fn translate(event: CtEvent) -> Option<CoachEvent> {
    match event {
        CtEvent::Key(key) if key.kind != KeyEventKind::Release => Some(CoachEvent::Key(key)),
        CtEvent::Paste(text) => Some(CoachEvent::Paste(text)),
        CtEvent::Resize(_, _) => Some(CoachEvent::Resize),
        _ => None,
    }
}

/// Reads the real terminal on a background thread
pub struct CrosstermEventSource {
    inner: ChannelEventSource,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            while let Ok(raw) = event::read() {
                let Some(evt) = translate(raw) else {
                    continue;
                };
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        Self {
            inner: ChannelEventSource::new(rx),
        }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CoachEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CoachEvent, RecvTimeoutError> {
        self.inner.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Pulls one event at a time, standing in a `Tick` for silence
pub struct Runner<E: CoachEventSource, T: Ticker> {
    source: E,
    ticker: T,
}

impl<E: CoachEventSource, T: Ticker> Runner<E, T> {
    pub fn new(source: E, ticker: T) -> Self {
        Self { source, ticker }
    }

    /// Waits at most one tick interval. A closed source also reads as `Tick`.
    pub fn step(&self) -> CoachEvent {
        self.source
            .recv_timeout(self.ticker.interval())
            .unwrap_or(CoachEvent::Tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn runner(rx: Receiver<CoachEvent>) -> Runner<ChannelEventSource, FixedTicker> {
        Runner::new(
            ChannelEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(2)),
        )
    }

    #[test]
    fn quiet_source_ticks() {
        let (_tx, rx) = mpsc::channel();
        assert_matches!(runner(rx).step(), CoachEvent::Tick);
    }

    #[test]
    fn closed_source_ticks() {
        let (tx, rx) = mpsc::channel::<CoachEvent>();
        drop(tx);
        assert_matches!(runner(rx).step(), CoachEvent::Tick);
    }

    #[test]
    fn queued_events_come_out_in_order() {
        let (tx, rx) = mpsc::channel();
        tx.send(CoachEvent::Paste("first".into())).unwrap();
        tx.send(CoachEvent::Resize).unwrap();
        let runner = runner(rx);

        assert_matches!(runner.step(), CoachEvent::Paste(text) if text == "first");
        assert_matches!(runner.step(), CoachEvent::Resize);
        assert_matches!(runner.step(), CoachEvent::Tick);
    }

    #[test]
    fn key_releases_are_dropped() {
        let press = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
            ..press
        };
        assert_matches!(translate(CtEvent::Key(press)), Some(CoachEvent::Key(_)));
        assert!(translate(CtEvent::Key(release)).is_none());
        assert!(translate(CtEvent::FocusGained).is_none());
        assert_matches!(
            translate(CtEvent::Paste("x".into())),
            Some(CoachEvent::Paste(_))
        );
    }
}
