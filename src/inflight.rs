//! At most one outstanding generator call.
//!
//! A call runs on its own worker thread and reports back over a channel; the
//! UI thread polls the slot on every tick.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crate::generator::GeneratorError;
use crate::model::{ExamPrompt, ParagraphReview};

/// What was asked of the generator. Carries enough to issue the same call again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Prompt,
    Review { index: usize, draft: String },
}

#[derive(Debug)]
pub enum Response {
    Prompt(ExamPrompt),
    Review(ParagraphReview),
}

pub type CallResult = Result<Response, GeneratorError>;

/// Handle to a call running on a worker thread
#[derive(Debug)]
pub struct PendingCall<T> {
    rx: Receiver<Result<T, GeneratorError>>,
    started_at: Instant,
}

impl<T: Send + 'static> PendingCall<T> {
    pub fn spawn<F>(call: F) -> Self
    where
        F: FnOnce() -> Result<T, GeneratorError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // receiver may already be gone if the app quit mid-call
            let _ = tx.send(call());
        });
        Self {
            rx,
            started_at: Instant::now(),
        }
    }

    /// Non-blocking check for the result
    pub fn poll(&self) -> Option<Result<T, GeneratorError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(GeneratorError::WorkerGone)),
        }
    }

    /// Block for up to `timeout` waiting for the result
    pub fn wait(&self, timeout: Duration) -> Option<Result<T, GeneratorError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(GeneratorError::WorkerGone)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[derive(Debug)]
struct Outstanding {
    request: Request,
    call: PendingCall<Response>,
}

/// Single-slot guard around the one call a session may have in flight
#[derive(Debug, Default)]
pub struct InFlight {
    slot: Option<Outstanding>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_some()
    }

    pub fn request(&self) -> Option<&Request> {
        self.slot.as_ref().map(|o| &o.request)
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.slot.as_ref().map(|o| o.call.elapsed())
    }

    /// Start `call` unless another one is outstanding. Returns false, without
    /// running anything, when the slot is taken.
    pub fn try_start<F>(&mut self, request: Request, call: F) -> bool
    where
        F: FnOnce() -> CallResult + Send + 'static,
    {
        if self.is_busy() {
            return false;
        }
        self.slot = Some(Outstanding {
            request,
            call: PendingCall::spawn(call),
        });
        true
    }

    /// Frees the slot and hands back the request and its result once the call has finished
    pub fn poll(&mut self) -> Option<(Request, CallResult)> {
        let result = self.slot.as_ref()?.call.poll()?;
        self.slot.take().map(|o| (o.request, result))
    }

    /// Like [`InFlight::poll`] but blocks up to `timeout`
    pub fn wait(&mut self, timeout: Duration) -> Option<(Request, CallResult)> {
        let result = self.slot.as_ref()?.call.wait(timeout)?;
        self.slot.take().map(|o| (o.request, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::{Arc, Barrier};

    fn prompt() -> ExamPrompt {
        ExamPrompt {
            title: "t".into(),
            material: "m".into(),
            question: "q".into(),
            guidance: "g".into(),
        }
    }

    #[test]
    fn pending_call_delivers_result() {
        let call = PendingCall::spawn(|| Ok(42));
        assert_matches!(call.wait(Duration::from_secs(5)), Some(Ok(42)));
    }

    #[test]
    fn panicking_worker_reports_worker_gone() {
        let call: PendingCall<u32> = PendingCall::spawn(|| panic!("boom"));
        assert_matches!(
            call.wait(Duration::from_secs(5)),
            Some(Err(GeneratorError::WorkerGone))
        );
    }

    #[test]
    fn slot_refuses_second_call() {
        let gate = Arc::new(Barrier::new(2));
        let worker_gate = gate.clone();
        let mut inflight = InFlight::new();

        assert!(inflight.try_start(Request::Prompt, move || {
            worker_gate.wait();
            Ok(Response::Prompt(prompt()))
        }));
        assert!(inflight.is_busy());
        assert!(!inflight.try_start(Request::Prompt, || Ok(Response::Prompt(prompt()))));
        assert_eq!(inflight.request(), Some(&Request::Prompt));
        assert!(inflight.poll().is_none());

        gate.wait();
        let (request, result) = inflight.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(request, Request::Prompt);
        assert_matches!(result, Ok(Response::Prompt(_)));
        assert!(!inflight.is_busy());
    }

    #[test]
    fn empty_slot_polls_nothing() {
        let mut inflight = InFlight::new();
        assert!(inflight.poll().is_none());
        assert!(inflight.wait(Duration::from_millis(1)).is_none());
        assert!(inflight.elapsed().is_none());
    }
}
