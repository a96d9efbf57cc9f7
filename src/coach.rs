//! The phase controller: every legal move through a guided-writing exercise.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::access::AccessGate;
use crate::credential::CredentialScope;
use crate::generator::{Generator, GeneratorError};
use crate::inflight::{CallResult, InFlight, Request, Response};
use crate::model::{is_submittable, ExamPrompt, MIN_DRAFT_CHARS};
use crate::session::EssaySession;
use crate::transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    AccessControl,
    Welcome,
    ApiKeyEntry,
    GeneratingPrompt,
    ReadingPrompt,
    Writing,
    ReviewingParagraph,
    Completed,
    GenerationFailed,
}

/// Errors emitted by [`Coach`]. None of them change state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoachError {
    #[error("not available in the {0} phase")]
    WrongPhase(Phase),
    #[error("incorrect passcode")]
    WrongPasscode,
    #[error("the API key cannot be blank")]
    BlankKey,
    #[error("no API key is available")]
    MissingKey,
    #[error("a draft needs at least {min} characters")]
    DraftTooShort { min: usize },
    #[error("the reflection cannot be blank")]
    BlankReflection,
    #[error("a request is already in progress")]
    Busy,
    #[error("no prompt has been generated")]
    NoPrompt,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A generator call that failed, kept so it can be retried
#[derive(Debug)]
pub struct Failure {
    pub request: Request,
    pub error: GeneratorError,
}

/// Drives one user through access, prompt generation, five reviewed
/// paragraphs and completion. Credentials outlive [`Coach::reset`]; the
/// prompt, drafts, reviews and reflection do not.
pub struct Coach {
    phase: Phase,
    gate: AccessGate,
    credentials: CredentialScope,
    generator: Arc<dyn Generator>,
    prompt: Option<Arc<ExamPrompt>>,
    essay: EssaySession,
    reflection: Option<String>,
    inflight: InFlight,
    failure: Option<Failure>,
    returned_draft: Option<String>,
}

impl Coach {
    pub fn new(
        generator: Arc<dyn Generator>,
        gate: AccessGate,
        credentials: CredentialScope,
    ) -> Self {
        Self {
            phase: Phase::AccessControl,
            gate,
            credentials,
            generator,
            prompt: None,
            essay: EssaySession::new(),
            reflection: None,
            inflight: InFlight::new(),
            failure: None,
            returned_draft: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn prompt(&self) -> Option<&ExamPrompt> {
        self.prompt.as_deref()
    }

    pub fn essay(&self) -> &EssaySession {
        &self.essay
    }

    pub fn reflection(&self) -> Option<&str> {
        self.reflection.as_deref()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn credentials(&self) -> &CredentialScope {
        &self.credentials
    }

    /// True while a generator call is outstanding
    pub fn is_busy(&self) -> bool {
        self.inflight.is_busy()
    }

    pub fn pending_request(&self) -> Option<&Request> {
        self.inflight.request()
    }

    pub fn pending_for(&self) -> Option<Duration> {
        self.inflight.elapsed()
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), CoachError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(CoachError::WrongPhase(self.phase))
        }
    }

    fn transition(&mut self, to: Phase) {
        debug!(from = %self.phase, %to, "phase transition");
        self.phase = to;
    }

    pub fn submit_passcode(&mut self, attempt: &str) -> Result<(), CoachError> {
        self.expect_phase(Phase::AccessControl)?;
        if !self.gate.check(attempt) {
            info!("passcode rejected");
            return Err(CoachError::WrongPasscode);
        }
        self.transition(Phase::Welcome);
        Ok(())
    }

    /// Begin an exercise. Asks for a key first if none is available.
    pub fn start_session(&mut self) -> Result<(), CoachError> {
        self.expect_phase(Phase::Welcome)?;
        if !self.credentials.has_key() {
            self.transition(Phase::ApiKeyEntry);
            return Ok(());
        }
        self.request_prompt()
    }

    pub fn submit_api_key(&mut self, key: &str) -> Result<(), CoachError> {
        self.expect_phase(Phase::ApiKeyEntry)?;
        if self.inflight.is_busy() {
            return Err(CoachError::Busy);
        }
        if !self.credentials.set_user_key(key) {
            return Err(CoachError::BlankKey);
        }
        info!("using user supplied API key");
        self.request_prompt()
    }

    /// Back out of key entry to the welcome screen without storing a key
    pub fn leave_key_entry(&mut self) -> Result<(), CoachError> {
        self.expect_phase(Phase::ApiKeyEntry)?;
        if self.inflight.is_busy() {
            return Err(CoachError::Busy);
        }
        self.transition(Phase::Welcome);
        Ok(())
    }

    fn request_prompt(&mut self) -> Result<(), CoachError> {
        let key = self
            .credentials
            .effective_key()
            .ok_or(CoachError::MissingKey)?
            .to_string();
        let generator = Arc::clone(&self.generator);

        let started = self.inflight.try_start(Request::Prompt, move || {
            generator.generate_prompt(&key).map(Response::Prompt)
        });
        if !started {
            return Err(CoachError::Busy);
        }

        info!("generating exam prompt");
        self.transition(Phase::GeneratingPrompt);
        Ok(())
    }

    pub fn begin_writing(&mut self) -> Result<(), CoachError> {
        self.expect_phase(Phase::ReadingPrompt)?;
        self.transition(Phase::Writing);
        Ok(())
    }

    /// Send the current paragraph's draft for review. The phase stays
    /// `Writing` until the review arrives through [`Coach::poll`].
    pub fn submit_paragraph(&mut self, draft: &str) -> Result<(), CoachError> {
        self.expect_phase(Phase::Writing)?;
        if self.inflight.is_busy() {
            return Err(CoachError::Busy);
        }
        if !is_submittable(draft) {
            return Err(CoachError::DraftTooShort {
                min: MIN_DRAFT_CHARS,
            });
        }
        if self.prompt.is_none() {
            return Err(CoachError::NoPrompt);
        }
        if !self.credentials.has_key() {
            return Err(CoachError::MissingKey);
        }

        let index = self.essay.current_index();
        self.request_review(index, draft.trim().to_string())
    }

    fn request_review(&mut self, index: usize, draft: String) -> Result<(), CoachError> {
        let prompt = self.prompt.clone().ok_or(CoachError::NoPrompt)?;
        let key = self
            .credentials
            .effective_key()
            .ok_or(CoachError::MissingKey)?
            .to_string();
        let generator = Arc::clone(&self.generator);
        let call_draft = draft.clone();

        let started = self
            .inflight
            .try_start(Request::Review { index, draft }, move || {
                generator
                    .review_paragraph(index, &call_draft, &prompt, &key)
                    .map(Response::Review)
            });
        if !started {
            return Err(CoachError::Busy);
        }

        info!(paragraph = index + 1, "submitted paragraph for review");
        self.transition(Phase::Writing);
        Ok(())
    }

    /// Settle a finished generator call, if any. Returns true when state changed.
    pub fn poll(&mut self) -> bool {
        match self.inflight.poll() {
            Some((request, result)) => {
                self.settle(request, result);
                true
            }
            None => false,
        }
    }

    /// Block up to `timeout` for the outstanding call to settle
    pub fn wait(&mut self, timeout: Duration) -> bool {
        match self.inflight.wait(timeout) {
            Some((request, result)) => {
                self.settle(request, result);
                true
            }
            None => false,
        }
    }

    fn settle(&mut self, request: Request, result: CallResult) {
        match (request, result) {
            (Request::Prompt, Ok(Response::Prompt(prompt))) => {
                self.prompt = Some(Arc::new(prompt));
                self.essay = EssaySession::new();
                self.reflection = None;
                self.transition(Phase::ReadingPrompt);
            }
            (Request::Review { index, draft }, Ok(Response::Review(review))) => {
                if index != self.essay.current_index() || !self.essay.accept(draft, review) {
                    warn!(paragraph = index + 1, "dropping review for a paragraph already reviewed");
                    return;
                }
                self.transition(Phase::ReviewingParagraph);
            }
            (request, Ok(_)) => {
                warn!(?request, "generator answered with the wrong kind of response");
                self.fail(request, GeneratorError::Incomplete("response"));
            }
            (request, Err(error)) => {
                warn!(?request, %error, "generator call failed");
                self.fail(request, error);
            }
        }
    }

    fn fail(&mut self, request: Request, error: GeneratorError) {
        self.failure = Some(Failure { request, error });
        self.transition(Phase::GenerationFailed);
    }

    /// Issue the failed request again
    pub fn retry(&mut self) -> Result<(), CoachError> {
        self.expect_phase(Phase::GenerationFailed)?;
        let Some(failure) = self.failure.take() else {
            return Err(CoachError::WrongPhase(self.phase));
        };

        let outcome = match failure.request.clone() {
            Request::Prompt => self.request_prompt(),
            Request::Review { index, draft } => self.request_review(index, draft),
        };
        if outcome.is_err() {
            self.failure = Some(failure);
        }
        outcome
    }

    /// Give up on the failed request. A failed prompt returns to the start
    /// (or to key entry when the key was the problem); a failed review returns
    /// to writing with the draft handed back.
    pub fn dismiss_failure(&mut self) -> Result<(), CoachError> {
        self.expect_phase(Phase::GenerationFailed)?;
        let Some(failure) = self.failure.take() else {
            return Err(CoachError::WrongPhase(self.phase));
        };

        match failure.request {
            Request::Prompt if failure.error.is_credential_problem() => {
                self.transition(Phase::ApiKeyEntry)
            }
            Request::Prompt => self.transition(Phase::Welcome),
            Request::Review { draft, .. } => {
                self.returned_draft = Some(draft);
                self.transition(Phase::Writing);
            }
        }
        Ok(())
    }

    /// Draft handed back after a dismissed review failure
    pub fn take_returned_draft(&mut self) -> Option<String> {
        self.returned_draft.take()
    }

    /// Move on from a reviewed paragraph: to the next one, or to completion after the fifth
    pub fn advance(&mut self) -> Result<(), CoachError> {
        self.expect_phase(Phase::ReviewingParagraph)?;
        if self.essay.advance() {
            self.transition(Phase::Writing);
        } else {
            info!(paragraphs = self.essay.completed_paragraphs(), "essay completed");
            self.transition(Phase::Completed);
        }
        Ok(())
    }

    pub fn set_reflection(&mut self, text: &str) -> Result<(), CoachError> {
        self.expect_phase(Phase::Completed)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(CoachError::BlankReflection);
        }
        self.reflection = Some(text.to_string());
        Ok(())
    }

    pub fn transcript(&self, date: NaiveDate) -> Result<String, CoachError> {
        let prompt = self.prompt.as_deref().ok_or(CoachError::NoPrompt)?;
        Ok(transcript::build_transcript(
            prompt,
            self.essay.reviews(),
            self.reflection.as_deref().unwrap_or_default(),
            date,
        ))
    }

    /// Write the practice record into `dir`
    pub fn export(&self, dir: &Path, date: NaiveDate) -> Result<PathBuf, CoachError> {
        self.expect_phase(Phase::Completed)?;
        let prompt = self.prompt.as_deref().ok_or(CoachError::NoPrompt)?;
        let path = transcript::write_transcript(
            dir,
            prompt,
            self.essay.reviews(),
            self.reflection.as_deref().unwrap_or_default(),
            date,
        )?;
        info!(path = %path.display(), "exported practice record");
        Ok(path)
    }

    /// Discard the finished exercise and return to the welcome screen. Keys are kept.
    pub fn reset(&mut self) -> Result<(), CoachError> {
        self.expect_phase(Phase::Completed)?;
        self.prompt = None;
        self.essay = EssaySession::new();
        self.reflection = None;
        self.failure = None;
        self.returned_draft = None;
        self.transition(Phase::Welcome);
        Ok(())
    }
}
