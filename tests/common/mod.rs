// Shared helpers for the integration tests: generators that answer
// instantly, fail on demand or block until released.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use essay_coach::{
    access::AccessGate,
    coach::Coach,
    credential::CredentialScope,
    generator::{Generator, GeneratorError},
    model::{ExamPrompt, ParagraphReview},
};

pub const WAIT: Duration = Duration::from_secs(5);

pub fn sample_prompt() -> ExamPrompt {
    ExamPrompt {
        title: "The Lamp Left On".into(),
        material: "Every night my grandmother left the porch lamp on.".into(),
        question: "Write about a small act that carries a large meaning.".into(),
        guidance: "Start from a concrete image.".into(),
    }
}

/// Answers every call at once. Each call consumes one script entry: `Some`
/// fails with that error, `None` (or an empty script) succeeds.
#[derive(Default)]
pub struct Scripted {
    pub calls: AtomicUsize,
    script: Mutex<VecDeque<Option<GeneratorError>>>,
}

impl Scripted {
    pub fn with_script(script: Vec<Option<GeneratorError>>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(script.into()),
        }
    }

    pub fn failing_with(errors: Vec<GeneratorError>) -> Self {
        Self::with_script(errors.into_iter().map(Some).collect())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_failure(&self) -> Option<GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().unwrap().pop_front().flatten()
    }
}

impl Generator for Scripted {
    fn generate_prompt(&self, _key: &str) -> Result<ExamPrompt, GeneratorError> {
        match self.next_failure() {
            Some(err) => Err(err),
            None => Ok(sample_prompt()),
        }
    }

    fn review_paragraph(
        &self,
        index: usize,
        draft: &str,
        _prompt: &ExamPrompt,
        _key: &str,
    ) -> Result<ParagraphReview, GeneratorError> {
        match self.next_failure() {
            Some(err) => Err(err),
            None => Ok(ParagraphReview::new(
                draft,
                format!("critique {}", index + 1),
                format!("refined {}", index + 1),
            )),
        }
    }
}

/// Holds every call until the test releases it
pub struct Gated {
    release: Mutex<Receiver<()>>,
}

impl Gated {
    pub fn new() -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                release: Mutex::new(rx),
            },
            tx,
        )
    }
}

impl Generator for Gated {
    fn generate_prompt(&self, _key: &str) -> Result<ExamPrompt, GeneratorError> {
        let _ = self.release.lock().unwrap().recv();
        Ok(sample_prompt())
    }

    fn review_paragraph(
        &self,
        _index: usize,
        draft: &str,
        _prompt: &ExamPrompt,
        _key: &str,
    ) -> Result<ParagraphReview, GeneratorError> {
        let _ = self.release.lock().unwrap().recv();
        Ok(ParagraphReview::new(draft, "gated".into(), "gated".into()))
    }
}

pub fn coach(generator: Arc<dyn Generator>, env_key: Option<&str>) -> Coach {
    Coach::new(
        generator,
        AccessGate::default(),
        CredentialScope::new(env_key.map(str::to_string)),
    )
}

/// A coach already past the gate, with a prompt, ready for paragraph 1
pub fn writing_coach(generator: Arc<dyn Generator>) -> Coach {
    let mut coach = coach(generator, Some("test-key"));
    coach.submit_passcode("EMMA2025").unwrap();
    coach.start_session().unwrap();
    assert!(coach.wait(WAIT), "prompt generation did not finish");
    coach.begin_writing().unwrap();
    coach
}

pub fn draft(n: usize) -> String {
    format!("Paragraph number {n} about the porch lamp and what it meant.")
}
