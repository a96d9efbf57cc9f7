//! The remote generator that writes exam prompts and reviews drafts.
//!
//! The coach treats it as an opaque, possibly slow, possibly failing call.
//! Implementations block; [`crate::inflight`] moves them off the UI thread.

pub mod chat;
pub mod prompts;

use thiserror::Error;

use crate::model::{ExamPrompt, ParagraphReview};

pub use chat::{ChatGenerator, ChatSettings};

/// Errors emitted by a [`Generator`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("no API key is available")]
    MissingKey,
    #[error("the API key was rejected (status {0})")]
    Unauthorized(reqwest::StatusCode),
    #[error("generator request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("generator returned an empty response")]
    EmptyResponse,
    #[error("generator returned malformed content: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("generator returned an incomplete {0}")]
    Incomplete(&'static str),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("generator worker stopped before answering")]
    WorkerGone,
}

impl GeneratorError {
    /// A new key might fix this
    pub fn is_credential_problem(&self) -> bool {
        matches!(self, Self::MissingKey | Self::Unauthorized(_))
    }
}

/// Produces writing prompts and paragraph reviews.
pub trait Generator: Send + Sync + 'static {
    fn generate_prompt(&self, key: &str) -> Result<ExamPrompt, GeneratorError>;

    fn review_paragraph(
        &self,
        index: usize,
        draft: &str,
        prompt: &ExamPrompt,
        key: &str,
    ) -> Result<ParagraphReview, GeneratorError>;
}
