use crate::guide::LAST_PARAGRAPH;
use crate::model::ParagraphReview;

/// In-memory accumulation of one five-paragraph exercise.
///
/// Drafts and reviews only ever grow together, one pair per accepted
/// submission, and are dropped together on reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EssaySession {
    drafts: Vec<String>,
    reviews: Vec<ParagraphReview>,
    current_index: usize,
}

impl EssaySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drafts(&self) -> &[String] {
        &self.drafts
    }

    pub fn reviews(&self) -> &[ParagraphReview] {
        &self.reviews
    }

    /// Index of the paragraph being written (or just reviewed)
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn completed_paragraphs(&self) -> usize {
        self.reviews.len()
    }

    /// True while the paragraph at `current_index` has not been accepted yet
    pub fn awaiting_draft(&self) -> bool {
        self.drafts.len() == self.current_index
    }

    pub fn latest_review(&self) -> Option<&ParagraphReview> {
        self.reviews.last()
    }

    pub fn is_last_paragraph(&self) -> bool {
        self.current_index >= LAST_PARAGRAPH
    }

    /// Record an accepted draft and its review. Returns false (and records
    /// nothing) if the current paragraph already has a review.
    pub fn accept(&mut self, draft: String, review: ParagraphReview) -> bool {
        if !self.awaiting_draft() {
            return false;
        }
        self.drafts.push(draft);
        self.reviews.push(review);
        true
    }

    /// Move to the next paragraph. Only valid once the current one is
    /// reviewed and it is not the last.
    pub fn advance(&mut self) -> bool {
        if self.awaiting_draft() || self.is_last_paragraph() {
            return false;
        }
        self.current_index += 1;
        true
    }

    /// Text of the refined essay, one paragraph per line
    pub fn refined_essay(&self) -> Vec<&str> {
        self.reviews.iter().map(|r| r.refined.as_str()).collect()
    }
}
