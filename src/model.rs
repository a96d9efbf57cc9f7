use serde::{Deserialize, Serialize};

/// Minimum number of characters (after trimming) a draft needs before it can be reviewed
pub const MIN_DRAFT_CHARS: usize = 10;

/// An exam-style writing prompt produced by the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamPrompt {
    pub title: String,
    /// reading passage the essay responds to
    pub material: String,
    /// the writing directive
    pub question: String,
    /// hint text shown alongside the directive
    pub guidance: String,
}

/// The generator's critique and rewrite of one submitted draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphReview {
    pub original: String,
    pub critique: String,
    pub refined: String,
    pub word_count: usize,
}

impl ParagraphReview {
    pub fn new(original: &str, critique: String, refined: String) -> Self {
        Self {
            original: original.to_string(),
            critique,
            refined,
            word_count: count_words(original),
        }
    }
}

/// Number of characters a draft contributes toward the minimum length
pub fn draft_len(text: &str) -> usize {
    text.trim().chars().count()
}

pub fn is_submittable(text: &str) -> bool {
    draft_len(text) >= MIN_DRAFT_CHARS
}

/// Counts words the way essay length limits are usually expressed: every CJK
/// character counts on its own, everything else by whitespace-separated runs.
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for c in text.chars() {
        if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if c.is_whitespace() || is_cjk_punctuation(c) {
            in_word = false;
        } else if !in_word {
            count += 1;
            in_word = true;
        }
    }

    count
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{3040}'..='\u{30FF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{20000}'..='\u{2A6DF}')
}

fn is_cjk_punctuation(c: char) -> bool {
    matches!(c, '\u{3000}'..='\u{303F}' | '\u{FF00}'..='\u{FFEF}')
}
