use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use itertools::Itertools;

use crate::guide::guide_for;
use crate::model::{ExamPrompt, ParagraphReview};

const RULE: &str = "------------------------------------------------";
const DOUBLE_RULE: &str = "================================================";

/// Render a finished session as a plain-text practice record.
///
/// Pure: the same inputs always give the same document. Order is fixed:
/// prompt, each paragraph's original/critique/refined, then the reflection.
pub fn build_transcript(
    prompt: &ExamPrompt,
    reviews: &[ParagraphReview],
    reflection: &str,
    date: NaiveDate,
) -> String {
    let paragraphs = reviews
        .iter()
        .enumerate()
        .map(|(idx, review)| {
            let heading = guide_for(idx)
                .map(|g| g.title.to_string())
                .unwrap_or_else(|| format!("Paragraph {}", idx + 1));
            format!(
                "[{heading}]\n{RULE}\n* Your original draft:\n{}\n\n* Coach's critique:\n{}\n\n* Refined version:\n{}\n",
                review.original, review.critique, review.refined
            )
        })
        .join(&format!("\n{DOUBLE_RULE}\n\n"));

    format!(
        "[Essay Coach - Practice Record]\n\n\
         Title: {}\n\
         Date: {}\n\
         {RULE}\n\
         [Reading Material]\n{}\n\n\
         [Writing Task]\n{}\n\
         {RULE}\n\n\
         {paragraphs}\n\
         {DOUBLE_RULE}\n\n\
         [Reflection]\n{}\n\n\
         {RULE}\n\
         Generated by essay-coach\n",
        prompt.title,
        date.format("%Y-%m-%d"),
        prompt.material,
        prompt.question,
        reflection.trim(),
    )
}

/// File name for an exported record, e.g. `essay-practice_Windows_2025-01-31.txt`
pub fn export_file_name(title: &str, date: NaiveDate) -> String {
    let safe_title: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let safe_title = if safe_title.is_empty() {
        "untitled".to_string()
    } else {
        safe_title
    };
    format!("essay-practice_{}_{}.txt", safe_title, date.format("%Y-%m-%d"))
}

/// Write the transcript into `dir`, creating it if needed. Returns the file path.
pub fn write_transcript(
    dir: &Path,
    prompt: &ExamPrompt,
    reviews: &[ParagraphReview],
    reflection: &str,
    date: NaiveDate,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(&prompt.title, date));
    fs::write(&path, build_transcript(prompt, reviews, reflection, date))?;
    Ok(path)
}
