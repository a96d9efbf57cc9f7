use serde::Deserialize;

use super::GeneratorError;
use crate::guide::guide_for;
use crate::model::{ExamPrompt, ParagraphReview};

pub fn system_message(language: &str) -> String {
    format!(
        "You are an experienced writing coach preparing students for a national \
         university entrance exam essay section. You write in {language}. \
         You always answer with a single JSON object and nothing else."
    )
}

pub fn prompt_request() -> String {
    "Write one new exam-style essay prompt in the spirit of the last three years of \
     entrance exam papers: a short reading passage followed by a writing task that \
     asks for both reflection and personal feeling.\n\
     Respond with JSON of the form \
     {\"title\": string, \"material\": string, \"question\": string, \"guidance\": string} \
     where `material` is the reading passage (200-400 characters), `question` is the \
     writing directive and `guidance` is a one or two sentence hint."
        .to_string()
}

pub fn review_request(index: usize, draft: &str, prompt: &ExamPrompt) -> String {
    let (title, description, goal) = match guide_for(index) {
        Some(g) => (g.title, g.description, g.goal),
        None => ("Paragraph", "", ""),
    };

    format!(
        "Essay title: {}\n\
         Reading material:\n{}\n\
         Writing task: {}\n\n\
         The student is writing {title}.\n\
         Purpose of this paragraph: {description}\n\
         Goal: {goal}\n\n\
         Student draft:\n{draft}\n\n\
         Critique the draft against the purpose and goal (strengths first, then the \
         most important improvements), then rewrite it into a polished version that \
         keeps the student's ideas and voice.\n\
         Respond with JSON of the form {{\"critique\": string, \"refined\": string}}.",
        prompt.title, prompt.material, prompt.question,
    )
}

#[derive(Debug, Deserialize)]
struct ReviewPayload {
    critique: String,
    #[serde(alias = "refinedText", alias = "refined_text")]
    refined: String,
}

/// Models sometimes wrap JSON in a markdown code fence
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn parse_prompt(content: &str) -> Result<ExamPrompt, GeneratorError> {
    let prompt: ExamPrompt = serde_json::from_str(strip_code_fence(content))?;
    if prompt.title.trim().is_empty() || prompt.material.trim().is_empty() {
        return Err(GeneratorError::Incomplete("prompt"));
    }
    Ok(prompt)
}

pub fn parse_review(draft: &str, content: &str) -> Result<ParagraphReview, GeneratorError> {
    let payload: ReviewPayload = serde_json::from_str(strip_code_fence(content))?;
    if payload.refined.trim().is_empty() {
        return Err(GeneratorError::Incomplete("review"));
    }
    Ok(ParagraphReview::new(
        draft,
        payload.critique.trim().to_string(),
        payload.refined.trim().to_string(),
    ))
}
