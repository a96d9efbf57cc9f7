use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{prompts, Generator, GeneratorError};
use crate::model::{ExamPrompt, ParagraphReview};

/// Gemini's OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Clone, Debug, PartialEq)]
pub struct ChatSettings {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    /// language the coach writes prompts and reviews in
    pub language: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(90),
            language: "Traditional Chinese".to_string(),
        }
    }
}

/// Generator backed by any OpenAI-compatible `/chat/completions` endpoint
#[derive(Clone, Debug)]
pub struct ChatGenerator {
    client: Client,
    settings: ChatSettings,
}

impl ChatGenerator {
    pub fn new(settings: ChatSettings) -> Result<Self, GeneratorError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn complete(&self, user_message: String, key: &str) -> Result<String, GeneratorError> {
        if key.trim().is_empty() {
            return Err(GeneratorError::MissingKey);
        }

        let payload = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::system_message(&self.settings.language),
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: 0.8,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(model = %self.settings.model, "sending chat completion request");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(key)
            .json(&payload)
            .send()?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%status, "generator rejected the API key");
            return Err(GeneratorError::Unauthorized(status));
        }
        if !status.is_success() {
            warn!(%status, "generator request failed");
            return Err(GeneratorError::HttpStatus(status));
        }

        let body: ChatResponse = response.json()?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GeneratorError::EmptyResponse)?;

        Ok(content)
    }
}

impl Generator for ChatGenerator {
    fn generate_prompt(&self, key: &str) -> Result<ExamPrompt, GeneratorError> {
        let content = self.complete(prompts::prompt_request(), key)?;
        let prompt = prompts::parse_prompt(&content)?;
        info!(title = %prompt.title, "generated exam prompt");
        Ok(prompt)
    }

    fn review_paragraph(
        &self,
        index: usize,
        draft: &str,
        prompt: &ExamPrompt,
        key: &str,
    ) -> Result<ParagraphReview, GeneratorError> {
        let content = self.complete(prompts::review_request(index, draft, prompt), key)?;
        let review = prompts::parse_review(draft, &content)?;
        info!(paragraph = index + 1, words = review.word_count, "reviewed paragraph");
        Ok(review)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
