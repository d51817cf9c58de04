//! # Tutor Service
//!
//! This module talks to the hosted generative language model that explains the
//! current phase, writes quiz questions and answers chat messages. The geometric
//! core never depends on it; it only receives a phase name as a topic string.
//!
//! ## Service
//!
//! ### Generative Language REST API
//! - **Request**: `POST {endpoint}/models/{model}:generateContent`
//! - **Auth**: `x-goog-api-key` header, read from the configured environment variable
//! - **Persona**: every request carries the configured system instruction
//! - **Quiz**: requested as `application/json` with a response schema
//!
//! ## Error Handling
//!
//! The three public operations of [`Tutor`] never fail. Network, status and
//! parse errors surface as [`TutorError`] from the `try_*` methods and are turned
//! into a placeholder message (explanation, chat) or an empty question list
//! (quiz) before they reach the caller.
//!
//! Without an API key the [`TutorBackend`] falls back to
//! [`crate::fallback::OfflineTutor`].

use crate::config::TutorConfig;
use crate::fallback::OfflineTutor;
use crate::quiz::QuizQuestion;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Shown when the model answers with no text.
pub const EMPTY_EXPLANATION: &str =
    "ごめんね、ちょっとうまく考えられなかったみたい。もう一回聞いてみてね。";
/// Shown when the explanation request fails.
pub const EXPLANATION_ERROR: &str = "通信エラーが発生しました。インターネットの接続を確認してね。";
/// Shown when the model has nothing to say in chat.
pub const EMPTY_CHAT: &str = "...";
/// Shown when the chat request fails.
pub const CHAT_ERROR: &str = "エラーがおきちゃった。";

/// Errors that can occur while talking to the tutor service.
#[derive(Error, Debug)]
pub enum TutorError {
    /// HTTP request failed (network, timeout, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("tutor service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response contained no candidate text
    #[error("empty response")]
    EmptyResponse,

    /// Response text was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The three operations the explorer needs from a tutor.
///
/// Every operation degrades instead of failing.
pub trait Tutor: Send + Sync {
    /// Short explanation of a phase name.
    fn explain(&self, topic: &str) -> impl Future<Output = String> + Send;

    /// Up to `count` quiz questions; empty when none could be produced.
    fn quiz(&self, count: usize) -> impl Future<Output = Vec<QuizQuestion>> + Send;

    /// Reply to a free-text chat message.
    fn chat(&self, message: &str) -> impl Future<Output = String> + Send;
}

// -- Wire format --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, `None` when blank.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Schema of the quiz response: an array of question objects.
pub fn quiz_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING" },
                "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                "correctAnswerIndex": { "type": "INTEGER" },
                "explanation": { "type": "STRING" }
            },
            "required": ["question", "options", "correctAnswerIndex", "explanation"]
        }
    })
}

/// Parse the model's quiz JSON, dropping unusable questions and keeping at most `count`.
pub fn parse_quiz(text: &str, count: usize) -> Result<Vec<QuizQuestion>, TutorError> {
    let questions: Vec<QuizQuestion> = serde_json::from_str(text.trim())?;
    let total = questions.len();
    let valid: Vec<_> = questions
        .into_iter()
        .filter(QuizQuestion::is_valid)
        .take(count)
        .collect();
    if valid.len() < total.min(count) {
        log::warn!("Dropped {} malformed quiz question(s)", total.min(count) - valid.len());
    }
    Ok(valid)
}

fn explanation_prompt(topic: &str) -> String {
    format!(
        "「{topic}」について、小学生にわかるように150文字以内で短く教えてください。例え話を使うとわかりやすいです。"
    )
}

fn quiz_prompt(count: usize) -> String {
    format!("月の満ち欠けに関する小学生向けのクイズを{count}問作ってください。")
}

const CHAT_STYLE: &str = "\n会話形式で短く返事をしてください。";

/// Client for the hosted generative language model.
#[derive(Clone)]
pub struct GeminiTutor {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    system_instruction: String,
}

impl std::fmt::Debug for GeminiTutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiTutor")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiTutor {
    pub fn new(config: &TutorConfig, api_key: String) -> Result<Self, TutorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            system_instruction: config.system_instruction.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Build a single-turn request with the persona attached.
    pub fn request(
        &self,
        prompt: &str,
        style: Option<&str>,
        generation_config: Option<GenerationConfig>,
    ) -> GenerateContentRequest {
        let mut system = self.system_instruction.clone();
        if let Some(style) = style {
            system.push_str(style);
        }
        GenerateContentRequest {
            system_instruction: Content::text(None, system),
            contents: vec![Content::text(Some("user"), prompt)],
            generation_config,
        }
    }

    /// Send a request and return the first candidate's text.
    pub async fn generate(&self, request: &GenerateContentRequest) -> Result<String, TutorError> {
        log::debug!("POST {}", self.url());
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        body.text().ok_or(TutorError::EmptyResponse)
    }

    pub async fn try_explain(&self, topic: &str) -> Result<String, TutorError> {
        let request = self.request(&explanation_prompt(topic), None, None);
        self.generate(&request).await
    }

    pub async fn try_quiz(&self, count: usize) -> Result<Vec<QuizQuestion>, TutorError> {
        let request = self.request(
            &quiz_prompt(count),
            None,
            Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: quiz_schema(),
            }),
        );
        match self.generate(&request).await {
            Ok(text) => parse_quiz(&text, count),
            Err(TutorError::EmptyResponse) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn try_chat(&self, message: &str) -> Result<String, TutorError> {
        let request = self.request(message, Some(CHAT_STYLE), None);
        self.generate(&request).await
    }
}

impl Tutor for GeminiTutor {
    async fn explain(&self, topic: &str) -> String {
        match self.try_explain(topic).await {
            Ok(text) => text,
            Err(TutorError::EmptyResponse) => EMPTY_EXPLANATION.to_string(),
            Err(e) => {
                log::error!("Explanation request failed: {}", e);
                EXPLANATION_ERROR.to_string()
            }
        }
    }

    async fn quiz(&self, count: usize) -> Vec<QuizQuestion> {
        self.try_quiz(count).await.unwrap_or_else(|e| {
            log::error!("Quiz request failed: {}", e);
            Vec::new()
        })
    }

    async fn chat(&self, message: &str) -> String {
        match self.try_chat(message).await {
            Ok(text) => text,
            Err(TutorError::EmptyResponse) => EMPTY_CHAT.to_string(),
            Err(e) => {
                log::error!("Chat request failed: {}", e);
                CHAT_ERROR.to_string()
            }
        }
    }
}

/// Tutor chosen at startup: the hosted model when a key is configured, the
/// offline tutor otherwise.
#[derive(Debug, Clone)]
pub enum TutorBackend {
    Gemini(GeminiTutor),
    Offline(OfflineTutor),
}

impl TutorBackend {
    pub fn from_config(config: &TutorConfig) -> Self {
        let Some(key) = config.api_key() else {
            log::warn!(
                "{} is not set, answering from the offline tutor",
                config.api_key_env
            );
            return TutorBackend::Offline(OfflineTutor);
        };
        match GeminiTutor::new(config, key) {
            Ok(tutor) => TutorBackend::Gemini(tutor),
            Err(e) => {
                log::error!("Could not build HTTP client: {}", e);
                TutorBackend::Offline(OfflineTutor)
            }
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, TutorBackend::Offline(_))
    }
}

impl Tutor for TutorBackend {
    async fn explain(&self, topic: &str) -> String {
        match self {
            TutorBackend::Gemini(t) => t.explain(topic).await,
            TutorBackend::Offline(t) => t.explain(topic).await,
        }
    }

    async fn quiz(&self, count: usize) -> Vec<QuizQuestion> {
        match self {
            TutorBackend::Gemini(t) => t.quiz(count).await,
            TutorBackend::Offline(t) => t.quiz(count).await,
        }
    }

    async fn chat(&self, message: &str) -> String {
        match self {
            TutorBackend::Gemini(t) => t.chat(message).await,
            TutorBackend::Offline(t) => t.chat(message).await,
        }
    }
}
