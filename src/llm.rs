// Copyright 2026 Docent Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Language model client for the Gemini `generateContent` API.
//!
//! [`LanguageModel`] is the seam the rest of the crate talks through;
//! [`GeminiClient`] is the one real implementation. Failures come back as
//! [`LlmError`] values so callers can decide between a quota apology and a
//! plain error line without parsing strings.

use std::fmt;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

const GENERATE_URL_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub trait LanguageModel {
    fn answer(&mut self, context: &str, question: &str) -> Result<String, LlmError>;
    fn summarize(&mut self, text: &str, max_tokens: u32) -> Result<String, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    QuotaExceeded,
    RateLimited,
    Api,
}

#[derive(Debug, Clone)]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn api(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Api,
            message: message.into(),
        }
    }

    /// The string shown in place of an answer when a request fails.
    pub fn user_message(&self) -> String {
        match self.kind {
            LlmErrorKind::QuotaExceeded => {
                "API quota exceeded. Please wait a moment and try again.".to_string()
            }
            LlmErrorKind::RateLimited => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            LlmErrorKind::Api => format!("Error: {}", self.message),
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LlmErrorKind::QuotaExceeded => write!(f, "api quota exceeded: {}", self.message),
            LlmErrorKind::RateLimited => write!(f, "rate limited: {}", self.message),
            LlmErrorKind::Api => write!(f, "api error: {}", self.message),
        }
    }
}

impl std::error::Error for LlmError {}

/// One turn of a chat exchange. The Gemini API has no assistant role;
/// assistant turns map to its `model` role and system turns move into the
/// request's `systemInstruction` field.
#[derive(Debug, Clone)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant(String),
}

impl ChatMessage {
    #[allow(dead_code)]
    pub fn system(text: impl Into<String>) -> Self {
        ChatMessage::System(text.into())
    }

    pub fn user(text: impl Into<String>) -> Self {
        ChatMessage::User(text.into())
    }

    #[allow(dead_code)]
    pub fn assistant(text: impl Into<String>) -> Self {
        ChatMessage::Assistant(text.into())
    }
}

/// Spaces out requests so free-tier rate limits are not tripped by an
/// interactive session asking questions back to back.
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Sleeps out the remainder of the minimum interval since the last
    /// call, then records now as the latest request time.
    pub fn pause(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last_request = Some(Instant::now());
    }
}

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    throttle: RequestThrottle,
}

impl GeminiClient {
    /// Reads the API key from `GEMINI_API_KEY`. A missing or empty key is a
    /// configuration error, raised here so commands fail before any work.
    pub fn from_env(config: &Config) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR).unwrap_or_default();
        if api_key.is_empty() {
            anyhow::bail!("{API_KEY_VAR} is not set; export it to use the language model");
        }
        Self::new(api_key, config)
    }

    pub fn new(api_key: String, config: &Config) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            throttle: RequestThrottle::new(Duration::from_millis(config.min_request_interval_ms)),
        })
    }

    pub fn chat(&mut self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let max_tokens = self.max_output_tokens;
        self.chat_with_limit(messages, max_tokens)
    }

    fn chat_with_limit(
        &mut self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let request = build_request(messages, self.temperature, max_tokens)?;
        self.throttle.pause();
        let url = format!("{GENERATE_URL_BASE}/{}:generateContent", self.model);
        debug!(model = %self.model, "sending generate request");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|err| LlmError::api(err.to_string()))?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().unwrap_or_default();
            return Err(classify_failure(status, &body));
        }
        let parsed: GenerateResponse = response
            .json()
            .map_err(|err| LlmError::api(format!("decode response: {err}")))?;
        first_candidate_text(parsed)
    }
}

impl LanguageModel for GeminiClient {
    fn answer(&mut self, context: &str, question: &str) -> Result<String, LlmError> {
        let prompt = answer_prompt(context, question);
        self.chat(&[ChatMessage::user(prompt)])
    }

    fn summarize(&mut self, text: &str, max_tokens: u32) -> Result<String, LlmError> {
        let prompt = summarize_prompt(text);
        self.chat_with_limit(&[ChatMessage::user(prompt)], max_tokens)
    }
}

fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Based on the following context, please answer the question.\n\nContext:\n{context}\n\nQuestion: {question}\n\nAnswer:"
    )
}

fn summarize_prompt(text: &str) -> String {
    format!("Please summarize the following text in a concise manner:\n\n{text}")
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

fn build_request(
    messages: &[ChatMessage],
    temperature: f32,
    max_tokens: u32,
) -> Result<GenerateRequest, LlmError> {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();
    for message in messages {
        match message {
            ChatMessage::System(text) => system_parts.push(Part { text: text.clone() }),
            ChatMessage::User(text) => contents.push(Content {
                role: "user",
                parts: vec![Part { text: text.clone() }],
            }),
            ChatMessage::Assistant(text) => contents.push(Content {
                role: "model",
                parts: vec![Part { text: text.clone() }],
            }),
        }
    }
    if contents.is_empty() {
        return Err(LlmError::api(
            "chat requires at least one user or assistant message",
        ));
    }
    Ok(GenerateRequest {
        contents,
        system_instruction: (!system_parts.is_empty()).then_some(SystemInstruction {
            parts: system_parts,
        }),
        generation_config: GenerationConfig {
            temperature,
            max_output_tokens: max_tokens,
        },
    })
}

fn first_candidate_text(response: GenerateResponse) -> Result<String, LlmError> {
    response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .map(|part| part.text)
        .find(|text| !text.is_empty())
        .ok_or_else(|| LlmError::api("model returned no text"))
}

/// Quota markers in the body outrank the bare 429 status, matching how the
/// API reports free-tier exhaustion (429 plus `RESOURCE_EXHAUSTED`).
fn classify_failure(status: u16, body: &str) -> LlmError {
    let message = error_message(body).unwrap_or_else(|| format!("http status {status}"));
    let lowered = body.to_lowercase();
    if lowered.contains("resource_exhausted") || lowered.contains("quota") {
        LlmError {
            kind: LlmErrorKind::QuotaExceeded,
            message,
        }
    } else if status == 429 {
        LlmError {
            kind: LlmErrorKind::RateLimited,
            message,
        }
    } else {
        LlmError {
            kind: LlmErrorKind::Api,
            message,
        }
    }
}

fn error_message(body: &str) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
    let message = parsed.error?.message;
    (!message.is_empty()).then_some(message)
}
