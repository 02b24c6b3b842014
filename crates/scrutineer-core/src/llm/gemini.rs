//! Gemini `generateContent` client
//!
//! Implements both judgment ports over the public REST API:
//! `POST {api_base}/models/{model}:generateContent`, authenticated with the
//! `x-goog-api-key` header.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checker::ComplianceJudge;
use crate::domain::ComplianceVerdict;
use crate::proposer::AlternativeProposer;
use crate::rules::Category;

use super::error::{ModelError, ModelResult};
use super::prompt;

/// Default REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini connection settings
#[derive(Clone)]
pub struct GeminiConfig {
    /// REST base URL, without trailing slash
    pub api_base: String,
    /// Model name (`models/` prefix optional)
    pub model: String,
    /// API key
    pub api_key: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Config for the default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        GeminiConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            temperature: 0.2,
            timeout: Duration::from_secs(60),
        }
    }

    /// Read the API key from the named environment variable.
    pub fn from_env(var: &str) -> ModelResult<Self> {
        let key = std::env::var(var).map_err(|_| ModelError::MissingApiKey {
            var: var.to_string(),
        })?;
        if key.trim().is_empty() {
            return Err(ModelError::MissingApiKey {
                var: var.to_string(),
            });
        }
        Ok(Self::new(key))
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint URL. The key travels in a header, never in the URL.
    pub fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/models/{}:generateContent", self.api_base, model)
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// -- wire types --------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn build_request<'a>(
    instruction: &'a str,
    message: &'a str,
    temperature: f32,
    json_mode: bool,
) -> GenerateRequest<'a> {
    GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part { text: instruction }],
        },
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part { text: message }],
        }],
        generation_config: GenerationConfig {
            temperature,
            response_mime_type: json_mode.then_some("application/json"),
        },
    }
}

/// Concatenated text of the first candidate.
///
/// A blocked prompt or a candidate withheld by the model's filters is
/// reported as [`ModelError::Unavailable`] rather than an empty reply.
fn first_candidate_text(response: GenerateResponse) -> ModelResult<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ModelError::Unavailable(format!("prompt blocked: {reason}")));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(ModelError::EmptyResponse);
    };
    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return match candidate.finish_reason {
            Some(reason) if reason != "STOP" && reason != "MAX_TOKENS" => Err(
                ModelError::Unavailable(format!("response withheld: {reason}")),
            ),
            _ => Err(ModelError::EmptyResponse),
        };
    }
    Ok(text)
}

/// Gemini client for the compliance and strategy calls
pub struct GeminiClient {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> ModelResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("scrutineer/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(GeminiClient {
            config,
            http_client,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        instruction: &str,
        message: &str,
        json_mode: bool,
    ) -> ModelResult<String> {
        let body = build_request(instruction, message, self.config.temperature, json_mode);
        debug!(model = %self.config.model, json_mode, "calling generateContent");

        let response = self
            .http_client
            .post(self.config.endpoint())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        first_candidate_text(parsed)
    }
}

#[async_trait]
impl ComplianceJudge for GeminiClient {
    async fn judge(&self, category: &Category, task: &str) -> ModelResult<ComplianceVerdict> {
        let message = prompt::compliance_prompt(category, task);
        let raw = self
            .generate(prompt::RULES_INSTRUCTION, &message, true)
            .await?;
        prompt::parse_verdict(&raw)
    }
}

#[async_trait]
impl AlternativeProposer for GeminiClient {
    async fn propose(&self, task: &str, reason: &str) -> ModelResult<String> {
        let message = prompt::alternative_prompt(task, reason);
        let raw = self
            .generate(prompt::STRATEGY_INSTRUCTION, &message, false)
            .await?;
        Ok(prompt::clean_proposal(&raw))
    }
}
