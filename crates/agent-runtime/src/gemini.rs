//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` for the Google Generative Language API.
//! Replies are decoded once, at this boundary, into a single canonical text
//! record; shapes we do not recognise are rejected instead of being passed
//! through as raw JSON.

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{
        Completion, DEFAULT_MODEL, FinishReason, GenerationOptions, LlmProvider, ProviderInfo,
        TokenUsage,
    },
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider configuration
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key; requests fail with `AgentError::Config` when absent
    pub api_key: Option<String>,

    /// API base URL
    pub base_url: String,

    /// Model used by `info()` and the health check
    pub default_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            default_model: DEFAULT_MODEL.into(),
        }
    }
}

/// Gemini LLM provider
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create from configuration
    pub fn from_config(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::Config("GOOGLE_API_KEY is not set".into()))
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Convert agent messages to a Gemini request body
    ///
    /// System messages become `systemInstruction`; tool context is sent as
    /// user text. Consecutive turns with the same role are merged because the
    /// API expects user and model turns to alternate.
    fn build_request(messages: &[Message], options: &GenerationOptions) -> GenerateRequest {
        let system: Vec<Part> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| Part { text: m.content.clone() })
            .collect();

        let mut contents: Vec<Content> = Vec::new();
        for message in messages.iter().filter(|m| m.role != Role::System) {
            let role = match message.role {
                Role::Assistant => "model",
                _ => "user",
            };
            let part = Part { text: message.content.clone() };

            match contents.last_mut() {
                Some(last) if last.role == role => last.parts.push(part),
                _ => contents.push(Content {
                    role: role.into(),
                    parts: vec![part],
                }),
            }
        }

        GenerateRequest {
            system_instruction: (!system.is_empty()).then_some(SystemInstruction { parts: system }),
            contents,
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_p: options.top_p,
                max_output_tokens: options.max_tokens,
            },
        }
    }

    /// Map a non-success HTTP status to the error taxonomy
    fn status_error(status: StatusCode, body: &str) -> AgentError {
        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {status}"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
            StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
            s if s.is_server_error() => AgentError::ProviderUnavailable(detail),
            _ => AgentError::Provider(detail),
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Gemini".into(),
            default_model: self.config.default_model.clone(),
            authenticated: self.config.api_key.is_some(),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let Ok(key) = self.api_key() else {
            return Ok(false);
        };

        let url = format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.default_model
        );

        match self.client.get(url).header("x-goog-api-key", key).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let key = self.api_key()?;
        let body = Self::build_request(messages, options);

        let response = self
            .client
            .post(self.endpoint(&options.model))
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::status_error(status, &text));
        }

        let reply = ModelText::decode(&text)?;

        Ok(Completion {
            content: reply.text,
            model: options.model.clone(),
            usage: reply.usage,
            finish_reason: reply.finish_reason,
        })
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

/// Every reply shape the endpoint (or a compatible proxy) is known to send
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelReply {
    /// `{"error": {...}}` delivered with a 200
    Error { error: ApiError },

    /// Standard `generateContent` reply
    Candidates {
        candidates: Vec<Candidate>,
        #[serde(default, rename = "usageMetadata")]
        usage_metadata: Option<UsageMetadata>,
    },

    /// Prompt rejected before generation
    Blocked {
        #[serde(rename = "promptFeedback")]
        prompt_feedback: PromptFeedback,
    },

    /// Proxies that flatten the reply to `{"text": ...}`
    Text { text: String },

    /// Proxies that flatten the reply to `{"content": ...}`
    Content { content: String },
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Canonical decoded reply
#[derive(Debug)]
struct ModelText {
    text: String,
    finish_reason: Option<FinishReason>,
    usage: Option<TokenUsage>,
}

impl ModelText {
    fn decode(body: &str) -> Result<Self> {
        let reply: ModelReply = serde_json::from_str(body).map_err(|_| {
            tracing::warn!(body = %truncate(body, 200), "Unrecognized Gemini reply shape");
            AgentError::UnrecognizedResponse(truncate(body, 200))
        })?;

        match reply {
            ModelReply::Error { error } => Err(AgentError::Provider(error.message)),
            ModelReply::Blocked { prompt_feedback } => Err(AgentError::Provider(format!(
                "prompt blocked: {}",
                prompt_feedback.block_reason
            ))),
            ModelReply::Candidates {
                candidates,
                usage_metadata,
            } => {
                let first = candidates.into_iter().next().ok_or_else(|| {
                    AgentError::UnrecognizedResponse("reply contained no candidates".into())
                })?;

                let text = first
                    .content
                    .map(|c| {
                        c.parts
                            .into_iter()
                            .filter_map(|p| p.text)
                            .collect::<Vec<_>>()
                            .join("")
                    })
                    .unwrap_or_default();

                Ok(Self {
                    text,
                    finish_reason: first.finish_reason.as_deref().map(finish_reason),
                    usage: usage_metadata.map(|u| TokenUsage {
                        prompt_tokens: u.prompt_token_count,
                        completion_tokens: u.candidates_token_count,
                        total_tokens: u.total_token_count,
                    }),
                })
            }
            ModelReply::Text { text } | ModelReply::Content { content: text } => Ok(Self {
                text,
                finish_reason: None,
                usage: None,
            }),
        }
    }
}

fn finish_reason(raw: &str) -> FinishReason {
    match raw {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::ContentFilter,
        _ => FinishReason::Other,
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
