//! OpenAI-compatible chat-completions gateway backend.
//!
//! The gateway (typically a LiteLLM proxy) owns the model routing and the
//! billing/inventory tool server attachment; this client only sends the
//! agent profile and task and reads back the final message.

use std::time::{Duration, Instant};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::retry::Backoff;
use super::{AgentBackend, AgentProfile, Task};
use crate::config::{GatewayConfig, TelemetryConfig};
use crate::error::AgentError;

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<RequestMetadata>,
    /// LiteLLM extension: keep this call out of the proxy's logging callbacks.
    #[serde(rename = "no-log", skip_serializing_if = "std::ops::Not::not")]
    no_log: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct RequestMetadata {
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawChatResponse {
    #[serde(default)]
    choices: Vec<RawChoice>,
    error: Option<RawApiError>,
}

#[derive(Debug, Deserialize)]
struct RawChoice {
    message: RawMessage,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawApiError {
    message: String,
}

// ── Backend ─────────────────────────────────────────────────────────────────

/// Sends tasks to `{base_url}/chat/completions`.
pub struct GatewayBackend {
    client: reqwest::Client,
    endpoint: Url,
    backoff: Backoff,
    config: GatewayConfig,
    telemetry: TelemetryConfig,
}

impl GatewayBackend {
    /// Build a client from explicit gateway and telemetry settings.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidRequest`] if `base_url` is not a URL or
    /// the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig, telemetry: &TelemetryConfig) -> Result<Self, AgentError> {
        let endpoint = chat_completions_url(&config.base_url)?;
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(concat!("finops-agents/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            backoff: Backoff::from_config(config),
            config: config.clone(),
            telemetry: telemetry.clone(),
        })
    }

    fn request_body<'a>(&'a self, profile: &AgentProfile, task: &Task) -> ChatRequest<'a> {
        let metadata = self.telemetry.enabled.then(|| RequestMetadata {
            tags: vec!["finops".to_string(), task.policy_id.clone()],
        });
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: profile.system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: task.user_prompt(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            metadata,
            no_log: !self.telemetry.enabled,
        }
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<String, AgentError> {
        let start = Instant::now();
        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(send_error)?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| AgentError::Request(format!("failed to read response: {e}")))?;
        debug!(
            "gateway response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(AgentError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_completion(&text)
    }
}

impl AgentBackend for GatewayBackend {
    async fn run(&self, profile: &AgentProfile, task: &Task) -> Result<String, AgentError> {
        let body = self.request_body(profile, task);
        info!(
            policy = %task.policy_id,
            model = %self.config.model,
            endpoint = %self.endpoint,
            "sending task to gateway"
        );

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < profile.max_retry_limit => {
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        "gateway attempt {} failed ({e}); retrying in {:.1}s",
                        attempt + 1,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// `{base_url}/chat/completions`, with any trailing slash on `base_url` dropped.
fn chat_completions_url(base_url: &str) -> Result<Url, AgentError> {
    let joined = format!("{}/chat/completions", base_url.trim().trim_end_matches('/'));
    let url = Url::parse(&joined)
        .map_err(|e| AgentError::InvalidRequest(format!("gateway URL '{base_url}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AgentError::InvalidRequest(format!(
            "gateway URL '{base_url}': unsupported scheme '{other}'"
        ))),
    }
}

/// Only timeouts and connection failures are worth another attempt.
fn send_error(e: reqwest::Error) -> AgentError {
    if e.is_timeout() || e.is_connect() {
        AgentError::Request(e.to_string())
    } else {
        AgentError::InvalidRequest(e.to_string())
    }
}

/// Pull the first choice's message text out of a chat-completions body.
fn parse_completion(text: &str) -> Result<String, AgentError> {
    let parsed: RawChatResponse =
        serde_json::from_str(text).map_err(|e| AgentError::Decode(e.to_string()))?;
    if let Some(err) = parsed.error {
        return Err(AgentError::Decode(format!("gateway error: {}", err.message)));
    }
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(AgentError::EmptyResponse)
}
