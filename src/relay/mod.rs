//! Completion relay backed by the OpenAI Chat Completions API.
//!
//! A stateless request/response mediator between the session controller (or
//! the HTTP endpoint) and the hosted completion API: it attaches the fixed
//! persona, forwards the prompt with prior turns, and returns the first
//! reply. A failed call surfaces immediately as a typed error; the caller
//! decides whether to show or re-attempt it.

use crate::config::CompletionConfig;
use crate::error::RelayError;
use crate::transcript::{Role, Turn};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument};
use zeroize::Zeroize;

/// OpenAI API endpoint
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Environment variable holding the API credential.
const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Sampling temperature: moderate randomness for conversational replies.
const REPLY_TEMPERATURE: f32 = 0.7;

/// Fixed persona prepended to every request. Not configurable at runtime.
const PERSONA: &str = "You are a friendly, concise voice assistant. \
Answer in short, spoken-word sentences that sound natural when read aloud. \
Avoid markdown, lists, and code blocks; keep replies to a few sentences \
unless the user asks for more detail.";

/// Client for the hosted chat completion API.
pub struct RelayClient {
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

/// Request body for the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    n: u32,
}

/// Message in the outgoing request.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Response from the Chat Completions API.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

/// Choice in the response.
#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

/// Response message content.
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// One prior turn as received over the wire.
///
/// Deliberately lenient: the role is free-form and the content may be any
/// JSON value. Entries that do not conform are dropped when the outgoing
/// message list is built, tolerating malformed client state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Value,
}

impl From<&Turn> for HistoryTurn {
    fn from(turn: &Turn) -> Self {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        Self {
            role: role.to_string(),
            content: Value::String(turn.content.clone()),
        }
    }
}

/// Seam between the session controller and the hosted completion API.
///
/// The controller only ever sees this trait, so tests substitute a mock
/// without touching the network.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn get_reply(&self, prompt: &str, history: &[Turn]) -> Result<String, RelayError>;
}

/// Build the ordered outgoing message list: persona first, then each
/// conforming history entry in order, then the new user prompt last.
fn build_messages(prompt: &str, history: &[HistoryTurn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage {
        role: "system".to_string(),
        content: PERSONA.to_string(),
    });
    for turn in history {
        if turn.role != "user" && turn.role != "assistant" {
            continue;
        }
        let Some(content) = turn.content.as_str() else {
            continue;
        };
        messages.push(ChatMessage {
            role: turn.role.clone(),
            content: content.to_string(),
        });
    }
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: prompt.to_string(),
    });
    messages
}

/// Extract the first candidate's text from the completion response.
fn extract_reply(response: &ChatCompletionResponse) -> Result<String, RelayError> {
    response
        .choices
        .first()
        .map(|choice| choice.message.content.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| RelayError::InvalidResponse("No text content in completion response".into()))
}

impl RelayClient {
    /// Create a relay client with an explicit credential.
    pub fn new(api_key: Option<String>, config: &CompletionConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client for RelayClient")?;

        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            client,
        })
    }

    /// Create a relay client, reading the credential from the environment.
    ///
    /// A missing credential is not an error here: the client is built
    /// unconfigured and every call fails with [`RelayError::Unconfigured`]
    /// until the key is provided.
    pub fn from_env(config: &CompletionConfig) -> anyhow::Result<Self> {
        Self::new(std::env::var(API_KEY_VAR).ok(), config)
    }

    /// Whether a credential is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Get a single assistant reply for a prompt plus prior turns.
    ///
    /// The full reply is returned atomically; no streaming, no retries.
    #[instrument(skip(self, prompt, history), fields(history_len = history.len()))]
    pub async fn get_reply(
        &self,
        prompt: &str,
        history: &[HistoryTurn],
    ) -> Result<String, RelayError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(RelayError::EmptyPrompt);
        }
        let api_key = self.api_key.as_deref().ok_or(RelayError::Unconfigured)?;

        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_messages(prompt, history),
            temperature: REPLY_TEMPERATURE,
            max_tokens: self.max_tokens,
            n: 1,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(RelayError::Upstream { status, message });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            RelayError::InvalidResponse(format!("Failed to parse completion response: {}", e))
        })?;

        let reply = extract_reply(&completion)?;
        info!(reply_len = reply.len(), "Completion reply received");
        Ok(reply)
    }
}

impl Drop for RelayClient {
    fn drop(&mut self) {
        // Clear API key from memory
        if let Some(key) = self.api_key.as_mut() {
            key.zeroize();
        }
    }
}

#[async_trait]
impl CompletionBackend for RelayClient {
    async fn get_reply(&self, prompt: &str, history: &[Turn]) -> Result<String, RelayError> {
        let history: Vec<HistoryTurn> = history.iter().map(HistoryTurn::from).collect();
        RelayClient::get_reply(self, prompt, &history).await
    }
}
