//! Azure OpenAI chat-completions client
//!
//! Implements [`ChatGateway`] against an Azure deployment:
//! `POST {endpoint}/openai/deployments/{model}/chat/completions`. One user
//! message per request, no streaming, no retries - failures are typed and
//! handed to the planner, which decides whether to fall back.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::client::ChatGateway;
use super::error::LlmError;
use super::{parse, prompts};
use crate::config::Settings;

const API_VERSION: &str = "2024-02-01";

/// Tight token budget for the JSON-array decomposition reply
const SUBTASK_MAX_TOKENS: u32 = 500;

/// Larger budget for freeform analysis/priority replies
const FREEFORM_MAX_TOKENS: u32 = 800;

/// Moderate temperature: some variety, still stable
const TEMPERATURE: f64 = 0.7;

/// Azure OpenAI API client
pub struct AzureClient {
    endpoint: String,
    api_key: String,
    model: String,
    http: Client,
}

impl AzureClient {
    /// Build a client from settings; the endpoint is normalized so a
    /// trailing slash in the config does not double up in URLs
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            endpoint: settings.endpoint.trim().trim_end_matches('/').to_string(),
            api_key: settings.api_key.trim().to_string(),
            model: settings.model.clone(),
            http: Client::new(),
        }
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.model, API_VERSION
        )
    }

    fn request_body(prompt: &str, max_tokens: u32) -> serde_json::Value {
        serde_json::json!({
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "max_tokens": max_tokens,
            "temperature": TEMPERATURE
        })
    }

    /// One request, one attempt. Non-2xx becomes `Service`, transport
    /// failures become `Transport`, an unusable payload becomes `Malformed`.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        debug!(model = %self.model, max_tokens, "complete: called");
        let response = self
            .http
            .post(self.chat_url())
            .header("api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&Self::request_body(prompt, max_tokens))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "complete: service error");
            return Err(LlmError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        extract_content(&text)
    }
}

/// Pull `choices[0].message.content` out of a raw response body
fn extract_content(body: &str) -> Result<String, LlmError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|_| LlmError::Malformed("response is not a chat completion object".to_string()))?;
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::Malformed("response has no message content".to_string()))?;
    Ok(content.trim().to_string())
}

#[async_trait]
impl ChatGateway for AzureClient {
    async fn request_subtasks(&self, task_text: &str) -> Result<Vec<String>, LlmError> {
        let prompt = prompts::subtask_prompt(task_text);
        let content = self.complete(&prompt, SUBTASK_MAX_TOKENS).await?;
        let parsed = parse::subtask_list(&content);
        debug!(
            strict = parsed.is_strict(),
            count = parsed.items().len(),
            "request_subtasks: parsed"
        );
        Ok(parsed.into_items())
    }

    async fn request_freeform(&self, prompt: &str) -> Result<String, LlmError> {
        self.complete(prompt, FREEFORM_MAX_TOKENS).await
    }
}

// Azure chat-completion response types (the subset we read)

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
