//! Gateway trait for chat-completion requests

use async_trait::async_trait;

use super::error::LlmError;

/// A configured chat-completion endpoint.
///
/// Both calls are single-attempt and fallible; retry/backoff is a caller
/// decision, never made here.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Ask the model to decompose a task. Returns at most 5 subtask strings,
    /// already run through the strict-then-lenient parser.
    async fn request_subtasks(&self, task_text: &str) -> Result<Vec<String>, LlmError>;

    /// Send a caller-supplied prompt verbatim and return the raw text reply
    async fn request_freeform(&self, prompt: &str) -> Result<String, LlmError>;
}
