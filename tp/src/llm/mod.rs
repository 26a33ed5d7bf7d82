//! AI gateway for taskpilot
//!
//! Builds chat-completion requests against an Azure OpenAI deployment and
//! defensively parses the text that comes back. Nothing in here retries:
//! a call is a single attempt, and the planner decides what a failure means.

use std::sync::Arc;

use tracing::debug;

mod azure;
pub mod client;
mod error;
pub mod parse;
pub mod prompts;

pub use azure::AzureClient;
pub use client::ChatGateway;
pub use error::LlmError;
pub use parse::{PrioritySuggestion, SubtaskParse};

use crate::config::Settings;

/// Build a gateway from settings, or `None` when AI is not configured.
///
/// Absence of a gateway is the signal for the planner to go straight to the
/// rule-based fallbacks.
pub fn create_gateway(settings: &Settings) -> Option<Arc<dyn ChatGateway>> {
    if !settings.is_configured() {
        debug!("create_gateway: AI not configured");
        return None;
    }
    debug!(model = %settings.model, "create_gateway: creating Azure client");
    Some(Arc::new(AzureClient::from_settings(settings)))
}
