//! taskpilot - hybrid planning & priority engine
//!
//! Orchestrates task decomposition and priority suggestions: an optional
//! Azure OpenAI gateway is tried first, and deterministic rule-based
//! fallbacks guarantee a bounded result whenever the AI path is unconfigured,
//! unreachable, or replies with something unparseable.

pub mod cli;
pub mod config;
pub mod llm;
pub mod planner;
pub mod rules;

pub use config::Settings;
pub use llm::{AzureClient, ChatGateway, LlmError};
pub use planner::{PlanError, PlanMethod, PlanReport, Planner, PriorityReport};
