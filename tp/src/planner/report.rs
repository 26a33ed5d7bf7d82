//! Planner outcomes and errors

use serde::Serialize;
use thiserror::Error;

use taskstore::{Priority, StoreError, TaskId};

use crate::llm::LlmError;

/// Bulk inserts from one planning run are capped at this many subtasks
pub const MAX_PLANNED_SUBTASKS: usize = 5;

/// Which path produced a planning/priority result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanMethod {
    AiPowered,
    RuleBased,
}

impl std::fmt::Display for PlanMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AiPowered => write!(f, "AI-powered"),
            Self::RuleBased => write!(f, "rule-based"),
        }
    }
}

/// Result of `plan_task`: how many subtasks were added and by which method.
/// `added == 0` is a legitimate outcome, distinct from a hard failure.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub added: usize,
    pub method: PlanMethod,
}

/// Result of `suggest_priority`: the applied level, the method, and the
/// model's stated reason when the AI path produced it
#[derive(Debug, Clone, Serialize)]
pub struct PriorityReport {
    pub level: Priority,
    pub method: PlanMethod,
    pub reason: Option<String>,
}

/// Hard failures of the planning surface.
///
/// Gateway failures never show up here for planning/priority flows - they
/// are converted into rule-based fallback. `Ai` is only surfaced by the
/// paths that have no fallback (analysis, connection test).
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("planning already in flight for task {0}")]
    PlanningInFlight(TaskId),

    #[error("AI endpoint is not configured")]
    NotConfigured,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("AI request failed: {0}")]
    Ai(#[from] LlmError),
}
