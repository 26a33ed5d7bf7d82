//! Task and Subtask domain types
//!
//! A Task is a top-level to-do item; Subtasks are its child action items.
//! Ids for both are drawn from one monotonic counter owned by the store, so
//! an id is unique across the whole hierarchy, not just within one task.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::priority::Priority;

/// Identifier shared by tasks and subtasks
pub type TaskId = u64;

/// A child action item belonging to exactly one task. No further children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
}

/// A top-level to-do item with optional subtasks, priority, and due date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    /// Display text, always non-empty after trimming
    pub text: String,

    pub completed: bool,

    #[serde(default)]
    pub priority: Priority,

    /// Calendar date only, no time component
    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    /// True iff the current priority came from an AI/heuristic suggestion
    /// rather than a direct user choice
    #[serde(default)]
    pub ai_suggested_priority: bool,

    /// Insertion order is meaningful and preserved
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    /// Completion percentage in 0..=100.
    ///
    /// With no subtasks this mirrors the completion flag (100 or 0);
    /// otherwise it is the rounded share of completed subtasks.
    pub fn progress(&self) -> u8 {
        if self.subtasks.is_empty() {
            return if self.completed { 100 } else { 0 };
        }
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        let pct = (done as f64 / self.subtasks.len() as f64) * 100.0;
        pct.round() as u8
    }

    /// Look up a subtask by id
    pub fn subtask(&self, subtask_id: TaskId) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == subtask_id)
    }

    pub(crate) fn subtask_mut(&mut self, subtask_id: TaskId) -> Option<&mut Subtask> {
        self.subtasks.iter_mut().find(|s| s.id == subtask_id)
    }
}
