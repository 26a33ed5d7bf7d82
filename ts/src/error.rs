//! Store error types

use thiserror::Error;

use crate::domain::TaskId;

/// Errors from store mutators and the persistence backends.
///
/// Mutators are total: a missing id yields `TaskNotFound`/`SubtaskNotFound`
/// and the store is left untouched, never poisoned.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("subtask {subtask} not found on task {task}")]
    SubtaskNotFound { task: TaskId, subtask: TaskId },

    #[error("text is empty after trimming")]
    EmptyText,

    #[error("task file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("task file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// True for the validation errors that leave the store untouched
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::TaskNotFound(_) | StoreError::SubtaskNotFound { .. } | StoreError::EmptyText
        )
    }
}
