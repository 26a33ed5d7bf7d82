//! Core TaskStore implementation
//!
//! In-memory hierarchy of tasks and subtasks. All mutators are synchronous
//! and total: a missing id is reported through [`StoreError`] and leaves the
//! store unchanged. Persistence is the caller's job via [`crate::repo`].

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::domain::{Priority, Subtask, Task, TaskId};
use crate::error::StoreError;
use crate::repo::Snapshot;

/// In-memory task store owning the id counter.
///
/// Ids are handed out from a single monotonic counter shared by tasks and
/// subtasks; the counter travels with the snapshot so ids are never reused
/// across restarts.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: TaskId,
}

impl TaskStore {
    /// Create an empty store with the counter at 1
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild a store from a persisted snapshot.
    ///
    /// The counter is clamped to be strictly above every id already present,
    /// so a hand-edited task file cannot cause id reuse.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let max_id = snapshot
            .tasks
            .iter()
            .flat_map(|t| std::iter::once(t.id).chain(t.subtasks.iter().map(|s| s.id)))
            .max()
            .unwrap_or(0);
        Self {
            next_id: snapshot.next_id.max(max_id + 1),
            tasks: snapshot.tasks,
        }
    }

    /// Snapshot the current state for persistence
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            next_id: self.next_id,
        }
    }

    fn take_id(&mut self) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// All tasks in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Look up a task by id
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))
    }

    /// Create a task. Text is trimmed; empty text is rejected.
    pub fn create_task(
        &mut self,
        text: &str,
        priority: Priority,
        due_date: Option<NaiveDate>,
    ) -> Result<&Task, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        let id = self.take_id();
        debug!(id, "create_task");
        let idx = self.tasks.len();
        self.tasks.push(Task {
            id,
            text: text.to_string(),
            completed: false,
            priority,
            due_date,
            created_at: Utc::now(),
            ai_suggested_priority: false,
            subtasks: Vec::new(),
        });
        Ok(&self.tasks[idx])
    }

    /// Append a subtask to a task, preserving insertion order
    pub fn add_subtask(&mut self, task_id: TaskId, text: &str) -> Result<&Subtask, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        let task_idx = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or(StoreError::TaskNotFound(task_id))?;
        let id = self.take_id();
        debug!(task_id, subtask_id = id, "add_subtask");
        let task = &mut self.tasks[task_idx];
        let idx = task.subtasks.len();
        task.subtasks.push(Subtask {
            id,
            text: text.to_string(),
            completed: false,
        });
        Ok(&self.tasks[task_idx].subtasks[idx])
    }

    /// Flip a task's completion flag.
    ///
    /// Completing a task cascades down and marks every subtask complete;
    /// un-completing does not touch subtasks, and completing all subtasks
    /// individually never completes the parent.
    pub fn toggle_task_complete(&mut self, task_id: TaskId) -> Result<bool, StoreError> {
        let task = self.task_mut(task_id)?;
        task.completed = !task.completed;
        if task.completed {
            for subtask in &mut task.subtasks {
                subtask.completed = true;
            }
        }
        debug!(task_id, completed = task.completed, "toggle_task_complete");
        Ok(task.completed)
    }

    /// Flip one subtask's completion flag. Never touches the parent flag.
    pub fn toggle_subtask_complete(
        &mut self,
        task_id: TaskId,
        subtask_id: TaskId,
    ) -> Result<bool, StoreError> {
        let task = self.task_mut(task_id)?;
        let subtask = task
            .subtask_mut(subtask_id)
            .ok_or(StoreError::SubtaskNotFound {
                task: task_id,
                subtask: subtask_id,
            })?;
        subtask.completed = !subtask.completed;
        Ok(subtask.completed)
    }

    /// Replace a task's text. Empty text after trim is a rejected no-op and
    /// the original value is retained.
    pub fn edit_task_text(&mut self, task_id: TaskId, text: &str) -> Result<(), StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        let task = self.task_mut(task_id)?;
        task.text = text.to_string();
        Ok(())
    }

    /// Replace a subtask's text, same trim/reject rules as tasks
    pub fn edit_subtask_text(
        &mut self,
        task_id: TaskId,
        subtask_id: TaskId,
        text: &str,
    ) -> Result<(), StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        let task = self.task_mut(task_id)?;
        let subtask = task
            .subtask_mut(subtask_id)
            .ok_or(StoreError::SubtaskNotFound {
                task: task_id,
                subtask: subtask_id,
            })?;
        subtask.text = text.to_string();
        Ok(())
    }

    /// Set the priority through the user path: clears the AI-suggested flag,
    /// so ownership of "why is this priority set" stays explicit.
    pub fn set_priority(&mut self, task_id: TaskId, priority: Priority) -> Result<(), StoreError> {
        let task = self.task_mut(task_id)?;
        task.priority = priority;
        task.ai_suggested_priority = false;
        Ok(())
    }

    /// Set the priority from an AI/heuristic suggestion and mark it as such
    pub fn set_ai_priority(&mut self, task_id: TaskId, priority: Priority) -> Result<(), StoreError> {
        let task = self.task_mut(task_id)?;
        task.priority = priority;
        task.ai_suggested_priority = true;
        Ok(())
    }

    /// Delete a task atomically with all of its subtasks
    pub fn delete_task(&mut self, task_id: TaskId) -> Result<Task, StoreError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or(StoreError::TaskNotFound(task_id))?;
        debug!(task_id, "delete_task");
        Ok(self.tasks.remove(idx))
    }

    /// Delete one subtask, leaving its siblings and parent untouched
    pub fn delete_subtask(&mut self, task_id: TaskId, subtask_id: TaskId) -> Result<Subtask, StoreError> {
        let task = self.task_mut(task_id)?;
        let idx = task
            .subtasks
            .iter()
            .position(|s| s.id == subtask_id)
            .ok_or(StoreError::SubtaskNotFound {
                task: task_id,
                subtask: subtask_id,
            })?;
        Ok(task.subtasks.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn store_with_task() -> (TaskStore, TaskId) {
        let mut store = TaskStore::new();
        let id = store
            .create_task("Write report", Priority::None, None)
            .unwrap()
            .id;
        (store, id)
    }

    #[test]
    fn test_create_task_trims_and_rejects_empty() {
        let mut store = TaskStore::new();
        let task = store.create_task("  hello  ", Priority::Low, None).unwrap();
        assert_eq!(task.text, "hello");
        assert!(matches!(
            store.create_task("   ", Priority::None, None),
            Err(StoreError::EmptyText)
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_are_global_and_monotonic() {
        let (mut store, t1) = store_with_task();
        let s1 = store.add_subtask(t1, "step one").unwrap().id;
        let s2 = store.add_subtask(t1, "step two").unwrap().id;
        let t2 = store.create_task("Another", Priority::None, None).unwrap().id;
        assert!(t1 < s1 && s1 < s2 && s2 < t2);
    }

    #[test]
    fn test_completion_cascades_down() {
        let (mut store, id) = store_with_task();
        store.add_subtask(id, "a").unwrap();
        store.add_subtask(id, "b").unwrap();

        assert!(store.toggle_task_complete(id).unwrap());
        let task = store.task(id).unwrap();
        assert!(task.completed);
        assert!(task.subtasks.iter().all(|s| s.completed));
    }

    #[test]
    fn test_cascade_is_one_directional() {
        let (mut store, id) = store_with_task();
        let a = store.add_subtask(id, "a").unwrap().id;
        let b = store.add_subtask(id, "b").unwrap().id;

        store.toggle_subtask_complete(id, a).unwrap();
        store.toggle_subtask_complete(id, b).unwrap();

        // all subtasks done, parent still open
        let task = store.task(id).unwrap();
        assert!(task.subtasks.iter().all(|s| s.completed));
        assert!(!task.completed);
        assert_eq!(task.progress(), 100);
    }

    #[test]
    fn test_uncomplete_leaves_subtasks_alone() {
        let (mut store, id) = store_with_task();
        store.add_subtask(id, "a").unwrap();
        store.toggle_task_complete(id).unwrap();
        assert!(!store.toggle_task_complete(id).unwrap());
        // subtask stays completed from the cascade
        assert!(store.task(id).unwrap().subtasks[0].completed);
    }

    #[test]
    fn test_missing_ids_are_reported_not_panicked() {
        let mut store = TaskStore::new();
        assert!(matches!(
            store.toggle_task_complete(42),
            Err(StoreError::TaskNotFound(42))
        ));
        let (mut store, id) = store_with_task();
        assert!(matches!(
            store.toggle_subtask_complete(id, 99),
            Err(StoreError::SubtaskNotFound { subtask: 99, .. })
        ));
    }

    #[test]
    fn test_edit_empty_is_a_noop() {
        let (mut store, id) = store_with_task();
        assert!(matches!(
            store.edit_task_text(id, "   "),
            Err(StoreError::EmptyText)
        ));
        assert_eq!(store.task(id).unwrap().text, "Write report");

        store.edit_task_text(id, " new text ").unwrap();
        assert_eq!(store.task(id).unwrap().text, "new text");
    }

    #[test]
    fn test_manual_priority_clears_ai_flag() {
        let (mut store, id) = store_with_task();
        store.set_ai_priority(id, Priority::High).unwrap();
        assert!(store.task(id).unwrap().ai_suggested_priority);

        store.set_priority(id, Priority::Low).unwrap();
        let task = store.task(id).unwrap();
        assert_eq!(task.priority, Priority::Low);
        assert!(!task.ai_suggested_priority);
    }

    #[test]
    fn test_delete_task_removes_subtasks_atomically() {
        let (mut store, id) = store_with_task();
        store.add_subtask(id, "a").unwrap();
        let removed = store.delete_task(id).unwrap();
        assert_eq!(removed.subtasks.len(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_subtask() {
        let (mut store, id) = store_with_task();
        let a = store.add_subtask(id, "a").unwrap().id;
        store.add_subtask(id, "b").unwrap();
        store.delete_subtask(id, a).unwrap();
        let task = store.task(id).unwrap();
        assert_eq!(task.subtasks.len(), 1);
        assert_eq!(task.subtasks[0].text, "b");
    }

    #[test]
    fn test_snapshot_round_trip_preserves_counter() {
        let (mut store, id) = store_with_task();
        store.add_subtask(id, "a").unwrap();
        let snapshot = store.snapshot();

        let mut restored = TaskStore::from_snapshot(snapshot);
        let next = restored.create_task("later", Priority::None, None).unwrap().id;
        assert!(next > id + 1);
    }

    #[test]
    fn test_from_snapshot_clamps_stale_counter() {
        let (store, id) = store_with_task();
        let mut snapshot = store.snapshot();
        snapshot.next_id = 1; // pretend the counter was lost
        let mut restored = TaskStore::from_snapshot(snapshot);
        let new_id = restored.create_task("fresh", Priority::None, None).unwrap().id;
        assert!(new_id > id);
    }

    proptest! {
        #[test]
        fn prop_progress_in_bounds(flags in proptest::collection::vec(any::<bool>(), 0..12)) {
            let mut store = TaskStore::new();
            let id = store.create_task("prop task", Priority::None, None).unwrap().id;
            for (i, flag) in flags.iter().enumerate() {
                let sid = store.add_subtask(id, &format!("s{}", i)).unwrap().id;
                if *flag {
                    store.toggle_subtask_complete(id, sid).unwrap();
                }
            }
            let progress = store.task(id).unwrap().progress();
            prop_assert!(progress <= 100);
            if flags.is_empty() {
                prop_assert_eq!(progress, 0);
            }
        }

        #[test]
        fn prop_cascade_always_completes_children(n in 1usize..8) {
            let mut store = TaskStore::new();
            let id = store.create_task("prop task", Priority::None, None).unwrap().id;
            for i in 0..n {
                store.add_subtask(id, &format!("s{}", i)).unwrap();
            }
            store.toggle_task_complete(id).unwrap();
            let task = store.task(id).unwrap();
            prop_assert!(task.subtasks.iter().all(|s| s.completed));
            prop_assert_eq!(task.progress(), 100);
        }
    }
}
