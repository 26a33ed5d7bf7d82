//! Persistence backends for the task store
//!
//! The store itself never touches disk; callers hand a [`Snapshot`] to a
//! [`TaskRepository`] after each successful mutation. The JSON file backend
//! holds an advisory lock while reading/writing so two processes cannot
//! interleave partial writes.

use std::fs;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Task, TaskId};
use crate::error::StoreError;

fn default_next_id() -> TaskId {
    1
}

/// Everything the store needs to survive a restart: the tasks and the
/// monotonic id counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default = "default_next_id")]
    pub next_id: TaskId,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

/// Storage collaborator: load at startup, save after each mutation
pub trait TaskRepository: Send + Sync {
    fn load(&self) -> Result<Snapshot, StoreError>;
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// JSON file backend with fs2 advisory locking
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskRepository for JsonFileRepository {
    fn load(&self) -> Result<Snapshot, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no task file yet, starting empty");
            return Ok(Snapshot::default());
        }
        let mut file = fs::File::open(&self.path)?;
        FileExt::lock_shared(&file)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let snapshot = serde_json::from_str(&contents)?;
        debug!(path = %self.path.display(), "loaded task file");
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        FileExt::lock_exclusive(&file)?;
        let json = serde_json::to_string_pretty(snapshot)?;
        file.set_len(0)?;
        file.rewind()?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        debug!(path = %self.path.display(), tasks = snapshot.tasks.len(), "saved task file");
        Ok(())
    }
}

/// In-memory backend for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryRepository {
    snapshot: Mutex<Snapshot>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks currently held, mostly for test assertions
    pub fn task_count(&self) -> usize {
        self.snapshot.lock().map(|s| s.tasks.len()).unwrap_or(0)
    }
}

impl TaskRepository for MemoryRepository {
    fn load(&self) -> Result<Snapshot, StoreError> {
        Ok(self
            .snapshot
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Ok(mut guard) = self.snapshot.lock() {
            *guard = snapshot.clone();
        }
        Ok(())
    }
}
