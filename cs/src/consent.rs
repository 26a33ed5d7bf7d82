//! Persistent per-kind consent flags
//!
//! Consent is granted per [`ContextKind`] and persisted as a small JSON file,
//! so a revoked integration stays revoked across restarts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::types::ContextKind;

/// Errors from reading/writing the consent file
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("consent file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("consent file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConsentState {
    calendar: bool,
    work: bool,
}

/// Consent flags persisted per context kind
#[derive(Debug)]
pub struct ConsentLedger {
    path: PathBuf,
    state: ConsentState,
}

impl ConsentLedger {
    /// Open the ledger at `path`, starting with nothing granted when the
    /// file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContextError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            ConsentState::default()
        };
        debug!(path = %path.display(), "opened consent ledger");
        Ok(Self { path, state })
    }

    /// Is access to this kind currently granted?
    pub fn granted(&self, kind: ContextKind) -> bool {
        match kind {
            ContextKind::Calendar => self.state.calendar,
            ContextKind::Work => self.state.work,
        }
    }

    /// Grant access to a kind and persist the decision
    pub fn grant(&mut self, kind: ContextKind) -> Result<(), ContextError> {
        self.set(kind, true)
    }

    /// Revoke access to a kind and persist the decision
    pub fn revoke(&mut self, kind: ContextKind) -> Result<(), ContextError> {
        self.set(kind, false)
    }

    fn set(&mut self, kind: ContextKind, value: bool) -> Result<(), ContextError> {
        match kind {
            ContextKind::Calendar => self.state.calendar = value,
            ContextKind::Work => self.state.work = value,
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.state)?)?;
        debug!(%kind, value, "consent updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_nothing_granted() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ConsentLedger::open(dir.path().join("consent.json")).unwrap();
        assert!(!ledger.granted(ContextKind::Calendar));
        assert!(!ledger.granted(ContextKind::Work));
    }

    #[test]
    fn test_grant_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consent.json");

        let mut ledger = ConsentLedger::open(&path).unwrap();
        ledger.grant(ContextKind::Calendar).unwrap();

        let reopened = ConsentLedger::open(&path).unwrap();
        assert!(reopened.granted(ContextKind::Calendar));
        assert!(!reopened.granted(ContextKind::Work));
    }

    #[test]
    fn test_revoke() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consent.json");

        let mut ledger = ConsentLedger::open(&path).unwrap();
        ledger.grant(ContextKind::Work).unwrap();
        ledger.revoke(ContextKind::Work).unwrap();

        let reopened = ConsentLedger::open(&path).unwrap();
        assert!(!reopened.granted(ContextKind::Work));
    }
}
