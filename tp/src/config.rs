//! AI connection settings and file locations

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default Azure OpenAI deployment name
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Connection settings for the AI gateway.
///
/// The AI path is optional: with an empty endpoint or key the planner runs
/// purely on the rule-based fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Azure OpenAI resource endpoint, e.g. https://myresource.openai.azure.com
    pub endpoint: String,

    #[serde(rename = "api-key")]
    pub api_key: String,

    /// Deployment/model name
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Settings {
    /// AI is configured iff both endpoint and key are non-empty
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.api_key.trim().is_empty()
    }

    /// Load settings with fallback chain: explicit path, project-local
    /// `.taskpilot.yml`, user config dir, then defaults (AI disabled).
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load settings from {}", path.display()));
        }

        let local = PathBuf::from(".taskpilot.yml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(settings) => return Ok(settings),
                Err(e) => {
                    warn!("Failed to load settings from {}: {}", local.display(), e);
                }
            }
        }

        let user = Self::user_config_path();
        if user.exists() {
            match Self::load_from_file(&user) {
                Ok(settings) => return Ok(settings),
                Err(e) => {
                    warn!("Failed to load settings from {}: {}", user.display(), e);
                }
            }
        }

        debug!("No settings file found, AI planning disabled");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read settings file")?;
        let settings: Self = serde_yaml::from_str(&content).context("Failed to parse settings file")?;
        info!("Loaded settings from: {}", path.as_ref().display());
        Ok(settings)
    }

    /// Persist settings to the explicit path or the user config file.
    /// Returns the path written.
    pub fn save(&self, config_path: Option<&PathBuf>) -> Result<PathBuf> {
        let path = config_path.cloned().unwrap_or_else(Self::user_config_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        let yaml = serde_yaml::to_string(self).context("Failed to serialize settings")?;
        fs::write(&path, yaml).context(format!("Failed to write {}", path.display()))?;
        info!("Saved settings to: {}", path.display());
        Ok(path)
    }

    /// Remove the stored settings file, reverting to rule-based planning.
    /// Missing file is fine; returns the path that was cleared.
    pub fn clear(config_path: Option<&PathBuf>) -> Result<PathBuf> {
        let path = config_path.cloned().unwrap_or_else(Self::user_config_path);
        if path.exists() {
            fs::remove_file(&path).context(format!("Failed to remove {}", path.display()))?;
            info!("Cleared settings at: {}", path.display());
        }
        Ok(path)
    }

    /// `~/.config/taskpilot/settings.yml` (platform equivalent)
    pub fn user_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskpilot")
            .join("settings.yml")
    }
}

/// Default data directory for the task file, consent file, and logs
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskpilot")
}

pub fn tasks_path(data_dir: &Path) -> PathBuf {
    data_dir.join("tasks.json")
}

pub fn consent_path(data_dir: &Path) -> PathBuf {
    data_dir.join("consent.json")
}

pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("logs").join("taskpilot.log")
}
