//! Context types surfaced to the planner

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kinds of context a user can grant access to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Calendar,
    Work,
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Calendar => write!(f, "calendar"),
            Self::Work => write!(f, "work"),
        }
    }
}

impl std::str::FromStr for ContextKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calendar" => Ok(Self::Calendar),
            "work" | "teams" => Ok(Self::Work),
            _ => Err(format!("Unknown context kind: {} (expected calendar or work)", s)),
        }
    }
}

/// An upcoming calendar entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub title: String,
    pub start: DateTime<Utc>,
}

/// Where the user is relative to their working day
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorkingHours {
    pub in_working_hours: bool,
    pub hours_until_end_of_day: i64,
}

/// Schedule context from the (mock) calendar integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarContext {
    pub upcoming_meetings: Vec<Meeting>,
    pub urgent_items: u32,
    pub working_hours: WorkingHours,
}

/// A project deadline from the (mock) work integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deadline {
    pub project: String,
    pub due: DateTime<Utc>,
}

/// Workload context from the (mock) work integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkContext {
    pub active_projects: Vec<String>,
    pub unread_messages: u32,
    pub upcoming_deadlines: Vec<Deadline>,
}

/// Who the user is, used to flavor priority prompts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub title: String,
    pub department: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            title: "Software Developer".to_string(),
            department: "Engineering".to_string(),
        }
    }
}
