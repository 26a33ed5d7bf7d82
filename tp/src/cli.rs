//! CLI command definitions
//!
//! The command set is the entire surface the presentation layer gets: a
//! finite list of named operations on the store and the planner, with no
//! implicit dispatch anywhere.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use contextstore::ContextKind;
use taskstore::{Priority, TaskId};

/// taskpilot - personal task tracker with hybrid AI / rule-based planning
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Personal task tracker with hybrid AI / rule-based planning",
    version
)]
pub struct Cli {
    /// Path to settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for the task file, consent file, and logs
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a new task
    Add {
        /// Task text
        text: String,

        /// Priority (none, low, medium, high)
        #[arg(short, long, default_value = "none")]
        priority: Priority,

        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<NaiveDate>,

        /// Suggest a priority from due date and context before creating
        #[arg(long)]
        smart: bool,
    },

    /// List tasks with subtasks and progress
    List {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a subtask to a task
    Sub {
        /// Parent task id
        task: TaskId,

        /// Subtask text
        text: String,
    },

    /// Toggle completion of a task, or of one subtask
    Done {
        /// Task id
        task: TaskId,

        /// Toggle this subtask instead of the task itself
        #[arg(short, long)]
        subtask: Option<TaskId>,
    },

    /// Edit task or subtask text
    Edit {
        /// Task id
        task: TaskId,

        /// New text
        text: String,

        /// Edit this subtask instead of the task itself
        #[arg(short, long)]
        subtask: Option<TaskId>,
    },

    /// Set a task's priority by hand
    Priority {
        /// Task id
        task: TaskId,

        /// New level (none, low, medium, high)
        level: Priority,
    },

    /// Delete a task with all its subtasks, or one subtask
    Rm {
        /// Task id
        task: TaskId,

        /// Delete only this subtask
        #[arg(short, long)]
        subtask: Option<TaskId>,
    },

    /// Break a task into subtasks (AI when configured, rules otherwise)
    Plan {
        /// Task id
        task: TaskId,
    },

    /// Suggest and apply a priority for a task
    Suggest {
        /// Task id
        task: TaskId,
    },

    /// Ask the AI to analyze a task's complexity and effort
    Analyze {
        /// Task id
        task: TaskId,
    },

    /// Manage AI connection settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Grant access to a context integration (calendar, work)
    Connect {
        /// Integration kind
        kind: ContextKind,
    },

    /// Revoke access to a context integration
    Disconnect {
        /// Integration kind
        kind: ContextKind,
    },
}

/// Settings management subcommands
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the current settings (key redacted)
    Show,

    /// Update one or more settings fields
    Set {
        /// Azure OpenAI resource endpoint
        #[arg(long)]
        endpoint: Option<String>,

        /// API key
        #[arg(long)]
        api_key: Option<String>,

        /// Deployment/model name
        #[arg(long)]
        model: Option<String>,
    },

    /// Remove stored settings; planning reverts to rule-based
    Clear,

    /// Send a test request to the configured endpoint
    Test,
}

/// Output format for list-style commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
