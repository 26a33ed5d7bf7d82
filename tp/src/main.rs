//! taskpilot - personal task tracker with hybrid AI / rule-based planning
//!
//! CLI entry point. Every subcommand is one named operation on the store or
//! the planner; mutating commands save a snapshot before printing.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::debug;

use contextstore::{ConsentLedger, ContextKind, MockProvider};
use taskstore::{JsonFileRepository, Priority, Task, TaskId, TaskRepository, TaskStore};

use taskpilot::cli::{Cli, Command, OutputFormat, SettingsCommand};
use taskpilot::config::{self, Settings};
use taskpilot::llm::create_gateway;
use taskpilot::planner::{PlanError, Planner};

fn setup_logging(data_dir: &Path, cli_log_level: Option<&str>) -> Result<()> {
    let log_path = config::log_path(data_dir);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }

    let level = match cli_log_level {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            other => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(config::default_data_dir);
    setup_logging(&data_dir, cli.log_level.as_deref()).context("Failed to setup logging")?;

    let settings = Settings::load(cli.config.as_ref()).context("Failed to load settings")?;
    debug!(configured = settings.is_configured(), "settings loaded");

    match cli.command {
        Command::Add {
            text,
            priority,
            due,
            smart,
        } => cmd_add(&data_dir, &settings, &text, priority, due, smart).await,
        Command::List { format } => cmd_list(&data_dir, format),
        Command::Sub { task, text } => cmd_sub(&data_dir, task, &text),
        Command::Done { task, subtask } => cmd_done(&data_dir, task, subtask),
        Command::Edit {
            task,
            text,
            subtask,
        } => cmd_edit(&data_dir, task, &text, subtask),
        Command::Priority { task, level } => cmd_priority(&data_dir, task, level),
        Command::Rm { task, subtask } => cmd_rm(&data_dir, task, subtask),
        Command::Plan { task } => cmd_plan(&data_dir, &settings, task).await,
        Command::Suggest { task } => cmd_suggest(&data_dir, &settings, task).await,
        Command::Analyze { task } => cmd_analyze(&data_dir, &settings, task).await,
        Command::Settings { command } => cmd_settings(cli.config.as_ref(), &settings, command).await,
        Command::Connect { kind } => cmd_consent(&data_dir, kind, true),
        Command::Disconnect { kind } => cmd_consent(&data_dir, kind, false),
    }
}

fn open_store(data_dir: &Path) -> Result<(JsonFileRepository, TaskStore)> {
    let repo = JsonFileRepository::new(config::tasks_path(data_dir));
    let snapshot = repo.load().context("Failed to load task file")?;
    Ok((repo, TaskStore::from_snapshot(snapshot)))
}

fn open_provider(data_dir: &Path) -> Result<MockProvider> {
    let ledger =
        ConsentLedger::open(config::consent_path(data_dir)).context("Failed to open consent file")?;
    Ok(MockProvider::new(ledger))
}

fn save(repo: &JsonFileRepository, store: &TaskStore) -> Result<()> {
    repo.save(&store.snapshot()).context("Failed to save task file")
}

async fn cmd_add(
    data_dir: &Path,
    settings: &Settings,
    text: &str,
    priority: Priority,
    due: Option<NaiveDate>,
    smart: bool,
) -> Result<()> {
    let (repo, mut store) = open_store(data_dir)?;

    let suggested = if smart {
        let provider = open_provider(data_dir)?;
        let gateway = create_gateway(settings);
        let planner = Planner::new(&mut store, &repo, &provider, gateway);
        Some(planner.suggest_smart_priority(text, due).await)
    } else {
        None
    };

    let id = match store.create_task(text, suggested.unwrap_or(priority), due) {
        Ok(task) => task.id,
        Err(e) => {
            eprintln!("Cannot add task: {}", e);
            return Ok(());
        }
    };
    if let Some(level) = suggested {
        store.set_ai_priority(id, level)?;
    }
    save(&repo, &store)?;

    println!("Added task #{}", id);
    if let Some(level) = suggested {
        println!(
            "Priority set to {} (suggested)",
            level.to_string().to_uppercase()
        );
    }
    Ok(())
}

fn priority_tag(priority: Priority) -> String {
    match priority {
        Priority::High => "high".red().bold().to_string(),
        Priority::Medium => "medium".yellow().to_string(),
        Priority::Low => "low".green().to_string(),
        Priority::None => "-".dimmed().to_string(),
    }
}

fn render_task(task: &Task) {
    let checkbox = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{} #{:<3} {:<8} {}",
        checkbox,
        task.id,
        priority_tag(task.priority),
        task.text
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!("  (due {})", due));
    }
    if task.ai_suggested_priority {
        line.push_str(&format!("  {}", "AI".cyan()));
    }
    line.push_str(&format!("  {}%", task.progress()));
    println!("{}", line);

    for subtask in &task.subtasks {
        let checkbox = if subtask.completed { "[x]" } else { "[ ]" };
        println!("    {} #{:<3} {}", checkbox, subtask.id, subtask.text);
    }
}

fn cmd_list(data_dir: &Path, format: OutputFormat) -> Result<()> {
    let (_repo, store) = open_store(data_dir)?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(store.tasks())?);
        }
        OutputFormat::Text => {
            if store.is_empty() {
                println!("No tasks yet. Add your first with: tp add \"...\"");
                return Ok(());
            }
            for task in store.tasks() {
                render_task(task);
            }
        }
    }
    Ok(())
}

fn cmd_sub(data_dir: &Path, task: TaskId, text: &str) -> Result<()> {
    let (repo, mut store) = open_store(data_dir)?;
    match store.add_subtask(task, text) {
        Ok(subtask) => {
            let id = subtask.id;
            save(&repo, &store)?;
            println!("Added subtask #{} to task #{}", id, task);
        }
        Err(e) if e.is_validation() => eprintln!("Cannot add subtask: {}", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn cmd_done(data_dir: &Path, task: TaskId, subtask: Option<TaskId>) -> Result<()> {
    let (repo, mut store) = open_store(data_dir)?;
    let result = match subtask {
        Some(sid) => store.toggle_subtask_complete(task, sid),
        None => store.toggle_task_complete(task),
    };
    match result {
        Ok(completed) => {
            save(&repo, &store)?;
            println!("{}", if completed { "Completed" } else { "Reopened" });
        }
        Err(e) if e.is_validation() => eprintln!("{}", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn cmd_edit(data_dir: &Path, task: TaskId, text: &str, subtask: Option<TaskId>) -> Result<()> {
    let (repo, mut store) = open_store(data_dir)?;
    let result = match subtask {
        Some(sid) => store.edit_subtask_text(task, sid, text),
        None => store.edit_task_text(task, text),
    };
    match result {
        Ok(()) => {
            save(&repo, &store)?;
            println!("Updated");
        }
        Err(e) if e.is_validation() => eprintln!("Cannot edit: {}", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn cmd_priority(data_dir: &Path, task: TaskId, level: Priority) -> Result<()> {
    let (repo, mut store) = open_store(data_dir)?;
    match store.set_priority(task, level) {
        Ok(()) => {
            save(&repo, &store)?;
            println!("Priority set to {}", level);
        }
        Err(e) if e.is_validation() => eprintln!("{}", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn cmd_rm(data_dir: &Path, task: TaskId, subtask: Option<TaskId>) -> Result<()> {
    let (repo, mut store) = open_store(data_dir)?;
    let result = match subtask {
        Some(sid) => store.delete_subtask(task, sid).map(|s| s.text),
        None => store.delete_task(task).map(|t| t.text),
    };
    match result {
        Ok(text) => {
            save(&repo, &store)?;
            println!("Deleted: {}", text);
        }
        Err(e) if e.is_validation() => eprintln!("{}", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn cmd_plan(data_dir: &Path, settings: &Settings, task: TaskId) -> Result<()> {
    let (repo, mut store) = open_store(data_dir)?;
    let provider = open_provider(data_dir)?;
    let gateway = create_gateway(settings);

    let mut planner = Planner::new(&mut store, &repo, &provider, gateway);
    let outcome = planner.plan_task(task).await;

    match outcome {
        Ok(report) if report.added > 0 => {
            println!(
                "{} planning complete! Added {} subtasks.",
                report.method, report.added
            );
            if let Some(task) = store.task(task) {
                for subtask in task.subtasks.iter().rev().take(report.added).rev() {
                    println!("    [ ] #{:<3} {}", subtask.id, subtask.text);
                }
            }
        }
        Ok(_) => println!("No subtasks were generated. Please try again."),
        Err(PlanError::TaskNotFound(id)) => eprintln!("task {} not found", id),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn cmd_suggest(data_dir: &Path, settings: &Settings, task: TaskId) -> Result<()> {
    let (repo, mut store) = open_store(data_dir)?;
    let provider = open_provider(data_dir)?;
    let gateway = create_gateway(settings);

    let mut planner = Planner::new(&mut store, &repo, &provider, gateway);
    match planner.suggest_priority(task).await {
        Ok(report) => {
            println!(
                "Priority set to {} ({})",
                report.level.to_string().to_uppercase(),
                report.method
            );
            if let Some(reason) = report.reason {
                println!("Reason: {}", reason);
            }
        }
        Err(PlanError::TaskNotFound(id)) => eprintln!("task {} not found", id),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn cmd_analyze(data_dir: &Path, settings: &Settings, task: TaskId) -> Result<()> {
    let (repo, mut store) = open_store(data_dir)?;
    let provider = open_provider(data_dir)?;
    let gateway = create_gateway(settings);

    let planner = Planner::new(&mut store, &repo, &provider, gateway);
    match planner.analyze_task(task).await {
        Ok(analysis) => println!("{}", analysis),
        Err(PlanError::TaskNotFound(id)) => eprintln!("task {} not found", id),
        Err(PlanError::NotConfigured) => {
            eprintln!("AI settings not configured. Set endpoint and api-key with: tp settings set");
        }
        Err(PlanError::Ai(e)) => eprintln!("Analysis failed: {}", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn cmd_settings(
    config_path: Option<&std::path::PathBuf>,
    settings: &Settings,
    command: SettingsCommand,
) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            println!("endpoint: {}", if settings.endpoint.is_empty() { "(not set)" } else { &settings.endpoint });
            println!(
                "api-key:  {}",
                if settings.api_key.is_empty() { "(not set)" } else { "(redacted)" }
            );
            println!("model:    {}", settings.model);
            println!(
                "AI planning: {}",
                if settings.is_configured() { "enabled" } else { "disabled (rule-based only)" }
            );
        }
        SettingsCommand::Set {
            endpoint,
            api_key,
            model,
        } => {
            let mut updated = settings.clone();
            if let Some(endpoint) = endpoint {
                updated.endpoint = endpoint.trim().to_string();
            }
            if let Some(api_key) = api_key {
                updated.api_key = api_key.trim().to_string();
            }
            if let Some(model) = model {
                let model = model.trim();
                updated.model = if model.is_empty() {
                    config::DEFAULT_MODEL.to_string()
                } else {
                    model.to_string()
                };
            }
            let path = updated.save(config_path)?;
            println!("Settings saved to {}", path.display());
        }
        SettingsCommand::Clear => {
            let path = Settings::clear(config_path)?;
            println!(
                "Settings cleared ({}). Planning will use rule-based features.",
                path.display()
            );
        }
        SettingsCommand::Test => match create_gateway(settings) {
            None => eprintln!("Please set both endpoint and api-key first."),
            Some(gateway) => match gateway.request_freeform("Test connection").await {
                Ok(_) => println!("Connection successful!"),
                Err(e) => eprintln!("Connection failed: {}", e),
            },
        },
    }
    Ok(())
}

fn cmd_consent(data_dir: &Path, kind: ContextKind, grant: bool) -> Result<()> {
    let mut ledger =
        ConsentLedger::open(config::consent_path(data_dir)).context("Failed to open consent file")?;
    if grant {
        ledger.grant(kind).context("Failed to save consent")?;
        println!("{} connected successfully!", kind);
    } else {
        ledger.revoke(kind).context("Failed to save consent")?;
        println!("{} disconnected", kind);
    }
    Ok(())
}
