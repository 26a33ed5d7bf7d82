//! Prompt templates for the AI gateway
//!
//! Kept as plain builders so the exact wire text is easy to test. The
//! decomposition prompt pins the output contract (JSON array, 3-5 entries)
//! hard enough that the lenient parser rarely has to fire.

use chrono::NaiveDate;
use contextstore::{CalendarContext, UserProfile, WorkContext};
use taskstore::Task;

/// Fixed template instructing the model to reply with ONLY a JSON array of
/// 3-5 short action strings
pub fn subtask_prompt(task_text: &str) -> String {
    format!(
        r#"You are a task planning assistant. Given a main task, break it down into actionable subtasks.

Main Task: "{task_text}"

Requirements:
- Provide exactly 3-5 specific, actionable subtasks (maximum 5)
- Each subtask should be a clear action item
- Keep subtasks concise (under 100 characters each)
- Return ONLY a JSON array of strings
- No explanations or additional text
- Do not exceed 5 subtasks

Example format: ["Subtask 1", "Subtask 2", "Subtask 3"]"#
    )
}

/// Context-aware prompt asking for a JSON object `{level, reason, confidence}`
pub fn priority_prompt(
    task: &Task,
    profile: &UserProfile,
    calendar: Option<&CalendarContext>,
    work: Option<&WorkContext>,
) -> String {
    let due = task
        .due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "Not set".to_string());

    let mut prompt = format!(
        r#"You are a smart task priority assistant. Analyze this task and suggest an appropriate priority level.

TASK DETAILS:
Task: "{}"
Due Date: {}
Subtasks: {} items

USER CONTEXT:
Role: {}
Department: {}
"#,
        task.text,
        due,
        task.subtasks.len(),
        profile.title,
        profile.department,
    );

    if let Some(calendar) = calendar {
        prompt.push_str(&format!(
            "Current workload: {} meetings this week\nUrgent items: {}\n",
            calendar.upcoming_meetings.len(),
            calendar.urgent_items,
        ));
    }
    if let Some(work) = work {
        prompt.push_str(&format!(
            "Active projects: {}\nUnread messages: {}\n",
            work.active_projects.len(),
            work.unread_messages,
        ));
    }

    prompt.push_str(
        r#"
PRIORITY LEVELS:
- high: Urgent, deadline-driven, business-critical
- medium: Important but not urgent, moderate impact
- low: Nice to have, low impact, flexible timing

Respond with ONLY a JSON object:
{
  "level": "high|medium|low",
  "reason": "Brief explanation for the priority level",
  "confidence": 0.8
}"#,
    );
    prompt
}

/// Compact prompt for the pre-creation smart-priority path: the model is
/// asked for a single word and the reply is parsed by substring search
pub fn smart_priority_prompt(
    task_text: &str,
    due_date: Option<NaiveDate>,
    calendar: Option<&CalendarContext>,
    work: Option<&WorkContext>,
    today: NaiveDate,
) -> String {
    let mut prompt = format!(
        "Analyze this task and suggest a priority (high/medium/low): \"{}\"",
        task_text
    );

    if let Some(due) = due_date {
        let days = (due - today).num_days();
        prompt.push_str(&format!("\nDue in {} days.", days));
    }

    if let Some(calendar) = calendar {
        prompt.push_str(&format!(
            "\nCalendar: {} meetings, {}.",
            calendar.upcoming_meetings.len(),
            if calendar.working_hours.in_working_hours {
                "work hours"
            } else {
                "after hours"
            }
        ));
    }

    if let Some(work) = work {
        prompt.push_str(&format!(
            "\nWork: {} projects, {} messages.",
            work.active_projects.len(),
            work.unread_messages
        ));
    }

    prompt.push_str("\nRespond with only: high, medium, or low");
    prompt
}

/// Freeform analysis prompt: complexity, effort, blockers, recommendations
pub fn analysis_prompt(task: &Task) -> String {
    let due = task
        .due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "Not set".to_string());

    format!(
        r#"Analyze this task and provide insights about its complexity, time requirements, and potential challenges.

Task: "{}"
Due Date: {}
Subtasks: {} items
Current Priority: {}

Provide a brief analysis (2-3 sentences) covering:
1. Task complexity assessment
2. Estimated effort/time required
3. Key dependencies or blockers
4. Recommendations for completion

Keep response concise and actionable."#,
        task.text,
        due,
        task.subtasks.len(),
        task.priority,
    )
}
