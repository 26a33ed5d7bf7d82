//! Rule-based priority scoring
//!
//! Additive heuristic over due-date proximity, contextual load, and urgency
//! keywords. Pure given a fixed `today` reference, so tests pin the date.

use chrono::NaiveDate;
use contextstore::{CalendarContext, WorkContext};
use taskstore::Priority;

const BASELINE: i32 = 50;
const HIGH_THRESHOLD: i32 = 70;
const LOW_THRESHOLD: i32 = 30;

const URGENCY_KEYWORDS: &[&str] = &["urgent", "asap", "critical", "emergency"];

/// Raw additive score before mapping to a level.
///
/// Adjustments apply in fixed order: due-date urgency, working hours,
/// unread load, urgency keywords. Absent context contributes nothing.
pub fn score_points(
    task_text: &str,
    due_date: Option<NaiveDate>,
    calendar: Option<&CalendarContext>,
    work: Option<&WorkContext>,
    today: NaiveDate,
) -> i32 {
    let mut score = BASELINE;

    if let Some(due) = due_date {
        let days_until_due = (due - today).num_days();
        if days_until_due <= 1 {
            score += 30;
        } else if days_until_due <= 3 {
            score += 20;
        } else if days_until_due <= 7 {
            score += 10;
        }
    }

    if let Some(calendar) = calendar
        && !calendar.working_hours.in_working_hours
    {
        score -= 10;
    }

    if let Some(work) = work
        && work.unread_messages > 10
    {
        score += 10;
    }

    let text = task_text.to_lowercase();
    if URGENCY_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
        score += 25;
    }

    score
}

/// Score a task and map to a level: >= 70 high, <= 30 low, else medium
pub fn score(
    task_text: &str,
    due_date: Option<NaiveDate>,
    calendar: Option<&CalendarContext>,
    work: Option<&WorkContext>,
    today: NaiveDate,
) -> Priority {
    let points = score_points(task_text, due_date, calendar, work, today);
    if points >= HIGH_THRESHOLD {
        Priority::High
    } else if points <= LOW_THRESHOLD {
        Priority::Low
    } else {
        Priority::Medium
    }
}
