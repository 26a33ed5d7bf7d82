//! Defensive parsing of model output
//!
//! Models are told exactly what to return and regularly return something
//! else. Every parser here is total: the worst outcome is an empty list or
//! `None`, never a panic or an exception-driven control path.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use taskstore::Priority;

/// Hard cap on subtasks taken from one model reply
pub const MAX_SUBTASKS: usize = 5;

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*•]\s*").expect("bullet pattern compiles"));
static ENUMERATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("enumeration pattern compiles"));

/// Outcome of the strict-then-lenient subtask parse, tagged with which stage
/// produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtaskParse {
    /// Stage 1: the content was a strict JSON array of strings
    Json(Vec<String>),
    /// Stage 2: recovered line-by-line from free text
    Lines(Vec<String>),
}

impl SubtaskParse {
    pub fn items(&self) -> &[String] {
        match self {
            SubtaskParse::Json(items) | SubtaskParse::Lines(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<String> {
        match self {
            SubtaskParse::Json(items) | SubtaskParse::Lines(items) => items,
        }
    }

    /// True when stage 1 (strict JSON) succeeded
    pub fn is_strict(&self) -> bool {
        matches!(self, SubtaskParse::Json(_))
    }
}

/// Parse model output into at most [`MAX_SUBTASKS`] subtask strings.
///
/// Stage 1 parses the whole content as a JSON string array. Stage 2 salvages
/// free text: drops empty lines and JSON array delimiter lines, strips
/// bullet markers, `1.`-style enumeration prefixes, and surrounding quotes.
pub fn subtask_list(content: &str) -> SubtaskParse {
    if let Ok(items) = serde_json::from_str::<Vec<String>>(content.trim()) {
        debug!(count = items.len(), "subtask_list: strict JSON parse");
        return SubtaskParse::Json(items.into_iter().take(MAX_SUBTASKS).collect());
    }

    let items: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('[') && !line.starts_with(']'))
        .map(strip_line_decorations)
        .filter(|line| !line.is_empty())
        .take(MAX_SUBTASKS)
        .collect();
    debug!(count = items.len(), "subtask_list: lenient line parse");
    SubtaskParse::Lines(items)
}

fn strip_line_decorations(line: &str) -> String {
    let line = BULLET_RE.replace(line, "");
    let line = ENUMERATION_RE.replace(&line, "");
    let mut line = line.as_ref();
    if let Some(rest) = line.strip_prefix(['"', '\'']) {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix(['"', '\'']) {
        line = rest;
    }
    line.trim().to_string()
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    level: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    confidence: Option<f64>,
}

/// A structured priority suggestion recovered from model output
#[derive(Debug, Clone, PartialEq)]
pub struct PrioritySuggestion {
    pub level: Priority,
    pub reason: String,
    pub confidence: Option<f64>,
}

/// Extract a `{level, reason, confidence}` suggestion from anywhere in the
/// reply text.
///
/// Takes the first balanced-brace substring, parses it as JSON, and rejects
/// any level outside low/medium/high. Returns `None` on every failure.
pub fn priority_suggestion(content: &str) -> Option<PrioritySuggestion> {
    let object = first_json_object(content)?;
    let raw: RawSuggestion = serde_json::from_str(object).ok()?;
    let level = match raw.level.to_lowercase().as_str() {
        "low" => Priority::Low,
        "medium" => Priority::Medium,
        "high" => Priority::High,
        other => {
            debug!(level = %other, "priority_suggestion: level out of range");
            return None;
        }
    };
    Some(PrioritySuggestion {
        level,
        reason: raw.reason,
        confidence: raw.confidence,
    })
}

/// First balanced `{...}` substring in the text, if any.
///
/// Braces inside JSON strings are not special-cased; the suggestion prompt
/// asks for a flat object and a miscount just means `None`.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Single-word priority parse for the smart-priority path: substring search
/// for `high`, then `low`, defaulting to medium
pub fn priority_word(content: &str) -> Priority {
    let text = content.to_lowercase();
    if text.contains("high") {
        Priority::High
    } else if text.contains("low") {
        Priority::Low
    } else {
        Priority::Medium
    }
}
