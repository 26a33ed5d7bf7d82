//! Rule-based subtask generation
//!
//! A fixed decision list, not a scored classifier: pattern groups are scanned
//! in declaration order and the first group with any keyword appearing as a
//! substring of the lowercased task text wins. Group order is part of the
//! contract and must stay exactly as-is for reproducible plans.

/// Generated plans are capped at this many steps
pub const MAX_GENERATED_STEPS: usize = 4;

struct PatternGroup {
    keywords: &'static [&'static str],
    template: &'static [&'static str],
}

const PATTERN_GROUPS: &[PatternGroup] = &[
    PatternGroup {
        keywords: &["website", "web app", "site", "webpage"],
        template: &[
            "Plan website structure and features",
            "Design user interface and layout",
            "Develop core functionality",
            "Test and debug",
            "Deploy and launch",
        ],
    },
    PatternGroup {
        keywords: &["presentation", "present", "pitch", "demo"],
        template: &[
            "Research topic and gather data",
            "Create presentation outline",
            "Design slides and visuals",
            "Practice presentation delivery",
            "Prepare for questions and feedback",
        ],
    },
    PatternGroup {
        keywords: &["report", "document", "write", "paper", "essay"],
        template: &[
            "Research and gather information",
            "Create document outline",
            "Write first draft",
            "Review and edit content",
            "Finalize formatting and submit",
        ],
    },
    PatternGroup {
        keywords: &["meeting", "conference", "event", "workshop"],
        template: &[
            "Set agenda and objectives",
            "Invite participants and book venue",
            "Prepare materials and resources",
            "Conduct meeting/event",
            "Follow up with action items",
        ],
    },
    PatternGroup {
        keywords: &["learn", "study", "course", "training", "skill"],
        template: &[
            "Identify learning resources",
            "Create study schedule",
            "Complete core learning modules",
            "Practice with exercises",
            "Review and test knowledge",
        ],
    },
    PatternGroup {
        keywords: &["app", "application", "software", "program"],
        template: &[
            "Define requirements and features",
            "Design architecture and UI",
            "Implement core functionality",
            "Test and debug thoroughly",
            "Deploy and maintain",
        ],
    },
    PatternGroup {
        keywords: &["budget", "financial", "money", "expense"],
        template: &[
            "Gather financial data",
            "Analyze current spending",
            "Create budget plan",
            "Implement tracking system",
            "Review and adjust monthly",
        ],
    },
    PatternGroup {
        keywords: &["project", "plan", "organize"],
        template: &[
            "Define project scope and goals",
            "Break down into phases",
            "Assign resources and timeline",
            "Execute planned activities",
            "Monitor progress and adjust",
        ],
    },
    PatternGroup {
        keywords: &["research", "investigate", "analyze"],
        template: &[
            "Define research questions",
            "Gather relevant sources",
            "Analyze and synthesize data",
            "Draw conclusions",
            "Document findings",
        ],
    },
];

const ACTION_VERBS: &[&str] = &[
    "complete", "finish", "do", "make", "create", "build", "develop", "implement",
];

const GENERIC_BREAKDOWN: [&str; 4] = [
    "Plan approach and gather requirements",
    "Collect necessary resources and tools",
    "Execute main work in phases",
    "Review, test and finalize",
];

const COMPLEX_BREAKDOWN: [&str; 4] = [
    "Break down into smaller components",
    "Research and prepare thoroughly",
    "Execute step by step",
    "Review and refine results",
];

const SIMPLE_BREAKDOWN: [&str; 4] = [
    "Plan and prepare",
    "Start implementation",
    "Complete main work",
    "Review and finalize",
];

/// Tasks longer than this with no keyword match get the complex breakdown
const COMPLEX_TEXT_LEN: usize = 50;

/// Produce an ordered subtask plan for a task description.
///
/// Pure function: identical input text always yields the identical sequence,
/// 1 to 4 entries long.
pub fn generate(task_text: &str) -> Vec<String> {
    let text = task_text.to_lowercase();

    for group in PATTERN_GROUPS {
        if group.keywords.iter().any(|keyword| text.contains(keyword)) {
            return group
                .template
                .iter()
                .take(MAX_GENERATED_STEPS)
                .map(|s| s.to_string())
                .collect();
        }
    }

    if ACTION_VERBS.iter().any(|verb| text.contains(verb)) {
        return GENERIC_BREAKDOWN.iter().map(|s| s.to_string()).collect();
    }

    if task_text.chars().count() > COMPLEX_TEXT_LEN {
        COMPLEX_BREAKDOWN.iter().map(|s| s.to_string()).collect()
    } else {
        SIMPLE_BREAKDOWN.iter().map(|s| s.to_string()).collect()
    }
}
