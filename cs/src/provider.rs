//! Context providers
//!
//! [`MockProvider`] stands in for the real calendar/Teams integrations and is
//! the only module that generates randomized values. Tests use
//! [`FixedProvider`] for fully deterministic context.

use chrono::{Duration, Local, Timelike, Utc};
use rand::Rng;
use tracing::debug;

use crate::consent::ConsentLedger;
use crate::types::{
    CalendarContext, ContextKind, Deadline, Meeting, UserProfile, WorkContext, WorkingHours,
};

const WORKDAY_START_HOUR: u32 = 9;
const WORKDAY_END_HOUR: u32 = 17;

/// Source of optional planning context.
///
/// `calendar`/`work` return `None` when the user has not granted consent for
/// that kind (or the integration has nothing to say).
pub trait ContextProvider: Send + Sync {
    fn calendar(&self) -> Option<CalendarContext>;
    fn work(&self) -> Option<WorkContext>;
    fn profile(&self) -> UserProfile;
}

/// Mock integration returning plausible randomized context, gated by consent
pub struct MockProvider {
    ledger: ConsentLedger,
}

impl MockProvider {
    pub fn new(ledger: ConsentLedger) -> Self {
        Self { ledger }
    }
}

impl ContextProvider for MockProvider {
    fn calendar(&self) -> Option<CalendarContext> {
        if !self.ledger.granted(ContextKind::Calendar) {
            debug!("calendar context not granted");
            return None;
        }
        let mut rng = rand::rng();
        let now = Local::now();
        let hour = now.hour();
        Some(CalendarContext {
            upcoming_meetings: vec![
                Meeting {
                    title: "Project Review".to_string(),
                    start: Utc::now() + Duration::hours(2),
                },
                Meeting {
                    title: "Team Standup".to_string(),
                    start: Utc::now() + Duration::hours(24),
                },
            ],
            urgent_items: rng.random_range(1..=3),
            working_hours: WorkingHours {
                in_working_hours: (WORKDAY_START_HOUR..=WORKDAY_END_HOUR).contains(&hour),
                hours_until_end_of_day: WORKDAY_END_HOUR as i64 - hour as i64,
            },
        })
    }

    fn work(&self) -> Option<WorkContext> {
        if !self.ledger.granted(ContextKind::Work) {
            debug!("work context not granted");
            return None;
        }
        let mut rng = rand::rng();
        Some(WorkContext {
            active_projects: vec![
                "Website Redesign".to_string(),
                "Mobile App".to_string(),
                "API Integration".to_string(),
            ],
            unread_messages: rng.random_range(0..=15),
            upcoming_deadlines: vec![Deadline {
                project: "Website Redesign".to_string(),
                due: Utc::now() + Duration::days(7),
            }],
        })
    }

    fn profile(&self) -> UserProfile {
        UserProfile::default()
    }
}

/// Fixed context for tests: returns exactly what it was built with
#[derive(Debug, Clone, Default)]
pub struct FixedProvider {
    pub calendar: Option<CalendarContext>,
    pub work: Option<WorkContext>,
    pub profile: UserProfile,
}

impl FixedProvider {
    /// Provider with no context at all (no consent granted)
    pub fn empty() -> Self {
        Self::default()
    }
}

impl ContextProvider for FixedProvider {
    fn calendar(&self) -> Option<CalendarContext> {
        self.calendar.clone()
    }

    fn work(&self) -> Option<WorkContext> {
        self.work.clone()
    }

    fn profile(&self) -> UserProfile {
        self.profile.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(dir: &tempfile::TempDir, grants: &[ContextKind]) -> ConsentLedger {
        let mut ledger = ConsentLedger::open(dir.path().join("consent.json")).unwrap();
        for kind in grants {
            ledger.grant(*kind).unwrap();
        }
        ledger
    }

    #[test]
    fn test_mock_respects_consent() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::new(ledger_with(&dir, &[]));
        assert!(provider.calendar().is_none());
        assert!(provider.work().is_none());
    }

    #[test]
    fn test_mock_returns_context_when_granted() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::new(ledger_with(&dir, &[ContextKind::Calendar, ContextKind::Work]));

        let calendar = provider.calendar().unwrap();
        assert_eq!(calendar.upcoming_meetings.len(), 2);
        assert!((1..=3).contains(&calendar.urgent_items));

        let work = provider.work().unwrap();
        assert_eq!(work.active_projects.len(), 3);
        assert!(work.unread_messages <= 15);
    }

    #[test]
    fn test_fixed_provider_is_deterministic() {
        let provider = FixedProvider {
            work: Some(WorkContext {
                active_projects: vec!["One".to_string()],
                unread_messages: 12,
                upcoming_deadlines: vec![],
            }),
            ..FixedProvider::empty()
        };
        assert!(provider.calendar().is_none());
        assert_eq!(provider.work().unwrap().unread_messages, 12);
        assert_eq!(provider.profile().department, "Engineering");
    }
}
