//! contextstore - consent-gated calendar/work context for priority planning
//!
//! Context is only ever handed out through the [`ContextProvider`] trait and
//! only when the user has granted consent for that kind. The mock provider is
//! the single place allowed to generate randomized context, so everything
//! downstream of the trait stays deterministic in tests.

pub mod consent;
pub mod provider;
pub mod types;

pub use consent::{ConsentLedger, ContextError};
pub use provider::{ContextProvider, FixedProvider, MockProvider};
pub use types::{CalendarContext, ContextKind, Deadline, Meeting, UserProfile, WorkContext, WorkingHours};
