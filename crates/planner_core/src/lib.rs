//! Core domain logic for the day planner.
//! This crate is the single source of truth for event scheduling invariants.

pub mod config;
pub mod db;
pub mod listener;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod schedule;
pub mod store;
pub mod view;

pub use config::{ConfigError, PlannerConfig};
pub use listener::{
    BroadcastReport, ChangeKind, ChangeListener, ListenerError, ListenerKind, ListenerRegistry,
    SubscriptionId,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError, LoggingStatus};
pub use model::event::{Category, Event, EventDraft, EventId, EventValidationError};
pub use reminder::{ReminderError, ReminderRequest, ReminderScheduler};
pub use repo::event_repo::{EventRepository, RepoError, RepoResult, SqliteEventRepository};
pub use schedule::drag::{DragError, DragSession, DragState};
pub use schedule::reschedule::{reschedule, RescheduleError};
pub use store::event_store::{Committed, EventStore, StoreError, StoreResult};
pub use view::day_view::{day_view, DayFilter};
pub use view::progress::DayProgress;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
