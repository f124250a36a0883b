//! Runtime state store for the LazyLife assistant.
//!
//! Holds transient agent telemetry (run status, event log, notification feed)
//! next to durable user data (schedule, deadlines, journal, context,
//! notification preferences) persisted in SQLite.

pub mod clock;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod telemetry;

pub use error::{StoreError, StoreResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::agent::{AgentIdentity, AgentState, AgentStatus};
pub use model::context::{UserContext, UserContextPatch};
pub use model::entity::{
    Deadline, DeadlineDraft, DeadlinePatch, EntityId, EntityKind, JournalEntry, JournalEntryPatch,
    LectureEventDraft, ScheduleEvent, ScheduleEventPatch,
};
pub use model::event::{Event, EventInput, EventPayload};
pub use model::notification::{Notification, NotificationDraft};
pub use model::preferences::{
    NotificationPreferences, NotificationPreferencesPatch, QuietHours, QuietHoursPatch,
};
pub use model::{Level, Priority};
pub use repo::{RepoError, RepoResult};
pub use service::summary::Summary;
pub use store::{RuntimeStore, Snapshot, StoreLocation};
pub use telemetry::event_log::EVENT_LOG_CAPACITY;
pub use telemetry::notification_feed::NOTIFICATION_FEED_CAPACITY;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
