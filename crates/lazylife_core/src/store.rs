//! Runtime store facade.
//!
//! # Responsibility
//! - Compose the transient telemetry tier and the durable SQLite tier behind
//!   one thread-safe API.
//! - Build independent `Snapshot` values with a freshly computed summary.
//!
//! # Invariants
//! - Every public call takes the store mutex exactly once and runs to
//!   completion under it, so readers never see half-applied mutations.
//! - Durable writes hit the backing file before the call returns; a failed
//!   write is reported, never silently kept in memory only.
//! - Transient state is never persisted. A new store on the same file starts
//!   with idle agents and empty logs but sees every committed durable row.
//! - Validation failures leave both tiers untouched.

use crate::clock::now_epoch_ms;
use crate::db::{open_db, open_db_in_memory};
use crate::error::{StoreError, StoreResult};
use crate::model::agent::{AgentIdentity, AgentState};
use crate::model::context::{UserContext, UserContextPatch};
use crate::model::entity::{
    Deadline, DeadlineDraft, DeadlinePatch, EntityId, EntityKind, JournalEntry,
    JournalEntryPatch, LectureEventDraft, ScheduleEvent, ScheduleEventPatch,
};
use crate::model::event::{Event, EventInput};
use crate::model::notification::{Notification, NotificationDraft};
use crate::model::preferences::{NotificationPreferences, NotificationPreferencesPatch};
use crate::repo::entity_repo::{EntityRepository, SqliteEntityRepository};
use crate::repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use crate::service::summary::{compute_summary, Summary};
use crate::telemetry::TransientState;
use log::{debug, error, info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Where the durable tier lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Ephemeral; durable rows vanish with the store.
    Memory,
    /// File-resident; durable rows survive restarts.
    File(PathBuf),
}

impl StoreLocation {
    fn mode(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }
}

/// One immutable read of the whole store plus its derived summary.
///
/// Owns all of its data; later store activity never changes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub generated_at: i64,
    /// All seven agents in `AgentIdentity::ALL` order.
    pub agent_states: Vec<AgentState>,
    /// Newest first, at most 100.
    pub events: Vec<Event>,
    /// Newest first, at most 40.
    pub notifications: Vec<Notification>,
    pub summary: Summary,
}

struct StoreInner {
    conn: Connection,
    transient: TransientState,
}

impl StoreInner {
    fn entities(&self) -> SqliteEntityRepository<'_> {
        SqliteEntityRepository::new(&self.conn)
    }

    fn settings(&self) -> SqliteSettingsRepository<'_> {
        SqliteSettingsRepository::new(&self.conn)
    }
}

/// Process-wide holder of agent telemetry and durable user data.
///
/// Construct one explicitly and pass it to whoever needs it; there is no
/// global instance.
pub struct RuntimeStore {
    location: StoreLocation,
    inner: Mutex<StoreInner>,
}

impl RuntimeStore {
    /// Opens a file-resident store when `path` is given, else an in-memory one.
    pub fn new(path: Option<&Path>) -> StoreResult<Self> {
        match path {
            Some(path) => Self::open(path),
            None => Self::open_in_memory(),
        }
    }

    /// Opens (or creates) the store file at `path` and applies migrations.
    ///
    /// # Errors
    /// - `Persistence` when the file cannot be opened, migrated or seeded.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = open_db(path)?;
        Self::from_connection(conn, StoreLocation::File(path.to_path_buf()))
    }

    /// Opens a store whose durable tier lives only in memory.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = open_db_in_memory()?;
        Self::from_connection(conn, StoreLocation::Memory)
    }

    fn from_connection(conn: Connection, location: StoreLocation) -> StoreResult<Self> {
        let started_at = Instant::now();
        if let Err(err) = SqliteSettingsRepository::new(&conn).ensure_defaults() {
            error!(
                "event=store_open module=store status=error mode={} error_code=seed_failed error={}",
                location.mode(),
                err
            );
            return Err(err.into());
        }
        info!(
            "event=store_open module=store status=ok mode={} agents={} duration_ms={}",
            location.mode(),
            AgentIdentity::ALL.len(),
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            location,
            inner: Mutex::new(StoreInner {
                conn,
                transient: TransientState::new(),
            }),
        })
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("event=store_lock module=store status=recovered reason=poisoned");
            poisoned.into_inner()
        })
    }

    // ---- agent telemetry ----

    /// Marks `identity` as running.
    ///
    /// # Errors
    /// - `UnknownAgent` when `identity` is not one of the seven agents.
    pub fn mark_agent_running(&self, identity: &str) -> StoreResult<AgentState> {
        let agent = resolve_agent("agent_running", identity)?;
        let mut inner = self.lock();
        let state = inner.transient.agents.mark_running(agent, now_epoch_ms()).clone();
        debug!("event=agent_running module=store status=ok agent={agent}");
        Ok(state)
    }

    /// Marks `identity` as failed.
    ///
    /// # Errors
    /// - `UnknownAgent` when `identity` is not one of the seven agents.
    pub fn mark_agent_error(&self, identity: &str) -> StoreResult<AgentState> {
        let agent = resolve_agent("agent_error", identity)?;
        let mut inner = self.lock();
        let state = inner.transient.agents.mark_error(agent, now_epoch_ms()).clone();
        warn!("event=agent_error module=store status=ok agent={agent}");
        Ok(state)
    }

    /// Current state of one agent.
    pub fn agent_state(&self, identity: &str) -> StoreResult<AgentState> {
        let agent = resolve_agent("agent_state", identity)?;
        Ok(self.lock().transient.agents.get(agent).clone())
    }

    /// Records an event and returns its source agent to idle.
    ///
    /// # Errors
    /// - `InvalidEvent` when id/timestamp are missing or the source is unknown.
    pub fn record_event(&self, input: EventInput) -> StoreResult<Event> {
        let mut inner = self.lock();
        let now = now_epoch_ms();
        let transient = &mut inner.transient;
        let result = transient.events.record(input, &mut transient.agents, now);
        match &result {
            Ok(event) => debug!(
                "event=event_recorded module=store status=ok source={} log_len={}",
                event.source,
                transient.events.len()
            ),
            Err(err) => log_rejection("event_rejected", err),
        }
        result
    }

    /// Pushes a notification with a store-generated id and timestamp.
    ///
    /// # Errors
    /// - `InvalidNotification` when title/message/priority/source is missing.
    pub fn push_notification(&self, draft: &NotificationDraft) -> StoreResult<Notification> {
        let mut inner = self.lock();
        let result = inner.transient.notifications.push(draft, now_epoch_ms());
        match &result {
            Ok(notification) => debug!(
                "event=notification_pushed module=store status=ok id={} source={} feed_len={}",
                notification.id,
                notification.source,
                inner.transient.notifications.len()
            ),
            Err(err) => log_rejection("notification_rejected", err),
        }
        result
    }

    // ---- settings singletons ----

    pub fn get_user_context(&self) -> StoreResult<UserContext> {
        let inner = self.lock();
        Ok(inner.settings().load_user_context()?)
    }

    /// Merge-patches the user context and writes it through.
    pub fn set_user_context(&self, patch: &UserContextPatch) -> StoreResult<UserContext> {
        let inner = self.lock();
        let settings = inner.settings();
        let next = settings.load_user_context()?.merged(patch);
        persisted("context_updated", settings.save_user_context(&next))?;
        info!(
            "event=context_updated module=store status=ok stress={} energy={}",
            next.stress_level.as_str(),
            next.energy_level.as_str()
        );
        Ok(next)
    }

    pub fn get_notification_preferences(&self) -> StoreResult<NotificationPreferences> {
        let inner = self.lock();
        Ok(inner.settings().load_notification_preferences()?)
    }

    /// Merge-patches notification preferences and writes them through.
    ///
    /// # Errors
    /// - `InvalidPreferences` when the merged value has out-of-range hours;
    ///   nothing is written.
    pub fn set_notification_preferences(
        &self,
        patch: &NotificationPreferencesPatch,
    ) -> StoreResult<NotificationPreferences> {
        let inner = self.lock();
        let settings = inner.settings();
        let next = match settings.load_notification_preferences()?.merged(patch) {
            Ok(next) => next,
            Err(err) => {
                log_rejection("preferences_rejected", &err);
                return Err(err);
            }
        };
        persisted(
            "preferences_updated",
            settings.save_notification_preferences(&next),
        )?;
        info!(
            "event=preferences_updated module=store status=ok quiet_hours={} minimum_priority={}",
            next.quiet_hours.enabled,
            next.minimum_priority.as_str()
        );
        Ok(next)
    }

    // ---- durable collections ----

    pub fn create_lecture_event(&self, draft: &LectureEventDraft) -> StoreResult<ScheduleEvent> {
        let inner = self.lock();
        let event = persisted("entity_created", inner.entities().create_schedule_event(draft))?;
        log_entity("entity_created", EntityKind::ScheduleEvent, event.id);
        Ok(event)
    }

    pub fn get_schedule_event(&self, id: EntityId) -> StoreResult<Option<ScheduleEvent>> {
        Ok(self.lock().entities().get_schedule_event(id)?)
    }

    /// All schedule events, earliest start first.
    pub fn get_schedule_events(&self) -> StoreResult<Vec<ScheduleEvent>> {
        Ok(self.lock().entities().list_schedule_events()?)
    }

    pub fn update_schedule_event(
        &self,
        id: EntityId,
        patch: &ScheduleEventPatch,
    ) -> StoreResult<ScheduleEvent> {
        let inner = self.lock();
        let event = persisted("entity_updated", inner.entities().update_schedule_event(id, patch))?;
        log_entity("entity_updated", EntityKind::ScheduleEvent, id);
        Ok(event)
    }

    pub fn delete_schedule_event(&self, id: EntityId) -> StoreResult<()> {
        let inner = self.lock();
        persisted("entity_deleted", inner.entities().delete_schedule_event(id))?;
        log_entity("entity_deleted", EntityKind::ScheduleEvent, id);
        Ok(())
    }

    pub fn create_deadline(&self, draft: &DeadlineDraft) -> StoreResult<Deadline> {
        let inner = self.lock();
        let deadline = persisted("entity_created", inner.entities().create_deadline(draft))?;
        log_entity("entity_created", EntityKind::Deadline, deadline.id);
        Ok(deadline)
    }

    pub fn get_deadline(&self, id: EntityId) -> StoreResult<Option<Deadline>> {
        Ok(self.lock().entities().get_deadline(id)?)
    }

    /// All deadlines, earliest due first.
    pub fn get_deadlines(&self) -> StoreResult<Vec<Deadline>> {
        Ok(self.lock().entities().list_deadlines()?)
    }

    pub fn update_deadline(&self, id: EntityId, patch: &DeadlinePatch) -> StoreResult<Deadline> {
        let inner = self.lock();
        let deadline = persisted("entity_updated", inner.entities().update_deadline(id, patch))?;
        log_entity("entity_updated", EntityKind::Deadline, id);
        Ok(deadline)
    }

    pub fn delete_deadline(&self, id: EntityId) -> StoreResult<()> {
        let inner = self.lock();
        persisted("entity_deleted", inner.entities().delete_deadline(id))?;
        log_entity("entity_deleted", EntityKind::Deadline, id);
        Ok(())
    }

    /// Stores a journal entry; tags are normalized before writing.
    pub fn record_journal_entry(&self, content: &str, tags: &[String]) -> StoreResult<JournalEntry> {
        let inner = self.lock();
        let entry = persisted(
            "entity_created",
            inner.entities().create_journal_entry(content, tags),
        )?;
        log_entity("entity_created", EntityKind::JournalEntry, entry.id);
        Ok(entry)
    }

    pub fn get_journal_entry(&self, id: EntityId) -> StoreResult<Option<JournalEntry>> {
        Ok(self.lock().entities().get_journal_entry(id)?)
    }

    /// All journal entries, newest first.
    pub fn get_journal_entries(&self) -> StoreResult<Vec<JournalEntry>> {
        Ok(self.lock().entities().list_journal_entries()?)
    }

    pub fn update_journal_entry(
        &self,
        id: EntityId,
        patch: &JournalEntryPatch,
    ) -> StoreResult<JournalEntry> {
        let inner = self.lock();
        let entry = persisted("entity_updated", inner.entities().update_journal_entry(id, patch))?;
        log_entity("entity_updated", EntityKind::JournalEntry, id);
        Ok(entry)
    }

    pub fn delete_journal_entry(&self, id: EntityId) -> StoreResult<()> {
        let inner = self.lock();
        persisted("entity_deleted", inner.entities().delete_journal_entry(id))?;
        log_entity("entity_deleted", EntityKind::JournalEntry, id);
        Ok(())
    }

    // ---- reads ----

    /// Builds an independent snapshot of agents, logs and the derived summary.
    pub fn get_snapshot(&self) -> StoreResult<Snapshot> {
        let inner = self.lock();
        let context = inner.settings().load_user_context()?;
        let transient = &inner.transient;
        let snapshot = Snapshot {
            generated_at: now_epoch_ms(),
            agent_states: transient.agents.to_vec(),
            events: transient.events.all(),
            notifications: transient.notifications.all(),
            summary: compute_summary(
                transient.events.iter(),
                &context,
                transient.events.digest_seen(),
            ),
        };
        debug!(
            "event=snapshot_built module=store status=ok events={} notifications={}",
            snapshot.events.len(),
            snapshot.notifications.len()
        );
        Ok(snapshot)
    }
}

fn resolve_agent(event: &'static str, identity: &str) -> StoreResult<AgentIdentity> {
    AgentIdentity::parse(identity).ok_or_else(|| {
        let err = StoreError::UnknownAgent(identity.trim().to_string());
        log_rejection(event, &err);
        err
    })
}

fn log_rejection(event: &'static str, err: &StoreError) {
    warn!(
        "event={} module=store status=rejected error_code={}",
        event,
        err.code()
    );
}

fn log_entity(event: &'static str, kind: EntityKind, id: EntityId) {
    info!(
        "event={} module=store status=ok kind={} id={}",
        event,
        kind.as_str(),
        id
    );
}

/// Converts a repository result, logging persistence failures and misses.
fn persisted<T>(event: &'static str, result: crate::repo::RepoResult<T>) -> StoreResult<T> {
    result.map_err(|err| {
        let err = StoreError::from(err);
        match &err {
            StoreError::Persistence(inner) => error!(
                "event={} module=store status=error error_code={} error={}",
                event,
                err.code(),
                inner
            ),
            other => log_rejection(event, other),
        }
        err
    })
}
