//! Schedule event, deadline and journal entry repository.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete over the three durable
//!   collections, one table each.
//! - Generate primary ids and timestamps on create.
//!
//! # Invariants
//! - Update is read-modify-write inside one transaction so a patch never
//!   lands on a row that changed underneath it.
//! - Missing rows surface as `RepoError::NotFound`.
//! - List order is deterministic:
//!   - schedule events: `start_time ASC, id ASC`
//!   - deadlines: `due_date ASC, id ASC`
//!   - journal entries: `created_at DESC, id ASC`

use crate::clock::now_epoch_ms;
use crate::model::entity::{
    normalize_tags, Deadline, DeadlineDraft, DeadlinePatch, EntityId, EntityKind, JournalEntry,
    JournalEntryPatch, LectureEventDraft, ScheduleEvent, ScheduleEventPatch,
};
use crate::model::{Level, Priority};
use crate::repo::{bool_to_int, int_to_bool, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const SCHEDULE_SELECT_SQL: &str = "SELECT
    id,
    title,
    location,
    start_time,
    duration_minutes,
    workload,
    created_at,
    updated_at
FROM schedule_events";

const DEADLINE_SELECT_SQL: &str = "SELECT
    id,
    course,
    task,
    due_date,
    priority,
    completed,
    created_at,
    updated_at
FROM deadlines";

const JOURNAL_SELECT_SQL: &str = "SELECT
    id,
    content,
    tags,
    created_at,
    updated_at
FROM journal_entries";

/// Repository interface for durable collection CRUD.
pub trait EntityRepository {
    fn create_schedule_event(&self, draft: &LectureEventDraft) -> RepoResult<ScheduleEvent>;
    fn get_schedule_event(&self, id: EntityId) -> RepoResult<Option<ScheduleEvent>>;
    fn list_schedule_events(&self) -> RepoResult<Vec<ScheduleEvent>>;
    fn update_schedule_event(
        &self,
        id: EntityId,
        patch: &ScheduleEventPatch,
    ) -> RepoResult<ScheduleEvent>;
    fn delete_schedule_event(&self, id: EntityId) -> RepoResult<()>;

    fn create_deadline(&self, draft: &DeadlineDraft) -> RepoResult<Deadline>;
    fn get_deadline(&self, id: EntityId) -> RepoResult<Option<Deadline>>;
    fn list_deadlines(&self) -> RepoResult<Vec<Deadline>>;
    fn update_deadline(&self, id: EntityId, patch: &DeadlinePatch) -> RepoResult<Deadline>;
    fn delete_deadline(&self, id: EntityId) -> RepoResult<()>;

    fn create_journal_entry(&self, content: &str, tags: &[String]) -> RepoResult<JournalEntry>;
    fn get_journal_entry(&self, id: EntityId) -> RepoResult<Option<JournalEntry>>;
    fn list_journal_entries(&self) -> RepoResult<Vec<JournalEntry>>;
    fn update_journal_entry(
        &self,
        id: EntityId,
        patch: &JournalEntryPatch,
    ) -> RepoResult<JournalEntry>;
    fn delete_journal_entry(&self, id: EntityId) -> RepoResult<()>;
}

/// SQLite-backed durable collection repository.
pub struct SqliteEntityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntityRepository<'conn> {
    /// Wraps a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_list<T>(
        &self,
        sql: &str,
        parse: fn(&Row<'_>) -> RepoResult<T>,
    ) -> RepoResult<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse(row)?);
        }
        Ok(items)
    }

    fn query_one<T>(
        &self,
        sql: &str,
        id: EntityId,
        parse: fn(&Row<'_>) -> RepoResult<T>,
    ) -> RepoResult<Option<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse(row)?));
        }
        Ok(None)
    }

    fn delete_row(&self, table: &str, kind: EntityKind, id: EntityId) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {table} WHERE id = ?1;"),
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { kind, id });
        }
        Ok(())
    }
}

impl EntityRepository for SqliteEntityRepository<'_> {
    fn create_schedule_event(&self, draft: &LectureEventDraft) -> RepoResult<ScheduleEvent> {
        let now = now_epoch_ms();
        let event = ScheduleEvent {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            location: draft.location.clone(),
            start_time: draft.start_time.clone(),
            duration_minutes: draft.duration_minutes,
            workload: draft.workload,
            created_at: now,
            updated_at: now,
        };

        self.conn.execute(
            "INSERT INTO schedule_events (
                id,
                title,
                location,
                start_time,
                duration_minutes,
                workload,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                event.id.to_string(),
                event.title.as_str(),
                event.location.as_deref(),
                event.start_time.as_str(),
                event.duration_minutes,
                event.workload.as_str(),
                event.created_at,
                event.updated_at,
            ],
        )?;

        Ok(event)
    }

    fn get_schedule_event(&self, id: EntityId) -> RepoResult<Option<ScheduleEvent>> {
        self.query_one(
            &format!("{SCHEDULE_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_schedule_row,
        )
    }

    fn list_schedule_events(&self) -> RepoResult<Vec<ScheduleEvent>> {
        self.query_list(
            &format!("{SCHEDULE_SELECT_SQL} ORDER BY start_time ASC, id ASC;"),
            parse_schedule_row,
        )
    }

    fn update_schedule_event(
        &self,
        id: EntityId,
        patch: &ScheduleEventPatch,
    ) -> RepoResult<ScheduleEvent> {
        let tx = self.conn.unchecked_transaction()?;
        let mut event = self
            .get_schedule_event(id)?
            .ok_or(RepoError::NotFound {
                kind: EntityKind::ScheduleEvent,
                id,
            })?;
        event.apply(patch);
        event.updated_at = now_epoch_ms();

        tx.execute(
            "UPDATE schedule_events
             SET
                title = ?1,
                location = ?2,
                start_time = ?3,
                duration_minutes = ?4,
                workload = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                event.title.as_str(),
                event.location.as_deref(),
                event.start_time.as_str(),
                event.duration_minutes,
                event.workload.as_str(),
                event.updated_at,
                id.to_string(),
            ],
        )?;
        tx.commit()?;

        Ok(event)
    }

    fn delete_schedule_event(&self, id: EntityId) -> RepoResult<()> {
        self.delete_row("schedule_events", EntityKind::ScheduleEvent, id)
    }

    fn create_deadline(&self, draft: &DeadlineDraft) -> RepoResult<Deadline> {
        let now = now_epoch_ms();
        let deadline = Deadline {
            id: Uuid::new_v4(),
            course: draft.course.clone(),
            task: draft.task.clone(),
            due_date: draft.due_date.clone(),
            priority: draft.priority,
            completed: draft.completed,
            created_at: now,
            updated_at: now,
        };

        self.conn.execute(
            "INSERT INTO deadlines (
                id,
                course,
                task,
                due_date,
                priority,
                completed,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                deadline.id.to_string(),
                deadline.course.as_str(),
                deadline.task.as_str(),
                deadline.due_date.as_str(),
                deadline.priority.as_str(),
                bool_to_int(deadline.completed),
                deadline.created_at,
                deadline.updated_at,
            ],
        )?;

        Ok(deadline)
    }

    fn get_deadline(&self, id: EntityId) -> RepoResult<Option<Deadline>> {
        self.query_one(
            &format!("{DEADLINE_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_deadline_row,
        )
    }

    fn list_deadlines(&self) -> RepoResult<Vec<Deadline>> {
        self.query_list(
            &format!("{DEADLINE_SELECT_SQL} ORDER BY due_date ASC, id ASC;"),
            parse_deadline_row,
        )
    }

    fn update_deadline(&self, id: EntityId, patch: &DeadlinePatch) -> RepoResult<Deadline> {
        let tx = self.conn.unchecked_transaction()?;
        let mut deadline = self.get_deadline(id)?.ok_or(RepoError::NotFound {
            kind: EntityKind::Deadline,
            id,
        })?;
        deadline.apply(patch);
        deadline.updated_at = now_epoch_ms();

        tx.execute(
            "UPDATE deadlines
             SET
                course = ?1,
                task = ?2,
                due_date = ?3,
                priority = ?4,
                completed = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                deadline.course.as_str(),
                deadline.task.as_str(),
                deadline.due_date.as_str(),
                deadline.priority.as_str(),
                bool_to_int(deadline.completed),
                deadline.updated_at,
                id.to_string(),
            ],
        )?;
        tx.commit()?;

        Ok(deadline)
    }

    fn delete_deadline(&self, id: EntityId) -> RepoResult<()> {
        self.delete_row("deadlines", EntityKind::Deadline, id)
    }

    fn create_journal_entry(&self, content: &str, tags: &[String]) -> RepoResult<JournalEntry> {
        let now = now_epoch_ms();
        let entry = JournalEntry {
            id: Uuid::new_v4(),
            content: content.to_string(),
            tags: normalize_tags(tags),
            created_at: now,
            updated_at: now,
        };

        self.conn.execute(
            "INSERT INTO journal_entries (
                id,
                content,
                tags,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                entry.id.to_string(),
                entry.content.as_str(),
                encode_tags(&entry.tags)?,
                entry.created_at,
                entry.updated_at,
            ],
        )?;

        Ok(entry)
    }

    fn get_journal_entry(&self, id: EntityId) -> RepoResult<Option<JournalEntry>> {
        self.query_one(
            &format!("{JOURNAL_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_journal_row,
        )
    }

    fn list_journal_entries(&self) -> RepoResult<Vec<JournalEntry>> {
        self.query_list(
            &format!("{JOURNAL_SELECT_SQL} ORDER BY created_at DESC, id ASC;"),
            parse_journal_row,
        )
    }

    fn update_journal_entry(
        &self,
        id: EntityId,
        patch: &JournalEntryPatch,
    ) -> RepoResult<JournalEntry> {
        let tx = self.conn.unchecked_transaction()?;
        let mut entry = self.get_journal_entry(id)?.ok_or(RepoError::NotFound {
            kind: EntityKind::JournalEntry,
            id,
        })?;
        entry.apply(patch);
        entry.updated_at = now_epoch_ms();

        tx.execute(
            "UPDATE journal_entries
             SET
                content = ?1,
                tags = ?2,
                updated_at = ?3
             WHERE id = ?4;",
            params![
                entry.content.as_str(),
                encode_tags(&entry.tags)?,
                entry.updated_at,
                id.to_string(),
            ],
        )?;
        tx.commit()?;

        Ok(entry)
    }

    fn delete_journal_entry(&self, id: EntityId) -> RepoResult<()> {
        self.delete_row("journal_entries", EntityKind::JournalEntry, id)
    }
}

fn parse_schedule_row(row: &Row<'_>) -> RepoResult<ScheduleEvent> {
    let workload_text: String = row.get("workload")?;
    let workload = Level::parse(&workload_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid workload `{workload_text}` in schedule_events.workload"
        ))
    })?;
    let duration: i64 = row.get("duration_minutes")?;
    let duration_minutes = u32::try_from(duration).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid duration `{duration}` in schedule_events.duration_minutes"
        ))
    })?;

    Ok(ScheduleEvent {
        id: parse_id(row, "schedule_events")?,
        title: row.get("title")?,
        location: row.get("location")?,
        start_time: row.get("start_time")?,
        duration_minutes,
        workload,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_deadline_row(row: &Row<'_>) -> RepoResult<Deadline> {
    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in deadlines.priority"
        ))
    })?;

    Ok(Deadline {
        id: parse_id(row, "deadlines")?,
        course: row.get("course")?,
        task: row.get("task")?,
        due_date: row.get("due_date")?,
        priority,
        completed: int_to_bool(row.get("completed")?, "deadlines.completed")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_journal_row(row: &Row<'_>) -> RepoResult<JournalEntry> {
    let tags_text: String = row.get("tags")?;
    let tags: Vec<String> = serde_json::from_str(&tags_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid tags in journal_entries.tags: {err}"))
    })?;

    Ok(JournalEntry {
        id: parse_id(row, "journal_entries")?,
        content: row.get("content")?,
        tags,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_id(row: &Row<'_>, table: &str) -> RepoResult<EntityId> {
    let id_text: String = row.get("id")?;
    Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in {table}.id"))
    })
}

fn encode_tags(tags: &[String]) -> RepoResult<String> {
    serde_json::to_string(tags)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode tags: {err}")))
}
