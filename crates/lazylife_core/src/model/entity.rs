//! Durable collections: schedule events, deadlines and journal entries.
//!
//! # Responsibility
//! - Define stored records plus the create drafts and merge-patches callers
//!   send for them.
//!
//! # Invariants
//! - `id`, `created_at` and `updated_at` are assigned by the store.
//! - These are authoritative records: no cap, no eviction.
//! - Journal tags are stored normalized (trimmed, lowercase, unique, sorted).

use crate::model::{Level, Priority};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable identifier for every durable entity row.
pub type EntityId = Uuid;

/// Durable collection discriminator, used in `NotFound` errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    ScheduleEvent,
    Deadline,
    JournalEntry,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScheduleEvent => "schedule_event",
            Self::Deadline => "deadline",
            Self::JournalEntry => "journal_entry",
        }
    }
}

/// One lecture or other timetable slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    pub id: EntityId,
    pub title: String,
    pub location: Option<String>,
    /// RFC 3339 start time as imported from the calendar source.
    pub start_time: String,
    pub duration_minutes: u32,
    pub workload: Level,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureEventDraft {
    pub title: String,
    pub location: Option<String>,
    pub start_time: String,
    pub duration_minutes: u32,
    pub workload: Level,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEventPatch {
    pub title: Option<String>,
    /// `None` keeps the location, `Some(None)` clears it. On the wire an
    /// absent key keeps it and an explicit `null` clears it.
    #[serde(
        default,
        deserialize_with = "present_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<Option<String>>,
    pub start_time: Option<String>,
    pub duration_minutes: Option<u32>,
    pub workload: Option<Level>,
}

impl ScheduleEvent {
    pub(crate) fn apply(&mut self, patch: &ScheduleEventPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
        if let Some(start_time) = &patch.start_time {
            self.start_time = start_time.clone();
        }
        if let Some(duration) = patch.duration_minutes {
            self.duration_minutes = duration;
        }
        if let Some(workload) = patch.workload {
            self.workload = workload;
        }
    }
}

/// Maps a present key (including `null`) to `Some`, so patches can tell an
/// explicit clear from an omitted field.
fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Course assignment or exam deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deadline {
    pub id: EntityId,
    pub course: String,
    pub task: String,
    /// RFC 3339 due time, e.g. `2026-02-24T23:59:00Z`.
    pub due_date: String,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineDraft {
    pub course: String,
    pub task: String,
    pub due_date: String,
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlinePatch {
    pub course: Option<String>,
    pub task: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl Deadline {
    pub(crate) fn apply(&mut self, patch: &DeadlinePatch) {
        if let Some(course) = &patch.course {
            self.course = course.clone();
        }
        if let Some(task) = &patch.task {
            self.task = task.clone();
        }
        if let Some(due_date) = &patch.due_date {
            self.due_date = due_date.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// Free-form journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: EntityId,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryPatch {
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl JournalEntry {
    pub(crate) fn apply(&mut self, patch: &JournalEntryPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = normalize_tags(tags);
        }
    }
}

/// Normalizes one tag: trimmed and lowercased, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates and sorts tag values.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let unique: BTreeSet<String> = tags.iter().filter_map(|tag| normalize_tag(tag)).collect();
    unique.into_iter().collect()
}
