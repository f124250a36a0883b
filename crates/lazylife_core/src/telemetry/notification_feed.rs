//! Bounded newest-first feed of user-facing notifications.
//!
//! # Invariants
//! - At most `NOTIFICATION_FEED_CAPACITY` notifications; oldest evicted first.
//! - Ids are `notif-<uuid v4>`; two pushes never share an id.
//! - Id and timestamp come from the feed, never from the draft.

use crate::error::StoreResult;
use crate::model::notification::{Notification, NotificationDraft};
use crate::telemetry::bounded_log::BoundedLog;
use uuid::Uuid;

pub const NOTIFICATION_FEED_CAPACITY: usize = 40;
const NOTIFICATION_ID_PREFIX: &str = "notif-";

#[derive(Debug, Clone, Default)]
pub struct NotificationFeed {
    entries: BoundedLog<Notification, NOTIFICATION_FEED_CAPACITY>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `draft`, assigns id and timestamp and prepends the result.
    ///
    /// # Errors
    /// - `InvalidNotification` when a required draft field is missing; the
    ///   feed is left unchanged.
    pub fn push(&mut self, draft: &NotificationDraft, now: i64) -> StoreResult<Notification> {
        let (priority, source) = draft.validate()?;
        let notification = Notification {
            id: format!("{NOTIFICATION_ID_PREFIX}{}", Uuid::new_v4().simple()),
            title: draft.title.clone(),
            message: draft.message.clone(),
            priority,
            source,
            timestamp: now,
        };
        self.entries.push(notification.clone());
        Ok(notification)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Defensive copy, newest first.
    pub fn all(&self) -> Vec<Notification> {
        self.entries.to_vec()
    }
}
