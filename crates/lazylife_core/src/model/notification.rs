//! User-facing notifications.
//!
//! # Invariants
//! - `id` and `timestamp` are assigned by the feed, never by the caller.

use crate::error::{StoreError, StoreResult};
use crate::model::agent::AgentIdentity;
use crate::model::Priority;
use serde::{Deserialize, Serialize};

/// Fully populated notification held by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// `notif-<uuid>`, generated on push.
    pub id: String,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub source: AgentIdentity,
    /// Unix epoch milliseconds, generated on push.
    pub timestamp: i64,
}

/// Caller-supplied part of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    pub priority: Option<Priority>,
    pub source: String,
}

impl NotificationDraft {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        priority: Priority,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            priority: Some(priority),
            source: source.into(),
        }
    }

    /// Checks required fields and resolves the source identity.
    ///
    /// # Errors
    /// - `InvalidNotification` when title/message are blank, priority is
    ///   absent, or source is not a known agent.
    pub(crate) fn validate(&self) -> StoreResult<(Priority, AgentIdentity)> {
        if self.title.trim().is_empty() {
            return Err(StoreError::InvalidNotification(
                "title is required".to_string(),
            ));
        }
        if self.message.trim().is_empty() {
            return Err(StoreError::InvalidNotification(
                "message is required".to_string(),
            ));
        }
        let priority = self.priority.ok_or_else(|| {
            StoreError::InvalidNotification("priority is required".to_string())
        })?;
        let source = AgentIdentity::parse(&self.source).ok_or_else(|| {
            StoreError::InvalidNotification(format!(
                "unknown source agent `{}`",
                self.source.trim()
            ))
        })?;
        Ok((priority, source))
    }
}
