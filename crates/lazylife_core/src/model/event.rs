//! Operational events produced by agents.
//!
//! # Invariants
//! - A recorded `Event` is immutable; the log only ever hands out copies.
//! - `payload` is opaque to the store: it is carried, never interpreted.

use crate::clock::now_epoch_ms;
use crate::error::{StoreError, StoreResult};
use crate::model::agent::AgentIdentity;
use crate::model::Priority;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open-ended key/value bag attached to an event by its producer.
pub type EventPayload = Map<String, Value>;

/// A validated event as held by the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub source: AgentIdentity,
    pub event_type: String,
    pub priority: Priority,
    /// Producer-supplied unix epoch milliseconds. Not used for ordering.
    pub timestamp: i64,
    #[serde(default)]
    pub payload: EventPayload,
}

/// Event as reported by a collaborator, before validation.
///
/// `source` stays textual so unknown identities can be rejected with
/// `InvalidEvent` instead of failing at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub id: String,
    pub source: String,
    pub event_type: String,
    pub priority: Priority,
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub payload: EventPayload,
}

impl EventInput {
    /// Builds an input stamped with the current time, medium priority and an
    /// empty payload.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            event_type: event_type.into(),
            priority: Priority::Medium,
            timestamp: Some(now_epoch_ms()),
            payload: EventPayload::new(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Option<i64>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Validates required fields and resolves the source identity.
    ///
    /// # Errors
    /// - `InvalidEvent` when `id` is blank, `timestamp` is absent or negative,
    ///   or `source` is not a known agent.
    pub fn validate(self) -> StoreResult<Event> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(StoreError::InvalidEvent("id is required".to_string()));
        }
        let timestamp = match self.timestamp {
            Some(value) if value >= 0 => value,
            Some(value) => {
                return Err(StoreError::InvalidEvent(format!(
                    "timestamp must not be negative, got {value}"
                )));
            }
            None => return Err(StoreError::InvalidEvent("timestamp is required".to_string())),
        };
        let source = AgentIdentity::parse(&self.source).ok_or_else(|| {
            StoreError::InvalidEvent(format!("unknown source agent `{}`", self.source.trim()))
        })?;

        Ok(Event {
            id: id.to_string(),
            source,
            event_type: self.event_type,
            priority: self.priority,
            timestamp,
            payload: self.payload,
        })
    }
}
