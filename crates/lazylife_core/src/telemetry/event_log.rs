//! Bounded newest-first log of operational events.
//!
//! # Invariants
//! - At most `EVENT_LOG_CAPACITY` events; the oldest is evicted first.
//! - Order is insertion order, newest first. Embedded timestamps are never
//!   used to re-sort.
//! - Recording forwards to the agent registry in the same call, so no reader
//!   can see the event without the matching agent update.
//! - Once a digest-ready event is recorded, `digest_seen` stays set for the
//!   life of the log, even after that event is evicted.

use crate::error::StoreResult;
use crate::model::event::{Event, EventInput};
use crate::service::summary::DIGEST_READY_EVENT_TYPE;
use crate::telemetry::agent_registry::AgentStateRegistry;
use crate::telemetry::bounded_log::BoundedLog;

pub const EVENT_LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: BoundedLog<Event, EVENT_LOG_CAPACITY>,
    digest_seen: bool,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `input`, prepends it and updates the source agent.
    ///
    /// # Errors
    /// - `InvalidEvent` when validation fails; neither the log nor the
    ///   registry is touched.
    pub fn record(
        &mut self,
        input: EventInput,
        registry: &mut AgentStateRegistry,
        now: i64,
    ) -> StoreResult<Event> {
        let event = input.validate()?;
        if event.event_type == DIGEST_READY_EVENT_TYPE {
            self.digest_seen = true;
        }
        self.entries.push(event.clone());
        registry.record_event(&event, now);
        Ok(event)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a digest-ready event was ever recorded into this log.
    pub fn digest_seen(&self) -> bool {
        self.digest_seen
    }

    /// Iterates newest to oldest without copying.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    /// Defensive copy, newest first.
    pub fn all(&self) -> Vec<Event> {
        self.entries.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventLog, EVENT_LOG_CAPACITY};
    use crate::model::event::EventInput;
    use crate::telemetry::agent_registry::AgentStateRegistry;

    #[test]
    fn record_caps_length_and_keeps_newest_first() {
        let mut log = EventLog::new();
        let mut registry = AgentStateRegistry::new();
        for n in 0..(EVENT_LOG_CAPACITY + 25) {
            log.record(
                EventInput::new(format!("evt-{n}"), "orchestrator", "tick"),
                &mut registry,
                0,
            )
            .unwrap();
            assert!(log.len() <= EVENT_LOG_CAPACITY);
        }

        let events = log.all();
        assert_eq!(events.len(), EVENT_LOG_CAPACITY);
        assert_eq!(events[0].id, format!("evt-{}", EVENT_LOG_CAPACITY + 24));
        assert_eq!(events[EVENT_LOG_CAPACITY - 1].id, "evt-25");
    }

    #[test]
    fn insertion_order_wins_over_embedded_timestamps() {
        let mut log = EventLog::new();
        let mut registry = AgentStateRegistry::new();
        log.record(
            EventInput::new("late", "notes", "x").with_timestamp(Some(9_000)),
            &mut registry,
            0,
        )
        .unwrap();
        log.record(
            EventInput::new("early", "notes", "x").with_timestamp(Some(1_000)),
            &mut registry,
            0,
        )
        .unwrap();
        assert_eq!(log.all()[0].id, "early");
    }

    #[test]
    fn digest_seen_survives_eviction() {
        let mut log = EventLog::new();
        let mut registry = AgentStateRegistry::new();
        assert!(!log.digest_seen());
        log.record(
            EventInput::new("digest", "video-editor", "video.digest-ready"),
            &mut registry,
            0,
        )
        .unwrap();
        for n in 0..EVENT_LOG_CAPACITY {
            log.record(
                EventInput::new(format!("evt-{n}"), "orchestrator", "tick"),
                &mut registry,
                0,
            )
            .unwrap();
        }
        assert!(log.iter().all(|event| event.id != "digest"));
        assert!(log.digest_seen());
    }

    #[test]
    fn rejected_event_changes_nothing() {
        let mut log = EventLog::new();
        let mut registry = AgentStateRegistry::new();
        let before = registry.to_vec();
        assert!(log
            .record(EventInput::new("", "notes", "x"), &mut registry, 5)
            .is_err());
        assert!(log.is_empty());
        assert_eq!(registry.to_vec(), before);
    }
}
