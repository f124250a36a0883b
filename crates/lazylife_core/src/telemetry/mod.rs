//! Transient telemetry tier: agent run status, event log, notification feed.
//!
//! # Responsibility
//! - Hold per-process operational state that is never written to disk.
//!
//! # Invariants
//! - A fresh `TransientState` has every agent idle and both logs empty,
//!   regardless of what the durable tier contains.
//! - Event log and notification feed are newest-first and capacity-bounded.

pub mod agent_registry;
pub mod bounded_log;
pub mod event_log;
pub mod notification_feed;

use agent_registry::AgentStateRegistry;
use event_log::EventLog;
use notification_feed::NotificationFeed;

/// Everything the runtime store forgets on restart.
#[derive(Debug, Clone, Default)]
pub struct TransientState {
    pub agents: AgentStateRegistry,
    pub events: EventLog,
    pub notifications: NotificationFeed,
}

impl TransientState {
    pub fn new() -> Self {
        Self::default()
    }
}
