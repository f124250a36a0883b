//! Fixed registry of agent run states.
//!
//! # Invariants
//! - Exactly one `AgentState` per `AgentIdentity`, stored in `ALL` order.
//! - Each transition touches only the addressed agent.
//! - Recording an event is the only way back to `Idle`.

use crate::model::agent::{AgentIdentity, AgentState, AgentStatus};
use crate::model::event::Event;

#[derive(Debug, Clone)]
pub struct AgentStateRegistry {
    states: [AgentState; 7],
}

impl Default for AgentStateRegistry {
    fn default() -> Self {
        Self {
            states: AgentIdentity::ALL.map(AgentState::idle),
        }
    }
}

impl AgentStateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `* -> Running`, stamping `last_run_at`.
    pub fn mark_running(&mut self, identity: AgentIdentity, now: i64) -> &AgentState {
        self.transition(identity, AgentStatus::Running, now)
    }

    /// `* -> Error`, stamping `last_run_at`.
    pub fn mark_error(&mut self, identity: AgentIdentity, now: i64) -> &AgentState {
        self.transition(identity, AgentStatus::Error, now)
    }

    /// Returns the emitting agent to `Idle` and remembers `event` as its latest.
    pub fn record_event(&mut self, event: &Event, now: i64) -> &AgentState {
        let state = &mut self.states[event.source.index()];
        state.status = AgentStatus::Idle;
        state.last_run_at = Some(now);
        state.last_event = Some(event.clone());
        state
    }

    pub fn get(&self, identity: AgentIdentity) -> &AgentState {
        &self.states[identity.index()]
    }

    /// Owned copy of all seven states in `AgentIdentity::ALL` order.
    pub fn to_vec(&self) -> Vec<AgentState> {
        self.states.to_vec()
    }

    fn transition(&mut self, identity: AgentIdentity, status: AgentStatus, now: i64) -> &AgentState {
        let state = &mut self.states[identity.index()];
        state.status = status;
        state.last_run_at = Some(now);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::AgentStateRegistry;
    use crate::model::agent::{AgentIdentity, AgentStatus};
    use crate::model::event::EventInput;

    #[test]
    fn starts_with_every_agent_idle() {
        let registry = AgentStateRegistry::new();
        let states = registry.to_vec();
        assert_eq!(states.len(), AgentIdentity::ALL.len());
        for (state, identity) in states.iter().zip(AgentIdentity::ALL) {
            assert_eq!(state.identity, identity);
            assert_eq!(state.status, AgentStatus::Idle);
            assert_eq!(state.last_run_at, None);
            assert!(state.last_event.is_none());
        }
    }

    #[test]
    fn transitions_touch_only_the_addressed_agent() {
        let mut registry = AgentStateRegistry::new();
        let before = registry.to_vec();

        registry.mark_running(AgentIdentity::LecturePlan, 10);
        let after = registry.to_vec();

        for (old, new) in before.iter().zip(after.iter()) {
            if new.identity == AgentIdentity::LecturePlan {
                assert_eq!(new.status, AgentStatus::Running);
                assert_eq!(new.last_run_at, Some(10));
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn error_is_left_only_by_running_or_event() {
        let mut registry = AgentStateRegistry::new();
        registry.mark_error(AgentIdentity::Notes, 1);
        assert_eq!(registry.get(AgentIdentity::Notes).status, AgentStatus::Error);

        registry.mark_running(AgentIdentity::Notes, 2);
        assert_eq!(registry.get(AgentIdentity::Notes).status, AgentStatus::Running);

        registry.mark_error(AgentIdentity::Notes, 3);
        let event = EventInput::new("evt-1", "notes", "notes.summary-ready")
            .validate()
            .unwrap();
        let state = registry.record_event(&event, 4);
        assert_eq!(state.status, AgentStatus::Idle);
        assert_eq!(state.last_run_at, Some(4));
        assert_eq!(state.last_event.as_ref(), Some(&event));
    }
}
