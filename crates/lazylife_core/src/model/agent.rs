//! Agent identities and per-agent run status.
//!
//! # Invariants
//! - `AgentIdentity::ALL` lists every identity exactly once, in the order
//!   snapshots report them.
//! - An `AgentState` never outlives or predates its registry.

use crate::model::event::Event;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the seven fixed producers of operational events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentIdentity {
    Notes,
    LecturePlan,
    AssignmentTracker,
    FoodTracking,
    SocialHighlights,
    VideoEditor,
    Orchestrator,
}

impl AgentIdentity {
    /// Every identity, in snapshot order.
    pub const ALL: [AgentIdentity; 7] = [
        Self::Notes,
        Self::LecturePlan,
        Self::AssignmentTracker,
        Self::FoodTracking,
        Self::SocialHighlights,
        Self::VideoEditor,
        Self::Orchestrator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::LecturePlan => "lecture-plan",
            Self::AssignmentTracker => "assignment-tracker",
            Self::FoodTracking => "food-tracking",
            Self::SocialHighlights => "social-highlights",
            Self::VideoEditor => "video-editor",
            Self::Orchestrator => "orchestrator",
        }
    }

    /// Parses the wire form. Surrounding whitespace is ignored; case is not.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "notes" => Some(Self::Notes),
            "lecture-plan" => Some(Self::LecturePlan),
            "assignment-tracker" => Some(Self::AssignmentTracker),
            "food-tracking" => Some(Self::FoodTracking),
            "social-highlights" => Some(Self::SocialHighlights),
            "video-editor" => Some(Self::VideoEditor),
            "orchestrator" => Some(Self::Orchestrator),
            _ => None,
        }
    }

    /// Position inside `ALL`.
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Display for AgentIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run status of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Running,
    Error,
}

impl AgentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Error => "error",
        }
    }
}

/// Current run status of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentState {
    pub identity: AgentIdentity,
    pub status: AgentStatus,
    /// Unix epoch milliseconds of the last transition, `None` until the
    /// agent first runs.
    pub last_run_at: Option<i64>,
    /// Value copy of the newest event this agent produced.
    pub last_event: Option<Event>,
}

impl AgentState {
    /// Construction-time state: idle, never run.
    pub fn idle(identity: AgentIdentity) -> Self {
        Self {
            identity,
            status: AgentStatus::Idle,
            last_run_at: None,
            last_event: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AgentIdentity;

    #[test]
    fn all_is_indexed_in_declaration_order() {
        for (position, identity) in AgentIdentity::ALL.iter().enumerate() {
            assert_eq!(identity.index(), position);
        }
    }

    #[test]
    fn wire_names_round_trip_and_reject_unknown() {
        for identity in AgentIdentity::ALL {
            assert_eq!(AgentIdentity::parse(identity.as_str()), Some(identity));
        }
        assert_eq!(AgentIdentity::parse(" notes "), Some(AgentIdentity::Notes));
        assert_eq!(AgentIdentity::parse("Notes"), None);
        assert_eq!(AgentIdentity::parse("calendar-sync"), None);
    }

    #[test]
    fn serializes_as_kebab_case() {
        let json = serde_json::to_string(&AgentIdentity::LecturePlan).unwrap();
        assert_eq!(json, "\"lecture-plan\"");
    }
}
