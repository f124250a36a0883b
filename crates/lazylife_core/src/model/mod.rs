//! Value types shared by the transient and durable tiers.
//!
//! # Responsibility
//! - Define the agent, event, notification, settings and durable entity
//!   shapes exchanged with callers.
//! - Own field-level validation so the facade can reject bad input before
//!   touching any state.
//!
//! # Invariants
//! - The agent set is closed: exactly seven identities, known at compile time.
//! - Server-generated ids and timestamps never come from caller input.

pub mod agent;
pub mod context;
pub mod entity;
pub mod event;
pub mod notification;
pub mod preferences;

use serde::{Deserialize, Serialize};

/// Shared four-step priority scale for events, notifications and deadlines.
///
/// Ordering follows severity: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Three-step scale used by stress, energy and lecture workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Level, Priority};

    #[test]
    fn priority_orders_by_severity() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::High < Priority::Critical);
    }

    #[test]
    fn text_forms_parse_back() {
        for priority in [
            Priority::Low,
            Priority::Medium,
            Priority::High,
            Priority::Critical,
        ] {
            assert_eq!(Priority::parse(priority.as_str()), Some(priority));
        }
        assert_eq!(Level::parse("high"), Some(Level::High));
        assert_eq!(Level::parse("critical"), None);
    }
}
