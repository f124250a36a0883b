//! Derived summary over live telemetry and user context.
//!
//! # Responsibility
//! - Compute the dashboard summary from the current event log and user
//!   context on every read.
//!
//! # Invariants
//! - Pure: no storage, no side effects, same inputs give the same output.
//! - `pending_deadlines` counts `assignment.deadline` events in the log, not
//!   rows in the durable deadline collection.
//! - `digest_ready` is latched: once a digest-ready event has been seen it
//!   stays true, even after that event leaves the log.

use crate::model::context::UserContext;
use crate::model::event::Event;
use serde::{Deserialize, Serialize};

pub const DEADLINE_EVENT_TYPE: &str = "assignment.deadline";
pub const FOOD_NUDGE_EVENT_TYPE: &str = "food.nudge";
pub const DIGEST_READY_EVENT_TYPE: &str = "video.digest-ready";

const FOCUS_MODE: &str = "focus";
const RECOVERY_MODE: &str = "recovery";

const FOCUS_TEXT: &str = "Deep work + assignment completion";
const RECOVERY_TEXT: &str = "Light planning + recovery tasks";
const BALANCED_TEXT: &str = "Balanced schedule with deadlines first";

const MEAL_COMPLIANCE_MAX: u32 = 100;
const MEAL_COMPLIANCE_FLOOR: u32 = 10;
const MEAL_COMPLIANCE_PENALTY: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub today_focus: String,
    pub pending_deadlines: usize,
    pub meal_compliance: u32,
    pub digest_ready: bool,
}

/// Computes the summary from events (any order), the current context and
/// whether a digest-ready event was seen earlier.
pub fn compute_summary<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    context: &UserContext,
    digest_seen: bool,
) -> Summary {
    let mut pending_deadlines = 0usize;
    let mut food_nudges = 0usize;
    let mut digest_ready = digest_seen;

    for event in events {
        match event.event_type.as_str() {
            DEADLINE_EVENT_TYPE => pending_deadlines += 1,
            FOOD_NUDGE_EVENT_TYPE => food_nudges += 1,
            DIGEST_READY_EVENT_TYPE => digest_ready = true,
            _ => {}
        }
    }

    Summary {
        today_focus: today_focus(&context.mode).to_string(),
        pending_deadlines,
        meal_compliance: meal_compliance(food_nudges),
        digest_ready,
    }
}

/// Focus line for the given mode. Unknown modes fall back to balanced.
pub fn today_focus(mode: &str) -> &'static str {
    match mode {
        FOCUS_MODE => FOCUS_TEXT,
        RECOVERY_MODE => RECOVERY_TEXT,
        _ => BALANCED_TEXT,
    }
}

/// `max(10, 100 - 8 * nudges)`.
pub fn meal_compliance(food_nudges: usize) -> u32 {
    let penalty = u32::try_from(food_nudges)
        .unwrap_or(u32::MAX)
        .saturating_mul(MEAL_COMPLIANCE_PENALTY);
    MEAL_COMPLIANCE_MAX
        .saturating_sub(penalty)
        .max(MEAL_COMPLIANCE_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::{compute_summary, meal_compliance, today_focus};
    use crate::model::context::UserContext;
    use crate::model::event::{Event, EventInput};

    fn event(event_type: &str) -> Event {
        EventInput::new("e", "orchestrator", event_type)
            .validate()
            .unwrap()
    }

    #[test]
    fn meal_compliance_fixed_points() {
        assert_eq!(meal_compliance(0), 100);
        assert_eq!(meal_compliance(1), 92);
        assert_eq!(meal_compliance(5), 60);
        assert_eq!(meal_compliance(11), 12);
        assert_eq!(meal_compliance(12), 10);
        assert_eq!(meal_compliance(20), 10);
        assert_eq!(meal_compliance(usize::MAX), 10);
    }

    #[test]
    fn focus_text_by_mode() {
        assert_eq!(today_focus("focus"), "Deep work + assignment completion");
        assert_eq!(today_focus("recovery"), "Light planning + recovery tasks");
        assert_eq!(today_focus("balanced"), "Balanced schedule with deadlines first");
        assert_eq!(today_focus("Focus"), "Balanced schedule with deadlines first");
    }

    #[test]
    fn counts_only_matching_event_types() {
        let events = vec![
            event("assignment.deadline"),
            event("assignment.deadline"),
            event("assignment.created"),
            event("food.nudge"),
            event("video.digest-ready"),
        ];
        let summary = compute_summary(&events, &UserContext::default(), false);
        assert_eq!(summary.pending_deadlines, 2);
        assert_eq!(summary.meal_compliance, 92);
        assert!(summary.digest_ready);
    }

    #[test]
    fn empty_log_has_neutral_summary() {
        let summary = compute_summary(Vec::<Event>::new().iter(), &UserContext::default(), false);
        assert_eq!(summary.pending_deadlines, 0);
        assert_eq!(summary.meal_compliance, 100);
        assert!(!summary.digest_ready);
        assert_eq!(summary.today_focus, "Balanced schedule with deadlines first");
    }

    #[test]
    fn latched_digest_holds_without_matching_events() {
        let events = vec![event("tick")];
        assert!(compute_summary(&events, &UserContext::default(), true).digest_ready);
        assert!(!compute_summary(&events, &UserContext::default(), false).digest_ready);
    }
}
