//! Notification preferences singleton, its merge-patch and delivery gating.
//!
//! # Invariants
//! - Every agent identity has a category toggle; missing keys are filled
//!   with `true` on read and on merge.
//! - Quiet-hour bounds are hours of the day (`0..=23`).

use crate::error::{StoreError, StoreResult};
use crate::model::agent::AgentIdentity;
use crate::model::Priority;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const HOURS_PER_DAY: u8 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuietHours {
    pub enabled: bool,
    pub start_hour: u8,
    pub end_hour: u8,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: 22,
            end_hour: 7,
        }
    }
}

impl QuietHours {
    /// Whether `hour` falls inside the quiet window.
    ///
    /// The window is `[start, end)` and wraps past midnight when
    /// `start > end`. `start == end` is an empty window.
    pub fn covers(&self, hour: u8) -> bool {
        if !self.enabled {
            return false;
        }
        let hour = hour % HOURS_PER_DAY;
        if self.start_hour <= self.end_hour {
            self.start_hour <= hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub quiet_hours: QuietHours,
    pub minimum_priority: Priority,
    pub allow_critical_in_quiet_hours: bool,
    pub category_toggles: BTreeMap<AgentIdentity, bool>,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            quiet_hours: QuietHours::default(),
            minimum_priority: Priority::Low,
            allow_critical_in_quiet_hours: true,
            category_toggles: all_categories_enabled(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuietHoursPatch {
    pub enabled: Option<bool>,
    pub start_hour: Option<u8>,
    pub end_hour: Option<u8>,
}

/// Partial update: absent fields keep their stored value. Category toggles
/// are merged key by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferencesPatch {
    pub quiet_hours: Option<QuietHoursPatch>,
    pub minimum_priority: Option<Priority>,
    pub allow_critical_in_quiet_hours: Option<bool>,
    pub category_toggles: Option<BTreeMap<AgentIdentity, bool>>,
}

impl NotificationPreferences {
    /// Returns a copy with every present patch field applied.
    ///
    /// # Errors
    /// - `InvalidPreferences` when a resulting quiet-hour bound is not a valid
    ///   hour of the day.
    pub fn merged(&self, patch: &NotificationPreferencesPatch) -> StoreResult<Self> {
        let mut next = self.clone();

        if let Some(quiet) = patch.quiet_hours {
            if let Some(enabled) = quiet.enabled {
                next.quiet_hours.enabled = enabled;
            }
            if let Some(start_hour) = quiet.start_hour {
                next.quiet_hours.start_hour = start_hour;
            }
            if let Some(end_hour) = quiet.end_hour {
                next.quiet_hours.end_hour = end_hour;
            }
        }
        if let Some(priority) = patch.minimum_priority {
            next.minimum_priority = priority;
        }
        if let Some(allow) = patch.allow_critical_in_quiet_hours {
            next.allow_critical_in_quiet_hours = allow;
        }
        if let Some(toggles) = &patch.category_toggles {
            for (identity, enabled) in toggles {
                next.category_toggles.insert(*identity, *enabled);
            }
        }

        next.fill_missing_categories();
        next.validate()?;
        Ok(next)
    }

    /// Checks field ranges.
    pub fn validate(&self) -> StoreResult<()> {
        for (name, hour) in [
            ("startHour", self.quiet_hours.start_hour),
            ("endHour", self.quiet_hours.end_hour),
        ] {
            if hour >= HOURS_PER_DAY {
                return Err(StoreError::InvalidPreferences(format!(
                    "quiet hours {name} must be within 0-23, got {hour}"
                )));
            }
        }
        Ok(())
    }

    /// Whether a notification with `priority` from `source` would be
    /// delivered at local `hour` under these preferences.
    pub fn allows(&self, priority: Priority, source: AgentIdentity, hour: u8) -> bool {
        let category_enabled = self
            .category_toggles
            .get(&source)
            .copied()
            .unwrap_or(true);
        if !category_enabled || priority < self.minimum_priority {
            return false;
        }
        if self.quiet_hours.covers(hour) {
            return priority == Priority::Critical && self.allow_critical_in_quiet_hours;
        }
        true
    }

    pub(crate) fn fill_missing_categories(&mut self) {
        for identity in AgentIdentity::ALL {
            self.category_toggles.entry(identity).or_insert(true);
        }
    }
}

fn all_categories_enabled() -> BTreeMap<AgentIdentity, bool> {
    AgentIdentity::ALL
        .into_iter()
        .map(|identity| (identity, true))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{NotificationPreferences, NotificationPreferencesPatch, QuietHours, QuietHoursPatch};
    use crate::error::StoreError;
    use crate::model::agent::AgentIdentity;
    use crate::model::Priority;
    use std::collections::BTreeMap;

    #[test]
    fn defaults_enable_every_category() {
        let prefs = NotificationPreferences::default();
        assert!(!prefs.quiet_hours.enabled);
        assert_eq!(prefs.minimum_priority, Priority::Low);
        assert!(prefs.allow_critical_in_quiet_hours);
        assert_eq!(prefs.category_toggles.len(), AgentIdentity::ALL.len());
        assert!(prefs.category_toggles.values().all(|enabled| *enabled));
    }

    #[test]
    fn quiet_window_wraps_past_midnight() {
        let window = QuietHours {
            enabled: true,
            start_hour: 22,
            end_hour: 7,
        };
        assert!(window.covers(23));
        assert!(window.covers(0));
        assert!(window.covers(6));
        assert!(!window.covers(7));
        assert!(!window.covers(12));

        let same_day = QuietHours {
            enabled: true,
            start_hour: 13,
            end_hour: 15,
        };
        assert!(same_day.covers(14));
        assert!(!same_day.covers(15));

        let empty = QuietHours {
            enabled: true,
            start_hour: 9,
            end_hour: 9,
        };
        assert!(!empty.covers(9));
    }

    #[test]
    fn merge_patches_nested_fields_independently() {
        let prefs = NotificationPreferences::default()
            .merged(&NotificationPreferencesPatch {
                quiet_hours: Some(QuietHoursPatch {
                    enabled: Some(true),
                    ..QuietHoursPatch::default()
                }),
                category_toggles: Some(BTreeMap::from([(AgentIdentity::SocialHighlights, false)])),
                ..NotificationPreferencesPatch::default()
            })
            .unwrap();

        assert!(prefs.quiet_hours.enabled);
        assert_eq!(prefs.quiet_hours.start_hour, 22);
        assert!(!prefs.category_toggles[&AgentIdentity::SocialHighlights]);
        assert!(prefs.category_toggles[&AgentIdentity::Notes]);
    }

    #[test]
    fn merge_rejects_out_of_range_hours() {
        let err = NotificationPreferences::default()
            .merged(&NotificationPreferencesPatch {
                quiet_hours: Some(QuietHoursPatch {
                    end_hour: Some(24),
                    ..QuietHoursPatch::default()
                }),
                ..NotificationPreferencesPatch::default()
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPreferences(_)));
    }

    #[test]
    fn allows_applies_category_priority_and_quiet_hours() {
        let mut prefs = NotificationPreferences::default();
        prefs.minimum_priority = Priority::Medium;
        prefs.quiet_hours = QuietHours {
            enabled: true,
            start_hour: 22,
            end_hour: 7,
        };
        prefs.category_toggles.insert(AgentIdentity::SocialHighlights, false);

        assert!(prefs.allows(Priority::High, AgentIdentity::Notes, 12));
        assert!(!prefs.allows(Priority::Low, AgentIdentity::Notes, 12));
        assert!(!prefs.allows(Priority::Critical, AgentIdentity::SocialHighlights, 12));
        assert!(!prefs.allows(Priority::High, AgentIdentity::Notes, 23));
        assert!(prefs.allows(Priority::Critical, AgentIdentity::Notes, 23));

        prefs.allow_critical_in_quiet_hours = false;
        assert!(!prefs.allows(Priority::Critical, AgentIdentity::Notes, 23));
    }
}
