//! User context singleton and its merge-patch.

use crate::model::Level;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODE: &str = "balanced";

/// Current user state used to steer planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub stress_level: Level,
    pub energy_level: Level,
    /// Free-form; `focus`, `recovery` and `balanced` carry meaning in the
    /// summary.
    pub mode: String,
}

impl Default for UserContext {
    fn default() -> Self {
        Self {
            stress_level: Level::Medium,
            energy_level: Level::Medium,
            mode: DEFAULT_MODE.to_string(),
        }
    }
}

/// Partial update: `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContextPatch {
    pub stress_level: Option<Level>,
    pub energy_level: Option<Level>,
    pub mode: Option<String>,
}

impl UserContext {
    /// Returns a copy with every present patch field applied.
    pub fn merged(&self, patch: &UserContextPatch) -> Self {
        Self {
            stress_level: patch.stress_level.unwrap_or(self.stress_level),
            energy_level: patch.energy_level.unwrap_or(self.energy_level),
            mode: patch.mode.clone().unwrap_or_else(|| self.mode.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{UserContext, UserContextPatch};
    use crate::model::Level;

    #[test]
    fn merge_keeps_absent_fields() {
        let current = UserContext::default();
        let stressed = current.merged(&UserContextPatch {
            stress_level: Some(Level::High),
            ..UserContextPatch::default()
        });
        let tired = stressed.merged(&UserContextPatch {
            energy_level: Some(Level::Low),
            ..UserContextPatch::default()
        });

        assert_eq!(tired.stress_level, Level::High);
        assert_eq!(tired.energy_level, Level::Low);
        assert_eq!(tired.mode, "balanced");
    }

    #[test]
    fn empty_patch_is_identity() {
        let current = UserContext {
            stress_level: Level::Low,
            energy_level: Level::High,
            mode: "focus".to_string(),
        };
        assert_eq!(current.merged(&UserContextPatch::default()), current);
    }
}
