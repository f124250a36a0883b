//! Singleton settings repository: user context and notification preferences.
//!
//! # Responsibility
//! - Seed default rows the first time a backing file is opened.
//! - Load and overwrite the two singleton rows.
//!
//! # Invariants
//! - Seeding never overwrites an existing row, so values written by an
//!   earlier process survive a restart.
//! - Loaded values are always fully populated.

use crate::clock::now_epoch_ms;
use crate::model::agent::AgentIdentity;
use crate::model::context::UserContext;
use crate::model::preferences::{NotificationPreferences, QuietHours};
use crate::model::{Level, Priority};
use crate::repo::{bool_to_int, int_to_bool, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

const SINGLETON_ID: i64 = 1;

/// Repository interface for singleton settings rows.
pub trait SettingsRepository {
    /// Inserts default rows when none exist yet.
    fn ensure_defaults(&self) -> RepoResult<()>;
    fn load_user_context(&self) -> RepoResult<UserContext>;
    fn save_user_context(&self, context: &UserContext) -> RepoResult<()>;
    fn load_notification_preferences(&self) -> RepoResult<NotificationPreferences>;
    fn save_notification_preferences(&self, prefs: &NotificationPreferences) -> RepoResult<()>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn ensure_defaults(&self) -> RepoResult<()> {
        let now = now_epoch_ms();
        let context = UserContext::default();
        let prefs = NotificationPreferences::default();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO user_context (
                id,
                stress_level,
                energy_level,
                mode,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                SINGLETON_ID,
                context.stress_level.as_str(),
                context.energy_level.as_str(),
                context.mode.as_str(),
                now,
            ],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO notification_preferences (
                id,
                quiet_hours_enabled,
                quiet_start_hour,
                quiet_end_hour,
                minimum_priority,
                allow_critical_in_quiet_hours,
                category_toggles,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                SINGLETON_ID,
                bool_to_int(prefs.quiet_hours.enabled),
                prefs.quiet_hours.start_hour,
                prefs.quiet_hours.end_hour,
                prefs.minimum_priority.as_str(),
                bool_to_int(prefs.allow_critical_in_quiet_hours),
                encode_toggles(&prefs.category_toggles)?,
                now,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn load_user_context(&self) -> RepoResult<UserContext> {
        let row = self
            .conn
            .query_row(
                "SELECT stress_level, energy_level, mode
                 FROM user_context
                 WHERE id = ?1;",
                [SINGLETON_ID],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((stress, energy, mode)) = row else {
            return Err(RepoError::InvalidData(
                "user_context row is missing".to_string(),
            ));
        };

        Ok(UserContext {
            stress_level: parse_level(&stress, "user_context.stress_level")?,
            energy_level: parse_level(&energy, "user_context.energy_level")?,
            mode,
        })
    }

    fn save_user_context(&self, context: &UserContext) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO user_context (id, stress_level, energy_level, mode, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                stress_level = excluded.stress_level,
                energy_level = excluded.energy_level,
                mode = excluded.mode,
                updated_at = excluded.updated_at;",
            params![
                SINGLETON_ID,
                context.stress_level.as_str(),
                context.energy_level.as_str(),
                context.mode.as_str(),
                now_epoch_ms(),
            ],
        )?;
        Ok(())
    }

    fn load_notification_preferences(&self) -> RepoResult<NotificationPreferences> {
        let mut stmt = self.conn.prepare(
            "SELECT
                quiet_hours_enabled,
                quiet_start_hour,
                quiet_end_hour,
                minimum_priority,
                allow_critical_in_quiet_hours,
                category_toggles
             FROM notification_preferences
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([SINGLETON_ID])?;
        let Some(row) = rows.next()? else {
            return Err(RepoError::InvalidData(
                "notification_preferences row is missing".to_string(),
            ));
        };

        let priority_text: String = row.get("minimum_priority")?;
        let minimum_priority = Priority::parse(&priority_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid priority `{priority_text}` in notification_preferences.minimum_priority"
            ))
        })?;
        let toggles_text: String = row.get("category_toggles")?;
        let category_toggles: BTreeMap<AgentIdentity, bool> = serde_json::from_str(&toggles_text)
            .map_err(|err| {
                RepoError::InvalidData(format!(
                    "invalid json in notification_preferences.category_toggles: {err}"
                ))
            })?;

        let mut prefs = NotificationPreferences {
            quiet_hours: QuietHours {
                enabled: int_to_bool(
                    row.get("quiet_hours_enabled")?,
                    "notification_preferences.quiet_hours_enabled",
                )?,
                start_hour: parse_hour(row.get("quiet_start_hour")?, "quiet_start_hour")?,
                end_hour: parse_hour(row.get("quiet_end_hour")?, "quiet_end_hour")?,
            },
            minimum_priority,
            allow_critical_in_quiet_hours: int_to_bool(
                row.get("allow_critical_in_quiet_hours")?,
                "notification_preferences.allow_critical_in_quiet_hours",
            )?,
            category_toggles,
        };
        prefs.fill_missing_categories();
        Ok(prefs)
    }

    fn save_notification_preferences(&self, prefs: &NotificationPreferences) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO notification_preferences (
                id,
                quiet_hours_enabled,
                quiet_start_hour,
                quiet_end_hour,
                minimum_priority,
                allow_critical_in_quiet_hours,
                category_toggles,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                quiet_hours_enabled = excluded.quiet_hours_enabled,
                quiet_start_hour = excluded.quiet_start_hour,
                quiet_end_hour = excluded.quiet_end_hour,
                minimum_priority = excluded.minimum_priority,
                allow_critical_in_quiet_hours = excluded.allow_critical_in_quiet_hours,
                category_toggles = excluded.category_toggles,
                updated_at = excluded.updated_at;",
            params![
                SINGLETON_ID,
                bool_to_int(prefs.quiet_hours.enabled),
                prefs.quiet_hours.start_hour,
                prefs.quiet_hours.end_hour,
                prefs.minimum_priority.as_str(),
                bool_to_int(prefs.allow_critical_in_quiet_hours),
                encode_toggles(&prefs.category_toggles)?,
                now_epoch_ms(),
            ],
        )?;
        Ok(())
    }
}

fn parse_level(value: &str, column: &str) -> RepoResult<Level> {
    Level::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid level `{value}` in {column}")))
}

fn parse_hour(value: i64, column: &str) -> RepoResult<u8> {
    u8::try_from(value)
        .ok()
        .filter(|hour| *hour < 24)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid hour `{value}` in notification_preferences.{column}"
            ))
        })
}

fn encode_toggles(toggles: &BTreeMap<AgentIdentity, bool>) -> RepoResult<String> {
    serde_json::to_string(toggles)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode category toggles: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{SettingsRepository, SqliteSettingsRepository};
    use crate::db::open_db_in_memory;
    use crate::model::agent::AgentIdentity;
    use crate::model::context::UserContext;
    use crate::model::preferences::NotificationPreferences;
    use crate::model::{Level, Priority};

    #[test]
    fn ensure_defaults_seeds_once_and_keeps_existing_rows() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteSettingsRepository::new(&conn);
        repo.ensure_defaults().unwrap();
        assert_eq!(repo.load_user_context().unwrap(), UserContext::default());
        assert_eq!(
            repo.load_notification_preferences().unwrap(),
            NotificationPreferences::default()
        );

        let custom = UserContext {
            stress_level: Level::High,
            energy_level: Level::Low,
            mode: "recovery".to_string(),
        };
        repo.save_user_context(&custom).unwrap();
        repo.ensure_defaults().unwrap();
        assert_eq!(repo.load_user_context().unwrap(), custom);
    }

    #[test]
    fn preferences_round_trip_through_row() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteSettingsRepository::new(&conn);
        repo.ensure_defaults().unwrap();

        let mut prefs = NotificationPreferences::default();
        prefs.quiet_hours.enabled = true;
        prefs.quiet_hours.start_hour = 23;
        prefs.minimum_priority = Priority::High;
        prefs.category_toggles.insert(AgentIdentity::VideoEditor, false);
        repo.save_notification_preferences(&prefs).unwrap();

        assert_eq!(repo.load_notification_preferences().unwrap(), prefs);
    }

    #[test]
    fn load_without_seed_reports_invalid_data() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteSettingsRepository::new(&conn);
        assert!(repo.load_user_context().is_err());
    }
}
