//! Versioned schema for the durable tier of the runtime store.
//!
//! # Responsibility
//! - Step 1 creates the three entity collections (schedule events,
//!   deadlines, journal entries).
//! - Step 2 adds the singleton user-context and notification-preference rows.
//!
//! # Invariants
//! - The schema step a file has reached is `PRAGMA user_version`.
//! - All pending steps commit together or not at all.
//! - A file written by a newer build is refused instead of downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "entity_collections",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "settings_rows",
        sql: include_str!("0002_settings.sql"),
    },
];

/// Schema step this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn` up to [`latest_version`] and returns how many steps ran.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this build.
/// - `Sqlite` when a step fails; the file stays at its previous version.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > found)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    for step in &pending {
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    Ok(pending.len())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, schema_version, SCHEMA_STEPS};
    use rusqlite::Connection;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn file_at_step_one_gains_settings_rows_only() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_STEPS[0].sql).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();
        conn.execute(
            "INSERT INTO deadlines (id, course, task, due_date, priority, completed, created_at, updated_at)
             VALUES ('d1', 'DAT560', 'Lab', '2026-02-24T23:59:00Z', 'high', 0, 1, 1);",
            [],
        )
        .unwrap();

        assert_eq!(apply_migrations(&mut conn).unwrap(), 1);
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
        assert!(table_exists(&conn, "user_context"));
        assert!(table_exists(&conn, "notification_preferences"));
        let kept: i64 = conn
            .query_row("SELECT COUNT(*) FROM deadlines;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(kept, 1);
    }

    #[test]
    fn up_to_date_file_runs_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(apply_migrations(&mut conn).unwrap(), SCHEMA_STEPS.len());
        assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
    }
}
