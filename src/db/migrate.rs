//! Versioned schema migrations. Every migration runs once and is recorded in
//! `schema_migrations`; running the engine again is a no-op.

use crate::errors::{AppError, AppResult};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_attendance_events",
        description: "Create append-only attendance_events log",
        sql: r#"
        CREATE TABLE IF NOT EXISTS attendance_events (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       TEXT    NOT NULL,
            event_type    TEXT    NOT NULL CHECK(event_type IN ('CHECK_IN','CHECK_OUT')),
            timestamp_ms  INTEGER NOT NULL,
            latitude      REAL,
            longitude     REAL,
            accuracy      REAL,
            location_id   TEXT,
            task_id       TEXT,
            device_type   TEXT    NOT NULL DEFAULT 'MOBILE' CHECK(device_type IN ('MOBILE','DESKTOP')),
            CHECK ((latitude IS NULL) = (longitude IS NULL))
        );

        CREATE INDEX IF NOT EXISTS idx_events_user_ts ON attendance_events(user_id, timestamp_ms, id);

        CREATE TRIGGER IF NOT EXISTS attendance_events_no_update
        BEFORE UPDATE ON attendance_events
        BEGIN
            SELECT RAISE(ABORT, 'attendance_events is append-only');
        END;
        "#,
    },
    Migration {
        version: "20250301_0002_daily_summaries",
        description: "Create attendance_daily_summaries cache",
        sql: r#"
        CREATE TABLE IF NOT EXISTS attendance_daily_summaries (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id              TEXT    NOT NULL,
            date                 TEXT    NOT NULL,
            first_check_in_ms    INTEGER,
            last_check_out_ms    INTEGER,
            total_work_minutes   INTEGER NOT NULL DEFAULT 0 CHECK(total_work_minutes >= 0),
            total_break_minutes  INTEGER NOT NULL DEFAULT 0 CHECK(total_break_minutes >= 0),
            sessions_count       INTEGER NOT NULL DEFAULT 0 CHECK(sessions_count >= 0),
            status               TEXT    NOT NULL
                CHECK(status IN ('PRESENT','PARTIAL','ABSENT','NEEDS_VERIFICATION')),
            UNIQUE(user_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_summaries_user_date ON attendance_daily_summaries(user_id, date);
        "#,
    },
    Migration {
        version: "20250301_0003_legacy_records_and_audit",
        description: "Create attendance_records and audit_log",
        sql: r#"
        CREATE TABLE IF NOT EXISTS attendance_records (
            id               TEXT PRIMARY KEY,
            user_id          TEXT    NOT NULL,
            date             TEXT    NOT NULL,
            check_in_ms      INTEGER,
            check_out_ms     INTEGER,
            is_overridden    INTEGER NOT NULL DEFAULT 0,
            override_by      TEXT,
            override_reason  TEXT
        );

        CREATE TABLE IF NOT EXISTS audit_log (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            actor_id     TEXT NOT NULL,
            action       TEXT NOT NULL,
            entity_type  TEXT NOT NULL,
            entity_id    TEXT NOT NULL DEFAULT '',
            payload      TEXT NOT NULL DEFAULT '{}',
            created_at   TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20250315_0004_user_directory",
        description: "Create user_directory for hierarchy checks",
        sql: r#"
        CREATE TABLE IF NOT EXISTS user_directory (
            user_id    TEXT PRIMARY KEY,
            domain_id  TEXT,
            team_id    TEXT
        );
        "#,
    },
];

fn ensure_migrations_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version      TEXT PRIMARY KEY,
            description  TEXT NOT NULL,
            applied_at   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM schema_migrations WHERE version = ?1",
            [version],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Versions already recorded, oldest first.
pub fn applied_versions(conn: &Connection) -> AppResult<Vec<String>> {
    ensure_migrations_table(conn)?;
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version ASC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Public entry point: run all pending migrations. Returns how many were applied.
pub fn run_pending_migrations(conn: &mut Connection) -> AppResult<usize> {
    ensure_migrations_table(conn)?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(m.sql)
            .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;
        tx.execute(
            "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
            params![m.version, m.description, Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;

        tracing::info!(version = m.version, "migration applied: {}", m.description);
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        let first = run_pending_migrations(&mut conn).unwrap();
        assert_eq!(first, MIGRATIONS.len());
        assert_eq!(run_pending_migrations(&mut conn).unwrap(), 0);
        assert_eq!(applied_versions(&conn).unwrap().len(), MIGRATIONS.len());
    }

    #[test]
    fn events_cannot_be_updated() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO attendance_events (user_id, event_type, timestamp_ms) VALUES ('u', 'CHECK_IN', 0)",
            [],
        )
        .unwrap();
        let res = conn.execute("UPDATE attendance_events SET timestamp_ms = 1", []);
        assert!(res.is_err());
    }
}
