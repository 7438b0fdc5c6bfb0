use crate::errors::{AppError, AppResult};
use crate::models::override_record::{AuditEntry, NewAuditEntry};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rusqlite::params;

/// Write an entry into the `audit_log` table.
pub fn write_audit(conn: &Connection, entry: NewAuditEntry) -> AppResult<AuditEntry> {
    let now = Utc::now();

    let mut stmt = conn.prepare_cached(
        "INSERT INTO audit_log (actor_id, action, entity_type, entity_id, payload, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    stmt.execute(params![
        entry.actor_id,
        entry.action,
        entry.entity_type,
        entry.entity_id,
        entry.payload,
        now.to_rfc3339(),
    ])?;

    Ok(AuditEntry {
        id: conn.last_insert_rowid(),
        actor_id: entry.actor_id,
        action: entry.action,
        entity_type: entry.entity_type,
        entity_id: entry.entity_id,
        payload: entry.payload,
        created_at: now,
    })
}

pub fn load_audit(conn: &Connection) -> AppResult<Vec<AuditEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, actor_id, action, entity_type, entity_id, payload, created_at
         FROM audit_log ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        let raw_date: String = row.get(6)?;
        Ok((
            AuditEntry {
                id: row.get(0)?,
                actor_id: row.get(1)?,
                action: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                payload: row.get(5)?,
                created_at: DateTime::<Utc>::MIN_UTC,
            },
            raw_date,
        ))
    })?;

    let mut out = Vec::new();
    for r in rows {
        let (mut entry, raw_date) = r?;
        entry.created_at = DateTime::parse_from_rfc3339(&raw_date)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| AppError::InvalidTimestamp(raw_date))?;
        out.push(entry);
    }
    Ok(out)
}
