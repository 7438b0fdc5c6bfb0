use crate::errors::{AppError, AppResult};
use crate::models::actor::Placement;
use crate::models::day_summary::{DailySummary, DayStatus, SummaryUpsert};
use crate::models::device_type::DeviceType;
use crate::models::event::{AttendanceEvent, NewEvent};
use crate::models::event_type::EventType;
use crate::models::override_record::AttendanceRecord;
use crate::store::SummaryQuery;
use crate::utils::time::from_millis;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn conversion_err(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn ts_col(row: &Row, name: &str) -> Result<DateTime<Utc>> {
    let ms: i64 = row.get(name)?;
    from_millis(ms).map_err(|e| conversion_err(0, e))
}

fn opt_ts_col(row: &Row, name: &str) -> Result<Option<DateTime<Utc>>> {
    let ms: Option<i64> = row.get(name)?;
    ms.map(from_millis)
        .transpose()
        .map_err(|e| conversion_err(0, e))
}

fn date_col(row: &Row, name: &str) -> Result<NaiveDate> {
    let s: String = row.get(name)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| conversion_err(0, AppError::InvalidDate(s)))
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub fn map_event_row(row: &Row) -> Result<AttendanceEvent> {
    let kind: String = row.get("event_type")?;
    let event_type = EventType::from_db_str(&kind)
        .ok_or_else(|| conversion_err(0, AppError::InvalidEventType(kind.clone())))?;

    let device: String = row.get("device_type")?;
    let device_type = DeviceType::from_db_str(&device).ok_or_else(|| {
        conversion_err(0, AppError::Validation(format!("Invalid device type: {device}")))
    })?;

    Ok(AttendanceEvent {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        event_type,
        timestamp: ts_col(row, "timestamp_ms")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        accuracy: row.get("accuracy")?,
        location_id: row.get("location_id")?,
        task_id: row.get("task_id")?,
        device_type,
    })
}

pub fn insert_event(conn: &Connection, ev: NewEvent) -> AppResult<AttendanceEvent> {
    conn.execute(
        "INSERT INTO attendance_events
            (user_id, event_type, timestamp_ms, latitude, longitude, accuracy, location_id, task_id, device_type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            ev.user_id,
            ev.event_type.to_db_str(),
            ev.timestamp.timestamp_millis(),
            ev.payload.latitude,
            ev.payload.longitude,
            ev.payload.accuracy,
            ev.payload.location_id,
            ev.payload.task_id,
            ev.payload.device_type.unwrap_or_default().to_db_str(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    Ok(ev.into_event(id))
}

pub fn load_events_between(
    conn: &Connection,
    user_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> AppResult<Vec<AttendanceEvent>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM attendance_events
         WHERE user_id = ?1 AND timestamp_ms >= ?2 AND timestamp_ms < ?3
         ORDER BY timestamp_ms ASC, id ASC",
    )?;

    let rows = stmt.query_map(
        params![user_id, from.timestamp_millis(), to.timestamp_millis()],
        map_event_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_event_instants(
    conn: &Connection,
    user_id: Option<&str>,
) -> AppResult<Vec<(String, DateTime<Utc>)>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, timestamp_ms FROM attendance_events
         WHERE ?1 IS NULL OR user_id = ?1
         ORDER BY user_id ASC, timestamp_ms ASC",
    )?;

    let rows = stmt.query_map([user_id], |row| {
        Ok((row.get::<_, String>(0)?, ts_col(row, "timestamp_ms")?))
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Daily summaries
// ---------------------------------------------------------------------------

pub fn map_summary_row(row: &Row) -> Result<DailySummary> {
    let status_str: String = row.get("status")?;
    let status = DayStatus::from_db_str(&status_str).ok_or_else(|| {
        conversion_err(0, AppError::Validation(format!("Invalid status: {status_str}")))
    })?;

    Ok(DailySummary {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        date: date_col(row, "date")?,
        first_check_in: opt_ts_col(row, "first_check_in_ms")?,
        last_check_out: opt_ts_col(row, "last_check_out_ms")?,
        total_work_minutes: row.get("total_work_minutes")?,
        total_break_minutes: row.get("total_break_minutes")?,
        sessions_count: row.get("sessions_count")?,
        status,
    })
}

/// Insert or fully replace the summary for `(user_id, date)`; nulls overwrite too.
pub fn upsert_summary(conn: &Connection, s: &SummaryUpsert) -> AppResult<DailySummary> {
    let id: i64 = conn.query_row(
        "INSERT INTO attendance_daily_summaries
            (user_id, date, first_check_in_ms, last_check_out_ms,
             total_work_minutes, total_break_minutes, sessions_count, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(user_id, date) DO UPDATE SET
             first_check_in_ms   = excluded.first_check_in_ms,
             last_check_out_ms   = excluded.last_check_out_ms,
             total_work_minutes  = excluded.total_work_minutes,
             total_break_minutes = excluded.total_break_minutes,
             sessions_count      = excluded.sessions_count,
             status              = excluded.status
         RETURNING id",
        params![
            s.user_id,
            s.date.format("%Y-%m-%d").to_string(),
            s.first_check_in.map(|t| t.timestamp_millis()),
            s.last_check_out.map(|t| t.timestamp_millis()),
            s.total_work_minutes,
            s.total_break_minutes,
            s.sessions_count,
            s.status.to_db_str(),
        ],
        |row| row.get(0),
    )?;

    Ok(DailySummary {
        id,
        user_id: s.user_id.clone(),
        date: s.date,
        first_check_in: s.first_check_in,
        last_check_out: s.last_check_out,
        total_work_minutes: s.total_work_minutes,
        total_break_minutes: s.total_break_minutes,
        sessions_count: s.sessions_count,
        status: s.status,
    })
}

pub fn find_summary(
    conn: &Connection,
    user_id: &str,
    date: NaiveDate,
) -> AppResult<Option<DailySummary>> {
    let found = conn
        .query_row(
            "SELECT * FROM attendance_daily_summaries WHERE user_id = ?1 AND date = ?2",
            params![user_id, date.format("%Y-%m-%d").to_string()],
            map_summary_row,
        )
        .optional()?;
    Ok(found)
}

pub fn list_summaries(conn: &Connection, q: &SummaryQuery) -> AppResult<(Vec<DailySummary>, i64)> {
    let from = q.from.map(|d| d.format("%Y-%m-%d").to_string());
    let to = q.to.map(|d| d.format("%Y-%m-%d").to_string());

    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM attendance_daily_summaries
         WHERE user_id = ?1
           AND (?2 IS NULL OR date >= ?2)
           AND (?3 IS NULL OR date <= ?3)",
        params![q.user_id, from, to],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT * FROM attendance_daily_summaries
         WHERE user_id = ?1
           AND (?2 IS NULL OR date >= ?2)
           AND (?3 IS NULL OR date <= ?3)
         ORDER BY date DESC
         LIMIT ?4 OFFSET ?5",
    )?;
    let rows = stmt.query_map(
        params![q.user_id, from, to, q.limit, q.offset],
        map_summary_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok((out, total))
}

pub fn delete_summaries(conn: &Connection, user_id: Option<&str>) -> AppResult<usize> {
    let n = conn.execute(
        "DELETE FROM attendance_daily_summaries WHERE ?1 IS NULL OR user_id = ?1",
        [user_id],
    )?;
    Ok(n)
}

// ---------------------------------------------------------------------------
// Legacy records
// ---------------------------------------------------------------------------

fn map_record_row(row: &Row) -> Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        date: date_col(row, "date")?,
        check_in_at: opt_ts_col(row, "check_in_ms")?,
        check_out_at: opt_ts_col(row, "check_out_ms")?,
        is_overridden: row.get::<_, i64>("is_overridden")? == 1,
        override_by: row.get("override_by")?,
        override_reason: row.get("override_reason")?,
    })
}

pub fn find_record(conn: &Connection, id: &str) -> AppResult<Option<AttendanceRecord>> {
    let found = conn
        .query_row(
            "SELECT * FROM attendance_records WHERE id = ?1",
            [id],
            map_record_row,
        )
        .optional()?;
    Ok(found)
}

pub fn save_record(conn: &Connection, r: &AttendanceRecord) -> AppResult<()> {
    conn.execute(
        "INSERT INTO attendance_records
            (id, user_id, date, check_in_ms, check_out_ms, is_overridden, override_by, override_reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
             user_id = excluded.user_id,
             date = excluded.date,
             check_in_ms = excluded.check_in_ms,
             check_out_ms = excluded.check_out_ms,
             is_overridden = excluded.is_overridden,
             override_by = excluded.override_by,
             override_reason = excluded.override_reason",
        params![
            r.id,
            r.user_id,
            r.date.format("%Y-%m-%d").to_string(),
            r.check_in_at.map(|t| t.timestamp_millis()),
            r.check_out_at.map(|t| t.timestamp_millis()),
            if r.is_overridden { 1 } else { 0 },
            r.override_by,
            r.override_reason,
        ],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// User directory
// ---------------------------------------------------------------------------

pub fn find_placement(conn: &Connection, user_id: &str) -> AppResult<Option<Placement>> {
    let found = conn
        .query_row(
            "SELECT domain_id, team_id FROM user_directory WHERE user_id = ?1",
            [user_id],
            |row| {
                Ok(Placement {
                    domain_id: row.get(0)?,
                    team_id: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(found)
}

pub fn upsert_placement(conn: &Connection, user_id: &str, p: &Placement) -> AppResult<()> {
    conn.execute(
        "INSERT INTO user_directory (user_id, domain_id, team_id) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET domain_id = excluded.domain_id, team_id = excluded.team_id",
        params![user_id, p.domain_id, p.team_id],
    )?;
    Ok(())
}
