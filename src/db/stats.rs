use crate::db::migrate::applied_versions;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DbStats {
    pub events: i64,
    pub users: i64,
    pub summaries: i64,
    pub records: i64,
    pub audit_entries: i64,
    pub last_event_ms: Option<i64>,
    pub migrations: Vec<String>,
}

pub fn collect(pool: &DbPool) -> AppResult<DbStats> {
    pool.with_conn(|conn| {
        let conn: &rusqlite::Connection = conn;
        let count = |sql: &str| -> rusqlite::Result<i64> { conn.query_row(sql, [], |r| r.get(0)) };

        Ok(DbStats {
            events: count("SELECT COUNT(*) FROM attendance_events")?,
            users: count("SELECT COUNT(DISTINCT user_id) FROM attendance_events")?,
            summaries: count("SELECT COUNT(*) FROM attendance_daily_summaries")?,
            records: count("SELECT COUNT(*) FROM attendance_records")?,
            audit_entries: count("SELECT COUNT(*) FROM audit_log")?,
            last_event_ms: conn
                .query_row("SELECT MAX(timestamp_ms) FROM attendance_events", [], |r| {
                    r.get::<_, Option<i64>>(0)
                })
                .optional()?
                .flatten(),
            migrations: applied_versions(conn)?,
        })
    })
}

pub fn print_db_info(pool: &DbPool) -> AppResult<()> {
    let stats = collect(pool)?;
    let db_path = pool.path();

    println!();

    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);
    println!("{}• Events:{} {}{}{}", CYAN, RESET, GREEN, stats.events, RESET);
    println!("{}• Users with events:{} {}", CYAN, RESET, stats.users);
    println!("{}• Daily summaries:{} {}", CYAN, RESET, stats.summaries);
    println!("{}• Legacy records:{} {}", CYAN, RESET, stats.records);
    println!("{}• Audit entries:{} {}", CYAN, RESET, stats.audit_entries);

    match stats.last_event_ms.and_then(chrono::DateTime::from_timestamp_millis) {
        Some(ts) => println!("{}• Last event:{} {}", CYAN, RESET, ts.to_rfc3339()),
        None => println!("{}• Last event:{} {}none{}", CYAN, RESET, GREY, RESET),
    }

    println!("{}• Migrations:{}", CYAN, RESET);
    for v in &stats.migrations {
        println!("    {}{}{}", GREY, v, RESET);
    }
    println!();

    Ok(())
}
