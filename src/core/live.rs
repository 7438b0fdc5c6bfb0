//! Read-time presentation of a recomputed summary.
//!
//! Stored summaries only count closed sessions. While a session is still
//! open, the minutes elapsed since its check-in are added here, against the
//! injected clock, and never written back.

use crate::core::calculator::timeline::floor_minutes;
use crate::models::day_summary::{DayStatus, RecomputedSummary};
use crate::utils::formatting::hours_worked;
use crate::utils::time::iso_millis;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSummary {
    pub id: i64,
    pub date: NaiveDate,
    pub first_check_in: Option<String>,
    pub last_check_out: Option<String>,
    pub total_work_minutes: i64,
    pub total_worked_seconds: i64,
    pub current_session_started_at: Option<String>,
    pub total_break_minutes: i64,
    pub sessions_count: i64,
    pub status: DayStatus,
    pub hours_worked: String,
}

/// Minutes of the open session at `now`, zero when none is open or the clock
/// is behind the check-in.
pub fn open_session_minutes(recomputed: &RecomputedSummary, now: DateTime<Utc>) -> i64 {
    recomputed
        .current_session_started_at
        .map(|start| floor_minutes(start, now).max(0))
        .unwrap_or(0)
}

pub fn format_summary(recomputed: &RecomputedSummary, now: DateTime<Utc>) -> FormattedSummary {
    let s = &recomputed.summary;
    let total = s.total_work_minutes + open_session_minutes(recomputed, now);

    FormattedSummary {
        id: s.id,
        date: s.date,
        first_check_in: s.first_check_in.map(iso_millis),
        last_check_out: s.last_check_out.map(iso_millis),
        total_work_minutes: total,
        total_worked_seconds: total * 60,
        current_session_started_at: recomputed.current_session_started_at.map(iso_millis),
        total_break_minutes: s.total_break_minutes,
        sessions_count: s.sessions_count,
        status: s.status,
        hours_worked: hours_worked(total),
    }
}

/// `GET /attendance/me` view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyDay {
    pub date: NaiveDate,
    pub check_in_at: Option<String>,
    pub check_out_at: Option<String>,
    pub total_work_minutes: i64,
    pub hours_worked: String,
    pub status: DayStatus,
}

impl From<FormattedSummary> for MyDay {
    fn from(f: FormattedSummary) -> Self {
        Self {
            date: f.date,
            check_in_at: f.first_check_in,
            check_out_at: f.last_check_out,
            total_work_minutes: f.total_work_minutes,
            hours_worked: f.hours_worked,
            status: f.status,
        }
    }
}

/// `GET /attendance/today` view; `None` when nothing happened yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayAttendance {
    pub id: i64,
    pub check_in_at: Option<String>,
    pub check_out_at: Option<String>,
    pub hours_worked: String,
    pub total_work_minutes: i64,
    pub total_worked_seconds: i64,
    pub current_session_started_at: Option<String>,
    pub sessions_count: i64,
    pub status: DayStatus,
}

impl TodayAttendance {
    pub fn from_formatted(f: FormattedSummary) -> Option<Self> {
        if f.first_check_in.is_none() && f.last_check_out.is_none() && f.sessions_count == 0 {
            return None;
        }
        Some(Self {
            id: f.id,
            check_in_at: f.first_check_in,
            check_out_at: f.last_check_out,
            hours_worked: f.hours_worked,
            total_work_minutes: f.total_work_minutes,
            total_worked_seconds: f.total_worked_seconds,
            current_session_started_at: f.current_session_started_at,
            sessions_count: f.sessions_count,
            status: f.status,
        })
    }
}
