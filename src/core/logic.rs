use crate::core::calculator::{status, timeline};
use crate::models::day_summary::DayStatus;
use crate::models::event::AttendanceEvent;
use chrono::{DateTime, Utc};

/// Everything derived from one user-day of events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayComputation {
    pub timeline: timeline::Timeline,
    pub first_check_in: Option<DateTime<Utc>>,
    pub last_check_out: Option<DateTime<Utc>>,
    pub total_work_minutes: i64,
    pub total_break_minutes: i64,
    pub sessions_count: i64,
    pub status: DayStatus,
    /// Set only when the day ends with an open check-in.
    pub current_session_started_at: Option<DateTime<Utc>>,
}

pub struct Core;

impl Core {
    pub fn build_daily_summary(events: &[AttendanceEvent]) -> DayComputation {
        let timeline = timeline::build_timeline(events);
        let status = status::classify(&timeline);

        let current_session_started_at = match status {
            DayStatus::NeedsVerification => timeline.pending_check_in,
            _ => None,
        };

        DayComputation {
            first_check_in: timeline.first_check_in,
            last_check_out: timeline.last_check_out,
            total_work_minutes: timeline.total_work_minutes,
            total_break_minutes: timeline.total_break_minutes,
            sessions_count: timeline.sessions_count(),
            status,
            current_session_started_at,
            timeline,
        }
    }
}
