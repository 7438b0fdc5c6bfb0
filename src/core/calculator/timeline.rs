//! Session pairing: turns one user-day of events into work sessions and breaks.

use crate::models::event::AttendanceEvent;
use crate::models::event_type::EventType;
use chrono::{DateTime, Utc};

/// Sessions shorter than this still count as work but never bound a break.
pub const MIN_SESSION_FOR_BREAK_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub duration_minutes: i64,
    /// Long enough to take part in break accounting.
    pub qualifying: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gap {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub sessions: Vec<Session>,
    pub breaks: Vec<Gap>,
    pub first_check_in: Option<DateTime<Utc>>,
    pub last_check_out: Option<DateTime<Utc>>,
    pub total_work_minutes: i64,
    pub total_break_minutes: i64,
    /// Check-in still waiting for its check-out at the end of the day.
    pub pending_check_in: Option<DateTime<Utc>>,
    /// Check-ins overwritten by a later check-in before any check-out.
    pub superseded_check_ins: Vec<DateTime<Utc>>,
    /// Check-outs that had no open check-in.
    pub orphan_check_outs: Vec<DateTime<Utc>>,
}

impl Timeline {
    pub fn sessions_count(&self) -> i64 {
        self.sessions.len() as i64
    }

    pub fn has_open_check_in(&self) -> bool {
        self.pending_check_in.is_some()
    }
}

/// Whole minutes from `start` to `end`, rounded towards negative infinity.
pub fn floor_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds().div_euclid(60_000)
}

pub fn build_timeline(events: &[AttendanceEvent]) -> Timeline {
    if events.is_empty() {
        return Timeline::default();
    }

    // -----------------------------
    // Order by (timestamp, insertion id)
    // -----------------------------
    let mut sorted: Vec<&AttendanceEvent> = events.iter().collect();
    sorted.sort_by_key(|e| (e.timestamp, e.id));

    let mut tl = Timeline::default();
    let mut last_session_end: Option<DateTime<Utc>> = None;

    for ev in sorted {
        match ev.event_type {
            EventType::CheckIn => {
                if let Some(prev) = tl.pending_check_in.replace(ev.timestamp) {
                    tl.superseded_check_ins.push(prev);
                }
                if tl.first_check_in.is_none() {
                    tl.first_check_in = Some(ev.timestamp);
                }
            }
            EventType::CheckOut => {
                let Some(check_in) = tl.pending_check_in.take() else {
                    tl.orphan_check_outs.push(ev.timestamp);
                    continue;
                };

                let minutes = floor_minutes(check_in, ev.timestamp);
                let qualifying = minutes >= MIN_SESSION_FOR_BREAK_MINUTES;

                tl.total_work_minutes += minutes;
                tl.last_check_out = Some(ev.timestamp);

                if qualifying {
                    if let Some(prev_end) = last_session_end {
                        let gap = floor_minutes(prev_end, check_in);
                        tl.total_break_minutes += gap;
                        tl.breaks.push(Gap {
                            start: prev_end,
                            end: check_in,
                            duration_minutes: gap,
                        });
                    }
                    last_session_end = Some(ev.timestamp);
                }

                tl.sessions.push(Session {
                    check_in,
                    check_out: ev.timestamp,
                    duration_minutes: minutes,
                    qualifying,
                });
            }
        }
    }

    tl
}
