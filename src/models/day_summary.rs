use crate::utils::time::serialize_opt_millis;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    Present,
    Partial,
    Absent,
    NeedsVerification,
}

impl DayStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DayStatus::Present => "PRESENT",
            DayStatus::Partial => "PARTIAL",
            DayStatus::Absent => "ABSENT",
            DayStatus::NeedsVerification => "NEEDS_VERIFICATION",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PRESENT" => Some(DayStatus::Present),
            "PARTIAL" => Some(DayStatus::Partial),
            "ABSENT" => Some(DayStatus::Absent),
            "NEEDS_VERIFICATION" => Some(DayStatus::NeedsVerification),
            _ => None,
        }
    }
}

/// The persisted per-(user, day) aggregate. Always fully derived from events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_opt_millis")]
    pub first_check_in: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_opt_millis")]
    pub last_check_out: Option<DateTime<Utc>>,
    pub total_work_minutes: i64,
    pub total_break_minutes: i64,
    pub sessions_count: i64,
    pub status: DayStatus,
}

/// Write request for the summary cache: replaces every derived column.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryUpsert {
    pub user_id: String,
    pub date: NaiveDate,
    pub first_check_in: Option<DateTime<Utc>>,
    pub last_check_out: Option<DateTime<Utc>>,
    pub total_work_minutes: i64,
    pub total_break_minutes: i64,
    pub sessions_count: i64,
    pub status: DayStatus,
}

/// Result of a recompute: the stored row plus the transient open-session start.
#[derive(Debug, Clone, PartialEq)]
pub struct RecomputedSummary {
    pub summary: DailySummary,
    pub current_session_started_at: Option<DateTime<Utc>>,
}
