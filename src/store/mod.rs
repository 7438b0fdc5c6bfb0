//! Storage seams. The aggregator and the HTTP layer only see these traits;
//! `db::store::SqliteStore` and `store::memory::MemoryStore` implement them.

pub mod memory;

use crate::errors::AppResult;
use crate::models::actor::Placement;
use crate::models::day_summary::{DailySummary, SummaryUpsert};
use crate::models::event::{AttendanceEvent, NewEvent};
use crate::models::override_record::{AttendanceRecord, AuditEntry, NewAuditEntry};
use chrono::{DateTime, NaiveDate, Utc};

/// Append-only attendance log.
pub trait EventRepository: Send + Sync {
    fn append(&self, event: NewEvent) -> AppResult<AttendanceEvent>;

    /// Events of `user_id` in `[from, to)`, ordered by `(timestamp, id)`.
    fn events_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<AttendanceEvent>>;

    /// `(user, timestamp)` of every event, optionally for one user only.
    fn event_instants(&self, user_id: Option<&str>) -> AppResult<Vec<(String, DateTime<Utc>)>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryQuery {
    pub user_id: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub offset: i64,
    pub limit: i64,
}

/// Derived per-day cache.
pub trait SummaryRepository: Send + Sync {
    /// Insert or fully replace the row keyed by `(user_id, date)`.
    fn upsert(&self, row: &SummaryUpsert) -> AppResult<DailySummary>;

    fn find(&self, user_id: &str, date: NaiveDate) -> AppResult<Option<DailySummary>>;

    /// Page of summaries, newest date first, plus the total matching count.
    fn list(&self, query: &SummaryQuery) -> AppResult<(Vec<DailySummary>, i64)>;

    /// Drop cached rows (all users when `user_id` is `None`).
    fn clear(&self, user_id: Option<&str>) -> AppResult<usize>;
}

/// Legacy hand-edited attendance records.
pub trait OverrideRepository: Send + Sync {
    fn find_record(&self, id: &str) -> AppResult<Option<AttendanceRecord>>;

    /// Store the corrected record and its audit entry together, or neither.
    fn save_overridden(
        &self,
        record: &AttendanceRecord,
        audit: NewAuditEntry,
    ) -> AppResult<AuditEntry>;
}

pub trait AuditSink: Send + Sync {
    fn record(&self, entry: NewAuditEntry) -> AppResult<AuditEntry>;

    fn entries(&self) -> AppResult<Vec<AuditEntry>>;
}

/// Organisation placement of users, owned by the user-management service.
pub trait UserDirectory: Send + Sync {
    fn placement(&self, user_id: &str) -> AppResult<Option<Placement>>;

    fn set_placement(&self, user_id: &str, placement: &Placement) -> AppResult<()>;
}

/// Everything one backing store provides.
pub trait AttendanceStore:
    EventRepository + SummaryRepository + OverrideRepository + AuditSink + UserDirectory
{
}

impl<T> AttendanceStore for T where
    T: EventRepository + SummaryRepository + OverrideRepository + AuditSink + UserDirectory
{
}
