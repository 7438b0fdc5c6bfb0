//! SQLite-backed implementation of the storage traits.

use crate::db::initialize::init_db;
use crate::db::log::{load_audit, write_audit};
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::actor::Placement;
use crate::models::day_summary::{DailySummary, SummaryUpsert};
use crate::models::event::{AttendanceEvent, NewEvent};
use crate::models::override_record::{AttendanceRecord, AuditEntry, NewAuditEntry};
use crate::store::{
    AuditSink, EventRepository, OverrideRepository, SummaryQuery, SummaryRepository, UserDirectory,
};
use chrono::{DateTime, NaiveDate, Utc};

pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and bring the schema up to date.
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        pool.with_conn(init_db)?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        pool.with_conn(init_db)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl EventRepository for SqliteStore {
    fn append(&self, event: NewEvent) -> AppResult<AttendanceEvent> {
        self.pool.with_conn(|conn| queries::insert_event(conn, event))
    }

    fn events_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<AttendanceEvent>> {
        self.pool
            .with_conn(|conn| queries::load_events_between(conn, user_id, from, to))
    }

    fn event_instants(&self, user_id: Option<&str>) -> AppResult<Vec<(String, DateTime<Utc>)>> {
        self.pool
            .with_conn(|conn| queries::load_event_instants(conn, user_id))
    }
}

impl SummaryRepository for SqliteStore {
    fn upsert(&self, row: &SummaryUpsert) -> AppResult<DailySummary> {
        self.pool.with_conn(|conn| queries::upsert_summary(conn, row))
    }

    fn find(&self, user_id: &str, date: NaiveDate) -> AppResult<Option<DailySummary>> {
        self.pool
            .with_conn(|conn| queries::find_summary(conn, user_id, date))
    }

    fn list(&self, query: &SummaryQuery) -> AppResult<(Vec<DailySummary>, i64)> {
        self.pool.with_conn(|conn| queries::list_summaries(conn, query))
    }

    fn clear(&self, user_id: Option<&str>) -> AppResult<usize> {
        self.pool
            .with_conn(|conn| queries::delete_summaries(conn, user_id))
    }
}

impl OverrideRepository for SqliteStore {
    fn find_record(&self, id: &str) -> AppResult<Option<AttendanceRecord>> {
        self.pool.with_conn(|conn| queries::find_record(conn, id))
    }

    fn save_overridden(
        &self,
        record: &AttendanceRecord,
        audit: NewAuditEntry,
    ) -> AppResult<AuditEntry> {
        self.pool.with_conn(|conn| {
            let tx = conn.transaction()?;
            queries::save_record(&tx, record)?;
            let entry = write_audit(&tx, audit)?;
            tx.commit()?;
            Ok(entry)
        })
    }
}

impl AuditSink for SqliteStore {
    fn record(&self, entry: NewAuditEntry) -> AppResult<AuditEntry> {
        self.pool.with_conn(|conn| write_audit(conn, entry))
    }

    fn entries(&self) -> AppResult<Vec<AuditEntry>> {
        self.pool.with_conn(|conn| load_audit(conn))
    }
}

impl UserDirectory for SqliteStore {
    fn placement(&self, user_id: &str) -> AppResult<Option<Placement>> {
        self.pool
            .with_conn(|conn| queries::find_placement(conn, user_id))
    }

    fn set_placement(&self, user_id: &str, placement: &Placement) -> AppResult<()> {
        self.pool
            .with_conn(|conn| queries::upsert_placement(conn, user_id, placement))
    }
}
