//! In-memory store used by tests and by `serve --memory`.

use super::{
    AuditSink, EventRepository, OverrideRepository, SummaryQuery, SummaryRepository, UserDirectory,
};
use crate::errors::{AppError, AppResult};
use crate::models::actor::Placement;
use crate::models::day_summary::{DailySummary, SummaryUpsert};
use crate::models::event::{AttendanceEvent, NewEvent};
use crate::models::override_record::{AttendanceRecord, AuditEntry, NewAuditEntry};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    events: Vec<AttendanceEvent>,
    summaries: BTreeMap<(String, NaiveDate), DailySummary>,
    next_summary_id: i64,
    records: HashMap<String, AttendanceRecord>,
    audit: Vec<AuditEntry>,
    directory: HashMap<String, Placement>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| AppError::Other("memory store lock poisoned".into()))
    }

    /// Seed a legacy record, as the external attendance service would.
    pub fn insert_record(&self, record: AttendanceRecord) -> AppResult<()> {
        self.lock()?.records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Number of stored events, for assertions on the append-only log.
    pub fn event_count(&self) -> AppResult<usize> {
        Ok(self.lock()?.events.len())
    }
}

impl EventRepository for MemoryStore {
    fn append(&self, event: NewEvent) -> AppResult<AttendanceEvent> {
        let mut inner = self.lock()?;
        let id = inner.events.len() as i64 + 1;
        let ev = event.into_event(id);
        inner.events.push(ev.clone());
        Ok(ev)
    }

    fn events_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<AttendanceEvent>> {
        let inner = self.lock()?;
        let mut out: Vec<AttendanceEvent> = inner
            .events
            .iter()
            .filter(|e| e.user_id == user_id && e.timestamp >= from && e.timestamp < to)
            .cloned()
            .collect();
        out.sort_by_key(|e| (e.timestamp, e.id));
        Ok(out)
    }

    fn event_instants(&self, user_id: Option<&str>) -> AppResult<Vec<(String, DateTime<Utc>)>> {
        let inner = self.lock()?;
        Ok(inner
            .events
            .iter()
            .filter(|e| user_id.is_none_or(|u| e.user_id == u))
            .map(|e| (e.user_id.clone(), e.timestamp))
            .collect())
    }
}

impl SummaryRepository for MemoryStore {
    fn upsert(&self, row: &SummaryUpsert) -> AppResult<DailySummary> {
        let mut inner = self.lock()?;
        let key = (row.user_id.clone(), row.date);

        let id = match inner.summaries.get(&key) {
            Some(existing) => existing.id,
            None => {
                inner.next_summary_id += 1;
                inner.next_summary_id
            }
        };

        let summary = DailySummary {
            id,
            user_id: row.user_id.clone(),
            date: row.date,
            first_check_in: row.first_check_in,
            last_check_out: row.last_check_out,
            total_work_minutes: row.total_work_minutes,
            total_break_minutes: row.total_break_minutes,
            sessions_count: row.sessions_count,
            status: row.status,
        };
        inner.summaries.insert(key, summary.clone());
        Ok(summary)
    }

    fn find(&self, user_id: &str, date: NaiveDate) -> AppResult<Option<DailySummary>> {
        Ok(self
            .lock()?
            .summaries
            .get(&(user_id.to_string(), date))
            .cloned())
    }

    fn list(&self, query: &SummaryQuery) -> AppResult<(Vec<DailySummary>, i64)> {
        let inner = self.lock()?;
        let mut matching: Vec<&DailySummary> = inner
            .summaries
            .values()
            .filter(|s| s.user_id == query.user_id)
            .filter(|s| query.from.is_none_or(|f| s.date >= f))
            .filter(|s| query.to.is_none_or(|t| s.date <= t))
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    fn clear(&self, user_id: Option<&str>) -> AppResult<usize> {
        let mut inner = self.lock()?;
        let before = inner.summaries.len();
        inner
            .summaries
            .retain(|(u, _), _| user_id.is_some_and(|target| target != u));
        Ok(before - inner.summaries.len())
    }
}

impl OverrideRepository for MemoryStore {
    fn find_record(&self, id: &str) -> AppResult<Option<AttendanceRecord>> {
        Ok(self.lock()?.records.get(id).cloned())
    }

    fn save_overridden(
        &self,
        record: &AttendanceRecord,
        audit: NewAuditEntry,
    ) -> AppResult<AuditEntry> {
        let mut inner = self.lock()?;
        inner.records.insert(record.id.clone(), record.clone());
        Ok(push_audit(&mut inner, audit))
    }
}

fn push_audit(inner: &mut Inner, entry: NewAuditEntry) -> AuditEntry {
    let saved = AuditEntry {
        id: inner.audit.len() as i64 + 1,
        actor_id: entry.actor_id,
        action: entry.action,
        entity_type: entry.entity_type,
        entity_id: entry.entity_id,
        payload: entry.payload,
        created_at: Utc::now(),
    };
    inner.audit.push(saved.clone());
    saved
}

impl AuditSink for MemoryStore {
    fn record(&self, entry: NewAuditEntry) -> AppResult<AuditEntry> {
        Ok(push_audit(&mut *self.lock()?, entry))
    }

    fn entries(&self) -> AppResult<Vec<AuditEntry>> {
        Ok(self.lock()?.audit.clone())
    }
}

impl UserDirectory for MemoryStore {
    fn placement(&self, user_id: &str) -> AppResult<Option<Placement>> {
        Ok(self.lock()?.directory.get(user_id).cloned())
    }

    fn set_placement(&self, user_id: &str, placement: &Placement) -> AppResult<()> {
        self.lock()?
            .directory
            .insert(user_id.to_string(), placement.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::day_summary::DayStatus;

    fn upsert_row(user: &str, date: &str, minutes: i64) -> SummaryUpsert {
        SummaryUpsert {
            user_id: user.into(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            first_check_in: None,
            last_check_out: None,
            total_work_minutes: minutes,
            total_break_minutes: 0,
            sessions_count: 0,
            status: DayStatus::Absent,
        }
    }

    #[test]
    fn upsert_keeps_id_and_replaces_fields() {
        let store = MemoryStore::new();
        let a = store.upsert(&upsert_row("u1", "2025-03-10", 10)).unwrap();
        let b = store.upsert(&upsert_row("u1", "2025-03-10", 20)).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(b.total_work_minutes, 20);
    }

    #[test]
    fn list_is_newest_first_and_paginated() {
        let store = MemoryStore::new();
        for d in ["2025-03-08", "2025-03-09", "2025-03-10"] {
            store.upsert(&upsert_row("u1", d, 0)).unwrap();
        }
        store.upsert(&upsert_row("u2", "2025-03-10", 0)).unwrap();

        let q = SummaryQuery {
            user_id: "u1".into(),
            offset: 1,
            limit: 1,
            ..Default::default()
        };
        let (page, total) = store.list(&q).unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].date.to_string(), "2025-03-09");
    }

    #[test]
    fn clear_scoped_to_user() {
        let store = MemoryStore::new();
        store.upsert(&upsert_row("u1", "2025-03-10", 0)).unwrap();
        store.upsert(&upsert_row("u2", "2025-03-10", 0)).unwrap();
        assert_eq!(store.clear(Some("u1")).unwrap(), 1);
        assert!(store.find("u2", upsert_row("u2", "2025-03-10", 0).date).unwrap().is_some());
        assert_eq!(store.clear(None).unwrap(), 1);
    }
}
