//! Write path and recomputation of daily summaries.
//!
//! Every mutation goes through the same sequence under the (user, day) lock:
//! append the event, reload the whole day in canonical order, rebuild the
//! summary from scratch and upsert it. The summary is never patched
//! incrementally, so replaying the log always lands on the same row.

use crate::core::clock::Clock;
use crate::core::locks::DayLocks;
use crate::core::logic::{Core, DayComputation};
use crate::errors::{AppError, AppResult};
use crate::models::day_summary::{DailySummary, RecomputedSummary, SummaryUpsert};
use crate::models::event::{AttendanceEvent, EventPayload, NewEvent};
use crate::models::event_type::EventType;
use crate::store::{EventRepository, SummaryQuery, SummaryRepository};
use crate::utils::time::{ReferenceZone, truncate_millis};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Outcome of a check-in or check-out.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub event: AttendanceEvent,
    pub summary: RecomputedSummary,
}

pub struct Aggregator {
    events: Arc<dyn EventRepository>,
    summaries: Arc<dyn SummaryRepository>,
    zone: ReferenceZone,
    clock: Arc<dyn Clock>,
    locks: DayLocks,
}

impl Aggregator {
    pub fn new(
        events: Arc<dyn EventRepository>,
        summaries: Arc<dyn SummaryRepository>,
        zone: ReferenceZone,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            summaries,
            zone,
            clock,
            locks: DayLocks::new(),
        }
    }

    pub fn zone(&self) -> ReferenceZone {
        self.zone
    }

    pub fn now(&self) -> DateTime<Utc> {
        truncate_millis(self.clock.now())
    }

    pub fn today(&self) -> NaiveDate {
        self.zone.today(self.now())
    }

    pub fn check_in(&self, user_id: &str, payload: EventPayload) -> AppResult<Recorded> {
        self.record(user_id, EventType::CheckIn, payload)
    }

    pub fn check_out(&self, user_id: &str, payload: EventPayload) -> AppResult<Recorded> {
        self.record(user_id, EventType::CheckOut, payload)
    }

    /// Append one event stamped with the server clock and refresh its day.
    pub fn record(
        &self,
        user_id: &str,
        event_type: EventType,
        payload: EventPayload,
    ) -> AppResult<Recorded> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::Validation("user id must not be empty".into()));
        }
        payload.validate()?;

        let timestamp = self.now();
        let date = self.zone.day_of(timestamp);

        self.locks.with_lock(user_id, date, || {
            let event = self.events.append(NewEvent {
                user_id: user_id.to_string(),
                event_type,
                timestamp,
                payload,
            })?;
            tracing::info!(
                user_id,
                event_id = event.id,
                event_type = event_type.to_db_str(),
                %date,
                "attendance event appended"
            );

            // The event is durable at this point; a failed refresh is healed
            // by the next recompute of the same day.
            let summary = self.recompute_locked(user_id, date).inspect_err(|e| {
                tracing::warn!(user_id, event_id = event.id, %date, error = %e, "summary refresh failed");
            })?;

            Ok(Recorded { event, summary })
        })
    }

    /// Rebuild and store the summary of `(user_id, date)`.
    pub fn recompute(&self, user_id: &str, date: NaiveDate) -> AppResult<RecomputedSummary> {
        self.locks
            .with_lock(user_id, date, || self.recompute_locked(user_id, date))
    }

    /// Derived view of one day without touching the summary cache.
    pub fn compute(&self, user_id: &str, date: NaiveDate) -> AppResult<DayComputation> {
        let events = self.day_events(user_id, date)?;
        Ok(Core::build_daily_summary(&events))
    }

    pub fn day_events(&self, user_id: &str, date: NaiveDate) -> AppResult<Vec<AttendanceEvent>> {
        let (from, to) = self.zone.day_bounds(date);
        self.events.events_between(user_id, from, to)
    }

    pub fn list(&self, query: &SummaryQuery) -> AppResult<(Vec<DailySummary>, i64)> {
        self.summaries.list(query)
    }

    /// Drop cached summaries and rebuild every day that has events.
    /// Returns the number of summaries written.
    pub fn rebuild(&self, user_id: Option<&str>) -> AppResult<usize> {
        let cleared = self.summaries.clear(user_id)?;

        let days: BTreeSet<(String, NaiveDate)> = self
            .events
            .event_instants(user_id)?
            .into_iter()
            .map(|(user, ts)| {
                let date = self.zone.day_of(ts);
                (user, date)
            })
            .collect();

        for (user, date) in &days {
            self.recompute(user, *date)?;
        }

        tracing::info!(cleared, rebuilt = days.len(), "summary cache rebuilt");
        Ok(days.len())
    }

    fn recompute_locked(&self, user_id: &str, date: NaiveDate) -> AppResult<RecomputedSummary> {
        let day = self.compute(user_id, date)?;

        let summary = self.summaries.upsert(&SummaryUpsert {
            user_id: user_id.to_string(),
            date,
            first_check_in: day.first_check_in,
            last_check_out: day.last_check_out,
            total_work_minutes: day.total_work_minutes,
            total_break_minutes: day.total_break_minutes,
            sessions_count: day.sessions_count,
            status: day.status,
        })?;

        tracing::debug!(
            user_id,
            %date,
            status = summary.status.to_db_str(),
            total_work_minutes = summary.total_work_minutes,
            "daily summary recomputed"
        );

        Ok(RecomputedSummary {
            summary,
            current_session_started_at: day.current_session_started_at,
        })
    }
}
