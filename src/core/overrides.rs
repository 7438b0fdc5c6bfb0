//! Administrative correction of legacy attendance records.
//! Writes the record and its audit entry in one step; the event log and the
//! summary cache are left alone.

use crate::core::access::require_admin;
use crate::errors::{AppError, AppResult};
use crate::models::actor::Actor;
use crate::models::override_record::{AttendanceRecord, NewAuditEntry, OverrideRequest};
use crate::store::OverrideRepository;
use serde_json::json;
use std::sync::Arc;

pub const OVERRIDE_ACTION: &str = "ATTENDANCE_OVERRIDE";
pub const OVERRIDE_ENTITY: &str = "attendance";

pub struct OverrideService {
    records: Arc<dyn OverrideRepository>,
}

impl OverrideService {
    pub fn new(records: Arc<dyn OverrideRepository>) -> Self {
        Self { records }
    }

    pub fn apply(
        &self,
        actor: &Actor,
        record_id: &str,
        request: OverrideRequest,
    ) -> AppResult<AttendanceRecord> {
        require_admin(actor)?;

        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation("reason must not be empty".into()));
        }

        let mut record = self
            .records
            .find_record(record_id)?
            .ok_or_else(|| AppError::NotFound(format!("attendance record '{record_id}'")))?;

        if let Some(at) = request.check_in_at {
            record.check_in_at = Some(at);
        }
        if let Some(at) = request.check_out_at {
            record.check_out_at = Some(at);
        }
        record.is_overridden = true;
        record.override_by = Some(actor.id.clone());
        record.override_reason = Some(reason.to_string());

        let payload = json!({
            "reason": reason,
            "changes": {
                "checkInAt": request.check_in_at,
                "checkOutAt": request.check_out_at,
            },
        });
        self.records.save_overridden(
            &record,
            NewAuditEntry {
                actor_id: actor.id.clone(),
                action: OVERRIDE_ACTION.to_string(),
                entity_type: OVERRIDE_ENTITY.to_string(),
                entity_id: record.id.clone(),
                payload: payload.to_string(),
            },
        )?;

        tracing::info!(
            actor_id = %actor.id,
            record_id = %record.id,
            "attendance record overridden"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::actor::Role;
    use crate::store::AuditSink;
    use crate::store::memory::MemoryStore;
    use crate::utils::time::parse_timestamp;
    use chrono::NaiveDate;

    fn admin() -> Actor {
        Actor {
            id: "adm".into(),
            role: Role::Admin,
            domain_id: None,
            team_id: None,
        }
    }

    fn seeded() -> (Arc<MemoryStore>, OverrideService) {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_record(AttendanceRecord {
                id: "rec-1".into(),
                user_id: "u1".into(),
                date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                check_in_at: Some(parse_timestamp("2025-03-10T09:00:00Z").unwrap()),
                check_out_at: None,
                is_overridden: false,
                override_by: None,
                override_reason: None,
            })
            .unwrap();
        let svc = OverrideService::new(store.clone());
        (store, svc)
    }

    #[test]
    fn override_updates_record_and_audits() {
        let (store, svc) = seeded();
        let out = parse_timestamp("2025-03-10T17:00:00Z").unwrap();
        let rec = svc
            .apply(
                &admin(),
                "rec-1",
                OverrideRequest {
                    check_in_at: None,
                    check_out_at: Some(out),
                    reason: "forgot to check out".into(),
                },
            )
            .unwrap();

        assert!(rec.is_overridden);
        assert_eq!(rec.check_out_at, Some(out));
        assert_eq!(
            rec.check_in_at,
            Some(parse_timestamp("2025-03-10T09:00:00Z").unwrap())
        );
        assert_eq!(rec.override_by.as_deref(), Some("adm"));

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "ATTENDANCE_OVERRIDE");
        assert_eq!(entries[0].entity_type, "attendance");
        assert_eq!(entries[0].entity_id, "rec-1");
        let payload: serde_json::Value = serde_json::from_str(&entries[0].payload).unwrap();
        assert_eq!(payload["reason"], "forgot to check out");
        assert_eq!(store.event_count().unwrap(), 0);
    }

    #[test]
    fn non_admin_is_forbidden() {
        let (_, svc) = seeded();
        let mut lead = admin();
        lead.role = Role::TeamLead;
        let err = svc
            .apply(
                &lead,
                "rec-1",
                OverrideRequest {
                    reason: "x".into(),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn blank_reason_is_rejected() {
        let (_, svc) = seeded();
        let err = svc
            .apply(
                &admin(),
                "rec-1",
                OverrideRequest {
                    reason: "   ".into(),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn unknown_record_is_not_found() {
        let (store, svc) = seeded();
        let err = svc
            .apply(
                &admin(),
                "missing",
                OverrideRequest {
                    reason: "x".into(),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.entries().unwrap().is_empty());
    }
}
