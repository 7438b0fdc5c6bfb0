use chrono::{DateTime, Duration, NaiveDate, Utc};
use rattendance::core::clock::FixedClock;
use rattendance::core::logic::Core;
use rattendance::core::service::AttendanceService;
use rattendance::db::store::SqliteStore;
use rattendance::models::event::EventPayload;
use rattendance::store::{EventRepository, SummaryRepository};
use rattendance::utils::time::ReferenceZone;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const ROUNDS: usize = 10;

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-03-10T08:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn concurrent_writes_converge_to_the_full_recompute() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("attendance.sqlite");
    let store = Arc::new(SqliteStore::open(db.to_str().unwrap()).unwrap());
    let clock = Arc::new(FixedClock::new(start()));
    let service = Arc::new(AttendanceService::new(
        store.clone(),
        ReferenceZone::Utc,
        clock.clone(),
        30,
    ));

    let handles: Vec<_> = (0..THREADS)
        .map(|n| {
            let service = Arc::clone(&service);
            let clock = Arc::clone(&clock);
            thread::spawn(move || {
                for round in 0..ROUNDS {
                    clock.advance(Duration::minutes(7));
                    let payload = EventPayload::default();
                    if (n + round) % 2 == 0 {
                        service.aggregator.check_in("u1", payload).unwrap();
                    } else {
                        service.aggregator.check_out("u1", payload).unwrap();
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("writer thread panicked");
    }

    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let (from, to) = ReferenceZone::Utc.day_bounds(date);
    let events = store.events_between("u1", from, to).unwrap();
    assert_eq!(events.len(), THREADS * ROUNDS);

    let expected = Core::build_daily_summary(&events);
    let stored = store.find("u1", date).unwrap().expect("summary row");
    assert_eq!(stored.total_work_minutes, expected.total_work_minutes);
    assert_eq!(stored.total_break_minutes, expected.total_break_minutes);
    assert_eq!(stored.sessions_count, expected.sessions_count);
    assert_eq!(stored.status, expected.status);
    assert_eq!(stored.first_check_in, expected.first_check_in);
    assert_eq!(stored.last_check_out, expected.last_check_out);
}

#[test]
fn separate_users_do_not_share_a_summary() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("attendance.sqlite");
    let store = Arc::new(SqliteStore::open(db.to_str().unwrap()).unwrap());
    let clock = Arc::new(FixedClock::new(start()));
    let service = Arc::new(AttendanceService::new(
        store.clone(),
        ReferenceZone::Utc,
        clock.clone(),
        30,
    ));

    let handles: Vec<_> = ["alice", "bob", "carol"]
        .into_iter()
        .map(|user| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .aggregator
                    .check_in(user, EventPayload::default())
                    .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().expect("writer thread panicked");
    }

    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let mut ids = Vec::new();
    for user in ["alice", "bob", "carol"] {
        let s = store.find(user, date).unwrap().expect("summary row");
        assert_eq!(s.user_id, user);
        assert_eq!(s.first_check_in, Some(start()));
        ids.push(s.id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}
