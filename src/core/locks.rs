//! Per-(user, day) serialization of recomputation.
//!
//! Two requests for the same user and day must not interleave their
//! "read events → recompute → upsert" sequences, otherwise the later upsert can
//! carry a view that misses an event the other request just appended. Each key
//! gets its own mutex; unrelated keys never wait on each other. Entries are
//! removed once nobody holds or waits for them.

use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub type DayKey = (String, NaiveDate);

#[derive(Default)]
pub struct DayLocks {
    map: Mutex<HashMap<DayKey, Arc<Mutex<()>>>>,
}

impl DayLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock of `(user_id, date)`.
    pub fn with_lock<T, F>(&self, user_id: &str, date: NaiveDate, f: F) -> AppResult<T>
    where
        F: FnOnce() -> AppResult<T>,
    {
        let key: DayKey = (user_id.to_string(), date);
        let entry = {
            let mut map = self.map.lock().map_err(|_| poisoned())?;
            Arc::clone(map.entry(key.clone()).or_default())
        };

        let result = {
            // A panic inside `f` poisons only this key; the lock itself carries no data.
            let _guard = entry.lock().unwrap_or_else(|p| p.into_inner());
            f()
        };

        drop(entry);
        self.release(&key)?;
        result
    }

    fn release(&self, key: &DayKey) -> AppResult<()> {
        let mut map = self.map.lock().map_err(|_| poisoned())?;
        if map.get(key).is_some_and(|e| Arc::strong_count(e) == 1) {
            map.remove(key);
        }
        Ok(())
    }

    /// Keys currently held or waited on.
    #[cfg(test)]
    fn active(&self) -> usize {
        self.map.lock().map(|m| m.len()).unwrap_or(0)
    }
}

fn poisoned() -> AppError {
    AppError::Other("day lock table poisoned".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn same_key_is_mutually_exclusive() {
        let locks = Arc::new(DayLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    locks
                        .with_lock("u1", day(), || {
                            let n = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            max_seen.fetch_max(n, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(5));
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active(), 0);
    }

    #[test]
    fn errors_propagate_and_release_the_key() {
        let locks = DayLocks::new();
        let res: AppResult<()> =
            locks.with_lock("u1", day(), || Err(AppError::Other("boom".into())));
        assert!(res.is_err());
        assert_eq!(locks.active(), 0);
        assert_eq!(locks.with_lock("u1", day(), || Ok(7)).unwrap(), 7);
    }
}
