//! SQLite connection wrapper shared between request handlers.

use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub struct DbPool {
    conn: Mutex<Connection>,
    path: String,
}

impl DbPool {
    pub fn new(path: &str) -> AppResult<Self> {
        let conn = Connection::open(Path::new(path))?;
        Self::configure(&conn, true)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_string(),
        })
    }

    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn, false)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: ":memory:".to_string(),
        })
    }

    fn configure(conn: &Connection, file_backed: bool) -> AppResult<()> {
        conn.busy_timeout(Duration::from_secs(5))?;
        if file_backed {
            // WAL lets the CLI read while a server writes.
            let _mode: String = conn.query_row("PRAGMA journal_mode=WAL;", [], |r| r.get(0))?;
        }
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Helper to execute a closure with a mutable connection reference.
    pub fn with_conn<F, T>(&self, func: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T>,
    {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| AppError::Other("database connection lock poisoned".into()))?;
        func(&mut guard)
    }
}
