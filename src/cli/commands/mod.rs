pub mod check;
pub mod config;
pub mod db;
pub mod events;
pub mod init;
pub mod list;
pub mod log;
pub mod rebuild;
pub mod serve;
pub mod summary;

use crate::config::Config;
use crate::core::clock::SystemClock;
use crate::core::service::AttendanceService;
use crate::db::store::SqliteStore;
use crate::errors::AppResult;
use std::fs;
use std::sync::Arc;

/// Open the configured database, creating it and its schema when missing.
pub(crate) fn open_store(cfg: &Config) -> AppResult<Arc<SqliteStore>> {
    let path = cfg.database_path();
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    Ok(Arc::new(SqliteStore::open(&path.to_string_lossy())?))
}

pub(crate) fn open_service(cfg: &Config) -> AppResult<(Arc<SqliteStore>, AttendanceService)> {
    cfg.validate()?;
    let store = open_store(cfg)?;
    let service = AttendanceService::new(
        store.clone(),
        cfg.zone()?,
        Arc::new(SystemClock),
        cfg.list_default_days,
    );
    Ok((store, service))
}
