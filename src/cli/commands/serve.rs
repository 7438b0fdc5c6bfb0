use crate::cli::commands::open_service;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::clock::SystemClock;
use crate::core::service::AttendanceService;
use crate::errors::AppResult;
use crate::http::{self, AppState};
use crate::store::memory::MemoryStore;
use std::sync::Arc;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Serve { bind, memory } = cmd {
        let bind = bind.clone().unwrap_or_else(|| cfg.bind.clone());

        let service = if *memory {
            cfg.validate()?;
            AttendanceService::new(
                Arc::new(MemoryStore::new()),
                cfg.zone()?,
                Arc::new(SystemClock),
                cfg.list_default_days,
            )
        } else {
            open_service(cfg)?.1
        };

        tracing::info!(
            bind = %bind,
            timezone = %cfg.timezone,
            database = if *memory { ":memory:" } else { cfg.database.as_str() },
            "starting attendance api"
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(http::serve(&bind, AppState::new(Arc::new(service))))?;
    }
    Ok(())
}
