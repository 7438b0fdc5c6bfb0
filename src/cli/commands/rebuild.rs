use crate::cli::commands::open_service;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::override_record::NewAuditEntry;
use crate::store::AuditSink;
use crate::ui::messages::success;
use serde_json::json;

pub const REBUILD_ACTION: &str = "SUMMARY_REBUILD";

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Rebuild { user } = cmd {
        let (store, service) = open_service(cfg)?;
        let rebuilt = service.aggregator.rebuild(user.as_deref())?;

        store.record(NewAuditEntry {
            actor_id: "cli".into(),
            action: REBUILD_ACTION.into(),
            entity_type: "summary".into(),
            entity_id: user.clone().unwrap_or_else(|| "*".into()),
            payload: json!({ "rebuilt": rebuilt }).to_string(),
        })?;

        match user {
            Some(u) => success(format!("Rebuilt {} daily summaries for '{}'.", rebuilt, u)),
            None => success(format!("Rebuilt {} daily summaries.", rebuilt)),
        }
    }
    Ok(())
}
