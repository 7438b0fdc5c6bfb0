use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::migrate::applied_versions;
use crate::db::store::SqliteStore;
use crate::errors::AppResult;
use crate::ui::messages::success;
use std::fs;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped with `--test`)
///  - the SQLite database and all pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let db_path = Config::init_all(cli.db.as_deref(), cli.test)?;
    if let Some(dir) = db_path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }

    println!("⚙️  Initializing rattendance…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database    : {}", db_path.display());

    let store = SqliteStore::open(&db_path.to_string_lossy())?;
    let versions = store.pool().with_conn(|conn| applied_versions(conn))?;

    success(format!(
        "Database ready ({} migrations applied).",
        versions.len()
    ));
    Ok(())
}
