use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::migrate::run_pending_migrations;
use crate::db::stats;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, RED, RESET};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check,
        vacuum,
        info,
    } = cmd
    {
        // Opening the store already applies pending migrations.
        let store = open_store(cfg)?;
        let pool = store.pool();

        if *migrate {
            println!("{}▶ Running migrations…{}", CYAN, RESET);
            let applied = pool.with_conn(run_pending_migrations)?;
            println!(
                "{}✔ Migration completed ({} pending applied).{}\n",
                GREEN, applied, RESET
            );
        }

        if *info {
            stats::print_db_info(pool)?;
        }

        if *check {
            println!("{}▶ Running integrity check…{}", CYAN, RESET);

            let integrity: String = pool.with_conn(|conn| {
                Ok(conn.query_row("PRAGMA integrity_check;", [], |row| row.get(0))?)
            })?;

            if integrity == "ok" {
                println!("{}✔ Integrity check passed.{}\n", GREEN, RESET);
            } else {
                println!("{}✘ Integrity check failed:{} {}\n", RED, RESET, integrity);
            }
        }

        if *vacuum {
            println!("{}▶ Running VACUUM…{}", CYAN, RESET);
            pool.with_conn(|conn| Ok(conn.execute_batch("VACUUM;")?))?;
            println!("{}✔ Vacuum completed.{}\n", GREEN, RESET);
        }
    }

    Ok(())
}
