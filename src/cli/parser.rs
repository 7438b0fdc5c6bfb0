use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for rattendance
/// Event-sourced attendance tracking backed by SQLite
#[derive(Parser)]
#[command(
    name = "rattendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "Attendance engine: record check-ins/check-outs and derive daily summaries",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file is written)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// `--user` values are trimmed once here so every command sees the same id.
fn user_id(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("user id must not be blank".to_string());
    }
    Ok(trimmed.to_string())
}

/// Optional data attached to a check-in or check-out.
#[derive(Args, Debug, Clone)]
pub struct EventArgs {
    /// User the event belongs to
    #[arg(long = "user", value_parser = user_id)]
    pub user: String,

    #[arg(long = "lat", allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    #[arg(long = "lon", allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// GPS accuracy in meters
    #[arg(long = "accuracy")]
    pub accuracy: Option<f64>,

    #[arg(long = "location")]
    pub location: Option<String>,

    #[arg(long = "task")]
    pub task: Option<String>,

    /// Device type: mobile (default) or desktop
    #[arg(long = "device")]
    pub device: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Run the HTTP API
    Serve {
        /// Listen address, e.g. 127.0.0.1:8080
        #[arg(long = "bind")]
        bind: Option<String>,

        /// Keep everything in memory instead of the configured database
        #[arg(long = "memory")]
        memory: bool,
    },

    /// Record a check-in stamped with the current time
    CheckIn(EventArgs),

    /// Record a check-out stamped with the current time
    CheckOut(EventArgs),

    /// Recompute and show the summary of one day
    Summary {
        #[arg(long = "user", value_parser = user_id)]
        user: String,

        /// Day to show (YYYY-MM-DD), today when omitted
        #[arg(long = "date")]
        date: Option<String>,

        /// Also print paired sessions and break gaps
        #[arg(long = "sessions")]
        sessions: bool,

        /// Print the summary as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// List stored daily summaries, newest first
    List {
        #[arg(long = "user", value_parser = user_id)]
        user: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long = "from")]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long = "to")]
        to: Option<String>,

        #[arg(long = "page")]
        page: Option<String>,

        #[arg(long = "limit")]
        limit: Option<String>,

        /// Print CSV instead of a table
        #[arg(long = "csv", conflicts_with = "json")]
        csv: bool,

        /// Print the page as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Print the raw event log of one day
    Events {
        #[arg(long = "user", value_parser = user_id)]
        user: String,

        /// Day to show (YYYY-MM-DD), today when omitted
        #[arg(long = "date")]
        date: Option<String>,
    },

    /// Drop cached summaries and rebuild them from the event log
    Rebuild {
        /// Only rebuild this user
        #[arg(long = "user", value_parser = user_id)]
        user: Option<String>,
    },

    /// Print the audit log
    Log {
        /// Only entries with this action (e.g. ATTENDANCE_OVERRIDE)
        #[arg(long = "action")]
        action: Option<String>,
    },

    /// Manage the configuration file (view, check, migrate or edit)
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields with their defaults")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },
}
