use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use crate::utils::time::ReferenceZone;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub mod migrate;

pub const ENV_HOME: &str = "RATTENDANCE_HOME";
pub const ENV_DB: &str = "RATTENDANCE_DB";
pub const ENV_BIND: &str = "RATTENDANCE_BIND";
pub const ENV_TZ: &str = "RATTENDANCE_TZ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_list_days")]
    pub list_default_days: i64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_list_days() -> i64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            bind: default_bind(),
            timezone: default_timezone(),
            list_default_days: default_list_days(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if let Ok(home) = env::var(ENV_HOME)
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rattendance")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".rattendance")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rattendance.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rattendance.sqlite")
    }

    /// Load the configuration file (defaults when absent) and apply environment overrides.
    pub fn load() -> AppResult<Self> {
        let mut cfg = Self::load_from(&Self::config_file())?;
        cfg.apply_overrides(|key| env::var(key).ok());
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(db) = get(ENV_DB) {
            self.database = db;
        }
        if let Some(bind) = get(ENV_BIND) {
            self.bind = bind;
        }
        if let Some(tz) = get(ENV_TZ) {
            self.timezone = tz;
        }
    }

    pub fn zone(&self) -> AppResult<ReferenceZone> {
        ReferenceZone::parse(&self.timezone)
    }

    pub fn database_path(&self) -> PathBuf {
        expand_tilde(&self.database)
    }

    /// Check the values that are not plain strings.
    pub fn validate(&self) -> AppResult<()> {
        self.zone()?;
        if self.list_default_days < 0 {
            return Err(AppError::Config(format!(
                "list_default_days must not be negative, got {}",
                self.list_default_days
            )));
        }
        if self.database.trim().is_empty() {
            return Err(AppError::Config("database path is empty".into()));
        }
        Ok(())
    }

    pub fn write_to(&self, path: &Path) -> AppResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Create the config directory, the config file (unless `is_test`) and
    /// return the database path to initialize.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => {
                let p = expand_tilde(name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        if !is_test {
            let config = Config {
                database: db_path.to_string_lossy().to_string(),
                ..Config::default()
            };
            config.write_to(&Self::config_file())?;
        }

        Ok(db_path)
    }
}
