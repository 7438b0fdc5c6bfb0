#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated home: config dir and database live in a fresh temp dir.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn db_path(&self) -> String {
        self.dir
            .path()
            .join("attendance.sqlite")
            .to_string_lossy()
            .to_string()
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.path().join("rattendance.conf")
    }

    /// `rattendance --db <tmp>` with config lookups pinned to the temp dir.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("rattendance");
        cmd.env("RATTENDANCE_HOME", self.dir.path())
            .env_remove("RATTENDANCE_DB")
            .env_remove("RATTENDANCE_BIND")
            .env_remove("RATTENDANCE_TZ")
            .env_remove("RUST_LOG")
            .args(["--db", &self.db_path()]);
        cmd
    }

    /// Initialize the schema without writing a config file.
    pub fn init(&self) {
        self.cmd().args(["--test", "init"]).assert().success();
    }
}
