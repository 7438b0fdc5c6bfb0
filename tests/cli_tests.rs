use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;

mod common;
use common::TestEnv;

#[test]
fn init_creates_schema() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database ready (4 migrations applied)"));
    assert!(std::path::Path::new(&env.db_path()).exists());
}

#[test]
fn check_in_reports_open_session() {
    let env = TestEnv::new();
    env.init();

    env.cmd()
        .args(["check-in", "--user", "alice", "--location", "hq"])
        .assert()
        .success()
        .stdout(contains("Check-in #1 recorded for 'alice'"))
        .stdout(contains("NEEDS_VERIFICATION"))
        .stdout(contains("Open since"));
}

#[test]
fn check_in_then_out_closes_the_session() {
    let env = TestEnv::new();
    env.init();

    env.cmd()
        .args(["check-in", "--user", "bob"])
        .assert()
        .success();
    env.cmd()
        .args(["check-out", "--user", "bob", "--device", "desktop"])
        .assert()
        .success()
        .stdout(contains("Check-out #2 recorded"))
        .stdout(contains("PARTIAL"));

    let out = env
        .cmd()
        .args(["summary", "--user", "bob", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&out).expect("summary json");
    assert_eq!(json["sessionsCount"], 1);
    assert_eq!(json["status"], "PARTIAL");
    assert!(json["currentSessionStartedAt"].is_null());
}

#[test]
fn orphan_check_out_leaves_day_absent() {
    let env = TestEnv::new();
    env.init();

    env.cmd()
        .args(["check-out", "--user", "carol"])
        .assert()
        .success()
        .stdout(contains("ABSENT"));

    env.cmd()
        .args(["summary", "--user", "carol", "--sessions"])
        .assert()
        .success()
        .stdout(contains("No closed sessions."))
        .stdout(contains("ignored check-out"));
}

#[test]
fn invalid_coordinates_are_rejected_without_writing() {
    let env = TestEnv::new();
    env.init();

    env.cmd()
        .args(["check-in", "--user", "dave", "--lat", "95", "--lon", "10"])
        .assert()
        .failure()
        .stderr(contains("Error:").and(contains("latitude")));

    env.cmd()
        .args(["events", "--user", "dave"])
        .assert()
        .success()
        .stdout(contains("No events"));
}

#[test]
fn unknown_device_is_rejected() {
    let env = TestEnv::new();
    env.init();
    env.cmd()
        .args(["check-in", "--user", "dave", "--device", "tablet"])
        .assert()
        .failure()
        .stderr(contains("Invalid device type"));
}

#[test]
fn malformed_summary_date_fails() {
    let env = TestEnv::new();
    env.init();
    env.cmd()
        .args(["summary", "--user", "erin", "--date", "2025-13-40"])
        .assert()
        .failure()
        .stderr(contains("Invalid date format"));
}

#[test]
fn events_lists_the_raw_log() {
    let env = TestEnv::new();
    env.init();

    env.cmd()
        .args(["check-in", "--user", "frank", "--task", "T-42"])
        .assert()
        .success();
    env.cmd()
        .args(["events", "--user", "frank"])
        .assert()
        .success()
        .stdout(contains("CHECK_IN").and(contains("T-42")).and(contains("MOBILE")));
}

#[test]
fn list_prints_stored_summaries_as_csv() {
    let env = TestEnv::new();
    env.init();

    env.cmd()
        .args(["check-in", "--user", "gina"])
        .assert()
        .success();

    env.cmd()
        .args(["list", "--user", "gina", "--csv"])
        .assert()
        .success()
        .stdout(contains("date,status,first_check_in").and(contains("NEEDS_VERIFICATION")));
}

#[test]
fn list_for_unknown_user_is_empty() {
    let env = TestEnv::new();
    env.init();
    env.cmd()
        .args(["list", "--user", "nobody"])
        .assert()
        .success()
        .stdout(contains("No stored summaries"));
}

#[test]
fn rebuild_recreates_summaries_and_is_audited() {
    let env = TestEnv::new();
    env.init();

    env.cmd()
        .args(["check-in", "--user", "hank"])
        .assert()
        .success();
    env.cmd()
        .args(["check-in", "--user", "ivy"])
        .assert()
        .success();

    env.cmd()
        .args(["rebuild"])
        .assert()
        .success()
        .stdout(contains("Rebuilt 2 daily summaries."));

    env.cmd()
        .args(["rebuild", "--user", "hank"])
        .assert()
        .success()
        .stdout(contains("Rebuilt 1 daily summaries for 'hank'."));

    env.cmd()
        .args(["log"])
        .assert()
        .success()
        .stdout(contains("SUMMARY_REBUILD").and(contains("summary/hank")));

    env.cmd()
        .args(["log", "--action", "attendance_override"])
        .assert()
        .success()
        .stdout(contains("(empty)"));
}

#[test]
fn db_info_and_check() {
    let env = TestEnv::new();
    env.init();

    env.cmd()
        .args(["db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("Events:").and(contains("Integrity check passed")));
}

#[test]
fn config_check_and_migrate() {
    let env = TestEnv::new();
    std::fs::write(env.config_file(), "database: /tmp/ignored.sqlite\n").unwrap();

    env.cmd()
        .args(["config", "--check"])
        .assert()
        .success()
        .stdout(contains("Missing configuration fields").and(contains("timezone")));

    env.cmd()
        .args(["config", "--migrate"])
        .assert()
        .success()
        .stdout(contains("Added configuration fields"));

    env.cmd()
        .args(["config", "--check"])
        .assert()
        .success()
        .stdout(contains("Configuration file is complete."));

    let content = std::fs::read_to_string(env.config_file()).unwrap();
    assert!(content.contains("database: /tmp/ignored.sqlite"));
    assert!(content.contains("list_default_days: 30"));
}

#[test]
fn config_print_shows_effective_values() {
    let env = TestEnv::new();
    env.cmd()
        .env("RATTENDANCE_TZ", "+02:00")
        .args(["config", "--print"])
        .assert()
        .success()
        .stdout(contains("+02:00").and(contains("127.0.0.1:8080")));
}

#[test]
fn invalid_timezone_is_a_config_error() {
    let env = TestEnv::new();
    env.init();
    env.cmd()
        .env("RATTENDANCE_TZ", "Mars/Olympus")
        .args(["summary", "--user", "x"])
        .assert()
        .failure()
        .stderr(contains("Configuration error"));
}

#[test]
fn padded_user_ids_resolve_to_the_same_day() {
    let env = TestEnv::new();
    env.init();

    env.cmd()
        .args(["check-in", "--user", " dana"])
        .assert()
        .success()
        .stdout(contains("for 'dana'"));

    let out = env
        .cmd()
        .args(["summary", "--user", "dana ", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&out).expect("summary json");
    assert_eq!(json["status"], "NEEDS_VERIFICATION");
    assert!(json["currentSessionStartedAt"].is_string());

    env.cmd()
        .args(["events", "--user", "  dana  "])
        .assert()
        .success()
        .stdout(contains("CHECK_IN"));
}

#[test]
fn local_zone_files_todays_check_in_under_today() {
    let env = TestEnv::new();
    env.init();

    env.cmd()
        .env("TZ", "Europe/Rome")
        .env("RATTENDANCE_TZ", "local")
        .args(["check-in", "--user", "erin"])
        .assert()
        .success();

    let out = env
        .cmd()
        .env("TZ", "Europe/Rome")
        .env("RATTENDANCE_TZ", "local")
        .args(["summary", "--user", "erin", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&out).expect("summary json");
    assert_eq!(json["status"], "NEEDS_VERIFICATION");
    assert!(json["firstCheckIn"].is_string());
}
