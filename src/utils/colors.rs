/// ANSI color helper utilities for terminal output.
use crate::models::day_summary::DayStatus;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";

pub fn color_for_status(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Present => GREEN,
        DayStatus::Partial => YELLOW,
        DayStatus::Absent => GREY,
        DayStatus::NeedsVerification => MAGENTA,
    }
}

pub fn colorize_status(status: DayStatus) -> String {
    format!("{}{}{}", color_for_status(status), status.to_db_str(), RESET)
}

/// Grey placeholder for missing values (`--:--`), plain text otherwise.
pub fn colorize_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => format!("{GREY}--:--{RESET}"),
    }
}

pub fn colorize_in_out(value: &str, is_in: bool) -> String {
    if is_in {
        format!("{GREEN}{value}{RESET}")
    } else {
        format!("{RED}{value}{RESET}")
    }
}
