//! One-line user messages for the CLI. Logs go to stderr through `tracing`;
//! these go to stdout.

use crate::utils::colors::{CYAN, GREEN, RESET, YELLOW};
use std::fmt;

const BOLD: &str = "\x1b[1m";

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";

fn line(color: &str, icon: &str, msg: impl fmt::Display) {
    println!("{color}{BOLD}{icon} {RESET}{msg}");
}

pub fn info<T: fmt::Display>(msg: T) {
    line(CYAN, ICON_INFO, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    line(GREEN, ICON_OK, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    line(YELLOW, ICON_WARN, msg);
}

/// Section header, e.g. `── u1 · 2025-03-10 ──`
pub fn header<T: fmt::Display>(msg: T) {
    println!("{CYAN}{BOLD}── {msg} ──{RESET}");
}
