//! Formatting utilities used for CLI and HTTP outputs.

/// Human-readable worked time: `7h 30m`, `7h`, `30m`, `0m`.
pub fn hours_worked(total_minutes: i64) -> String {
    let mins = total_minutes.max(0);
    let h = mins / 60;
    let m = mins % 60;

    if h > 0 && m > 0 {
        format!("{}h {}m", h, m)
    } else if h > 0 {
        format!("{}h", h)
    } else {
        format!("{}m", m)
    }
}

/// Short `HH:MM` form used in CLI tables.
pub fn hhmm(total_minutes: i64) -> String {
    let m = total_minutes.max(0);
    format!("{:02}:{:02}", m / 60, m % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_worked_variants() {
        assert_eq!(hours_worked(0), "0m");
        assert_eq!(hours_worked(45), "45m");
        assert_eq!(hours_worked(60), "1h");
        assert_eq!(hours_worked(420), "7h");
        assert_eq!(hours_worked(452), "7h 32m");
    }

    #[test]
    fn hhmm_pads() {
        assert_eq!(hhmm(5), "00:05");
        assert_eq!(hhmm(605), "10:05");
    }
}
