use crate::errors::{AppError, AppResult};
use chrono::{Duration, NaiveDate};

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse an optional `YYYY-MM-DD`, falling back to `default` when absent or blank.
pub fn parse_date_or(s: Option<&str>, default: NaiveDate) -> AppResult<NaiveDate> {
    match s.map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => parse_date(v).ok_or_else(|| AppError::InvalidDate(v.to_string())),
    }
}

/// Inclusive `[from, to]` window. With neither bound given, the trailing `days` up to `today`.
pub fn resolve_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
    days: i64,
) -> AppResult<(Option<NaiveDate>, Option<NaiveDate>)> {
    match (from, to) {
        (None, None) => Ok((Some(today - Duration::days(days)), None)),
        (Some(f), Some(t)) if f > t => Err(AppError::InvalidDate(format!(
            "range start {f} is after range end {t}"
        ))),
        (f, t) => Ok((f, t)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn default_range_is_trailing_days() {
        let (from, to) = resolve_range(None, None, d("2025-03-31"), 30).unwrap();
        assert_eq!(from, Some(d("2025-03-01")));
        assert_eq!(to, None);
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(resolve_range(Some(d("2025-03-02")), Some(d("2025-03-01")), d("2025-03-31"), 30).is_err());
    }

    #[test]
    fn blank_date_uses_default() {
        let today = d("2025-03-10");
        assert_eq!(parse_date_or(Some(" "), today).unwrap(), today);
        assert!(parse_date_or(Some("2025-13-01"), today).is_err());
    }
}
