//! Time utilities: reference timezone, calendar-day bounds, timestamp parsing.

use crate::errors::{AppError, AppResult};
use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveTime, SecondsFormat,
    TimeZone, Utc,
};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Timezone in which "calendar day" is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceZone {
    #[default]
    Utc,
    Local,
    Fixed(FixedOffset),
}

fn offset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([+-])(\d{2}):?(\d{2})$").expect("static regex"))
}

impl ReferenceZone {
    /// Accepts `UTC`, `Z`, `local`, or a fixed offset such as `+02:00` / `-0530`.
    pub fn parse(s: &str) -> AppResult<Self> {
        let t = s.trim();
        match t.to_lowercase().as_str() {
            "utc" | "z" | "" => return Ok(ReferenceZone::Utc),
            "local" => return Ok(ReferenceZone::Local),
            _ => {}
        }

        let caps = offset_re()
            .captures(t)
            .ok_or_else(|| AppError::Config(format!("Invalid timezone '{t}'")))?;

        let hours: i32 = caps[2]
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid timezone '{t}'")))?;
        let minutes: i32 = caps[3]
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid timezone '{t}'")))?;
        let mut secs = hours * 3600 + minutes * 60;
        if &caps[1] == "-" {
            secs = -secs;
        }

        FixedOffset::east_opt(secs)
            .map(ReferenceZone::Fixed)
            .ok_or_else(|| AppError::Config(format!("Timezone offset out of range '{t}'")))
    }

    /// Calendar day a timestamp falls on.
    pub fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        match self {
            ReferenceZone::Utc => ts.date_naive(),
            ReferenceZone::Local => ts.with_timezone(&Local).date_naive(),
            ReferenceZone::Fixed(off) => ts.with_timezone(off).date_naive(),
        }
    }

    /// Instant at which `date` starts.
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        match self {
            ReferenceZone::Utc => local_midnight(&Utc, date),
            ReferenceZone::Fixed(off) => local_midnight(off, date),
            ReferenceZone::Local => local_midnight(&Local, date),
        }
    }

    /// `[dayStart, nextDayStart)`. Spans 23 or 25 hours across a DST change
    /// with `Local`, so consecutive days tile without gaps or overlap.
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            ReferenceZone::Utc => calendar_day_bounds(&Utc, date),
            ReferenceZone::Fixed(off) => calendar_day_bounds(off, date),
            ReferenceZone::Local => calendar_day_bounds(&Local, date),
        }
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.day_of(now)
    }
}

/// Midnight may not exist (DST gap) or exist twice; take the earliest real instant.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc()),
    }
}

fn calendar_day_bounds<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight(tz, date);
    let end = date
        .succ_opt()
        .map(|next| local_midnight(tz, next))
        .unwrap_or_else(|| start + Duration::hours(24));
    (start, end)
}

impl fmt::Display for ReferenceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceZone::Utc => write!(f, "UTC"),
            ReferenceZone::Local => write!(f, "local"),
            ReferenceZone::Fixed(off) => write!(f, "{off}"),
        }
    }
}

/// RFC 3339 with millisecond precision, `Z` suffix.
pub fn iso_millis(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `serialize_with` helper rendering optional instants like [`iso_millis`].
pub fn serialize_opt_millis<S: serde::Serializer>(
    ts: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serializer.serialize_str(&iso_millis(*ts)),
        None => serializer.serialize_none(),
    }
}

pub fn from_millis(ms: i64) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| AppError::InvalidTimestamp(format!("{ms} ms out of range")))
}

/// Drop sub-millisecond precision so stored and in-memory values compare equal.
pub fn truncate_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

pub fn parse_timestamp(s: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::InvalidTimestamp(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDateTime};

    #[test]
    fn parses_zone_forms() {
        assert_eq!(ReferenceZone::parse("UTC").unwrap(), ReferenceZone::Utc);
        assert_eq!(ReferenceZone::parse("local").unwrap(), ReferenceZone::Local);
        assert_eq!(
            ReferenceZone::parse("+02:00").unwrap(),
            ReferenceZone::Fixed(FixedOffset::east_opt(7200).unwrap())
        );
        assert_eq!(
            ReferenceZone::parse("-0530").unwrap(),
            ReferenceZone::Fixed(FixedOffset::west_opt(5 * 3600 + 1800).unwrap())
        );
        assert!(ReferenceZone::parse("Mars/Olympus").is_err());
    }

    #[test]
    fn fixed_offset_day_bounds() {
        let z = ReferenceZone::parse("+02:00").unwrap();
        let d = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let (start, end) = z.day_bounds(d);
        assert_eq!(iso_millis(start), "2025-03-09T22:00:00.000Z");
        assert_eq!(end - start, Duration::hours(24));
        // 23:30 UTC on the 9th is already the 10th at +02:00.
        let late = parse_timestamp("2025-03-09T23:30:00Z").unwrap();
        assert_eq!(z.day_of(late), d);
    }

    /// Two-offset zone switching at one UTC instant, shaped like Europe/Rome.
    #[derive(Debug, Clone)]
    struct Shift {
        switch: NaiveDateTime,
        before: FixedOffset,
        after: FixedOffset,
    }

    impl Shift {
        fn rome_autumn_2025() -> Self {
            Self {
                switch: parse_timestamp("2025-10-26T01:00:00Z").unwrap().naive_utc(),
                before: FixedOffset::east_opt(7200).unwrap(),
                after: FixedOffset::east_opt(3600).unwrap(),
            }
        }

        fn rome_spring_2025() -> Self {
            Self {
                switch: parse_timestamp("2025-03-30T01:00:00Z").unwrap().naive_utc(),
                before: FixedOffset::east_opt(3600).unwrap(),
                after: FixedOffset::east_opt(7200).unwrap(),
            }
        }
    }

    impl TimeZone for Shift {
        type Offset = FixedOffset;

        fn from_offset(offset: &FixedOffset) -> Self {
            Self {
                switch: NaiveDateTime::MIN,
                before: *offset,
                after: *offset,
            }
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let as_before = *local - Duration::seconds(self.before.local_minus_utc() as i64);
            let as_after = *local - Duration::seconds(self.after.local_minus_utc() as i64);
            match (as_before < self.switch, as_after >= self.switch) {
                (true, true) => LocalResult::Ambiguous(self.before, self.after),
                (true, false) => LocalResult::Single(self.before),
                (false, true) => LocalResult::Single(self.after),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < self.switch {
                self.before
            } else {
                self.after
            }
        }
    }

    #[test]
    fn long_dst_day_keeps_its_last_hour() {
        let tz = Shift::rome_autumn_2025();
        let d = NaiveDate::from_ymd_opt(2025, 10, 26).unwrap();
        let (start, end) = calendar_day_bounds(&tz, d);
        assert_eq!(iso_millis(start), "2025-10-25T22:00:00.000Z");
        assert_eq!(iso_millis(end), "2025-10-26T23:00:00.000Z");
        assert_eq!(end - start, Duration::hours(25));

        // 23:30 local on the 26th belongs to the 26th.
        let late = parse_timestamp("2025-10-26T22:30:00Z").unwrap();
        assert!(start <= late && late < end);
        assert_eq!(late.with_timezone(&tz).date_naive(), d);
    }

    #[test]
    fn short_dst_day_does_not_overlap_the_next() {
        let tz = Shift::rome_spring_2025();
        let d = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
        let (start, end) = calendar_day_bounds(&tz, d);
        assert_eq!(end - start, Duration::hours(23));
        let (next_start, _) = calendar_day_bounds(&tz, d.succ_opt().unwrap());
        assert_eq!(end, next_start);
    }

    #[test]
    fn local_days_tile_the_whole_year() {
        let zone = ReferenceZone::Local;
        let mut d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        while d.year() == 2025 {
            let (start, end) = zone.day_bounds(d);
            let next = d.succ_opt().unwrap();
            assert_eq!(end, zone.day_start(next), "gap or overlap after {d}");
            assert_eq!(zone.day_of(start), d);
            assert_eq!(zone.day_of(end - Duration::milliseconds(1)), d);
            d = next;
        }
    }

    #[test]
    fn truncation_keeps_millis() {
        let ts = parse_timestamp("2025-03-10T09:00:00.123456Z").unwrap();
        assert_eq!(iso_millis(truncate_millis(ts)), "2025-03-10T09:00:00.123Z");
    }
}
