use crate::core::calculator::timeline::Timeline;
use crate::models::day_summary::DayStatus;

/// Worked minutes from which a closed day counts as PRESENT.
pub const PRESENT_THRESHOLD_MINUTES: i64 = 360;

/// Status of a day, checked in priority order.
pub fn classify(timeline: &Timeline) -> DayStatus {
    let open = timeline.has_open_check_in();

    if timeline.first_check_in.is_none() && !open {
        DayStatus::Absent
    } else if open {
        DayStatus::NeedsVerification
    } else if timeline.total_work_minutes >= PRESENT_THRESHOLD_MINUTES {
        DayStatus::Present
    } else {
        DayStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calculator::test_support::ev;
    use crate::core::calculator::timeline::build_timeline;

    #[test]
    fn no_check_in_is_absent() {
        assert_eq!(classify(&build_timeline(&[])), DayStatus::Absent);
        assert_eq!(
            classify(&build_timeline(&[ev(1, "10:00", false)])),
            DayStatus::Absent
        );
    }

    #[test]
    fn open_session_needs_verification_even_after_long_work() {
        let tl = build_timeline(&[
            ev(1, "08:00", true),
            ev(2, "16:00", false),
            ev(3, "17:00", true),
        ]);
        assert_eq!(classify(&tl), DayStatus::NeedsVerification);
    }

    #[test]
    fn six_hours_is_present() {
        let tl = build_timeline(&[ev(1, "09:00", true), ev(2, "15:00", false)]);
        assert_eq!(tl.total_work_minutes, 360);
        assert_eq!(classify(&tl), DayStatus::Present);
    }

    #[test]
    fn just_below_six_hours_is_partial() {
        let tl = build_timeline(&[ev(1, "09:00", true), ev(2, "14:59", false)]);
        assert_eq!(classify(&tl), DayStatus::Partial);
    }

    #[test]
    fn superseded_check_in_with_zero_sessions_is_partial() {
        // firstCheckIn is set, nothing open, nothing worked.
        let tl = build_timeline(&[ev(1, "09:00", true), ev(2, "09:00", false)]);
        assert_eq!(classify(&tl), DayStatus::Partial);
    }
}
