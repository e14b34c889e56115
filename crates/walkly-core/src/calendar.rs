//! Local-calendar helpers
//!
//! Day, month and year boundaries are computed on the naive (wall clock)
//! date of the caller's time zone and mapped back to an instant, so a
//! "day" is always the user's day regardless of DST shifts.

use chrono::{DateTime, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Longest DST gap we step over when midnight does not exist locally
const MAX_GAP_HOURS: u32 = 3;

/// Map a local wall-clock time to an instant in `tz`.
///
/// Ambiguous times resolve to the earliest instant. Times inside a DST gap
/// move forward hour by hour to the first one that exists.
pub fn local_instant<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let mut candidate = naive;
    for _ in 0..=MAX_GAP_HOURS {
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt;
        }
        candidate += chrono::Duration::hours(1);
    }
    // No zone has a gap this long; treat the wall clock as UTC
    tz.from_utc_datetime(&naive)
}

/// Local midnight at the start of `date`.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    local_instant(tz, date.and_time(NaiveTime::MIN))
}

/// Start of the local day containing `now`.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    local_midnight(&now.timezone(), now.date_naive())
}

/// `date` minus `days`, clamped to the earliest representable date.
pub fn sub_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

/// `date` plus `days`, clamped to the latest representable date.
pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

/// `date` minus `months`, clamping the day to the end of the target month.
pub fn sub_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// `date` plus `months`, clamping the day to the end of the target month.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn test_start_of_day_uses_local_calendar() {
        // 2026-10-16 00:30 in Tokyo is still 2026-10-15 in UTC
        let now = jst().with_ymd_and_hms(2026, 10, 16, 0, 30, 0).unwrap();
        let start = start_of_day(&now);

        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(start.hour(), 0);
        assert_eq!(start.minute(), 0);
        assert!(start <= now);
    }

    #[test]
    fn test_month_arithmetic_clamps_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert_eq!(sub_months(date, 1), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert_eq!(add_months(date, 1), NaiveDate::from_ymd_opt(2026, 4, 30).unwrap());
    }

    #[test]
    fn test_day_arithmetic_saturates() {
        assert_eq!(sub_days(NaiveDate::MIN, 1), NaiveDate::MIN);
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
    }

    #[test]
    fn test_repeated_wall_time_resolves_to_earliest() {
        let naive = NaiveDate::from_ymd_opt(2026, 11, 1)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        let instant = local_instant(&fall_back::Pacific, naive);

        // Still on daylight time (UTC-7)
        assert_eq!(instant.offset().local_minus_utc(), -7 * 3600);
    }
}

/// US Pacific time around the 2026-11-01 fall-back, for DST tests
#[cfg(test)]
pub(crate) mod fall_back {
    use chrono::{
        Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    };

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct Pacific;

    fn pdt() -> FixedOffset {
        FixedOffset::west_opt(7 * 3600).unwrap()
    }

    fn pst() -> FixedOffset {
        FixedOffset::west_opt(8 * 3600).unwrap()
    }

    /// 02:00 PDT on 2026-11-01, in UTC
    fn transition() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 11, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    impl TimeZone for Pacific {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Pacific
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let as_pdt = *local + Duration::hours(7) < transition();
            let as_pst = *local + Duration::hours(8) >= transition();
            match (as_pdt, as_pst) {
                (true, true) => LocalResult::Ambiguous(pdt(), pst()),
                (true, false) => LocalResult::Single(pdt()),
                (false, true) => LocalResult::Single(pst()),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < transition() { pdt() } else { pst() }
        }
    }
}
