//! Bucket labels
//!
//! Every bucket is keyed by a short label derived from its start instant in
//! the user's calendar. Periods that span more than one full label cycle
//! would otherwise produce the same text twice (for example the oldest and the
//! newest day of an eight-day week view), and a chart that groups marks by
//! label would fold two different days into one bar. The oldest bucket of such
//! a window therefore carries a single leading space, which is trimmed for
//! display. The same applies to hourly buckets on a day where the clocks go
//! back: the first of the two hours with the same wall-clock time is the one
//! prefixed.

use core::fmt::Write;

use chrono::{DateTime, Datelike, LocalResult, TimeZone, Timelike};

use crate::calendar;
use crate::period::ReportPeriod;
use crate::sample::Sample;

/// Maximum label length in bytes (leading space + "-262143" fits)
pub const LABEL_CAPACITY: usize = 8;

/// Fixed-capacity bucket label
pub type Label = heapless::String<LABEL_CAPACITY>;

/// Two-letter weekday names, Monday first
pub const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// Label of `sample` for `period`, as seen on the day starting at `today_start`.
///
/// The label always derives from the sample's start instant, converted to the
/// time zone of `today_start`.
pub fn bucket_label<Tz: TimeZone>(
    period: ReportPeriod,
    sample: &Sample<Tz>,
    today_start: &DateTime<Tz>,
) -> Label {
    let start = sample.period_start().with_timezone(&today_start.timezone());
    let mut label = Label::new();

    if let Some(boundary) = collision_boundary(period, today_start) {
        if start <= boundary {
            let _ = label.write_char(' ');
        }
    }

    // Capacity covers every value below, so writes cannot fail
    let _ = match period {
        ReportPeriod::Today => {
            if wall_time_repeats(&start) {
                let _ = label.write_char(' ');
            }
            write!(label, "{}", start.hour())
        }
        ReportPeriod::Last6Days | ReportPeriod::LastWeek => {
            let weekday = start.weekday().num_days_from_monday() as usize;
            label.write_str(WEEKDAY_ABBREVIATIONS[weekday])
        }
        ReportPeriod::LastMonth => write!(label, "{}", start.day()),
        ReportPeriod::LastYear => write!(label, "{}", start.month()),
        ReportPeriod::LastDecade => write!(label, "{}", start.year()),
    };

    label
}

/// Label text as it should be shown to the user.
pub fn display_text(label: &Label) -> &str {
    label.trim_start()
}

/// Whether the local wall-clock time of `instant` occurs again later, which
/// happens during the repeated hour when the clocks go back.
fn wall_time_repeats<Tz: TimeZone>(instant: &DateTime<Tz>) -> bool {
    match instant.timezone().from_local_datetime(&instant.naive_local()) {
        LocalResult::Ambiguous(earliest, _) => earliest == *instant,
        _ => false,
    }
}

/// Buckets starting at or before this instant repeat a label of a newer bucket.
///
/// `None` for periods whose window never covers a full label cycle.
fn collision_boundary<Tz: TimeZone>(
    period: ReportPeriod,
    today_start: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let today = today_start.date_naive();
    let date = match period {
        ReportPeriod::Today | ReportPeriod::LastDecade => return None,
        ReportPeriod::Last6Days | ReportPeriod::LastWeek => calendar::sub_days(today, 7),
        ReportPeriod::LastMonth => calendar::sub_months(today, 1),
        ReportPeriod::LastYear => calendar::sub_months(today, 12),
    };
    Some(calendar::local_midnight(&today_start.timezone(), date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::resolve_window;
    use chrono::FixedOffset;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    /// Friday 2026-10-16 15:42 JST
    fn now() -> DateTime<FixedOffset> {
        jst().with_ymd_and_hms(2026, 10, 16, 15, 42, 7).unwrap()
    }

    fn sample_at(y: i32, m: u32, d: u32, h: u32) -> Sample<FixedOffset> {
        let start = jst().with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        Sample::new(start, start + chrono::Duration::hours(1), 10.0)
    }

    fn label(period: ReportPeriod, sample: &Sample<FixedOffset>) -> Label {
        let window = resolve_window(period, now());
        bucket_label(period, sample, &window.today_start)
    }

    #[test]
    fn test_hour_labels() {
        assert_eq!(label(ReportPeriod::Today, &sample_at(2026, 10, 16, 0)), "0");
        assert_eq!(label(ReportPeriod::Today, &sample_at(2026, 10, 16, 9)), "9");
        assert_eq!(label(ReportPeriod::Today, &sample_at(2026, 10, 16, 23)), "23");
    }

    #[test]
    fn test_hour_label_uses_window_time_zone() {
        // 00:00 UTC is 09:00 in Tokyo
        let utc = FixedOffset::east_opt(0).unwrap();
        let start = utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
        let sample = Sample::new(start, start, 1.0);
        let window = resolve_window(ReportPeriod::Today, now());

        assert_eq!(bucket_label(ReportPeriod::Today, &sample, &window.today_start), "9");
    }

    #[test]
    fn test_weekday_labels() {
        assert_eq!(label(ReportPeriod::LastWeek, &sample_at(2026, 10, 16, 0)), "Fr");
        assert_eq!(label(ReportPeriod::LastWeek, &sample_at(2026, 10, 12, 0)), "Mo");
        assert_eq!(label(ReportPeriod::Last6Days, &sample_at(2026, 10, 11, 0)), "Su");
    }

    #[test]
    fn test_oldest_weekday_is_space_prefixed() {
        // 2026-10-09 is also a Friday, exactly 7 days before today
        let oldest = label(ReportPeriod::LastWeek, &sample_at(2026, 10, 9, 0));
        let newest = label(ReportPeriod::LastWeek, &sample_at(2026, 10, 16, 0));

        assert_eq!(oldest, " Fr");
        assert_eq!(newest, "Fr");
        assert_ne!(oldest, newest);
        assert_eq!(display_text(&oldest), display_text(&newest));
    }

    #[test]
    fn test_six_day_window_never_prefixes() {
        let window = resolve_window(ReportPeriod::Last6Days, now());
        for bucket in window.buckets() {
            let sample = Sample::new(bucket.start.clone(), bucket.end.clone(), 0.0);
            let text = window.label_for(&sample);
            assert!(!text.starts_with(' '), "{}", text.as_str());
        }
    }

    #[test]
    fn test_day_of_month_labels() {
        assert_eq!(label(ReportPeriod::LastMonth, &sample_at(2026, 10, 1, 0)), "1");
        assert_eq!(label(ReportPeriod::LastMonth, &sample_at(2026, 9, 30, 0)), "30");
        // First bucket of the month view repeats today's day number
        assert_eq!(label(ReportPeriod::LastMonth, &sample_at(2026, 9, 16, 0)), " 16");
        assert_eq!(label(ReportPeriod::LastMonth, &sample_at(2026, 10, 16, 0)), "16");
    }

    #[test]
    fn test_month_and_year_labels_use_start_instant() {
        // A monthly bucket 2026-01-16 .. 2026-02-16 is labelled January
        assert_eq!(label(ReportPeriod::LastYear, &sample_at(2026, 1, 16, 0)), "1");
        assert_eq!(label(ReportPeriod::LastYear, &sample_at(2025, 10, 16, 0)), " 10");
        assert_eq!(label(ReportPeriod::LastYear, &sample_at(2026, 10, 16, 0)), "10");

        assert_eq!(label(ReportPeriod::LastDecade, &sample_at(2016, 10, 16, 0)), "2016");
        assert_eq!(label(ReportPeriod::LastDecade, &sample_at(2023, 10, 16, 0)), "2023");
    }

    #[test]
    fn test_every_window_has_distinct_labels() {
        for period in ReportPeriod::ALL {
            let window = resolve_window(period, now());
            let buckets = window.buckets();
            for (i, a) in buckets.iter().enumerate() {
                for b in buckets.iter().skip(i + 1) {
                    let la = window.label_for(&Sample::new(a.start.clone(), a.end.clone(), 0.0));
                    let lb = window.label_for(&Sample::new(b.start.clone(), b.end.clone(), 0.0));
                    assert_ne!(la, lb, "{:?}", period);
                }
            }
        }
    }

    #[test]
    fn test_labels_are_deterministic() {
        let sample = sample_at(2026, 10, 14, 7);
        for period in ReportPeriod::ALL {
            assert_eq!(label(period, &sample), label(period, &sample));
        }
    }

    #[test]
    fn test_repeated_hour_is_space_prefixed_when_clocks_go_back() {
        use crate::calendar::fall_back::Pacific;

        let now = Pacific.with_ymd_and_hms(2026, 11, 1, 23, 30, 0).unwrap();
        let window = resolve_window(ReportPeriod::Today, now);
        let labels: alloc::vec::Vec<Label> = window
            .buckets()
            .into_iter()
            .map(|b| window.label_for(&Sample::new(b.start, b.end, 0.0)))
            .collect();

        // 01:00 happens twice, so the day has 25 hourly buckets
        assert_eq!(labels.len(), 25);
        assert_eq!(labels[1], " 1");
        assert_eq!(labels[2], "1");
        for (i, a) in labels.iter().enumerate() {
            for b in labels.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }

        let shown: alloc::vec::Vec<&str> = labels.iter().map(display_text).collect();
        assert_eq!(shown[..4], ["0", "1", "1", "2"]);
        assert_eq!(shown[24], "23");
    }
}
