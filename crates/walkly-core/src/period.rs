//! Reporting periods and their query windows
//!
//! A [`ReportPeriod`] is what the user picks in the period selector. It maps
//! deterministically to a [`WindowSpec`]: the time range to query, the anchor
//! the health source aligns buckets to, and the bucket granularity.

use alloc::vec::Vec;

use chrono::{DateTime, NaiveDate, TimeZone};
use thiserror_no_std::Error;

use crate::calendar;
use crate::chart::label::{self, Label};
use crate::sample::Sample;

/// Reporting window selection
///
/// Each window corresponds to a bucket granularity and a lookback from the
/// start of today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportPeriod {
    /// Today so far (hourly buckets)
    Today,
    /// Six days back plus today (daily buckets)
    Last6Days,
    /// Seven days back plus today (daily buckets)
    LastWeek,
    /// One calendar month back plus today (daily buckets)
    LastMonth,
    /// One calendar year back (monthly buckets)
    LastYear,
    /// Ten calendar years back (yearly buckets)
    LastDecade,
}

/// Error returned when an external period code is not one of the known codes
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Unknown report period code: {0}")]
pub struct UnknownPeriod(pub u16);

impl ReportPeriod {
    /// All periods in selector order
    pub const ALL: [ReportPeriod; 6] = [
        Self::Today,
        Self::Last6Days,
        Self::LastWeek,
        Self::LastMonth,
        Self::LastYear,
        Self::LastDecade,
    ];

    /// Stable numeric code used by persisted settings and deep links
    pub const fn code(self) -> u16 {
        match self {
            Self::Today => 1,
            Self::Last6Days => 6,
            Self::LastWeek => 7,
            Self::LastMonth => 30,
            Self::LastYear => 365,
            Self::LastDecade => 999,
        }
    }

    /// Get a short label for display
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "1d",
            Self::Last6Days => "6d",
            Self::LastWeek => "1w",
            Self::LastMonth => "1m",
            Self::LastYear => "1y",
            Self::LastDecade => "10y",
        }
    }

    /// Bucket granularity used when querying this period
    pub const fn granularity(self) -> Granularity {
        match self {
            Self::Today => Granularity::Hour,
            Self::Last6Days | Self::LastWeek | Self::LastMonth => Granularity::Day,
            Self::LastYear => Granularity::Month,
            Self::LastDecade => Granularity::Year,
        }
    }

    /// First day of the window for a day starting on `today`
    fn window_start_date(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Today => today,
            Self::Last6Days => calendar::sub_days(today, 6),
            Self::LastWeek => calendar::sub_days(today, 7),
            Self::LastMonth => calendar::sub_months(today, 1),
            Self::LastYear => calendar::sub_months(today, 12),
            Self::LastDecade => calendar::sub_months(today, 120),
        }
    }
}

impl TryFrom<u16> for ReportPeriod {
    type Error = UnknownPeriod;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|period| period.code() == code)
            .ok_or(UnknownPeriod(code))
    }
}

/// Size of one aggregation bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Hour,
    Day,
    Month,
    Year,
}

/// One calendar-aligned aggregation slot
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Query window for a reporting period
///
/// `anchor` is always equal to `start`: the first bucket begins exactly at the
/// window start, so the health source aligns every bucket to it.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec<Tz: TimeZone> {
    pub period: ReportPeriod,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub anchor: DateTime<Tz>,
    pub granularity: Granularity,
    /// Local midnight of the day containing `end`
    pub today_start: DateTime<Tz>,
}

/// Resolve the query window for `period` as seen at `now`.
///
/// Day, month and year boundaries follow the calendar of `now`'s time zone.
pub fn resolve_window<Tz: TimeZone>(period: ReportPeriod, now: DateTime<Tz>) -> WindowSpec<Tz> {
    let tz = now.timezone();
    let today_start = calendar::start_of_day(&now);
    let start = if period == ReportPeriod::Today {
        today_start.clone()
    } else {
        calendar::local_midnight(&tz, period.window_start_date(now.date_naive()))
    };

    WindowSpec {
        period,
        anchor: start.clone(),
        start,
        end: now,
        granularity: period.granularity(),
        today_start,
    }
}

impl<Tz: TimeZone> WindowSpec<Tz> {
    /// Start instant of the bucket `index` positions after the anchor.
    ///
    /// Calendar buckets are computed from the anchor each time rather than by
    /// stepping, so month-end clamping never drifts.
    pub fn bucket_start(&self, index: u32) -> DateTime<Tz> {
        let tz = self.anchor.timezone();
        let anchor_date = self.anchor.date_naive();
        match self.granularity {
            Granularity::Hour => {
                self.anchor.clone() + chrono::Duration::hours(i64::from(index))
            }
            Granularity::Day => {
                calendar::local_midnight(&tz, calendar::add_days(anchor_date, u64::from(index)))
            }
            Granularity::Month => {
                calendar::local_midnight(&tz, calendar::add_months(anchor_date, index))
            }
            Granularity::Year => calendar::local_midnight(
                &tz,
                calendar::add_months(anchor_date, index.saturating_mul(12)),
            ),
        }
    }

    /// Ordered buckets from the anchor up to the bucket containing `end`.
    pub fn buckets(&self) -> Vec<Bucket<Tz>> {
        let mut buckets = Vec::new();
        let mut index = 0u32;
        let mut start = self.bucket_start(index);

        while start <= self.end {
            let end = self.bucket_start(index + 1);
            if end <= start {
                // Calendar saturated at the edge of the representable range
                break;
            }
            buckets.push(Bucket {
                start,
                end: end.clone(),
            });
            index += 1;
            start = end;
        }

        buckets
    }

    /// Number of buckets the health source is expected to report.
    pub fn bucket_count(&self) -> usize {
        self.buckets().len()
    }

    /// Display label of `sample` within this window.
    pub fn label_for(&self, sample: &Sample<Tz>) -> Label {
        label::bucket_label(self.period, sample, &self.today_start)
    }

    /// Whether `instant` lies inside `[start, end]`.
    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}
