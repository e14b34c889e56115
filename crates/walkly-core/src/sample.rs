//! Observations handed over by the health source

use chrono::{DateTime, TimeZone};
use log::warn;

use crate::metrics::Metric;

/// One bucketed observation for a period query.
///
/// Values are already converted to the unit the presentation expects and are
/// never negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<Tz: TimeZone> {
    period_start: DateTime<Tz>,
    period_end: DateTime<Tz>,
    value: f64,
}

impl<Tz: TimeZone> Sample<Tz> {
    /// Creates a new sample. Negative or non-finite values are stored as zero.
    pub fn new(period_start: DateTime<Tz>, period_end: DateTime<Tz>, value: f64) -> Self {
        Self {
            period_start,
            period_end,
            value: sanitize(value),
        }
    }

    pub fn period_start(&self) -> &DateTime<Tz> {
        &self.period_start
    }

    pub fn period_end(&self) -> &DateTime<Tz> {
        &self.period_end
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Today's aggregate for a single metric
#[derive(Debug, Clone, PartialEq)]
pub struct Statistic<Tz: TimeZone> {
    pub metric: Metric,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub value: f64,
}

impl<Tz: TimeZone> Statistic<Tz> {
    pub fn new(metric: Metric, start: DateTime<Tz>, end: DateTime<Tz>, value: f64) -> Self {
        Self {
            metric,
            start,
            end,
            value: sanitize(value),
        }
    }

    /// Placeholder for a metric with no data yet, stamped at `at`.
    pub fn empty(metric: Metric, at: DateTime<Tz>) -> Self {
        Self {
            metric,
            start: at.clone(),
            end: at,
            value: 0.0,
        }
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!("Discarding invalid health value {}", value);
        0.0
    }
}
