//! Health data source abstraction
//!
//! The platform health store lives outside this crate. Everything the refresh
//! pipeline and the widget need from it goes through [`HealthSource`].

use alloc::string::String;
use alloc::vec::Vec;

use chrono::TimeZone;
use thiserror_no_std::Error;

use crate::metrics::Metric;
use crate::period::WindowSpec;
use crate::sample::{Sample, Statistic};

/// Read authorization state for a set of metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Granted,
    /// The user has not been asked yet
    ShouldRequest,
    Denied,
    Unknown,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Health data is not available on this device")]
    NotAvailable,
    #[error("No health data for the requested window")]
    NoData,
    #[error("Health data access was denied")]
    AuthorizationDenied,
    #[error("Health source error: {0}")]
    Backend(String),
}

/// Asynchronous provider of health statistics.
///
/// Values are expected in the unit of [`Metric::unit`], aggregated per
/// [`Metric::aggregation`].
pub trait HealthSource<Tz: TimeZone> {
    /// Ask for read access to `metrics`.
    fn authorize(
        &self,
        metrics: &[Metric],
    ) -> impl Future<Output = Result<AuthorizationStatus, SourceError>>;

    /// One aggregate per metric over `window`. Metrics without data are
    /// left out.
    fn fetch_today(
        &self,
        metrics: &[Metric],
        window: &WindowSpec<Tz>,
    ) -> impl Future<Output = Result<Vec<Statistic<Tz>>, SourceError>>;

    /// Bucketed samples for `metric`, aligned to `window.anchor` at
    /// `window.granularity`, in chronological order.
    fn fetch_period(
        &self,
        metric: Metric,
        window: &WindowSpec<Tz>,
    ) -> impl Future<Output = Result<Vec<Sample<Tz>>, SourceError>>;
}
