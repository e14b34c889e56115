//! Refresh pipeline for the dashboard and the period chart
//!
//! A refresh runs in three stages: authorize, fetch today's statistics, fetch
//! the selected period's samples. The source is only awaited between stages
//! and never while the state lock is held.
//!
//! Every request bumps the generation counter under the state lock and keeps
//! the new value as its ticket. [`ActivityState::select_period`] bumps it
//! too. Each stage re-checks the ticket under that same lock before
//! committing, so only the newest request can commit: a result fetched for a
//! period that is no longer selected, or overtaken by a later refresh, is
//! never merged into the series.

use alloc::string::ToString;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, TimeZone};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex as AsyncMutex;
use log::{debug, error, info, warn};

use super::PipelineError;
use crate::chart::{ChartSeries, MergeOutcome, SeriesTotals, derive_totals};
use crate::metrics::Metric;
use crate::period::{ReportPeriod, resolve_window};
use crate::sample::Statistic;
use crate::source::{AuthorizationStatus, HealthSource};
use crate::storage::{AppDefaults, KeyValueStore};

struct ChartState<Tz: TimeZone> {
    period: ReportPeriod,
    today: Vec<Statistic<Tz>>,
    series: ChartSeries,
    refreshed_at: Option<DateTime<Tz>>,
}

#[derive(Debug, Clone, Copy)]
struct Ticket {
    period: ReportPeriod,
    generation: u32,
}

/// Summary of a completed refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub period: ReportPeriod,
    /// Number of today's statistics committed
    pub today: usize,
    pub merge: MergeOutcome,
}

/// Display-ready view of the selected period
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSnapshot {
    pub period: ReportPeriod,
    pub series: ChartSeries,
    pub totals: SeriesTotals,
}

/// Shared state behind the dashboard and the period chart
pub struct ActivityState<Tz: TimeZone> {
    state: AsyncMutex<CriticalSectionRawMutex, ChartState<Tz>>,
    generation: AtomicU32,
}

impl<Tz: TimeZone> ActivityState<Tz> {
    pub const fn new(period: ReportPeriod) -> Self {
        Self {
            state: AsyncMutex::new(ChartState {
                period,
                today: Vec::new(),
                series: ChartSeries::new(),
                refreshed_at: None,
            }),
            generation: AtomicU32::new(0),
        }
    }

    pub async fn period(&self) -> ReportPeriod {
        self.state.lock().await.period
    }

    /// Make `period` the selected period.
    ///
    /// Invalidates every in-flight refresh. Switching to a different period
    /// also empties the series. Returns whether the period changed.
    pub async fn select_period(&self, period: ReportPeriod) -> bool {
        let mut state = self.state.lock().await;
        self.generation.fetch_add(1, Ordering::AcqRel);

        if state.period == period {
            return false;
        }
        info!("Report period {:?} -> {:?}", state.period, period);
        state.period = period;
        state.series.clear();
        true
    }

    /// Today's statistics from the last successful refresh
    pub async fn today(&self) -> Vec<Statistic<Tz>> {
        self.state.lock().await.today.clone()
    }

    /// Today's value for `metric`, zero when it has no data
    pub async fn today_value(&self, metric: Metric) -> f64 {
        self.state
            .lock()
            .await
            .today
            .iter()
            .find(|stat| stat.metric == metric)
            .map_or(0.0, |stat| stat.value)
    }

    /// `now` of the last refresh that updated the series
    pub async fn refreshed_at(&self) -> Option<DateTime<Tz>> {
        self.state.lock().await.refreshed_at.clone()
    }

    /// Series and totals for the selected period, ready for display.
    pub async fn snapshot(&self, stacked: bool, target: Option<f64>) -> ChartSnapshot {
        let state = self.state.lock().await;
        let (series, totals) = derive_totals(&state.series, stacked, target);
        ChartSnapshot {
            period: state.period,
            series,
            totals,
        }
    }

    /// Refresh today's statistics and the selected period's series as of
    /// `now`.
    ///
    /// On failure the previous data stays in place and the error text is
    /// stored as the last error; success clears it. A superseded request
    /// touches neither.
    pub async fn refresh<S, K>(
        &self,
        source: &S,
        defaults: &mut AppDefaults<K>,
        now: DateTime<Tz>,
    ) -> Result<RefreshReport, PipelineError>
    where
        S: HealthSource<Tz>,
        K: KeyValueStore,
    {
        let result = self.run_refresh(source, defaults, now).await;

        match &result {
            Ok(report) => {
                info!(
                    "Refreshed {:?}: {} statistics, {} buckets",
                    report.period,
                    report.today,
                    report.merge.updated + report.merge.appended
                );
                if let Err(e) = defaults.clear_last_error() {
                    error!("Failed to clear last error: {}", e);
                }
            }
            Err(PipelineError::Superseded) => {}
            Err(e) => {
                warn!("Refresh failed: {}", e);
                if let Err(store_err) = defaults.set_last_error(&e.to_string()) {
                    error!("Failed to store last error: {}", store_err);
                }
            }
        }

        result
    }

    async fn run_refresh<S, K>(
        &self,
        source: &S,
        defaults: &mut AppDefaults<K>,
        now: DateTime<Tz>,
    ) -> Result<RefreshReport, PipelineError>
    where
        S: HealthSource<Tz>,
        K: KeyValueStore,
    {
        let ticket = self.ticket().await;

        let status = source.authorize(&Metric::DASHBOARD).await?;
        if status != AuthorizationStatus::Granted {
            return Err(PipelineError::Unauthorized(status));
        }

        self.check(&ticket)?;
        let today_window = resolve_window(ReportPeriod::Today, now.clone());
        let today = source.fetch_today(&Metric::DASHBOARD, &today_window).await?;
        let today_count = today.len();
        {
            let mut state = self.state.lock().await;
            self.check(&ticket)?;
            for stat in &today {
                if let Err(e) = defaults.record_statistic(stat) {
                    error!("Failed to record last {:?}: {}", stat.metric, e);
                }
            }
            state.today = today;
        }

        self.check(&ticket)?;
        let window = resolve_window(ticket.period, now.clone());
        let samples = source.fetch_period(Metric::StepCount, &window).await?;

        let mut state = self.state.lock().await;
        self.check(&ticket)?;
        let merge = state.series.merge(&samples, &window);
        debug!("Merged {} samples into {:?}: {:?}", samples.len(), ticket.period, merge);
        state.refreshed_at = Some(now);

        Ok(RefreshReport {
            period: ticket.period,
            today: today_count,
            merge,
        })
    }

    /// Start a request, superseding every request still in flight.
    async fn ticket(&self) -> Ticket {
        let state = self.state.lock().await;
        let generation = self.generation.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        Ticket {
            period: state.period,
            generation,
        }
    }

    fn check(&self, ticket: &Ticket) -> Result<(), PipelineError> {
        if self.generation.load(Ordering::Acquire) == ticket.generation {
            Ok(())
        } else {
            warn!("Dropping superseded refresh for {:?}", ticket.period);
            Err(PipelineError::Superseded)
        }
    }
}
