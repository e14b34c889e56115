//! Home-screen widget timeline
//!
//! The widget runs apart from the app and only shows today's steps and
//! distance against the step goal. When the health source cannot be read (a
//! locked device is the usual case) the entry falls back to the last values a
//! successful fetch stored, plus the error text so the widget can offer a
//! manual refresh.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use chrono::{DateTime, TimeZone};
use log::{error, warn};

use crate::app_state::PipelineError;
use crate::config::Settings;
use crate::metrics::{GoalProgress, Metric};
use crate::period::{ReportPeriod, resolve_window};
use crate::sample::Statistic;
use crate::source::HealthSource;
use crate::storage::{AppDefaults, KeyValueStore};

/// One widget timeline entry
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetEntry<Tz: TimeZone> {
    /// When the entry was built
    pub date: DateTime<Tz>,
    /// When the widget should ask for the next entry
    pub next_refresh: DateTime<Tz>,
    pub target_steps: f64,
    /// Show the time elapsed since `date` on the circular widget
    pub show_offset_time: bool,
    pub statistics: Vec<Statistic<Tz>>,
    /// Today's steps against `target_steps`
    pub progress: GoalProgress,
    /// Why fresh values could not be read; `statistics` are last-known values
    pub error: Option<String>,
}

impl<Tz: TimeZone> WidgetEntry<Tz> {
    fn new(
        date: DateTime<Tz>,
        settings: &Settings,
        statistics: Vec<Statistic<Tz>>,
        error: Option<String>,
    ) -> Self {
        let next_refresh =
            date.clone() + chrono::Duration::minutes(i64::from(settings.refresh_interval_mins));
        let steps = statistics
            .iter()
            .find(|stat| stat.metric == Metric::StepCount)
            .map_or(0.0, |stat| stat.value);

        Self {
            date,
            next_refresh,
            target_steps: settings.target_steps,
            show_offset_time: settings.show_offset_time,
            progress: GoalProgress::new(steps, settings.target_steps),
            statistics,
            error,
        }
    }

    /// Entry shown while the widget has no data yet
    pub fn placeholder(now: DateTime<Tz>) -> Self {
        Self::new(now, &Settings::default(), Vec::new(), None)
    }

    /// Entry for the widget gallery
    pub fn preview(now: DateTime<Tz>) -> Self {
        let statistics = alloc::vec![
            Statistic::new(Metric::StepCount, now.clone(), now.clone(), 5000.0),
            Statistic::new(Metric::Distance, now.clone(), now.clone(), 4.0),
        ];
        Self::new(now, &Settings::default(), statistics, None)
    }

    /// Statistic for `metric`, or an empty one stamped at `date`
    pub fn statistic(&self, metric: Metric) -> Statistic<Tz> {
        self.statistics
            .iter()
            .find(|stat| stat.metric == metric)
            .cloned()
            .unwrap_or_else(|| Statistic::empty(metric, self.date.clone()))
    }

    pub fn is_stale(&self) -> bool {
        self.error.is_some()
    }
}

/// Build the widget entry for `now`.
///
/// Fresh values are stored as last-known values. On a fetch failure the
/// entry carries the stored values instead; only a store that cannot be read
/// at all is an error.
pub async fn build_timeline_entry<Tz, S, K>(
    source: &S,
    defaults: &mut AppDefaults<K>,
    now: DateTime<Tz>,
) -> Result<WidgetEntry<Tz>, PipelineError>
where
    Tz: TimeZone,
    S: HealthSource<Tz>,
    K: KeyValueStore,
{
    let settings = defaults.settings().unwrap_or_else(|e| {
        error!("Failed to read settings, using defaults: {}", e);
        Settings::default()
    });

    let window = resolve_window(ReportPeriod::Today, now.clone());
    match source.fetch_today(&Metric::WIDGET, &window).await {
        Ok(statistics) => {
            for stat in &statistics {
                if let Err(e) = defaults.record_statistic(stat) {
                    error!("Failed to record last {:?}: {}", stat.metric, e);
                }
            }
            Ok(WidgetEntry::new(now, &settings, statistics, None))
        }
        Err(e) => {
            warn!("Widget fetch failed, showing last-known values: {}", e);
            let tz = now.timezone();
            let mut statistics = Vec::with_capacity(Metric::WIDGET.len());
            for metric in Metric::WIDGET {
                if let Some(stat) = defaults.last_statistic(metric, &tz)? {
                    statistics.push(stat);
                }
            }
            Ok(WidgetEntry::new(now, &settings, statistics, Some(e.to_string())))
        }
    }
}
