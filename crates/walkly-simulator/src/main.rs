//! Desktop simulator for the walkly step-count statistics app.
//!
//! Drives walkly-core's refresh pipeline and widget timeline against a
//! synthetic health source and renders the selected period as a text bar
//! chart. Nothing here touches a real health store.
//!
//! # Commands
//!
//! | Input | Action                              |
//! |-------|-------------------------------------|
//! | 1-6   | Select period (1d 6d 1w 1m 1y 10y)  |
//! | s     | Toggle stacked display              |
//! | f     | Toggle simulated source failure     |
//! | w     | Build a widget timeline entry       |
//! | r     | Refresh the selected period         |
//! | q     | Quit                                |
//!
//! Set `RUST_LOG=debug` to follow merges and resyncs.

use std::cell::Cell;
use std::io::{self, BufRead, Write};

use chrono::{DateTime, Datelike, Duration, Local, TimeZone, Timelike};
use embassy_futures::block_on;
use log::{error, info};

use walkly_core::app_state::{ActivityState, ChartSnapshot};
use walkly_core::chart::{DEFAULT_AXIS_HEADROOM, display_text};
use walkly_core::metrics::Metric;
use walkly_core::period::{ReportPeriod, WindowSpec};
use walkly_core::sample::{Sample, Statistic};
use walkly_core::source::{AuthorizationStatus, HealthSource, SourceError};
use walkly_core::storage::{AppDefaults, MemoryStore};
use walkly_core::widgets::build_timeline_entry;

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

/// Width of the longest bar in characters.
const BAR_WIDTH: usize = 48;

/// Kilometers per step of the synthetic walker.
const KM_PER_STEP: f64 = 0.00072;

/// Kilocalories per step of the synthetic walker.
const KCAL_PER_STEP: f64 = 0.04;

/// Steps per minute counted as exercise.
const STEPS_PER_EXERCISE_MIN: f64 = 110.0;

// ---------------------------------------------------------------------------
// Mock data generation
// ---------------------------------------------------------------------------

/// Synthetic health source with a walking day profile.
///
/// Steps follow a daytime sine with a per-day activity factor, so every
/// period shows some variation.
struct MockHealthSource {
    failing: Cell<bool>,
}

impl MockHealthSource {
    fn new() -> Self {
        Self {
            failing: Cell::new(false),
        }
    }

    /// Steps walked during the hour starting at `hour_start`.
    fn hourly_steps<Tz: TimeZone>(hour_start: &DateTime<Tz>) -> f64 {
        let hour = f64::from(hour_start.hour());
        let daytime = if (6.0..22.0).contains(&hour) {
            400.0 + 350.0 * (std::f64::consts::PI * (hour - 6.0) / 16.0).sin()
        } else {
            15.0
        };

        let day_seed = (hour_start.ordinal() * 7919 + hour_start.year().unsigned_abs()) % 100;
        daytime * (0.6 + 0.8 * f64::from(day_seed) / 100.0)
    }

    /// Steps between `from` and `to`, hour by hour.
    fn steps_between<Tz: TimeZone>(from: &DateTime<Tz>, to: &DateTime<Tz>) -> f64 {
        let mut total = 0.0;
        let mut hour_start = from.clone();

        while hour_start < *to {
            let hour_end = hour_start.clone() + Duration::hours(1);
            let covered_end = if hour_end < *to { hour_end.clone() } else { to.clone() };
            let fraction = (covered_end - hour_start.clone()).num_seconds() as f64 / 3600.0;
            total += Self::hourly_steps(&hour_start) * fraction;
            hour_start = hour_end;
        }

        total
    }

    fn value_for(metric: Metric, steps: f64) -> f64 {
        match metric {
            Metric::StepCount => steps,
            Metric::Distance => steps * KM_PER_STEP,
            Metric::ActiveEnergy => steps * KCAL_PER_STEP,
            Metric::ExerciseTime => steps / STEPS_PER_EXERCISE_MIN,
            Metric::StepLength => 72.0,
            Metric::WalkingHeartRate => 96.0,
            Metric::OxygenSaturation => 98.0,
        }
    }

    fn check_available(&self) -> Result<(), SourceError> {
        if self.failing.get() {
            Err(SourceError::NotAvailable)
        } else {
            Ok(())
        }
    }
}

impl<Tz: TimeZone> HealthSource<Tz> for MockHealthSource {
    async fn authorize(&self, _metrics: &[Metric]) -> Result<AuthorizationStatus, SourceError> {
        Ok(AuthorizationStatus::Granted)
    }

    async fn fetch_today(
        &self,
        metrics: &[Metric],
        window: &WindowSpec<Tz>,
    ) -> Result<Vec<Statistic<Tz>>, SourceError> {
        self.check_available()?;
        let steps = Self::steps_between(&window.start, &window.end);

        Ok(metrics
            .iter()
            .map(|&metric| {
                Statistic::new(
                    metric,
                    window.start.clone(),
                    window.end.clone(),
                    Self::value_for(metric, steps),
                )
            })
            .collect())
    }

    async fn fetch_period(
        &self,
        metric: Metric,
        window: &WindowSpec<Tz>,
    ) -> Result<Vec<Sample<Tz>>, SourceError> {
        self.check_available()?;

        Ok(window
            .buckets()
            .into_iter()
            .map(|bucket| {
                let until = if bucket.end < window.end {
                    bucket.end.clone()
                } else {
                    window.end.clone()
                };
                let steps = Self::steps_between(&bucket.start, &until);
                Sample::new(bucket.start, bucket.end, Self::value_for(metric, steps))
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Print the snapshot as a horizontal bar chart.
fn render_chart(snapshot: &ChartSnapshot, target: f64) {
    let upper = snapshot.totals.axis_upper_bound(DEFAULT_AXIS_HEADROOM);
    println!();
    println!(
        "== {} ({} buckets, goal {:.0}) ==",
        snapshot.period.label(),
        snapshot.series.len(),
        target
    );

    for item in &snapshot.series {
        let len = if upper > 0.0 {
            ((item.value / upper) * BAR_WIDTH as f64) as usize
        } else {
            0
        };
        println!(
            "{:>4} | {:<width$} {:.0}",
            display_text(&item.label),
            "#".repeat(len),
            item.value,
            width = BAR_WIDTH
        );
    }

    match snapshot.totals.running_total {
        Some(total) => println!("total {:.0}, axis max {:.0}", total, upper),
        None => println!("axis max {:.0}", upper),
    }
}

fn print_help() {
    println!("1-6 period  s stacked  f failure  w widget  r refresh  q quit");
}

fn period_for_key(key: &str) -> Option<ReportPeriod> {
    let index: usize = key.parse().ok()?;
    ReportPeriod::ALL.get(index.checked_sub(1)?).copied()
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting walkly simulator");

    let source = MockHealthSource::new();
    let state = ActivityState::<Local>::new(ReportPeriod::Today);
    let mut defaults = AppDefaults::new(MemoryStore::new());
    let mut stacked = false;

    print_help();
    let mut needs_refresh = true;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    'running: loop {
        if needs_refresh {
            let now = Local::now();
            if let Err(e) = block_on(state.refresh(&source, &mut defaults, now)) {
                error!("Refresh failed: {}", e);
            }

            let target = defaults.target_steps();
            let snapshot = block_on(state.snapshot(stacked, Some(target)));
            render_chart(&snapshot, target);
            println!(
                "today: {:.0} steps, {:.1} km",
                block_on(state.today_value(Metric::StepCount)),
                block_on(state.today_value(Metric::Distance))
            );
            needs_refresh = false;
        }

        print!("> ");
        let _ = io::stdout().flush();

        let Some(Ok(line)) = lines.next() else {
            break 'running;
        };

        match line.trim() {
            "q" => break 'running,
            "s" => {
                stacked = !stacked;
                info!("Stacked display {}", if stacked { "on" } else { "off" });
                needs_refresh = true;
            }
            "f" => {
                source.failing.set(!source.failing.get());
                info!("Simulated source failure {}", if source.failing.get() { "on" } else { "off" });
            }
            "w" => match block_on(build_timeline_entry(&source, &mut defaults, Local::now())) {
                Ok(entry) => {
                    let steps = entry.statistic(Metric::StepCount);
                    let distance = entry.statistic(Metric::Distance);
                    println!(
                        "widget: {:.0} steps ({}%), {:.1} km, next at {}",
                        steps.value,
                        entry.progress.percent(),
                        distance.value,
                        entry.next_refresh.format("%H:%M")
                    );
                    if let Some(reason) = entry.error {
                        println!("widget: stale since {} ({}), tap to refresh", steps.end.format("%H:%M"), reason);
                    }
                }
                Err(e) => error!("Widget entry failed: {}", e),
            },
            "r" => needs_refresh = true,
            key => match period_for_key(key) {
                Some(period) => {
                    block_on(state.select_period(period));
                    needs_refresh = true;
                }
                None => print_help(),
            },
        }
    }

    info!("Simulator exiting");
}
