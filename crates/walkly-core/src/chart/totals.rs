//! Derived totals for chart scaling

use super::{ChartSeries, ChartSeriesItem};

/// Headroom the app leaves above the tallest mark
pub const DEFAULT_AXIS_HEADROOM: f64 = 0.1;

/// Scalars derived from a series for display
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeriesTotals {
    /// Final cumulative value, only for stacked display
    pub running_total: Option<f64>,
    /// Largest value the axis has to show, including the target line
    pub display_max: f64,
}

impl SeriesTotals {
    /// Upper bound of the value axis with `headroom` (0.1 = 10%) on top
    pub fn axis_upper_bound(&self, headroom: f64) -> f64 {
        self.display_max * (1.0 + headroom)
    }
}

/// Derive the display series and totals for `series`.
///
/// With `stacked`, every value becomes the running sum up to and including
/// its item, in series order. The input series is left untouched so later
/// merges keep operating on per-bucket values.
pub fn derive_totals(
    series: &ChartSeries,
    stacked: bool,
    target: Option<f64>,
) -> (ChartSeries, SeriesTotals) {
    let target = target.unwrap_or(0.0);

    if stacked {
        let mut running = 0.0;
        let items = series
            .iter()
            .map(|item| {
                running += item.value;
                ChartSeriesItem::new(item.label.clone(), running)
            })
            .collect();

        let totals = SeriesTotals {
            running_total: Some(running),
            display_max: f64::max(running, target),
        };
        (ChartSeries::from_items(items), totals)
    } else {
        let max_value = series.values().fold(0.0, f64::max);
        let totals = SeriesTotals {
            running_total: None,
            display_max: f64::max(max_value, target),
        };
        (series.clone(), totals)
    }
}
