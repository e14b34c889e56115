//! Health metrics and goal progress
//!
//! This module provides the closed set of metrics walkly reads, together with
//! the unit each value arrives in and how a bucket aggregates its samples.

use serde::{Deserialize, Serialize};

/// Health metric read from the health source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    /// Number of steps
    StepCount,
    /// Walking and running distance
    Distance,
    /// Active energy burned
    ActiveEnergy,
    /// Exercise time
    ExerciseTime,
    /// Average walking step length
    StepLength,
    /// Average walking heart rate
    WalkingHeartRate,
    /// Average blood oxygen saturation
    OxygenSaturation,
}

/// Unit a metric's values are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Count,
    Kilometers,
    Kilocalories,
    Minutes,
    Centimeters,
    BeatsPerMinute,
    Percent,
}

impl Unit {
    /// Short suffix for display
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Count => "",
            Self::Kilometers => "km",
            Self::Kilocalories => "kcal",
            Self::Minutes => "min",
            Self::Centimeters => "cm",
            Self::BeatsPerMinute => "bpm",
            Self::Percent => "%",
        }
    }
}

/// How samples inside one bucket combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    /// Cumulative sum over the bucket
    Sum,
    /// Discrete average over the bucket
    Average,
}

impl Metric {
    /// Metrics shown on the dashboard for today
    pub const DASHBOARD: [Metric; 4] = [
        Self::StepCount,
        Self::Distance,
        Self::ActiveEnergy,
        Self::ExerciseTime,
    ];

    /// Metrics shown by the home-screen widget
    pub const WIDGET: [Metric; 2] = [Self::StepCount, Self::Distance];

    /// Unit the health source converts this metric to
    pub const fn unit(self) -> Unit {
        match self {
            Self::StepCount => Unit::Count,
            Self::Distance => Unit::Kilometers,
            Self::ActiveEnergy => Unit::Kilocalories,
            Self::ExerciseTime => Unit::Minutes,
            Self::StepLength => Unit::Centimeters,
            Self::WalkingHeartRate => Unit::BeatsPerMinute,
            Self::OxygenSaturation => Unit::Percent,
        }
    }

    /// Aggregation the health source applies per bucket
    pub const fn aggregation(self) -> AggregationMode {
        match self {
            Self::StepCount | Self::Distance | Self::ActiveEnergy | Self::ExerciseTime => {
                AggregationMode::Sum
            }
            Self::StepLength | Self::WalkingHeartRate | Self::OxygenSaturation => {
                AggregationMode::Average
            }
        }
    }

    /// Fraction digits used when displaying a value of this metric
    pub const fn display_precision(self) -> usize {
        match self {
            Self::Distance => 1,
            _ => 0,
        }
    }

    /// Get the display label for this metric
    pub const fn label(self) -> &'static str {
        match self {
            Self::StepCount => "Steps",
            Self::Distance => "Distance",
            Self::ActiveEnergy => "Active energy",
            Self::ExerciseTime => "Exercise",
            Self::StepLength => "Step length",
            Self::WalkingHeartRate => "Walking heart rate",
            Self::OxygenSaturation => "Blood oxygen",
        }
    }
}

/// Progress of a value toward a daily goal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub value: f64,
    pub target: f64,
}

impl GoalProgress {
    pub const fn new(value: f64, target: f64) -> Self {
        Self { value, target }
    }

    /// `value / target`, or 0 when there is no goal
    pub fn ratio(&self) -> f64 {
        if self.target > 0.0 {
            self.value / self.target
        } else {
            0.0
        }
    }

    /// Whole percent, rounded toward zero
    pub fn percent(&self) -> u32 {
        let percent = self.ratio() * 100.0;
        if percent >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            percent as u32
        }
    }

    /// Whether the goal has been reached
    pub fn reached(&self) -> bool {
        self.target > 0.0 && self.value >= self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summed_metrics_are_the_dashboard_set() {
        for metric in Metric::DASHBOARD {
            assert_eq!(metric.aggregation(), AggregationMode::Sum);
        }
        assert_eq!(Metric::StepLength.aggregation(), AggregationMode::Average);
        assert_eq!(Metric::WalkingHeartRate.aggregation(), AggregationMode::Average);
        assert_eq!(Metric::OxygenSaturation.aggregation(), AggregationMode::Average);
    }

    #[test]
    fn test_units() {
        assert_eq!(Metric::StepCount.unit(), Unit::Count);
        assert_eq!(Metric::Distance.unit().symbol(), "km");
        assert_eq!(Metric::ActiveEnergy.unit().symbol(), "kcal");
        assert_eq!(Metric::ExerciseTime.unit().symbol(), "min");
    }

    #[test]
    fn test_goal_progress() {
        let progress = GoalProgress::new(6000.0, 8000.0);
        assert_eq!(progress.ratio(), 0.75);
        assert_eq!(progress.percent(), 75);
        assert!(!progress.reached());

        assert!(GoalProgress::new(8000.0, 8000.0).reached());
    }

    #[test]
    fn test_goal_progress_without_target() {
        let progress = GoalProgress::new(1234.0, 0.0);
        assert_eq!(progress.ratio(), 0.0);
        assert_eq!(progress.percent(), 0);
        assert!(!progress.reached());
    }
}
