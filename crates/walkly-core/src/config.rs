use serde::{Deserialize, Serialize};

/// Lowest daily step goal the settings accept
pub const MIN_TARGET_STEPS: f64 = 100.0;
/// Highest daily step goal the settings accept
pub const MAX_TARGET_STEPS: f64 = 60_000.0;
/// Granularity of the daily step goal
pub const TARGET_STEPS_INCREMENT: f64 = 100.0;

/// User settings shared by the app and its widget
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Daily step goal
    pub target_steps: f64,
    /// Show the time elapsed since the last refresh on the circular widget
    pub show_offset_time: bool,
    /// Background refresh interval in minutes
    pub refresh_interval_mins: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_steps: 8000.0,
            show_offset_time: false,
            refresh_interval_mins: 15,
        }
    }
}

impl Settings {
    /// Settings with `target_steps` moved onto the accepted grid.
    pub fn normalized(self) -> Self {
        Self {
            target_steps: clamp_target_steps(self.target_steps),
            refresh_interval_mins: self.refresh_interval_mins.max(1),
            ..self
        }
    }
}

/// Clamp a step goal to `MIN_TARGET_STEPS..=MAX_TARGET_STEPS`, rounded to the
/// nearest `TARGET_STEPS_INCREMENT`.
pub fn clamp_target_steps(value: f64) -> f64 {
    if !value.is_finite() {
        return Settings::default().target_steps;
    }
    let clamped = value.clamp(MIN_TARGET_STEPS, MAX_TARGET_STEPS);
    // Round half up without std's f64::round
    let steps = (clamped / TARGET_STEPS_INCREMENT + 0.5) as u32;
    f64::from(steps) * TARGET_STEPS_INCREMENT
}
