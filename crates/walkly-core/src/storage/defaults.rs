//! Typed accessors over the shared key-value store
//!
//! | Key          | Type         | Default              |
//! |--------------|--------------|----------------------|
//! | `settings`   | [`Settings`] | `Settings::default()`|
//! | `last_known` | [`LastKnown`]| all empty            |
//! | `last_error` | `String`     | none                 |
//!
//! Last-known values let the widget show the most recent successful reading
//! when a fetch fails.

use alloc::string::String;

use chrono::{DateTime, TimeZone};
use log::error;
use serde::{Deserialize, Serialize};

use super::{KeyValueStore, StoreError, load, save};
use crate::config::Settings;
use crate::metrics::Metric;
use crate::sample::Statistic;

const KEY_SETTINGS: &str = "settings";
const KEY_LAST_KNOWN: &str = "last_known";
const KEY_LAST_ERROR: &str = "last_error";

/// Most recent successfully fetched values
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct LastKnown {
    pub step_count: f64,
    /// Unix seconds of the step count's measurement end
    pub step_count_at: Option<i64>,
    /// Distance in kilometers
    pub distance: f64,
    /// Unix seconds of the distance's measurement end
    pub distance_at: Option<i64>,
}

impl LastKnown {
    /// Last-known value and timestamp for `metric`, if this store keeps it
    pub fn get(&self, metric: Metric) -> Option<(f64, Option<i64>)> {
        match metric {
            Metric::StepCount => Some((self.step_count, self.step_count_at)),
            Metric::Distance => Some((self.distance, self.distance_at)),
            _ => None,
        }
    }
}

/// Typed view over a [`KeyValueStore`]
pub struct AppDefaults<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> AppDefaults<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Stored settings, or defaults when none were saved
    pub fn settings(&self) -> Result<Settings, StoreError> {
        Ok(load::<_, Settings>(&self.store, KEY_SETTINGS)?
            .unwrap_or_default()
            .normalized())
    }

    pub fn set_settings(&mut self, settings: Settings) -> Result<(), StoreError> {
        save(&mut self.store, KEY_SETTINGS, &settings.normalized())
    }

    /// Daily step goal, falling back to the default on read errors
    pub fn target_steps(&self) -> f64 {
        match self.settings() {
            Ok(settings) => settings.target_steps,
            Err(e) => {
                error!("Failed to read settings: {}", e);
                Settings::default().target_steps
            }
        }
    }

    pub fn last_known(&self) -> Result<LastKnown, StoreError> {
        Ok(load(&self.store, KEY_LAST_KNOWN)?.unwrap_or_default())
    }

    /// Remember `stat` if it is one of the metrics the widget falls back to.
    ///
    /// Returns whether anything was written.
    pub fn record_statistic<Tz: TimeZone>(&mut self, stat: &Statistic<Tz>) -> Result<bool, StoreError> {
        let mut last = self.last_known()?;
        let at = Some(stat.end.timestamp());
        match stat.metric {
            Metric::StepCount => {
                last.step_count = stat.value;
                last.step_count_at = at;
            }
            Metric::Distance => {
                last.distance = stat.value;
                last.distance_at = at;
            }
            _ => return Ok(false),
        }
        save(&mut self.store, KEY_LAST_KNOWN, &last)?;
        Ok(true)
    }

    /// Last-known `metric` as a statistic in `tz`, if one was recorded
    pub fn last_statistic<Tz: TimeZone>(
        &self,
        metric: Metric,
        tz: &Tz,
    ) -> Result<Option<Statistic<Tz>>, StoreError> {
        let last = self.last_known()?;
        let stat = last.get(metric).and_then(|(value, at)| {
            let at = at.and_then(|secs| DateTime::from_timestamp(secs, 0))?;
            let at = at.with_timezone(tz);
            Some(Statistic::new(metric, at.clone(), at, value))
        });
        Ok(stat)
    }

    pub fn last_error(&self) -> Result<Option<String>, StoreError> {
        load(&self.store, KEY_LAST_ERROR)
    }

    pub fn set_last_error(&mut self, message: &str) -> Result<(), StoreError> {
        save(&mut self.store, KEY_LAST_ERROR, message)
    }

    pub fn clear_last_error(&mut self) -> Result<(), StoreError> {
        self.store.remove(KEY_LAST_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::FixedOffset;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn test_missing_keys_yield_defaults() {
        let defaults = AppDefaults::new(MemoryStore::new());

        assert_eq!(defaults.settings().unwrap(), Settings::default());
        assert_eq!(defaults.last_known().unwrap(), LastKnown::default());
        assert_eq!(defaults.last_error().unwrap(), None);
        assert_eq!(defaults.target_steps(), 8000.0);
    }

    #[test]
    fn test_settings_are_normalized_on_write() {
        let mut defaults = AppDefaults::new(MemoryStore::new());
        defaults
            .set_settings(Settings {
                target_steps: 75_000.0,
                show_offset_time: true,
                refresh_interval_mins: 30,
            })
            .unwrap();

        let settings = defaults.settings().unwrap();
        assert_eq!(settings.target_steps, 60_000.0);
        assert!(settings.show_offset_time);
        assert_eq!(settings.refresh_interval_mins, 30);
    }

    #[test]
    fn test_record_statistic_keeps_steps_and_distance() {
        let mut defaults = AppDefaults::new(MemoryStore::new());
        let start = jst().with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
        let end = jst().with_ymd_and_hms(2026, 10, 16, 18, 51, 0).unwrap();

        assert!(defaults.record_statistic(&Statistic::new(Metric::StepCount, start, end, 5000.0)).unwrap());
        assert!(defaults.record_statistic(&Statistic::new(Metric::Distance, start, end, 3.1)).unwrap());
        assert!(!defaults.record_statistic(&Statistic::new(Metric::ActiveEnergy, start, end, 321.9)).unwrap());

        let last = defaults.last_known().unwrap();
        assert_eq!(last.step_count, 5000.0);
        assert_eq!(last.step_count_at, Some(end.timestamp()));
        assert_eq!(last.distance, 3.1);

        let steps = defaults.last_statistic(Metric::StepCount, &jst()).unwrap().unwrap();
        assert_eq!(steps.value, 5000.0);
        assert_eq!(steps.end, end);
        assert!(defaults.last_statistic(Metric::ActiveEnergy, &jst()).unwrap().is_none());
    }

    #[test]
    fn test_last_error_set_and_clear() {
        let mut defaults = AppDefaults::new(MemoryStore::new());

        defaults.set_last_error("Health data unavailable").unwrap();
        assert_eq!(
            defaults.last_error().unwrap().as_deref(),
            Some("Health data unavailable")
        );

        defaults.clear_last_error().unwrap();
        assert_eq!(defaults.last_error().unwrap(), None);
    }

    #[test]
    fn test_corrupt_settings_fall_back_for_target() {
        let mut store = MemoryStore::new();
        store.set(KEY_SETTINGS, &[0xff]).unwrap();
        let defaults = AppDefaults::new(store);

        assert_eq!(
            defaults.settings(),
            Err(StoreError::Decode { key: KEY_SETTINGS })
        );
        assert_eq!(defaults.target_steps(), 8000.0);
    }

    #[test]
    fn test_shared_store_between_consumers() {
        let mut store = MemoryStore::new();
        {
            let mut app = AppDefaults::new(&mut store);
            app.set_last_error("boom").unwrap();
        }
        let widget = AppDefaults::new(&mut store);
        assert_eq!(widget.last_error().unwrap().as_deref(), Some("boom"));
    }
}
