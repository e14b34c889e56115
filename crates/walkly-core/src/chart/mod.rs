//! Chart-ready series for the selected reporting period
//!
//! A [`ChartSeries`] is an ordered list of labelled values, one per bucket.
//! It is owned by whoever displays the active period and is updated in place
//! as fresh samples arrive:
//!
//! - an incoming batch whose length differs from the held series means the
//!   window shifted (for example at midnight), so the series is cleared and
//!   rebuilt from that batch;
//! - otherwise each sample overwrites the value of the item with the same
//!   label, keeping its position, and unknown labels are appended.
//!
//! Items stay in first-seen order. The health source reports buckets in
//! chronological order, so after a resync the order is chronological too.

pub mod label;
pub mod totals;

use alloc::vec::Vec;

use chrono::TimeZone;
use log::debug;

use crate::period::WindowSpec;
use crate::sample::Sample;

pub use label::{Label, bucket_label, display_text};
pub use totals::{DEFAULT_AXIS_HEADROOM, SeriesTotals, derive_totals};

/// One point of a chart series
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeriesItem {
    /// Bucket label (may carry a leading space, see [`label`])
    pub label: Label,
    /// Bucket value in the metric's display unit
    pub value: f64,
}

impl ChartSeriesItem {
    pub fn new(label: Label, value: f64) -> Self {
        Self { label, value }
    }
}

/// What a call to [`ChartSeries::merge`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The series was cleared before merging
    pub resynced: bool,
    /// Items whose value was overwritten in place
    pub updated: usize,
    /// Items appended at the end
    pub appended: usize,
}

/// Ordered, label-keyed series of bucket values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    items: Vec<ChartSeriesItem>,
}

impl ChartSeries {
    /// Create an empty series
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a series from items already in display order
    pub fn from_items(items: Vec<ChartSeriesItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ChartSeriesItem] {
        &self.items
    }

    pub fn iter(&self) -> core::slice::Iter<'_, ChartSeriesItem> {
        self.items.iter()
    }

    /// Value of the item with exactly this label
    pub fn value_of(&self, label: &str) -> Option<f64> {
        self.position_of(label).map(|i| self.items[i].value)
    }

    /// Values in display order
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.items.iter().map(|item| item.value)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn position_of(&self, label: &str) -> Option<usize> {
        self.items.iter().position(|item| item.label.as_str() == label)
    }

    /// Merge a freshly fetched batch of samples for `window` into the series.
    pub fn merge<Tz: TimeZone>(
        &mut self,
        samples: &[Sample<Tz>],
        window: &WindowSpec<Tz>,
    ) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        if samples.len() != self.items.len() {
            if !self.items.is_empty() {
                debug!(
                    "Bucket count changed ({} -> {}), rebuilding {:?} series",
                    self.items.len(),
                    samples.len(),
                    window.period
                );
            }
            self.items.clear();
            outcome.resynced = true;
        }

        for sample in samples {
            let label = window.label_for(sample);
            match self.position_of(label.as_str()) {
                Some(index) => {
                    self.items[index].value = sample.value();
                    outcome.updated += 1;
                }
                None => {
                    self.items.push(ChartSeriesItem::new(label, sample.value()));
                    outcome.appended += 1;
                }
            }
        }

        outcome
    }
}

impl<'a> IntoIterator for &'a ChartSeries {
    type Item = &'a ChartSeriesItem;
    type IntoIter = core::slice::Iter<'a, ChartSeriesItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
