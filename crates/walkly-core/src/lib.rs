//! Platform-independent core library for walkly
//!
//! This crate contains the logic of the walkly step-count statistics app that
//! does not depend on any health platform or UI toolkit: reporting periods and
//! their query windows, bucket labelling, chart series merging, derived
//! totals, the refresh pipeline over an abstract health source, and the
//! settings / last-known value store shared between the app and its widget.
//!
//! It is `#![no_std]` with `extern crate alloc`. Time zones are whatever
//! `chrono::TimeZone` the caller hands in with `now`, so the desktop simulator
//! uses the local zone and tests use fixed offsets.

#![no_std]

extern crate alloc;

pub mod app_state;
pub mod calendar;
pub mod chart;
pub mod config;
pub mod metrics;
pub mod period;
pub mod sample;
pub mod source;
pub mod storage;
pub mod widgets;
