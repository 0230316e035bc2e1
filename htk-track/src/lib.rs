//! Core types and loaders for hurricane track data.
//!
//! - [`event`]: the canonical [`Event`](event::Event) and storm status codes
//! - [`dataset`]: [`DatasetStore`](dataset::DatasetStore), which merges raw CSV
//!   sources into one immutable [`Dataset`](dataset::Dataset)
//! - [`temperature`]: the auxiliary global temperature series
//! - [`units`]: wind unit conversion and coordinate parsing

pub mod dataset;
pub mod error;
pub mod event;
pub mod temperature;
pub mod units;

pub use dataset::{Dataset, DatasetStore, EventSource, LoadConfig, LoadReport};
pub use error::{Result, TrackError};
pub use event::{EntityKey, Event, NumericField, StormStatus};

/// Embedded sample of Atlantic best-track observations.
pub static AL_FIXTURE: &str = include_str!("../../fixtures/AL.csv");

/// Embedded sample of Eastern Pacific best-track observations.
pub static EP_FIXTURE: &str = include_str!("../../fixtures/EP.csv");

/// Embedded sample of the global land temperature series.
pub static TEMPERATURE_FIXTURE: &str = include_str!("../../fixtures/GlobalTemperatures.csv");
