//! Loading raw event sources into one normalized, immutable [`Dataset`].
//!
//! Each source is a CSV string with a header row. Column names differ between
//! sources, so every canonical field is resolved through a list of accepted
//! header names (case-insensitive). Rows are never fatal: a row whose
//! timestamp cannot be parsed, that falls before the cutoff, or that lacks a
//! required field is dropped and counted in the [`LoadReport`].
//!
//! # Example CSV
//! ```text
//! Key,Name,DateTime,Status,Lat,Lon,Wind,Pressure
//! AL011950,ABLE,1950-08-12 00:00:00+00:00,TS,17.1N,55.5W,35,-999
//! ```

use crate::error::{Result, TrackError};
use crate::event::{Event, StormStatus};
use crate::units::{convert_wind, parse_coordinate, WindUnit};
use chrono::{Datelike, NaiveDate, NaiveTime};
use csv::StringRecord;
use htk_utils::dates::parse_timestamp;
use htk_utils::years::within;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::ops::AddAssign;

/// Year of the default cutoff date; earlier observations are not admitted.
pub const DEFAULT_CUTOFF_YEAR: i32 = 1950;

/// The default cutoff date, January 1st of [`DEFAULT_CUTOFF_YEAR`].
pub fn default_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(DEFAULT_CUTOFF_YEAR, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Accepted header names for each canonical event field.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    pub key: Vec<String>,
    pub name: Vec<String>,
    pub timestamp: Vec<String>,
    pub lat: Vec<String>,
    pub lon: Vec<String>,
    pub wind: Vec<String>,
    pub pressure: Vec<String>,
    pub status: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            key: names(&["Key", "ID", "StormID", "storm_id", "entity_key"]),
            name: names(&["Name", "StormName", "storm_name"]),
            timestamp: names(&["DateTime", "Date Time", "ISO_TIME", "timestamp", "Date"]),
            lat: names(&["Lat", "Latitude"]),
            lon: names(&["Lon", "Long", "Longitude"]),
            wind: names(&["Wind", "MaxWind", "Max Wind", "wind_kt", "USA_WIND"]),
            pressure: names(&["Pressure", "MinPressure", "Min Pressure", "USA_PRES"]),
            status: names(&["Status", "status_code", "USA_STATUS"]),
        }
    }
}

/// Column indexes of one source, resolved from its header row.
#[derive(Debug, Clone, Copy)]
struct ResolvedColumns {
    key: usize,
    name: Option<usize>,
    timestamp: usize,
    lat: usize,
    lon: usize,
    wind: usize,
    pressure: Option<usize>,
    status: Option<usize>,
}

fn find_column(headers: &StringRecord, candidates: &[String]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(candidate.trim()))
    })
}

impl ColumnMapping {
    fn resolve(&self, label: &str, headers: &StringRecord) -> Result<ResolvedColumns> {
        let required = |field: &'static str, candidates: &[String]| {
            find_column(headers, candidates).ok_or_else(|| TrackError::MissingColumn {
                source_label: label.to_string(),
                field,
            })
        };
        Ok(ResolvedColumns {
            key: required("key", &self.key)?,
            name: find_column(headers, &self.name),
            timestamp: required("timestamp", &self.timestamp)?,
            lat: required("lat", &self.lat)?,
            lon: required("lon", &self.lon)?,
            wind: required("wind", &self.wind)?,
            pressure: find_column(headers, &self.pressure),
            status: find_column(headers, &self.status),
        })
    }
}

/// Loader configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadConfig {
    /// Earliest admitted timestamp (inclusive, at midnight).
    pub cutoff: NaiveDate,
    /// Wind unit of sources that do not declare their own.
    pub wind_unit: WindUnit,
    pub columns: ColumnMapping,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
            wind_unit: WindUnit::Knots,
            columns: ColumnMapping::default(),
        }
    }
}

/// One raw tabular source of events.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSource {
    /// Basin label stamped on every event from this source.
    pub label: String,
    /// Raw CSV bytes, header row first. Rows that are not valid UTF-8 are
    /// skipped at load time.
    pub data: Vec<u8>,
    /// Overrides [`LoadConfig::wind_unit`] for this source.
    pub wind_unit: Option<WindUnit>,
}

impl EventSource {
    pub fn new(label: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
            wind_unit: None,
        }
    }

    /// Read the whole source from `reader`. Encoding is not checked here.
    pub fn from_reader<R: Read>(label: impl Into<String>, mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::new(label, data))
    }

    pub fn with_wind_unit(mut self, unit: WindUnit) -> Self {
        self.wind_unit = Some(unit);
        self
    }
}

/// Row counts from a load, per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub sources: usize,
    pub rows_read: usize,
    pub loaded: usize,
    pub skipped_invalid_timestamp: usize,
    pub skipped_before_cutoff: usize,
    pub skipped_missing_field: usize,
    /// Records the CSV reader could not decode, e.g. invalid UTF-8
    pub skipped_unreadable: usize,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.skipped_invalid_timestamp
            + self.skipped_before_cutoff
            + self.skipped_missing_field
            + self.skipped_unreadable
    }
}

impl AddAssign for LoadReport {
    fn add_assign(&mut self, rhs: Self) {
        self.sources += rhs.sources;
        self.rows_read += rhs.rows_read;
        self.loaded += rhs.loaded;
        self.skipped_invalid_timestamp += rhs.skipped_invalid_timestamp;
        self.skipped_before_cutoff += rhs.skipped_before_cutoff;
        self.skipped_missing_field += rhs.skipped_missing_field;
        self.skipped_unreadable += rhs.skipped_unreadable;
    }
}

/// Why a row was dropped.
enum RowRejection {
    InvalidTimestamp,
    BeforeCutoff,
    MissingField(&'static str),
}

/// The normalized working set of events, in load order.
///
/// Built once and never mutated; share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    events: Vec<Event>,
    report: LoadReport,
}

impl Dataset {
    /// Wrap already-normalized events, keeping their order.
    pub fn from_events(events: Vec<Event>) -> Self {
        let report = LoadReport {
            loaded: events.len(),
            rows_read: events.len(),
            ..LoadReport::default()
        };
        Self { events, report }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Smallest and largest event year, or `None` for an empty dataset.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.events.iter().map(|e| e.year).min()?;
        let max = self.events.iter().map(|e| e.year).max()?;
        Some((min, max))
    }

    /// Distinct basin labels in order of first appearance.
    pub fn basins(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.events
            .iter()
            .map(|e| e.basin.as_str())
            .filter(|b| seen.insert(*b))
            .collect()
    }

    /// Events whose year lies in `[start, end]`, in dataset order.
    pub fn in_years(&self, start: i32, end: i32) -> impl Iterator<Item = &Event> + '_ {
        self.events
            .iter()
            .filter(move |e| within(e.year, start, end))
    }

    /// A copy ordered by timestamp. The sort is stable, so events with equal
    /// timestamps keep their load order.
    pub fn sorted_chronologically(&self) -> Dataset {
        let mut events = self.events.clone();
        events.sort_by_key(|e| e.timestamp);
        Dataset {
            events,
            report: self.report,
        }
    }
}

/// Loads event sources into a [`Dataset`] under one [`LoadConfig`].
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    config: LoadConfig,
}

impl DatasetStore {
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Load and concatenate all sources in the given order.
    ///
    /// Sources without any usable row contribute nothing; the result may be
    /// empty. A source whose header lacks a required column is an error.
    pub fn load(&self, sources: &[EventSource]) -> Result<Dataset> {
        if let Some(i) = sources.iter().position(|s| s.label.trim().is_empty()) {
            return Err(TrackError::InvalidConfig(format!("source #{} has an empty label", i + 1)));
        }
        let mut events = Vec::new();
        let mut report = LoadReport::default();
        for source in sources {
            report += self.load_source(source, &mut events)?;
        }
        log::info!(
            "[HTK Debug] loader: Dataset ready with {} events from {} sources ({} rows skipped)",
            events.len(),
            report.sources,
            report.skipped()
        );
        Ok(Dataset { events, report })
    }

    fn load_source(&self, source: &EventSource, events: &mut Vec<Event>) -> Result<LoadReport> {
        let mut report = LoadReport {
            sources: 1,
            ..LoadReport::default()
        };
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(&source.data[..]);

        let headers = rdr.headers()?.clone();
        if headers.iter().all(|h| h.is_empty()) {
            log::warn!("[HTK Debug] loader: Source {} is empty", source.label);
            return Ok(report);
        }
        let columns = self.config.columns.resolve(&source.label, &headers)?;
        let wind_unit = source.wind_unit.unwrap_or(self.config.wind_unit);

        for result in rdr.records() {
            report.rows_read += 1;
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    log::debug!(
                        "[HTK Debug] loader: {} row {} unreadable: {}",
                        source.label,
                        report.rows_read,
                        e
                    );
                    report.skipped_unreadable += 1;
                    continue;
                }
            };
            match self.parse_row(&record, &columns, &source.label, wind_unit) {
                Ok(event) => {
                    events.push(event);
                    report.loaded += 1;
                }
                Err(RowRejection::InvalidTimestamp) => {
                    log::debug!(
                        "[HTK Debug] loader: {} row {} has an invalid timestamp",
                        source.label,
                        report.rows_read
                    );
                    report.skipped_invalid_timestamp += 1;
                }
                Err(RowRejection::BeforeCutoff) => {
                    log::debug!(
                        "[HTK Debug] loader: {} row {} is before the cutoff",
                        source.label,
                        report.rows_read
                    );
                    report.skipped_before_cutoff += 1;
                }
                Err(RowRejection::MissingField(field)) => {
                    log::debug!(
                        "[HTK Debug] loader: {} row {} missing {}",
                        source.label,
                        report.rows_read,
                        field
                    );
                    report.skipped_missing_field += 1;
                }
            }
        }
        log::info!(
            "[HTK Debug] loader: Loaded {} events from {}, skipped {} invalid timestamps, {} before cutoff, {} missing fields, {} unreadable",
            report.loaded,
            source.label,
            report.skipped_invalid_timestamp,
            report.skipped_before_cutoff,
            report.skipped_missing_field,
            report.skipped_unreadable
        );
        Ok(report)
    }

    fn parse_row(
        &self,
        r: &StringRecord,
        columns: &ResolvedColumns,
        label: &str,
        wind_unit: WindUnit,
    ) -> std::result::Result<Event, RowRejection> {
        let timestamp = r
            .get(columns.timestamp)
            .and_then(parse_timestamp)
            .ok_or(RowRejection::InvalidTimestamp)?;
        if timestamp < self.config.cutoff.and_time(NaiveTime::MIN) {
            return Err(RowRejection::BeforeCutoff);
        }

        let entity_key = r.get(columns.key).unwrap_or("").trim();
        if entity_key.is_empty() {
            return Err(RowRejection::MissingField("key"));
        }
        let lat = r
            .get(columns.lat)
            .and_then(parse_coordinate)
            .ok_or(RowRejection::MissingField("lat"))?;
        let lon = r
            .get(columns.lon)
            .and_then(parse_coordinate)
            .ok_or(RowRejection::MissingField("lon"))?;
        // Negative wind values are the "missing" sentinel in best-track data
        let wind = r
            .get(columns.wind)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|w| w.is_finite() && *w >= 0.0)
            .ok_or(RowRejection::MissingField("wind"))?;
        let pressure = columns
            .pressure
            .and_then(|i| r.get(i))
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite() && *p > 0.0);
        let name = columns
            .name
            .and_then(|i| r.get(i))
            .unwrap_or("")
            .trim()
            .to_string();
        let status = StormStatus::from_code(columns.status.and_then(|i| r.get(i)).unwrap_or(""));

        Ok(Event {
            entity_key: entity_key.to_string(),
            name,
            basin: label.to_string(),
            timestamp,
            year: timestamp.year(),
            lat,
            lon,
            wind: convert_wind(wind, wind_unit, WindUnit::Knots),
            pressure,
            status,
        })
    }
}
