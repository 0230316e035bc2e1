//! Rendering payloads handed to the map and chart layer.

use crate::reducer::{Notice, Recompute};
use crate::state::ViewState;
use chrono::NaiveDateTime;
use htk_data::yearly::{BasinSeries, YearlyAggregate, YearlyExtrema};
use htk_track::{EntityKey, Event, StormStatus};
use serde::Serialize;

/// Start marker of one storm, with its hover label fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub key: EntityKey,
    pub name: String,
    pub basin: String,
    pub lat: f64,
    pub lon: f64,
    pub timestamp: NaiveDateTime,
    pub wind: f64,
    pub pressure: Option<f64>,
    pub status: StormStatus,
    pub is_hurricane: bool,
}

impl From<&Event> for Marker {
    fn from(e: &Event) -> Self {
        Self {
            key: e.entity_key.clone(),
            name: e.name.clone(),
            basin: e.basin.clone(),
            lat: e.lat,
            lon: e.lon,
            timestamp: e.timestamp,
            wind: e.wind,
            pressure: e.pressure,
            status: e.status.clone(),
            is_hurricane: e.is_hurricane(),
        }
    }
}

/// One point of a drawn track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub status: StormStatus,
    /// Segment colouring: hurricane intensity or not
    pub is_hurricane: bool,
    /// 0.0 at the first observation, 1.0 at the last
    pub progress: f64,
    pub timestamp: NaiveDateTime,
}

/// The full track of the selected storm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackOverlay {
    pub key: EntityKey,
    pub name: String,
    pub points: Vec<TrackPoint>,
}

impl TrackOverlay {
    pub fn start(&self) -> Option<&TrackPoint> {
        self.points.first()
    }

    pub fn end(&self) -> Option<&TrackPoint> {
        self.points.last()
    }
}

/// Temperature trend against storm-count trend for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationRow {
    pub year: i32,
    pub temp_rolling_mean: Option<f64>,
    pub count_rolling_mean: Option<f64>,
}

/// Every range-keyed chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub yearly: Vec<YearlyAggregate>,
    pub wind: Vec<YearlyExtrema>,
    pub basins: Vec<BasinSeries>,
    pub correlation: Vec<CorrelationRow>,
    pub correlation_coefficient: Option<f64>,
}

/// What to draw after one transition. `track` is `None` without a
/// selection, and `charts` is `None` when the charts are unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub state: ViewState,
    pub recompute: Recompute,
    pub notices: Vec<Notice>,
    pub markers: Vec<Marker>,
    pub track: Option<TrackOverlay>,
    pub charts: Option<Charts>,
}
