//! The reconciled rendering state of one exploration session.
//!
//! A `ViewState` holds everything needed to redraw the map and charts: the
//! active year range, the selected storm (if any) and the map viewport. It
//! is replaced wholesale by every reducer step, never edited in place.

use htk_track::EntityKey;
use htk_utils::years::{clamp_year, within};
use serde::{Deserialize, Serialize};

/// Default map center latitude, over the tropical Atlantic.
pub const DEFAULT_CENTER_LAT: f64 = 20.0;

/// Default map center longitude.
pub const DEFAULT_CENTER_LON: f64 = -60.0;

/// Default map zoom level.
pub const DEFAULT_ZOOM: f64 = 3.0;

/// Inclusive span of calendar years with `start <= end`.
///
/// Serialized as a two-element array; constructing one from an unordered
/// pair swaps the ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        within(year, self.start, self.end)
    }

    /// Clamp both ends into `bounds`.
    pub fn clamp_to(&self, bounds: YearRange) -> YearRange {
        YearRange::new(
            clamp_year(self.start, bounds.start, bounds.end),
            clamp_year(self.end, bounds.start, bounds.end),
        )
    }

    pub fn is_within(&self, bounds: YearRange) -> bool {
        bounds.start <= self.start && self.end <= bounds.end
    }
}

impl From<(i32, i32)> for YearRange {
    fn from((a, b): (i32, i32)) -> Self {
        YearRange::new(a, b)
    }
}

impl From<YearRange> for (i32, i32) {
    fn from(range: YearRange) -> Self {
        (range.start, range.end)
    }
}

/// Map center and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center_lat: f64, center_lon: f64, zoom: f64) -> Self {
        Self {
            center_lat,
            center_lon,
            zoom,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LON, DEFAULT_ZOOM)
    }
}

/// Filter, selection and viewport of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub date_range: YearRange,
    pub selected_entity: Option<EntityKey>,
    pub viewport: Viewport,
}

impl ViewState {
    /// The starting state: the full range, nothing selected.
    pub fn initial(bounds: YearRange, viewport: Viewport) -> Self {
        Self {
            date_range: bounds,
            selected_entity: None,
            viewport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_orders_its_ends() {
        let range = YearRange::new(2000, 1990);
        assert_eq!(range.start(), 1990);
        assert_eq!(range.end(), 2000);
        assert!(range.contains(1990));
        assert!(range.contains(2000));
        assert!(!range.contains(2001));
    }

    #[test]
    fn year_range_clamps_into_bounds() {
        let bounds = YearRange::new(1950, 2020);
        assert_eq!(YearRange::new(1900, 1980).clamp_to(bounds), YearRange::new(1950, 1980));
        assert_eq!(YearRange::new(2010, 2050).clamp_to(bounds), YearRange::new(2010, 2020));
        assert_eq!(YearRange::new(1800, 1900).clamp_to(bounds), YearRange::new(1950, 1950));
        assert!(YearRange::new(1960, 1970).is_within(bounds));
        assert!(!YearRange::new(1940, 1970).is_within(bounds));
    }

    #[test]
    fn year_range_serializes_as_pair() {
        let json = serde_json::to_string(&YearRange::new(1960, 1970)).unwrap();
        assert_eq!(json, "[1960,1970]");
        let parsed: YearRange = serde_json::from_str("[1970,1960]").unwrap();
        assert_eq!(parsed, YearRange::new(1960, 1970));
    }

    #[test]
    fn initial_state_has_no_selection() {
        let state = ViewState::initial(YearRange::new(1950, 2020), Viewport::default());
        assert_eq!(state.selected_entity, None);
        assert_eq!(state.viewport, Viewport::new(20.0, -60.0, 3.0));
        assert_eq!(state.date_range, YearRange::new(1950, 2020));
    }
}
