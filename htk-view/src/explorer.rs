//! The query surface the rendering layer talks to.
//!
//! An [`Explorer`] is built once per dataset and is immutable afterwards.
//! Aggregates are computed over the whole dataset at construction and clipped
//! to the requested range on every query, so rolling means near the start of
//! a range still see the years before it.

use crate::models::{Charts, CorrelationRow, Frame, Marker, TrackOverlay, TrackPoint};
use crate::reducer::{Action, InteractionReducer, Recompute, Transition};
use crate::selection::{track_progress, SelectionIndex};
use crate::state::{ViewState, Viewport, YearRange};
use chrono::Datelike;
use htk_data::correlation::{correlate, count_trend, pearson, temperature_trend, JoinedPoint};
use htk_data::temperature::yearly_temperature;
use htk_data::yearly::{
    within_years, yearly_counts, yearly_counts_by_basin, yearly_extrema, AggregationConfig,
    BasinSeries, YearlyAggregate, YearlyExtrema,
};
use htk_track::temperature::{load_temperature, TemperatureColumns, TemperatureReading};
use htk_track::{Dataset, DatasetStore, EventSource, LoadConfig, NumericField};
use std::sync::Arc;

/// Which observation of a storm counts as its start marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FirstEventPolicy {
    /// First row in load order
    LoadOrder,
    /// Earliest timestamp; ties keep load order
    #[default]
    Chronological,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplorerConfig {
    pub load: LoadConfig,
    pub aggregation: AggregationConfig,
    pub default_viewport: Viewport,
    pub first_event_policy: FirstEventPolicy,
    /// Header names tried when reading the temperature CSV
    pub temperature_columns: TemperatureColumns,
}

#[derive(Debug, Clone)]
pub struct Explorer {
    config: ExplorerConfig,
    index: SelectionIndex,
    bounds: YearRange,
    yearly: Vec<YearlyAggregate>,
    wind: Vec<YearlyExtrema>,
    basins: Vec<BasinSeries>,
    correlation: Vec<JoinedPoint>,
}

impl Explorer {
    /// Load every source and the optional temperature CSV, then build.
    pub fn from_sources(
        sources: &[EventSource],
        temperature_csv: Option<&str>,
        config: ExplorerConfig,
    ) -> htk_track::Result<Self> {
        let dataset = DatasetStore::new(config.load.clone()).load(sources)?;
        let readings = match temperature_csv {
            Some(csv) => load_temperature(csv, &config.temperature_columns)?,
            None => Vec::new(),
        };
        Ok(Self::new(dataset, &readings, config))
    }

    pub fn new(dataset: Dataset, temperature: &[TemperatureReading], config: ExplorerConfig) -> Self {
        let agg = config.aggregation;
        let yearly = yearly_counts(&dataset, None, &agg);
        let wind = yearly_extrema(&dataset, NumericField::Wind, None, agg.window);
        let basins = yearly_counts_by_basin(&dataset, &agg);
        let temperature = yearly_temperature(temperature, agg.window);
        let correlation = correlate(&temperature_trend(&temperature), &count_trend(&yearly));

        let bounds = match dataset.year_bounds() {
            Some((min, max)) => YearRange::new(min, max),
            None => {
                let year = config.load.cutoff.year();
                YearRange::new(year, year)
            }
        };
        let dataset = match config.first_event_policy {
            FirstEventPolicy::Chronological => dataset.sorted_chronologically(),
            FirstEventPolicy::LoadOrder => dataset,
        };
        log::info!(
            "[HTK Debug] explorer: Ready with {} events over {}-{}, {} yearly rows, {} correlation rows",
            dataset.len(),
            bounds.start(),
            bounds.end(),
            yearly.len(),
            correlation.len()
        );

        Self {
            config,
            index: SelectionIndex::new(Arc::new(dataset)),
            bounds,
            yearly,
            wind,
            basins,
            correlation,
        }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn index(&self) -> &SelectionIndex {
        &self.index
    }

    pub fn dataset(&self) -> &Dataset {
        self.index.dataset()
    }

    /// Observed year span of the dataset; the cutoff year when it is empty.
    pub fn bounds(&self) -> YearRange {
        self.bounds
    }

    pub fn initial_state(&self) -> ViewState {
        ViewState::initial(self.bounds, self.config.default_viewport)
    }

    pub fn reducer(&self) -> InteractionReducer<'_> {
        InteractionReducer::new(&self.index, self.bounds)
    }

    pub fn reduce(&self, state: &ViewState, action: Action) -> Transition {
        self.reducer().reduce(state, action)
    }

    /// Start markers of storms whose first event falls in the state's range.
    pub fn get_markers(&self, state: &ViewState) -> Vec<Marker> {
        self.index
            .first_events()
            .filter(|e| state.date_range.contains(e.year))
            .map(Marker::from)
            .collect()
    }

    /// Full track of the selected storm, or `None` without a resolvable
    /// selection.
    pub fn get_track(&self, state: &ViewState) -> Option<TrackOverlay> {
        let key = state.selected_entity.as_deref()?;
        let track = self.index.track(key);
        let head = track.first()?;
        let points = track
            .iter()
            .zip(track_progress(&track))
            .map(|(e, progress)| TrackPoint {
                lat: e.lat,
                lon: e.lon,
                status: e.status.clone(),
                is_hurricane: e.is_hurricane(),
                progress,
                timestamp: e.timestamp,
            })
            .collect();
        Some(TrackOverlay {
            key: head.entity_key.clone(),
            name: head.name.clone(),
            points,
        })
    }

    pub fn get_yearly_chart(&self, range: YearRange) -> Vec<YearlyAggregate> {
        within_years(self.yearly.clone(), range.start(), range.end())
    }

    pub fn get_wind_chart(&self, range: YearRange) -> Vec<YearlyExtrema> {
        within_years(self.wind.clone(), range.start(), range.end())
    }

    pub fn get_basin_charts(&self, range: YearRange) -> Vec<BasinSeries> {
        self.basins
            .iter()
            .map(|series| BasinSeries {
                basin: series.basin.clone(),
                rows: within_years(series.rows.clone(), range.start(), range.end()),
            })
            .collect()
    }

    /// Temperature trend joined with the count trend on year.
    pub fn get_correlation_chart(&self, range: YearRange) -> Vec<CorrelationRow> {
        self.correlation_points(range)
            .into_iter()
            .map(|p| CorrelationRow {
                year: p.year,
                temp_rolling_mean: p.a,
                count_rolling_mean: p.b,
            })
            .collect()
    }

    pub fn correlation_coefficient(&self, range: YearRange) -> Option<f64> {
        pearson(&self.correlation_points(range))
    }

    fn correlation_points(&self, range: YearRange) -> Vec<JoinedPoint> {
        within_years(self.correlation.clone(), range.start(), range.end())
    }

    pub fn get_charts(&self, range: YearRange) -> Charts {
        Charts {
            yearly: self.get_yearly_chart(range),
            wind: self.get_wind_chart(range),
            basins: self.get_basin_charts(range),
            correlation: self.get_correlation_chart(range),
            correlation_coefficient: self.correlation_coefficient(range),
        }
    }

    /// Build the views flagged by `transition.recompute`.
    pub fn render(&self, transition: Transition) -> Frame {
        let Transition {
            state,
            recompute,
            notices,
        } = transition;
        let markers = self.get_markers(&state);
        let track = if recompute.track {
            self.get_track(&state)
        } else {
            None
        };
        let charts = recompute.charts.then(|| self.get_charts(state.date_range));
        Frame {
            state,
            recompute,
            notices,
            markers,
            track,
            charts,
        }
    }

    /// Every view of `state`, charts included.
    pub fn full_frame(&self, state: ViewState) -> Frame {
        let recompute = Recompute {
            markers: true,
            track: state.selected_entity.is_some(),
            viewport: true,
            charts: true,
        };
        self.render(Transition {
            state,
            recompute,
            notices: Vec::new(),
        })
    }

    pub fn initial_frame(&self) -> Frame {
        self.full_frame(self.initial_state())
    }
}
