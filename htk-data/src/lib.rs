//! Aggregation over storm observations for charting and analysis.
//!
//! Every chart in the explorer is a thin projection over the functions in
//! this crate. All results are ordered ascending by year, and a year with no
//! input never produces a row: there is no zero-filling anywhere.

/// Trailing rolling means over the year axis.
pub mod rolling {
    /// Default trailing window, in years.
    pub const DEFAULT_WINDOW: usize = 10;

    /// Trailing mean of `(year, value)` points over a window of `window` years.
    ///
    /// `points` must be sorted ascending by year with no repeated year. The
    /// window at year `Y` spans the calendar years `Y - window + 1 ..= Y` and
    /// averages only the years present in that span, so gap years shrink the
    /// denominator instead of counting as zero.
    ///
    /// The mean at a point is `None` until at least `window` points (the
    /// point itself included) have been seen. A zero window yields all `None`.
    pub fn trailing_mean(points: &[(i32, f64)], window: usize) -> Vec<Option<f64>> {
        let mut out = Vec::with_capacity(points.len());
        let span = i64::try_from(window).unwrap_or(i64::MAX);
        let mut lo = 0usize;
        for (i, &(year, _)) in points.iter().enumerate() {
            let first_year = i64::from(year) - span + 1;
            while lo < i && i64::from(points[lo].0) < first_year {
                lo += 1;
            }
            if window == 0 || i + 1 < window {
                out.push(None);
            } else {
                let span_points = &points[lo..=i];
                let sum: f64 = span_points.iter().map(|(_, v)| v).sum();
                out.push(Some(sum / span_points.len() as f64));
            }
        }
        out
    }

}

/// Per-year counts and extrema over a dataset.
pub mod yearly {
    use crate::rolling::{trailing_mean, DEFAULT_WINDOW};
    use htk_track::{Dataset, Event, NumericField};
    use htk_utils::years::within;
    use serde::{Deserialize, Serialize};
    use std::collections::{BTreeMap, BTreeSet};

    /// Rows that belong to a calendar year.
    pub trait Yearly {
        fn year(&self) -> i32;
    }

    /// Keep only rows whose year lies in `[start, end]`.
    pub fn within_years<T: Yearly>(rows: Vec<T>, start: i32, end: i32) -> Vec<T> {
        rows.into_iter()
            .filter(|r| within(r.year(), start, end))
            .collect()
    }

    /// Restricts which events take part in an aggregation.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct EventFilter {
        pub basin: Option<String>,
        pub entity_key: Option<String>,
        pub hurricanes_only: bool,
    }

    impl EventFilter {
        pub fn basin(basin: impl Into<String>) -> Self {
            Self {
                basin: Some(basin.into()),
                ..Self::default()
            }
        }

        pub fn entity(key: impl Into<String>) -> Self {
            Self {
                entity_key: Some(key.into()),
                ..Self::default()
            }
        }

        pub fn hurricanes() -> Self {
            Self {
                hurricanes_only: true,
                ..Self::default()
            }
        }

        pub fn matches(&self, event: &Event) -> bool {
            self.basin.as_deref().map_or(true, |b| event.basin == b)
                && self
                    .entity_key
                    .as_deref()
                    .map_or(true, |k| event.entity_key == k)
                && (!self.hurricanes_only || event.is_hurricane())
        }
    }

    fn filtered<'a>(
        dataset: &'a Dataset,
        filter: Option<&'a EventFilter>,
    ) -> impl Iterator<Item = &'a Event> + 'a {
        dataset
            .events()
            .iter()
            .filter(move |e| filter.map_or(true, |f| f.matches(e)))
    }

    /// What a yearly count counts.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub enum CountMode {
        /// Every observation row
        #[default]
        Observations,
        /// Distinct storms observed during the year
        Storms,
    }

    /// Aggregation settings shared by every chart.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AggregationConfig {
        pub window: usize,
        pub count_mode: CountMode,
    }

    impl Default for AggregationConfig {
        fn default() -> Self {
            Self {
                window: DEFAULT_WINDOW,
                count_mode: CountMode::Observations,
            }
        }
    }

    /// Count for one year, with its trailing mean.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct YearlyAggregate {
        pub year: i32,
        pub count: usize,
        pub rolling_mean: Option<f64>,
    }

    impl Yearly for YearlyAggregate {
        fn year(&self) -> i32 {
            self.year
        }
    }

    /// Highest and lowest value of a field for one year, with trailing means
    /// of each.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct YearlyExtrema {
        pub year: i32,
        pub max: f64,
        pub min: f64,
        pub rolling_max: Option<f64>,
        pub rolling_min: Option<f64>,
    }

    impl Yearly for YearlyExtrema {
        fn year(&self) -> i32 {
            self.year
        }
    }

    /// Yearly counts for one basin.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct BasinSeries {
        pub basin: String,
        pub rows: Vec<YearlyAggregate>,
    }

    /// Count matching events per year.
    pub fn yearly_counts(
        dataset: &Dataset,
        filter: Option<&EventFilter>,
        config: &AggregationConfig,
    ) -> Vec<YearlyAggregate> {
        let counts: BTreeMap<i32, usize> = match config.count_mode {
            CountMode::Observations => {
                let mut counts = BTreeMap::new();
                for event in filtered(dataset, filter) {
                    *counts.entry(event.year).or_insert(0) += 1;
                }
                counts
            }
            CountMode::Storms => {
                let mut storms: BTreeMap<i32, BTreeSet<&str>> = BTreeMap::new();
                for event in filtered(dataset, filter) {
                    storms
                        .entry(event.year)
                        .or_default()
                        .insert(event.entity_key.as_str());
                }
                storms.into_iter().map(|(y, keys)| (y, keys.len())).collect()
            }
        };

        let points: Vec<(i32, f64)> = counts.iter().map(|(y, c)| (*y, *c as f64)).collect();
        let means = trailing_mean(&points, config.window);
        let rows: Vec<YearlyAggregate> = counts
            .into_iter()
            .zip(means)
            .map(|((year, count), rolling_mean)| YearlyAggregate {
                year,
                count,
                rolling_mean,
            })
            .collect();
        log::debug!(
            "[HTK Debug] aggregate: yearly_counts returned {} years",
            rows.len()
        );
        rows
    }

    /// Per-year maximum and minimum of `field`. Events without a value for
    /// the field are ignored; a year where no event has one yields no row.
    pub fn yearly_extrema(
        dataset: &Dataset,
        field: NumericField,
        filter: Option<&EventFilter>,
        window: usize,
    ) -> Vec<YearlyExtrema> {
        let mut envelope: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
        for event in filtered(dataset, filter) {
            let Some(value) = event.value_of(field) else {
                continue;
            };
            let entry = envelope.entry(event.year).or_insert((value, value));
            entry.0 = entry.0.max(value);
            entry.1 = entry.1.min(value);
        }

        let maxes: Vec<(i32, f64)> = envelope.iter().map(|(y, (max, _))| (*y, *max)).collect();
        let mins: Vec<(i32, f64)> = envelope.iter().map(|(y, (_, min))| (*y, *min)).collect();
        let rolling_max = trailing_mean(&maxes, window);
        let rolling_min = trailing_mean(&mins, window);

        envelope
            .into_iter()
            .zip(rolling_max.into_iter().zip(rolling_min))
            .map(|((year, (max, min)), (rolling_max, rolling_min))| YearlyExtrema {
                year,
                max,
                min,
                rolling_max,
                rolling_min,
            })
            .collect()
    }

    /// Yearly counts for every basin in the dataset, in basin load order.
    pub fn yearly_counts_by_basin(dataset: &Dataset, config: &AggregationConfig) -> Vec<BasinSeries> {
        dataset
            .basins()
            .into_iter()
            .map(|basin| BasinSeries {
                basin: basin.to_string(),
                rows: yearly_counts(dataset, Some(&EventFilter::basin(basin)), config),
            })
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;
        use htk_track::{DatasetStore, EventSource, StormStatus, AL_FIXTURE, EP_FIXTURE};

        fn event(key: &str, basin: &str, year: i32, wind: f64, pressure: Option<f64>) -> Event {
            let timestamp = NaiveDate::from_ymd_opt(year, 8, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            Event {
                entity_key: key.to_string(),
                name: String::new(),
                basin: basin.to_string(),
                timestamp,
                year,
                lat: 20.0,
                lon: -60.0,
                wind,
                pressure,
                status: if wind >= 64.0 {
                    StormStatus::Hurricane
                } else {
                    StormStatus::TropicalStorm
                },
            }
        }

        fn fixture() -> Dataset {
            DatasetStore::default()
                .load(&[
                    EventSource::new("AL", AL_FIXTURE),
                    EventSource::new("EP", EP_FIXTURE),
                ])
                .unwrap()
        }

        #[test]
        fn yearly_counts_scenario_has_no_rolling_history() {
            let dataset = Dataset::from_events(vec![
                event("A1", "AL", 1960, 50.0, None),
                event("A1", "AL", 1965, 50.0, None),
                event("B2", "AL", 1970, 50.0, None),
            ]);
            let rows = yearly_counts(&dataset, None, &AggregationConfig::default());
            let summary: Vec<(i32, usize, Option<f64>)> =
                rows.iter().map(|r| (r.year, r.count, r.rolling_mean)).collect();
            assert_eq!(
                summary,
                vec![(1960, 1, None), (1965, 1, None), (1970, 1, None)]
            );
        }

        #[test]
        fn yearly_counts_fixture_by_observation() {
            let rows = yearly_counts(&fixture(), None, &AggregationConfig::default());
            let counts: Vec<(i32, usize)> = rows.iter().map(|r| (r.year, r.count)).collect();
            assert_eq!(counts, vec![(1950, 6), (1961, 6), (1972, 4)]);
        }

        #[test]
        fn yearly_counts_fixture_by_storm() {
            let config = AggregationConfig {
                count_mode: CountMode::Storms,
                ..AggregationConfig::default()
            };
            let rows = yearly_counts(&fixture(), None, &config);
            let counts: Vec<(i32, usize)> = rows.iter().map(|r| (r.year, r.count)).collect();
            assert_eq!(counts, vec![(1950, 2), (1961, 3), (1972, 2)]);
        }

        #[test]
        fn yearly_counts_rolling_mean_matches_window_definition() {
            let mut events = Vec::new();
            for year in 1950..1962 {
                if year == 1955 {
                    continue;
                }
                for i in 0..(year - 1949) {
                    events.push(event(&format!("S{year}{i}"), "AL", year, 40.0, None));
                }
            }
            let dataset = Dataset::from_events(events);
            let config = AggregationConfig {
                window: 5,
                ..AggregationConfig::default()
            };
            let rows = yearly_counts(&dataset, None, &config);
            for row in &rows {
                let history: Vec<&YearlyAggregate> =
                    rows.iter().filter(|r| r.year <= row.year).collect();
                if history.len() < config.window {
                    assert_eq!(row.rolling_mean, None, "year {}", row.year);
                    continue;
                }
                let in_window: Vec<f64> = history
                    .iter()
                    .filter(|r| r.year > row.year - config.window as i32)
                    .map(|r| r.count as f64)
                    .collect();
                let expected = in_window.iter().sum::<f64>() / in_window.len() as f64;
                let actual = row.rolling_mean.unwrap();
                assert!((actual - expected).abs() < 1e-9, "year {}", row.year);
            }
        }

        #[test]
        fn yearly_counts_with_filters() {
            let dataset = fixture();
            let config = AggregationConfig::default();

            let ep = yearly_counts(&dataset, Some(&EventFilter::basin("EP")), &config);
            let counts: Vec<(i32, usize)> = ep.iter().map(|r| (r.year, r.count)).collect();
            assert_eq!(counts, vec![(1961, 2), (1972, 2)]);

            let carla = yearly_counts(&dataset, Some(&EventFilter::entity("AL051961")), &config);
            assert_eq!(carla.len(), 1);
            assert_eq!(carla[0].count, 3);

            let hurricanes = yearly_counts(&dataset, Some(&EventFilter::hurricanes()), &config);
            let counts: Vec<(i32, usize)> = hurricanes.iter().map(|r| (r.year, r.count)).collect();
            assert_eq!(counts, vec![(1950, 3), (1961, 4), (1972, 3)]);
        }

        #[test]
        fn yearly_counts_empty_dataset_is_empty() {
            let rows = yearly_counts(&Dataset::default(), None, &AggregationConfig::default());
            assert!(rows.is_empty());
            assert!(yearly_extrema(&Dataset::default(), NumericField::Wind, None, 10).is_empty());
        }

        #[test]
        fn yearly_extrema_wind() {
            let rows = yearly_extrema(&fixture(), NumericField::Wind, None, 10);
            let summary: Vec<(i32, f64, f64)> = rows.iter().map(|r| (r.year, r.max, r.min)).collect();
            assert_eq!(
                summary,
                vec![(1950, 80.0, 35.0), (1961, 140.0, 25.0), (1972, 100.0, 25.0)]
            );
            assert!(rows.iter().all(|r| r.rolling_max.is_none() && r.rolling_min.is_none()));
        }

        #[test]
        fn yearly_extrema_pressure_skips_missing_values() {
            let dataset = Dataset::from_events(vec![
                event("A", "AL", 1990, 40.0, None),
                event("A", "AL", 1990, 70.0, Some(990.0)),
                event("B", "AL", 1991, 70.0, None),
                event("C", "AL", 1992, 70.0, Some(950.0)),
                event("C", "AL", 1992, 90.0, Some(940.0)),
            ]);
            let rows = yearly_extrema(&dataset, NumericField::Pressure, None, 2);
            let summary: Vec<(i32, f64, f64)> = rows.iter().map(|r| (r.year, r.max, r.min)).collect();
            assert_eq!(summary, vec![(1990, 990.0, 990.0), (1992, 950.0, 940.0)]);
            assert_eq!(rows[0].rolling_max, None);
            // 1991 is absent, so the 1992 window holds only 1992
            assert_eq!(rows[1].rolling_max, Some(950.0));
            assert_eq!(rows[1].rolling_min, Some(940.0));
        }

        #[test]
        fn yearly_counts_by_basin_follows_load_order() {
            let series = yearly_counts_by_basin(&fixture(), &AggregationConfig::default());
            assert_eq!(series.len(), 2);
            assert_eq!(series[0].basin, "AL");
            assert_eq!(series[0].rows.iter().map(|r| r.count).sum::<usize>(), 12);
            assert_eq!(series[1].basin, "EP");
            assert_eq!(series[1].rows.iter().map(|r| r.count).sum::<usize>(), 4);
        }

        #[test]
        fn within_years_clips_rows() {
            let rows = yearly_counts(&fixture(), None, &AggregationConfig::default());
            let clipped = within_years(rows, 1955, 1972);
            let years: Vec<i32> = clipped.iter().map(|r| r.year).collect();
            assert_eq!(years, vec![1961, 1972]);
        }
    }
}

/// Yearly means of the auxiliary temperature series.
pub mod temperature {
    use crate::rolling::trailing_mean;
    use crate::yearly::Yearly;
    use htk_track::temperature::TemperatureReading;
    use serde::Serialize;
    use std::collections::BTreeMap;

    /// Mean temperature for one year, with its trailing mean.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct YearlyMean {
        pub year: i32,
        pub mean: f64,
        pub rolling_mean: Option<f64>,
    }

    impl Yearly for YearlyMean {
        fn year(&self) -> i32 {
            self.year
        }
    }

    /// Average the readings of each year. Blank readings are ignored, and a
    /// year with only blank readings has no row.
    pub fn yearly_temperature(readings: &[TemperatureReading], window: usize) -> Vec<YearlyMean> {
        let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for reading in readings {
            if let Some(value) = reading.value {
                let entry = sums.entry(reading.year).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
        let points: Vec<(i32, f64)> = sums
            .into_iter()
            .map(|(year, (sum, n))| (year, sum / n as f64))
            .collect();
        let means = trailing_mean(&points, window);
        points
            .into_iter()
            .zip(means)
            .map(|((year, mean), rolling_mean)| YearlyMean {
                year,
                mean,
                rolling_mean,
            })
            .collect()
    }

}

/// Joining yearly series on the year key.
pub mod correlation {
    use crate::temperature::YearlyMean;
    use crate::yearly::{Yearly, YearlyAggregate};
    use serde::Serialize;
    use std::collections::BTreeMap;

    /// One point of a yearly series; `value` may be undefined.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct YearValue {
        pub year: i32,
        pub value: Option<f64>,
    }

    /// A year present in both joined series.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct JoinedPoint {
        pub year: i32,
        pub a: Option<f64>,
        pub b: Option<f64>,
    }

    impl Yearly for JoinedPoint {
        fn year(&self) -> i32 {
            self.year
        }
    }

    /// Trend line of a count series.
    pub fn count_trend(rows: &[YearlyAggregate]) -> Vec<YearValue> {
        rows.iter()
            .map(|r| YearValue {
                year: r.year,
                value: r.rolling_mean,
            })
            .collect()
    }

    /// Trend line of a temperature series.
    pub fn temperature_trend(rows: &[YearlyMean]) -> Vec<YearValue> {
        rows.iter()
            .map(|r| YearValue {
                year: r.year,
                value: r.rolling_mean,
            })
            .collect()
    }

    /// Inner join of two series on year, ascending.
    ///
    /// Years present in only one series are dropped. Undefined values are
    /// carried through as `None`. If a series repeats a year, its last point
    /// for that year is used.
    pub fn correlate(a: &[YearValue], b: &[YearValue]) -> Vec<JoinedPoint> {
        let right: BTreeMap<i32, Option<f64>> = b.iter().map(|p| (p.year, p.value)).collect();
        let left: BTreeMap<i32, Option<f64>> = a.iter().map(|p| (p.year, p.value)).collect();
        left.into_iter()
            .filter_map(|(year, a)| right.get(&year).map(|b| JoinedPoint { year, a, b: *b }))
            .collect()
    }

    /// Pearson correlation over the joined points where both values are
    /// defined. `None` with fewer than two such points or zero variance.
    pub fn pearson(points: &[JoinedPoint]) -> Option<f64> {
        let pairs: Vec<(f64, f64)> = points
            .iter()
            .filter_map(|p| Some((p.a?, p.b?)))
            .collect();
        if pairs.len() < 2 {
            return None;
        }
        let n = pairs.len() as f64;
        let mean_a = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
        let mean_b = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;
        let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
        for (a, b) in &pairs {
            cov += (a - mean_a) * (b - mean_b);
            var_a += (a - mean_a).powi(2);
            var_b += (b - mean_b).powi(2);
        }
        if var_a == 0.0 || var_b == 0.0 {
            return None;
        }
        Some(cov / (var_a.sqrt() * var_b.sqrt()))
    }

}
