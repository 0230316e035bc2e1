//! Lookup of storm tracks and start points by entity key.
//!
//! "First" always means first in dataset order. Callers that want the true
//! first observation must index a chronologically sorted dataset, which is
//! what [`Explorer`](crate::explorer::Explorer) does by default.

use htk_track::{Dataset, EntityKey, Event};
use htk_utils::years::within;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One event per distinct key, the first in dataset order, listed in order
/// of each key's first appearance.
pub fn first_events_by_entity(dataset: &Dataset) -> Vec<&Event> {
    let mut seen: HashSet<&str> = HashSet::new();
    dataset
        .events()
        .iter()
        .filter(|e| seen.insert(e.entity_key.as_str()))
        .collect()
}

/// All events of `key` in dataset order; empty for an unknown key.
pub fn track_of<'a>(dataset: &'a Dataset, key: &str) -> Vec<&'a Event> {
    let key = key.trim();
    dataset
        .events()
        .iter()
        .filter(|e| e.entity_key == key)
        .collect()
}

/// Position of each event between the track's earliest (0.0) and latest
/// (1.0) timestamp. A track spanning no time maps every event to 0.0.
pub fn track_progress(track: &[&Event]) -> Vec<f64> {
    let (Some(min), Some(max)) = (
        track.iter().map(|e| e.timestamp).min(),
        track.iter().map(|e| e.timestamp).max(),
    ) else {
        return Vec::new();
    };
    let span = (max - min).num_seconds();
    if span == 0 {
        return vec![0.0; track.len()];
    }
    track
        .iter()
        .map(|e| (e.timestamp - min).num_seconds() as f64 / span as f64)
        .collect()
}

/// Precomputed key → event positions over a shared dataset.
#[derive(Debug, Clone)]
pub struct SelectionIndex {
    dataset: Arc<Dataset>,
    tracks: HashMap<EntityKey, Vec<usize>>,
    order: Vec<EntityKey>,
}

impl SelectionIndex {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let mut tracks: HashMap<EntityKey, Vec<usize>> = HashMap::new();
        let mut order = Vec::new();
        for (i, event) in dataset.events().iter().enumerate() {
            let positions = tracks.entry(event.entity_key.clone()).or_default();
            if positions.is_empty() {
                order.push(event.entity_key.clone());
            }
            positions.push(i);
        }
        log::info!(
            "[HTK Debug] selection: Indexed {} storms over {} events",
            order.len(),
            dataset.len()
        );
        Self {
            dataset,
            tracks,
            order,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Number of distinct storms.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Start event of every storm, in order of first appearance.
    pub fn first_events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.order.iter().filter_map(|key| self.first_event(key))
    }

    pub fn first_event(&self, key: &str) -> Option<&Event> {
        let i = *self.tracks.get(key.trim())?.first()?;
        self.dataset.events().get(i)
    }

    /// Events of `key` in dataset order; empty for an unknown key.
    pub fn track(&self, key: &str) -> Vec<&Event> {
        let events = self.dataset.events();
        self.tracks
            .get(key.trim())
            .map(|positions| positions.iter().filter_map(|&i| events.get(i)).collect())
            .unwrap_or_default()
    }

    /// True when `key` has a non-empty track.
    pub fn resolves(&self, key: &str) -> bool {
        self.tracks
            .get(key.trim())
            .is_some_and(|positions| !positions.is_empty())
    }

    /// True when any event of `key` falls in `[start, end]`.
    pub fn has_event_in_years(&self, key: &str, start: i32, end: i32) -> bool {
        self.track(key)
            .iter()
            .any(|e| within(e.year, start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use htk_track::{DatasetStore, EventSource, StormStatus, AL_FIXTURE, EP_FIXTURE};

    fn event_at(key: &str, year: i32, month: u32, day: u32, hour: u32) -> Event {
        let timestamp = NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        Event {
            entity_key: key.to_string(),
            name: key.to_string(),
            basin: "AL".to_string(),
            timestamp,
            year,
            lat: 20.0,
            lon: -60.0,
            wind: 50.0,
            pressure: None,
            status: StormStatus::TropicalStorm,
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
    fn first_events_follow_load_order() {
        // B's later observation is loaded before its earlier one
        let dataset = Dataset::from_events(vec![
            event_at("A", 1980, 8, 1, 0),
            event_at("B", 1980, 8, 5, 0),
            event_at("A", 1980, 8, 2, 0),
            event_at("B", 1980, 8, 3, 0),
        ]);
        let firsts = first_events_by_entity(&dataset);
        assert_eq!(firsts.len(), 2);
        assert_eq!(firsts[0].entity_key, "A");
        assert_eq!(firsts[1].timestamp.format("%d").to_string(), "05");
    }

    #[test]
    fn first_events_after_chronological_sort() {
        let dataset = Dataset::from_events(vec![
            event_at("B", 1980, 8, 5, 0),
            event_at("A", 1980, 8, 1, 0),
            event_at("B", 1980, 8, 3, 0),
        ])
        .sorted_chronologically();
        let firsts = first_events_by_entity(&dataset);
        assert_eq!(firsts[0].entity_key, "A");
        assert_eq!(firsts[1].timestamp.format("%d").to_string(), "03");
    }

    #[test]
    fn track_head_agrees_with_first_events() {
        let dataset = fixture();
        let index = SelectionIndex::new(Arc::new(dataset.clone()));
        for first in first_events_by_entity(&dataset) {
            let track = track_of(&dataset, &first.entity_key);
            assert_eq!(track[0], first);
            assert_eq!(index.first_event(&first.entity_key), Some(first));
            assert_eq!(index.track(&first.entity_key), track);
        }
        assert_eq!(index.len(), 7);
        assert_eq!(index.first_events().count(), 7);
    }

    #[test]
    fn unknown_key_has_empty_track() {
        let dataset = fixture();
        let index = SelectionIndex::new(Arc::new(dataset.clone()));
        assert!(track_of(&dataset, "AL999999").is_empty());
        assert!(index.track("AL999999").is_empty());
        assert!(!index.resolves("AL999999"));
        assert_eq!(index.first_event("AL999999"), None);
        // BETTY was dropped at load time
        assert!(!index.resolves("AL021972"));
    }

    #[test]
    fn keys_are_trimmed_on_lookup() {
        let index = SelectionIndex::new(Arc::new(fixture()));
        assert!(index.resolves(" AL051961 "));
        assert_eq!(index.track(" AL051961").len(), 3);
    }

    #[test]
    fn has_event_in_years_checks_whole_track() {
        let dataset = Dataset::from_events(vec![
            event_at("X", 1980, 8, 1, 0),
            event_at("X", 1985, 8, 1, 0),
        ]);
        let index = SelectionIndex::new(Arc::new(dataset));
        assert!(index.has_event_in_years("X", 1984, 1990));
        assert!(index.has_event_in_years("X", 1970, 1980));
        assert!(!index.has_event_in_years("X", 1990, 2000));
        assert!(index.has_event_in_years("X", 1985, 1985));
        assert!(!index.has_event_in_years("X", 1981, 1984));
        assert!(!index.has_event_in_years("Y", 1900, 2100));
    }

    #[test]
    fn progress_spans_zero_to_one() {
        let a = event_at("P", 1990, 9, 1, 0);
        let b = event_at("P", 1990, 9, 1, 12);
        let c = event_at("P", 1990, 9, 2, 0);
        let progress = track_progress(&[&a, &b, &c]);
        assert_eq!(progress, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn progress_of_single_instant_track_is_zero() {
        let a = event_at("P", 1990, 9, 1, 0);
        assert_eq!(track_progress(&[&a]), vec![0.0]);
        let b = a.clone();
        assert_eq!(track_progress(&[&a, &b]), vec![0.0, 0.0]);
        assert!(track_progress(&[]).is_empty());
    }
}
