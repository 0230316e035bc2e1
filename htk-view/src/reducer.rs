//! The interaction state machine.
//!
//! | Action | Effect |
//! |---|---|
//! | `RangeChanged` | new range (clamped to the dataset); selection kept only if the storm has an event in it |
//! | `MarkerClicked` | select the storm, or clear the selection if the key does not resolve |
//! | `ViewportMoved` | new viewport, everything else kept |
//! | `SelectionCleared` | no selection |
//!
//! No action ever resets the viewport. Only `RangeChanged` invalidates the
//! aggregate charts.

use crate::selection::SelectionIndex;
use crate::state::{ViewState, Viewport, YearRange};
use htk_track::EntityKey;
use serde::{Deserialize, Serialize};

/// One user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    RangeChanged { start: i32, end: i32 },
    MarkerClicked { key: EntityKey },
    ViewportMoved(Viewport),
    SelectionCleared,
}

/// Derived views the rendering layer must rebuild after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Recompute {
    /// Visible start markers
    pub markers: bool,
    /// Track overlay of the selected storm
    pub track: bool,
    pub viewport: bool,
    /// Range-keyed aggregate charts
    pub charts: bool,
}

/// Something the reducer recovered from while applying an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The requested range reached outside the dataset and was clamped.
    RangeClamped { requested: YearRange, applied: YearRange },
    /// The selected storm has no event in the new range.
    SelectionInvalidated { key: EntityKey },
    /// A clicked key did not resolve to a track.
    UnresolvedSelection { key: EntityKey },
}

/// Result of reducing one action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub state: ViewState,
    pub recompute: Recompute,
    pub notices: Vec<Notice>,
}

/// Applies actions against a selection index and the dataset's year bounds.
#[derive(Debug, Clone, Copy)]
pub struct InteractionReducer<'a> {
    index: &'a SelectionIndex,
    bounds: YearRange,
}

impl<'a> InteractionReducer<'a> {
    pub fn new(index: &'a SelectionIndex, bounds: YearRange) -> Self {
        Self { index, bounds }
    }

    pub fn bounds(&self) -> YearRange {
        self.bounds
    }

    /// Produce the state following `action`. Never fails: anything that
    /// cannot be honored degrades to a well-defined state and is reported
    /// as a [`Notice`].
    pub fn reduce(&self, state: &ViewState, action: Action) -> Transition {
        let mut notices = Vec::new();
        let mut charts = false;
        let next = match action {
            Action::RangeChanged { start, end } => {
                charts = true;
                let requested = YearRange::new(start, end);
                let applied = requested.clamp_to(self.bounds);
                if !requested.is_within(self.bounds) {
                    notices.push(Notice::RangeClamped { requested, applied });
                }
                let selected_entity = match &state.selected_entity {
                    Some(key)
                        if self
                            .index
                            .has_event_in_years(key, applied.start(), applied.end()) =>
                    {
                        Some(key.clone())
                    }
                    Some(key) => {
                        notices.push(Notice::SelectionInvalidated { key: key.clone() });
                        None
                    }
                    None => None,
                };
                ViewState {
                    date_range: applied,
                    selected_entity,
                    viewport: state.viewport,
                }
            }
            Action::MarkerClicked { key } => {
                let key = key.trim().to_string();
                let selected_entity = if self.index.resolves(&key) {
                    Some(key)
                } else {
                    notices.push(Notice::UnresolvedSelection { key });
                    None
                };
                ViewState {
                    selected_entity,
                    ..state.clone()
                }
            }
            Action::ViewportMoved(viewport) => ViewState {
                viewport,
                ..state.clone()
            },
            Action::SelectionCleared => ViewState {
                selected_entity: None,
                ..state.clone()
            },
        };

        for notice in &notices {
            log::info!("[HTK Debug] reducer: {:?}", notice);
        }
        let recompute = Recompute {
            markers: true,
            track: next.selected_entity.is_some(),
            viewport: true,
            charts,
        };
        Transition {
            state: next,
            recompute,
            notices,
        }
    }
}
