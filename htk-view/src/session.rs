use crate::explorer::Explorer;
use crate::models::Frame;
use crate::reducer::Action;
use crate::state::ViewState;
use std::sync::Arc;

/// One interactive session over a shared [`Explorer`].
///
/// Actions are applied one at a time through `&mut self`; the latest action
/// always wins.
#[derive(Debug, Clone)]
pub struct Session {
    explorer: Arc<Explorer>,
    state: ViewState,
}

impl Session {
    pub fn new(explorer: Arc<Explorer>) -> Self {
        let state = explorer.initial_state();
        Self { explorer, state }
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Full frame for the current state, charts included.
    pub fn snapshot(&self) -> Frame {
        self.explorer.full_frame(self.state.clone())
    }

    pub fn apply(&mut self, action: Action) -> Frame {
        log::debug!("[HTK Debug] session: Applying {:?}", action);
        let transition = self.explorer.reduce(&self.state, action);
        self.state = transition.state.clone();
        self.explorer.render(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::ExplorerConfig;
    use crate::state::{Viewport, YearRange};
    use htk_track::{EventSource, AL_FIXTURE, EP_FIXTURE, TEMPERATURE_FIXTURE};

    fn explorer() -> Arc<Explorer> {
        Arc::new(
            Explorer::from_sources(
                &[
                    EventSource::new("AL", AL_FIXTURE),
                    EventSource::new("EP", EP_FIXTURE),
                ],
                Some(TEMPERATURE_FIXTURE),
                ExplorerConfig::default(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn session_starts_at_full_range() {
        let session = Session::new(explorer());
        let frame = session.snapshot();
        assert_eq!(frame.state.date_range, YearRange::new(1950, 1972));
        assert_eq!(frame.markers.len(), 7);
        assert!(frame.charts.is_some());
        assert_eq!(frame.track, None);
    }

    #[test]
    fn session_walkthrough() {
        let mut session = Session::new(explorer());

        let frame = session.apply(Action::MarkerClicked {
            key: "AL091961".to_string(),
        });
        assert_eq!(frame.track.as_ref().unwrap().name, "HATTIE");

        let frame = session.apply(Action::ViewportMoved(Viewport::new(17.0, -88.0, 6.0)));
        assert!(frame.track.is_some());
        assert_eq!(frame.charts, None);

        let frame = session.apply(Action::RangeChanged {
            start: 1961,
            end: 1972,
        });
        assert_eq!(frame.state.selected_entity.as_deref(), Some("AL091961"));
        assert_eq!(frame.state.viewport, Viewport::new(17.0, -88.0, 6.0));
        assert_eq!(frame.markers.len(), 5);

        let frame = session.apply(Action::SelectionCleared);
        assert_eq!(frame.track, None);
        assert_eq!(session.state().selected_entity, None);
        assert_eq!(session.state().date_range, YearRange::new(1961, 1972));
    }

    #[test]
    fn snapshot_reflects_applied_actions() {
        let mut session = Session::new(explorer());
        session.apply(Action::RangeChanged {
            start: 1972,
            end: 1972,
        });
        session.apply(Action::MarkerClicked {
            key: "EP031972".to_string(),
        });
        let frame = session.snapshot();
        assert_eq!(frame.markers.len(), 2);
        assert_eq!(frame.track.unwrap().points.len(), 2);
        assert_eq!(frame.charts.unwrap().yearly.len(), 1);
    }

    #[test]
    fn sessions_share_one_explorer() {
        let explorer = explorer();
        let mut a = Session::new(Arc::clone(&explorer));
        let b = Session::new(Arc::clone(&explorer));
        a.apply(Action::SelectionCleared);
        a.apply(Action::RangeChanged {
            start: 1950,
            end: 1950,
        });
        assert_eq!(b.state().date_range, YearRange::new(1950, 1972));
        assert_eq!(Arc::strong_count(&explorer), 3);
    }
}
