//! Interactive selection over a hurricane track dataset.
//!
//! This crate provides:
//! - `selection`: key → track and start-marker lookups
//! - `state`: the `ViewState` of one session (range, selection, viewport)
//! - `reducer`: the action state machine producing the next `ViewState`
//! - `explorer`: the query facade the rendering layer calls
//! - `session`: a single-threaded session over a shared `Explorer`

pub mod explorer;
pub mod models;
pub mod reducer;
pub mod selection;
pub mod session;
pub mod state;

pub use explorer::{Explorer, ExplorerConfig, FirstEventPolicy};
pub use models::{Charts, CorrelationRow, Frame, Marker, TrackOverlay, TrackPoint};
pub use reducer::{Action, InteractionReducer, Notice, Recompute, Transition};
pub use selection::SelectionIndex;
pub use session::Session;
pub use state::{ViewState, Viewport, YearRange};
