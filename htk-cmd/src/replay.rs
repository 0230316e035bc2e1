//! Replaying a recorded list of interactions.
//!
//! The action file is a JSON array, e.g.
//! ```text
//! [
//!   {"type": "range_changed", "start": 1960, "end": 1970},
//!   {"type": "marker_clicked", "key": "AL011960"},
//!   {"type": "viewport_moved", "center_lat": 25.0, "center_lon": -80.0, "zoom": 5.0},
//!   {"type": "selection_cleared"}
//! ]
//! ```

use anyhow::Context;
use htk_view::{Action, Explorer, Session};
use std::io::Write;
use std::sync::Arc;

pub fn parse_actions(json: &str) -> anyhow::Result<Vec<Action>> {
    serde_json::from_str(json).context("Failed to parse action list")
}

/// Print the initial frame, then one frame per action, one JSON document
/// per line.
pub fn run_replay<W: Write>(
    explorer: Arc<Explorer>,
    actions: Vec<Action>,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut session = Session::new(explorer);
    serde_json::to_writer(&mut *out, &session.snapshot())?;
    writeln!(out)?;
    let total = actions.len();
    for action in actions {
        let frame = session.apply(action);
        serde_json::to_writer(&mut *out, &frame)?;
        writeln!(out)?;
    }
    log::info!("[HTK Debug] replay: Applied {} actions", total);
    Ok(())
}
