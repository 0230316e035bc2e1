//! One-shot queries against a loaded explorer, printed as JSON.

use clap::ValueEnum;
use htk_track::LoadReport;
use htk_utils::dates::format_timestamp;
use htk_view::{Explorer, ViewState, YearRange};
use serde::Serialize;
use std::io::Write;

/// Which chart to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    /// Observations per year with rolling mean
    Yearly,
    /// Max/min wind per year with rolling means
    Wind,
    /// Temperature trend against count trend
    Correlation,
    /// Yearly counts per basin
    Basins,
    /// Every chart at once
    All,
}

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub report: &'a LoadReport,
    pub events: usize,
    pub storms: usize,
    pub bounds: YearRange,
    pub basins: Vec<&'a str>,
}

/// Resolve optional `--start`/`--end` against the dataset bounds.
pub fn resolve_range(explorer: &Explorer, start: Option<i32>, end: Option<i32>) -> YearRange {
    let bounds = explorer.bounds();
    YearRange::new(start.unwrap_or(bounds.start()), end.unwrap_or(bounds.end())).clamp_to(bounds)
}

fn print_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn run_summary<W: Write>(explorer: &Explorer, out: &mut W) -> anyhow::Result<()> {
    let dataset = explorer.dataset();
    let summary = Summary {
        report: dataset.report(),
        events: dataset.len(),
        storms: explorer.index().len(),
        bounds: explorer.bounds(),
        basins: dataset.basins(),
    };
    print_json(out, &summary)
}

pub fn run_markers<W: Write>(explorer: &Explorer, range: YearRange, out: &mut W) -> anyhow::Result<()> {
    let state = ViewState {
        date_range: range,
        ..explorer.initial_state()
    };
    let markers = explorer.get_markers(&state);
    log::info!(
        "[HTK Debug] cmd: {} markers over {} events in {}-{}",
        markers.len(),
        explorer.dataset().in_years(range.start(), range.end()).count(),
        range.start(),
        range.end()
    );
    print_json(out, &markers)
}

pub fn run_track<W: Write>(explorer: &Explorer, key: &str, out: &mut W) -> anyhow::Result<()> {
    let state = ViewState {
        selected_entity: Some(key.trim().to_string()),
        ..explorer.initial_state()
    };
    let Some(track) = explorer.get_track(&state) else {
        anyhow::bail!("No storm with key '{}'", key.trim());
    };
    if let (Some(start), Some(end)) = (track.start(), track.end()) {
        log::info!(
            "[HTK Debug] cmd: Track {} runs from {} to {}",
            track.key,
            format_timestamp(&start.timestamp),
            format_timestamp(&end.timestamp)
        );
    }
    print_json(out, &track)
}

pub fn run_chart<W: Write>(
    explorer: &Explorer,
    kind: ChartKind,
    range: YearRange,
    out: &mut W,
) -> anyhow::Result<()> {
    match kind {
        ChartKind::Yearly => print_json(out, &explorer.get_yearly_chart(range)),
        ChartKind::Wind => print_json(out, &explorer.get_wind_chart(range)),
        ChartKind::Correlation => print_json(out, &explorer.get_correlation_chart(range)),
        ChartKind::Basins => print_json(out, &explorer.get_basin_charts(range)),
        ChartKind::All => print_json(out, &explorer.get_charts(range)),
    }
}
