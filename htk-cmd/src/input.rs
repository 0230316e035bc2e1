//! Loading the explorer from files named on the command line.

use anyhow::Context;
use clap::{Args, ValueEnum};
use flate2::read::GzDecoder;
use htk_data::yearly::{AggregationConfig, CountMode};
use htk_track::units::WindUnit;
use htk_track::{EventSource, LoadConfig};
use htk_view::{Explorer, ExplorerConfig, FirstEventPolicy};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// What yearly counts count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CountArg {
    /// Every observation row
    Observations,
    /// Distinct storms per year
    Storms,
}

impl From<CountArg> for CountMode {
    fn from(arg: CountArg) -> Self {
        match arg {
            CountArg::Observations => CountMode::Observations,
            CountArg::Storms => CountMode::Storms,
        }
    }
}

/// A `LABEL=PATH` source argument.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceArg {
    pub label: String,
    pub path: PathBuf,
}

/// Parse `LABEL=PATH`, or a bare path labelled by its file name
/// ("data/AL.csv.gz" becomes "AL").
pub fn parse_source_arg(s: &str) -> Result<SourceArg, String> {
    if let Some((label, path)) = s.split_once('=') {
        let label = label.trim();
        if label.is_empty() || path.trim().is_empty() {
            return Err(format!("expected LABEL=PATH, got '{s}'"));
        }
        return Ok(SourceArg {
            label: label.to_string(),
            path: PathBuf::from(path.trim()),
        });
    }
    let path = PathBuf::from(s.trim());
    let label = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| format!("cannot derive a label from '{s}'"))?
        .to_string();
    Ok(SourceArg { label, path })
}

/// Open a file for reading, decompressing it when the name ends in `.gz`.
pub fn open(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

pub fn read_text(path: &Path) -> anyhow::Result<String> {
    let mut text = String::new();
    open(path)?
        .read_to_string(&mut text)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(text)
}

/// Data and aggregation options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// Event source as LABEL=PATH (repeatable, loaded in order)
    #[arg(short = 's', long = "source", required = true, value_parser = parse_source_arg)]
    pub sources: Vec<SourceArg>,

    /// Temperature CSV (dt,LandAverageTemperature)
    #[arg(short = 't', long)]
    pub temperature: Option<PathBuf>,

    /// Earliest admitted date (YYYY-MM-DD)
    #[arg(long, default_value = "1950-01-01")]
    pub cutoff: String,

    /// Rolling window in years
    #[arg(short = 'w', long, default_value_t = htk_data::rolling::DEFAULT_WINDOW)]
    pub window: usize,

    /// Wind unit of the sources (kt, kmh, mph, ms)
    #[arg(long, default_value = "kt")]
    pub wind_unit: WindUnit,

    #[arg(long, value_enum, default_value_t = CountArg::Observations)]
    pub count_mode: CountArg,

    /// Use each storm's first row in file order as its start marker
    #[arg(long)]
    pub load_order: bool,
}

impl DataArgs {
    pub fn explorer_config(&self) -> anyhow::Result<ExplorerConfig> {
        let cutoff = htk_utils::dates::parse_date(self.cutoff.trim())
            .with_context(|| format!("Invalid --cutoff '{}'", self.cutoff))?;
        Ok(ExplorerConfig {
            load: LoadConfig {
                cutoff,
                wind_unit: self.wind_unit,
                ..LoadConfig::default()
            },
            aggregation: AggregationConfig {
                window: self.window,
                count_mode: self.count_mode.into(),
            },
            first_event_policy: if self.load_order {
                FirstEventPolicy::LoadOrder
            } else {
                FirstEventPolicy::Chronological
            },
            ..ExplorerConfig::default()
        })
    }

    /// Read every file and build the explorer.
    pub fn load(&self) -> anyhow::Result<Explorer> {
        let config = self.explorer_config()?;
        let mut sources = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            log::info!(
                "[HTK Debug] cmd: Reading source {} from {}",
                source.label,
                source.path.display()
            );
            let event_source = EventSource::from_reader(&source.label, open(&source.path)?)
                .with_context(|| format!("Failed to read {}", source.path.display()))?;
            sources.push(event_source);
        }
        let temperature = match &self.temperature {
            Some(path) => Some(read_text(path)?),
            None => None,
        };
        let explorer = Explorer::from_sources(&sources, temperature.as_deref(), config)
            .context("Failed to load dataset")?;
        Ok(explorer)
    }
}
