//! Command implementations for the HTK CLI.
//!
//! Every subcommand loads the sources named by [`DataArgs`] and prints its
//! result as JSON on stdout.

use clap::Subcommand;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

pub mod input;
pub mod query;
pub mod replay;

pub use input::DataArgs;
pub use query::ChartKind;

#[derive(Subcommand)]
pub enum Command {
    /// Print load counts, year bounds and basins
    Summary {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Print the start markers of storms that begin within a year range
    Markers {
        #[command(flatten)]
        data: DataArgs,

        /// First year (defaults to the earliest in the data)
        #[arg(long)]
        start: Option<i32>,

        /// Last year (defaults to the latest in the data)
        #[arg(long)]
        end: Option<i32>,
    },

    /// Print the full track of one storm
    Track {
        #[command(flatten)]
        data: DataArgs,

        /// Storm key, e.g. AL011950
        #[arg(short = 'k', long)]
        key: String,
    },

    /// Print a yearly chart
    Chart {
        #[command(flatten)]
        data: DataArgs,

        #[arg(value_enum)]
        kind: ChartKind,

        #[arg(long)]
        start: Option<i32>,

        #[arg(long)]
        end: Option<i32>,
    },

    /// Replay a JSON list of actions and print every resulting frame
    Replay {
        #[command(flatten)]
        data: DataArgs,

        /// Path to the JSON action list
        #[arg(short = 'a', long)]
        actions: PathBuf,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(command, &mut out)
}

/// Run `command`, writing its output to `out`.
pub fn execute<W: Write>(command: Command, out: &mut W) -> anyhow::Result<()> {
    match command {
        Command::Summary { data } => {
            let explorer = data.load()?;
            query::run_summary(&explorer, out)
        }
        Command::Markers { data, start, end } => {
            let explorer = data.load()?;
            let range = query::resolve_range(&explorer, start, end);
            query::run_markers(&explorer, range, out)
        }
        Command::Track { data, key } => {
            let explorer = data.load()?;
            query::run_track(&explorer, &key, out)
        }
        Command::Chart {
            data,
            kind,
            start,
            end,
        } => {
            let explorer = data.load()?;
            let range = query::resolve_range(&explorer, start, end);
            query::run_chart(&explorer, kind, range, out)
        }
        Command::Replay { data, actions } => {
            let explorer = Arc::new(data.load()?);
            let actions = replay::parse_actions(&input::read_text(&actions)?)?;
            replay::run_replay(explorer, actions, out)
        }
    }
}
