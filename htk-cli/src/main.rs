//! HTK CLI - Command line tool for exploring hurricane tracks and yearly trends.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "htk-cli",
    version,
    about = "Hurricane track explorer toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: htk_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("[HTK Debug] cli: Starting");
    htk_cmd::run(cli.command)
}
