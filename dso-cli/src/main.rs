//! DSO CLI - Command line tool for analyzing DICHOSOcean sensor data.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "dso-cli",
    version,
    about = "DICHOSOcean mooring sensor data analysis toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: dso_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    dso_cmd::run(cli.command)
}
