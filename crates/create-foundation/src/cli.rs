use std::path::PathBuf;

use clap::{ArgAction, Parser};
use foundation_core::args::FlagArgs;

#[derive(Parser, Debug)]
#[command(name = "create-foundation")]
#[command(about = "Scaffold an Electron + React project", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Settings file path (overrides default discovery)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print what would be generated without writing
    #[arg(short = 'n', long = "dry_run", visible_alias = "dry-run")]
    pub dry_run: bool,

    #[command(flatten)]
    pub flags: FlagArgs,
}
