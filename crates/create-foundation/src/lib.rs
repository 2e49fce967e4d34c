#![forbid(unsafe_code)]

use clap::CommandFactory;

mod cli;

pub use cli::Cli;

pub fn command() -> clap::Command {
    Cli::command()
}
