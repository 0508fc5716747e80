//! Bump the version of every `Cargo.toml` in a tree and turn the changelog's
//! unreleased section into a dated release.
//!
//! Runs as `cargo bump <major|minor|patch> [--execute]`. Without `--execute`
//! nothing is written, but the output is the same as a real run.

pub mod cli;
pub mod command;
pub mod error;
pub mod ops;
pub mod version;

pub use error::*;

pub fn run() -> Result<()> {
    use clap::Parser;
    use command::CargoCommand;

    let cli = cli::CargoCli::parse();
    match cli.command {
        CargoCommand::Bump(args) => command::bump::execute(args),
    }
}
