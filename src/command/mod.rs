pub mod bump;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum CargoCommand {
    /// Bump the version of every Cargo.toml and cut a changelog release.
    Bump(bump::BumpArgs),
}
