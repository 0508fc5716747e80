//! Orchestration for the `bump` subcommand.
//!
//! Manifests and changelog are staged into one `Transaction`, which is only
//! committed with `--execute`.

use crate::error::Result;
use crate::ops::changelog::{normalize_repository, repository_from_changelog};
use crate::ops::manifest::MANIFEST_FILE;
use crate::ops::{
    CHANGELOG_FILE, Transaction, find_manifests, read_repository, update_all_manifests,
    update_changelog,
};
use crate::version::BumpLevel;
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the `bump` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct BumpArgs {
    /// Version component to increment
    #[arg(value_enum, ignore_case = true)]
    pub level: BumpLevel,

    /// Write the changes (without this flag only a dry run is performed)
    #[arg(long)]
    pub execute: bool,

    /// Changelog to release, relative to the current directory
    #[arg(long, value_name = "PATH", default_value = CHANGELOG_FILE)]
    pub changelog: PathBuf,

    /// Repository URL used for compare links
    /// (defaults to `repository` in the root Cargo.toml)
    #[arg(long, value_name = "URL")]
    pub repository: Option<String>,
}

pub fn execute(args: BumpArgs) -> Result<()> {
    let root = std::env::current_dir()?;
    run_in(&root, &args)
}

/// Runs the release in `root`.
pub fn run_in(root: &Path, args: &BumpArgs) -> Result<()> {
    if args.execute {
        println!("Executing\n");
    } else {
        println!("Starting dry run\n");
    }

    let mut txn = Transaction::new(!args.execute);
    let display_path = |path: &Path| -> String {
        let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
        relative.to_string_lossy().replace('\\', "/")
    };

    println!("Updating Cargo.toml files");
    let manifests = find_manifests(root)?;
    let (next_version, updates) = update_all_manifests(&manifests, args.level, &mut txn)?;
    for update in &updates {
        for rep in &update.replacements {
            println!(
                "{}: updated '{}' -> '{}'",
                display_path(&update.path),
                rep.old_line,
                rep.new_version
            );
        }
    }
    log::info!("Next version: {} ({} bump)", next_version, args.level);

    println!("\nUpdating changelog");
    let changelog = root.join(&args.changelog);
    let repository = resolve_repository(root, &changelog, args.repository.as_deref())?;
    let today = chrono::Local::now().date_naive();
    let released = update_changelog(
        &changelog,
        &next_version,
        today,
        repository.as_deref(),
        &mut txn,
    )?;
    println!("{}", released);

    if let Err(e) = txn.commit() {
        eprintln!("{} {}", "Error during commit:".red().bold(), e);
        return Err(e);
    }

    txn.print_summary(root);
    Ok(())
}

/// Picks the repository URL for compare links.
///
/// The explicit flag wins, then the root manifest's `repository`, then the
/// base of an existing `...HEAD` compare link in the changelog.
fn resolve_repository(
    root: &Path,
    changelog: &Path,
    explicit: Option<&str>,
) -> Result<Option<String>> {
    if let Some(url) = explicit {
        return Ok(Some(normalize_repository(url)));
    }

    if let Some(url) = read_repository(&root.join(MANIFEST_FILE))? {
        log::debug!("Repository from {}: {}", MANIFEST_FILE, url);
        return Ok(Some(normalize_repository(&url)));
    }

    match fs::read_to_string(changelog) {
        Ok(content) => repository_from_changelog(&content),
        Err(e) => {
            log::debug!("Could not read {}: {}", changelog.display(), e);
            Ok(None)
        }
    }
}
