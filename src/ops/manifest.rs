//! Manifest discovery and version rewriting.

use crate::error::{BumpError, Result};
use crate::ops::transaction::Transaction;
use crate::version::BumpLevel;
use regex::Regex;
use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

pub const MANIFEST_FILE: &str = "Cargo.toml";

const VERSION_PATTERN: &str = r#"^version = "(\d+)\.(\d+)\.(\d+)""#;

/// The version computed for this run.
///
/// The first declaration seen fixes both values; every later declaration is
/// overwritten with the same `next`.
#[derive(Debug, Default, Clone)]
pub struct VersionBump {
    resolved: Option<(Version, Version)>,
}

impl VersionBump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next version, computing it from `found` on first call.
    fn next_from(&mut self, found: Version, level: BumpLevel) -> Result<&Version> {
        if self.resolved.is_none() {
            let next = level.apply(&found)?;
            log::debug!("Authoritative version {} -> {}", found, next);
            self.resolved = Some((found, next));
        }
        self.next().ok_or(BumpError::NoVersionFound)
    }

    pub fn previous(&self) -> Option<&Version> {
        self.resolved.as_ref().map(|(prev, _)| prev)
    }

    pub fn next(&self) -> Option<&Version> {
        self.resolved.as_ref().map(|(_, next)| next)
    }

    /// Consumes the accumulator; fails if no declaration was ever seen.
    pub fn into_next(self) -> Result<Version> {
        self.resolved
            .map(|(_, next)| next)
            .ok_or(BumpError::NoVersionFound)
    }
}

/// A single rewritten declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// The original line, without its terminator.
    pub old_line: String,
    pub new_version: Version,
}

/// Result of processing one manifest.
#[derive(Debug, Clone)]
pub struct ManifestUpdate {
    pub path: PathBuf,
    pub replacements: Vec<Replacement>,
}

/// Finds every `Cargo.toml` below `root`.
///
/// `target/` and `.git/` are skipped along with hidden and git-ignored
/// entries. The result is ordered by depth, then path, so the root manifest
/// is processed first.
pub fn find_manifests(root: &Path) -> Result<Vec<PathBuf>> {
    let walker = ignore::WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .git_global(true)
        .filter_entry(|e| {
            let name = e.file_name().to_str();
            !(name == Some("target") || name == Some(".git"))
        })
        .build();

    let mut manifests = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::debug!("Skipping entry due to error: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        if entry.file_name() == MANIFEST_FILE {
            manifests.push(entry.into_path());
        }
    }

    manifests.sort_by(|a, b| {
        a.components()
            .count()
            .cmp(&b.components().count())
            .then_with(|| a.cmp(b))
    });

    log::debug!("Found {} manifest(s) under {}", manifests.len(), root.display());
    Ok(manifests)
}

/// Rewrites every version declaration in `content`.
///
/// Lines are compared with their terminators stripped and written back with
/// the terminator they had. Everything else passes through untouched.
pub fn rewrite_versions(
    content: &str,
    pattern: &Regex,
    level: BumpLevel,
    bump: &mut VersionBump,
) -> Result<(String, Vec<Replacement>)> {
    let mut output = String::with_capacity(content.len());
    let mut replacements = Vec::new();

    for line in content.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let terminator = &line[body.len()..];

        let Some(caps) = pattern.captures(body) else {
            output.push_str(line);
            continue;
        };

        let found = Version::new(
            parse_component(&caps[1])?,
            parse_component(&caps[2])?,
            parse_component(&caps[3])?,
        );
        let next = bump.next_from(found, level)?.clone();

        output.push_str(&format!("version = \"{}\"", next));
        output.push_str(terminator);
        replacements.push(Replacement {
            old_line: body.trim().to_string(),
            new_version: next,
        });
    }

    Ok((output, replacements))
}

fn parse_component(digits: &str) -> Result<u64> {
    digits
        .parse()
        .map_err(|e| BumpError::Other(anyhow::anyhow!("Version component '{}': {}", digits, e)))
}

/// Rewrites one manifest and stages the result.
pub fn update_manifest(
    path: &Path,
    pattern: &Regex,
    level: BumpLevel,
    bump: &mut VersionBump,
    txn: &mut Transaction,
) -> Result<ManifestUpdate> {
    let content = fs::read_to_string(path)?;
    let (new_content, replacements) = rewrite_versions(&content, pattern, level, bump)?;

    if !replacements.is_empty() {
        txn.update_file(path.to_path_buf(), new_content)?;
    } else {
        log::debug!("No version declaration in {}", path.display());
    }

    Ok(ManifestUpdate {
        path: path.to_path_buf(),
        replacements,
    })
}

/// Applies `level` to every manifest, in order.
///
/// Returns the single next version together with a per-manifest report.
pub fn update_all_manifests(
    manifests: &[PathBuf],
    level: BumpLevel,
    txn: &mut Transaction,
) -> Result<(Version, Vec<ManifestUpdate>)> {
    let pattern = Regex::new(VERSION_PATTERN)?;
    let mut bump = VersionBump::new();

    let updates = manifests
        .iter()
        .map(|path| update_manifest(path, &pattern, level, &mut bump, txn))
        .collect::<Result<Vec<_>>>()?;

    Ok((bump.into_next()?, updates))
}

/// Reads the `repository` key from a root manifest.
///
/// `[workspace.package]` wins over `[package]`; a `{ workspace = true }`
/// value is not a string and is skipped.
pub fn read_repository(manifest: &Path) -> Result<Option<String>> {
    if !manifest.is_file() {
        return Ok(None);
    }

    let doc = fs::read_to_string(manifest)?.parse::<DocumentMut>()?;

    let from_workspace = doc
        .get("workspace")
        .and_then(|ws| ws.get("package"))
        .and_then(|pkg| pkg.get("repository"))
        .and_then(|r| r.as_str());
    let from_package = doc
        .get("package")
        .and_then(|pkg| pkg.get("repository"))
        .and_then(|r| r.as_str());

    Ok(from_workspace.or(from_package).map(str::to_string))
}
