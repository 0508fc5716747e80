//! Changelog release cutting.
//!
//! The changelog is edited with literal replacements around a fixed set of
//! markers. A missing marker turns its replacement into a no-op and is only
//! reported as a warning.

use crate::error::{BumpError, Result};
use crate::ops::transaction::Transaction;
use crate::version::tag_name;
use chrono::NaiveDate;
use regex::Regex;
use semver::Version;
use std::fs;
use std::path::Path;

pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

const UNRELEASED: &str = "[Unreleased]";
const HEAD_SUFFIX: &str = "...HEAD";
const RELEASE_DATE: &str = "ReleaseDate";
const NEXT_HEADER: &str = "<!-- next-header -->";
const NEXT_URL: &str = "<!-- next-url -->\n";

const HEADER_TEMPLATE: &str = "<!-- next-header -->

## [Unreleased] - ReleaseDate

### Added

### Changed
";

/// Returns the link block that replaces the next-url marker.
fn next_url_block(repository: &str, tag: &str) -> String {
    format!("<!-- next-url -->\n\n[Unreleased]: {repository}/compare/{tag}...HEAD")
}

/// Trims a trailing `/` and `.git` so compare links can be appended.
pub fn normalize_repository(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    url.strip_suffix(".git").unwrap_or(url).to_string()
}

/// Extracts the repository URL from an existing `<url>/compare/<from>...HEAD` link.
pub fn repository_from_changelog(content: &str) -> Result<Option<String>> {
    let link = Regex::new(r"(https?://\S+?)/compare/\S+\.\.\.HEAD")?;
    Ok(link
        .captures(content)
        .map(|caps| normalize_repository(&caps[1])))
}

/// Cuts a release out of the unreleased section of `content`.
///
/// `repository` is only needed when the next-url marker is present.
pub fn release_changelog(
    content: &str,
    version: &Version,
    date: NaiveDate,
    repository: Option<&str>,
) -> Result<String> {
    let tag = tag_name(version);
    let mut doc = content.to_string();

    for marker in [UNRELEASED, HEAD_SUFFIX, RELEASE_DATE, NEXT_HEADER, NEXT_URL] {
        if !doc.contains(marker) {
            log::warn!("Changelog marker {:?} not found; leaving it as is", marker);
        }
    }

    // Heading and link definition both carry the label, so every occurrence moves.
    doc = doc.replace(UNRELEASED, &format!("[{}]", version));
    doc = doc.replacen(HEAD_SUFFIX, &format!("...{}", tag), 1);
    doc = doc.replacen(RELEASE_DATE, &date.format("%Y-%m-%d").to_string(), 1);
    doc = doc.replacen(NEXT_HEADER, HEADER_TEMPLATE, 1);

    if doc.contains(NEXT_URL) {
        let repository = repository.ok_or(BumpError::MissingRepository)?;
        doc = doc.replacen(NEXT_URL, &next_url_block(repository, &tag), 1);
    }

    Ok(doc)
}

/// Reads the changelog at `path`, stages the released version and returns it.
pub fn update_changelog(
    path: &Path,
    version: &Version,
    date: NaiveDate,
    repository: Option<&str>,
    txn: &mut Transaction,
) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| {
        BumpError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })?;

    let released = release_changelog(&content, version, date, repository)?;
    txn.update_file(path.to_path_buf(), released.clone())?;

    Ok(released)
}
