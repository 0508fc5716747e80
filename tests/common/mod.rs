//! Shared fixtures for cargo-bump integration tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(unused)]
pub const REPO: &str = "https://github.com/org/repo";

pub const CHANGELOG: &str = "# Changelog

<!-- next-header -->

## [Unreleased] - ReleaseDate

### Added

- Shiny feature

## [1.0.0] - 2024-01-01

Initial release

<!-- next-url -->

[Unreleased]: https://github.com/org/repo/compare/v1.0.0...HEAD
[1.0.0]: https://github.com/org/repo/compare/v0.9.0...v1.0.0
";

/// Workspace with a versioned root manifest, two members with differing
/// versions, an unversioned member and a changelog.
#[allow(unused)]
pub fn create_test_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();

    let workspace_toml = r#"[workspace]
members = ["crate-a", "crate-b", "crate-c"]
resolver = "2"

[workspace.package]
version = "1.0.0"
repository = "https://github.com/org/repo"
"#;
    fs::write(temp.path().join("Cargo.toml"), workspace_toml).unwrap();

    write_member(
        temp.path(),
        "crate-a",
        r#"[package]
name = "crate-a"
version = "1.0.0"
edition = "2021"
"#,
    );
    write_member(
        temp.path(),
        "crate-b",
        r#"[package]
name = "crate-b"
version = "0.9.0"
edition = "2021"

[dependencies]
crate-a = { path = "../crate-a", version = "1.0.0" }
"#,
    );
    write_member(
        temp.path(),
        "crate-c",
        r#"[package]
name = "crate-c"
version.workspace = true
edition = "2021"
"#,
    );

    fs::write(temp.path().join("CHANGELOG.md"), CHANGELOG).unwrap();

    temp
}

#[allow(unused)]
pub fn write_member(root: &Path, name: &str, manifest: &str) {
    let dir = root.join(name);
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(dir.join("Cargo.toml"), manifest).unwrap();
    fs::write(dir.join("src/lib.rs"), "pub fn hello() {}\n").unwrap();
}

#[allow(unused)]
pub fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

/// Today's date as written into released headings.
#[allow(unused)]
pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Helper to run a bump command
pub fn run_bump(workspace_root: &Path, level: &str, extra_args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("cargo-bump");
    cmd.arg("bump")
        .arg(level)
        .args(extra_args)
        .env_remove("RUST_LOG")
        .current_dir(workspace_root);

    cmd.assert()
}
