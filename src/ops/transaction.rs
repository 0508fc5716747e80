//! Staged file rewrites applied as a unit.
//!
//! Manifest and changelog updates are staged here first and only touch the
//! disk on `commit`. In dry-run mode `commit` is a no-op, so a dry run and
//! a real run go through exactly the same code up to that point.

use crate::error::{BumpError, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum Operation {
    UpdateFile {
        path: PathBuf,
        original: String,
        new: String,
    },
}

impl Operation {
    fn path(&self) -> &Path {
        match self {
            Operation::UpdateFile { path, .. } => path,
        }
    }
}

#[must_use = "Transaction must be committed"]
pub struct Transaction {
    operations: Vec<Operation>,
    dry_run: bool,
    committed: bool,
}

impl Transaction {
    pub fn new(dry_run: bool) -> Self {
        Self {
            operations: Vec::new(),
            dry_run,
            committed: false,
        }
    }

    /// Stages new content for `path`.
    ///
    /// The current content is read and kept for restoring. Content identical
    /// to what is on disk is not staged.
    pub fn update_file(&mut self, path: PathBuf, new_content: String) -> Result<()> {
        log::debug!("Transaction::update_file called for: {}", path.display());

        let original = fs::read_to_string(&path).map_err(|e| {
            log::error!("Failed to read file {}: {}", path.display(), e);
            BumpError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", path.display(), e),
            ))
        })?;

        if original == new_content {
            log::debug!("File content unchanged, skipping: {}", path.display());
            return Ok(());
        }

        if self.operations.iter().any(|op| op.path() == path) {
            return Err(BumpError::Other(anyhow::anyhow!(
                "Duplicate file operation: {}",
                path.display()
            )));
        }

        if self.dry_run {
            log::info!("Would update: {}", path.display());
        } else {
            log::debug!("Staging update for: {}", path.display());
        }

        self.operations.push(Operation::UpdateFile {
            path,
            original,
            new: new_content,
        });

        log::debug!("Transaction now has {} operations", self.operations.len());
        Ok(())
    }

    /// Writes every staged file.
    ///
    /// If a write fails, files already written are restored before the
    /// error is returned.
    pub fn commit(&mut self) -> Result<()> {
        if self.committed {
            return Err(BumpError::Other(anyhow::anyhow!(
                "Transaction already committed"
            )));
        }

        if self.dry_run {
            self.committed = true;
            return Ok(());
        }

        for (idx, op) in self.operations.iter().enumerate() {
            let Operation::UpdateFile { path, new, .. } = op;
            if let Err(e) = fs::write(path, new) {
                let err = BumpError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to write {}: {}", path.display(), e),
                ));
                log::warn!("{}; restoring {} file(s)", err, idx);
                if let Err(failures) = restore(&self.operations[..idx]) {
                    return Err(rollback_error(&err, &failures));
                }
                return Err(err);
            }
            log::debug!("Updated: {}", path.display());
        }

        self.committed = true;
        Ok(())
    }

    /// Content staged for `path`, if any.
    #[cfg(test)]
    pub(crate) fn staged(&self, path: &Path) -> Option<&str> {
        self.operations.iter().find_map(|op| match op {
            Operation::UpdateFile { path: p, new, .. } if p == path => Some(new.as_str()),
            _ => None,
        })
    }

    /// Prints the staged files grouped into manifests and other files.
    pub fn print_summary(&self, root: &Path) {
        if self.operations.is_empty() {
            println!("\n{}", "No changes needed".yellow());
            return;
        }

        let display_path = |path: &Path| -> String {
            let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
            relative.to_string_lossy().replace('\\', "/")
        };

        let mut manifests = Vec::new();
        let mut documents = Vec::new();
        for op in &self.operations {
            let path = op.path();
            if path.file_name().is_some_and(|n| n == "Cargo.toml") {
                manifests.push(display_path(path));
            } else {
                documents.push(display_path(path));
            }
        }
        manifests.sort();
        documents.sort();

        if self.dry_run {
            println!("\n{}", "DRY RUN - No changes will be made".yellow().bold());
        } else {
            println!("\n{}", "Changes applied:".green().bold());
        }

        let print_group = |title: &str, paths: &[String]| {
            if paths.is_empty() {
                return;
            }
            println!(
                "\n{} ({} file{})",
                title.bold(),
                paths.len(),
                if paths.len() == 1 { "" } else { "s" }
            );
            for path in paths {
                if self.dry_run {
                    println!("   • {}", path.dimmed());
                } else {
                    println!("   {} {}", "✓".green(), path.dimmed());
                }
            }
        };
        print_group("Manifests", &manifests);
        print_group("Changelog", &documents);

        println!();
        let num_ops = self.operations.len();
        if self.dry_run {
            println!(
                "{} {} will be modified. Run with {} to apply.",
                num_ops.to_string().cyan().bold(),
                if num_ops > 1 { "files" } else { "file" },
                "--execute".cyan()
            );
        } else {
            println!(
                "{} Successfully updated {} {}",
                "✓".green().bold(),
                num_ops,
                if num_ops > 1 { "files" } else { "file" }
            );
        }
    }
}

/// Writes back the original content of `operations`, newest first.
///
/// Returns one message per file that could not be restored.
fn restore(operations: &[Operation]) -> std::result::Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for op in operations.iter().rev() {
        let Operation::UpdateFile { path, original, .. } = op;
        if let Err(e) = fs::write(path, original) {
            errors.push(format!("Failed to restore {}: {}", path.display(), e));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Combines the write error that aborted a commit with the restore failures.
fn rollback_error(cause: &BumpError, failures: &[String]) -> BumpError {
    BumpError::RollbackFailed(format!("{} (after: {})", failures.join("; "), cause))
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.committed && !self.operations.is_empty() && !self.dry_run {
            log::warn!("Transaction dropped without commit - changes were not applied");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_new_transaction() {
        let txn = Transaction::new(false);
        assert!(!txn.dry_run);
        assert!(!txn.committed);
        assert!(txn.operations.is_empty());
    }

    #[test]
    fn test_update_file_stages_operation() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("Cargo.toml");
        fs::write(&file_path, "version = \"1.0.0\"\n").unwrap();

        let mut txn = Transaction::new(true);
        txn.update_file(file_path.clone(), "version = \"1.0.1\"\n".to_string())
            .unwrap();

        assert_eq!(txn.operations.len(), 1);
        assert_eq!(txn.staged(&file_path), Some("version = \"1.0.1\"\n"));
        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            "version = \"1.0.0\"\n"
        );
    }

    #[test]
    fn test_update_file_no_change_skips() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");
        fs::write(&file_path, "same content").unwrap();

        let mut txn = Transaction::new(false);
        txn.update_file(file_path, "same content".to_string())
            .unwrap();

        assert!(txn.operations.is_empty());
    }

    #[test]
    fn test_update_file_nonexistent_fails() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("nonexistent.txt");

        let mut txn = Transaction::new(false);
        let result = txn.update_file(file_path, "content".to_string());

        assert!(matches!(result, Err(BumpError::Io(_))));
    }

    #[test]
    fn test_update_file_twice_fails() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");
        fs::write(&file_path, "a").unwrap();

        let mut txn = Transaction::new(true);
        txn.update_file(file_path.clone(), "b".to_string()).unwrap();
        assert!(txn.update_file(file_path, "c".to_string()).is_err());
    }

    #[test]
    fn test_dry_run_commit_does_not_modify_files() {
        let temp = TempDir::new().unwrap();
        let file1 = temp.path().join("file1.txt");
        let file2 = temp.path().join("file2.txt");
        fs::write(&file1, "original 1").unwrap();
        fs::write(&file2, "original 2").unwrap();

        let mut txn = Transaction::new(true);
        txn.update_file(file1.clone(), "modified 1".to_string())
            .unwrap();
        txn.update_file(file2.clone(), "modified 2".to_string())
            .unwrap();
        txn.commit().unwrap();

        assert!(txn.committed);
        assert_eq!(fs::read_to_string(&file1).unwrap(), "original 1");
        assert_eq!(fs::read_to_string(&file2).unwrap(), "original 2");
    }

    #[test]
    fn test_commit_applies_file_updates() {
        let temp = TempDir::new().unwrap();
        let file1 = temp.path().join("file1.txt");
        let file2 = temp.path().join("file2.txt");
        fs::write(&file1, "original 1").unwrap();
        fs::write(&file2, "original 2").unwrap();

        let mut txn = Transaction::new(false);
        txn.update_file(file1.clone(), "modified 1".to_string())
            .unwrap();
        txn.update_file(file2.clone(), "modified 2".to_string())
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(fs::read_to_string(&file1).unwrap(), "modified 1");
        assert_eq!(fs::read_to_string(&file2).unwrap(), "modified 2");
    }

    #[test]
    fn test_commit_twice_fails() {
        let mut txn = Transaction::new(false);
        txn.commit().unwrap();
        assert!(txn.commit().is_err());
    }

    #[test]
    fn test_failed_commit_restores_written_files() {
        let temp = TempDir::new().unwrap();
        let file1 = temp.path().join("file1.txt");
        let gone_dir = temp.path().join("gone");
        fs::create_dir(&gone_dir).unwrap();
        let file2 = gone_dir.join("file2.txt");
        fs::write(&file1, "original 1").unwrap();
        fs::write(&file2, "original 2").unwrap();

        let mut txn = Transaction::new(false);
        txn.update_file(file1.clone(), "modified 1".to_string())
            .unwrap();
        txn.update_file(file2, "modified 2".to_string()).unwrap();

        // Second write cannot succeed once its directory is gone
        fs::remove_dir_all(&gone_dir).unwrap();

        let err = txn.commit().unwrap_err();
        assert!(matches!(err, BumpError::Io(_)));
        assert!(err.to_string().contains("Failed to write"));
        assert!(err.to_string().contains("file2.txt"));
        assert!(!txn.committed);
        assert_eq!(fs::read_to_string(&file1).unwrap(), "original 1");
    }

    #[test]
    fn test_restore_reports_every_failure() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing").join("Cargo.toml");
        let ops = vec![Operation::UpdateFile {
            path: missing,
            original: "version = \"1.0.0\"\n".to_string(),
            new: "version = \"1.0.1\"\n".to_string(),
        }];

        let failures = restore(&ops).unwrap_err();

        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("Failed to restore"));
    }

    #[test]
    fn test_rollback_error_keeps_the_write_cause() {
        let cause = BumpError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "Failed to write CHANGELOG.md: permission denied",
        ));
        let failures = vec!["Failed to restore Cargo.toml: disk full".to_string()];

        let err = rollback_error(&cause, &failures);

        assert!(matches!(err, BumpError::RollbackFailed(_)));
        let message = err.to_string();
        assert!(message.contains("Failed to restore Cargo.toml: disk full"));
        assert!(message.contains("Failed to write CHANGELOG.md: permission denied"));
    }

    #[test]
    fn test_print_summary_empty() {
        let temp = TempDir::new().unwrap();
        let txn = Transaction::new(false);

        // Should not panic
        txn.print_summary(temp.path());
    }

    #[test]
    fn test_print_summary_with_operations() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("crates").join("a");
        fs::create_dir_all(&nested).unwrap();
        let manifest = nested.join("Cargo.toml");
        let changelog = temp.path().join("CHANGELOG.md");
        fs::write(&manifest, "version = \"0.1.0\"\n").unwrap();
        fs::write(&changelog, "# Changelog\n").unwrap();

        let mut txn = Transaction::new(true);
        txn.update_file(manifest, "version = \"0.2.0\"\n".to_string())
            .unwrap();
        txn.update_file(changelog, "# Changelog\n\n".to_string())
            .unwrap();

        txn.print_summary(temp.path());
        assert_eq!(txn.operations.len(), 2);
    }
}
