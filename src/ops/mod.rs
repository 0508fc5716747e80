pub mod changelog;
pub mod manifest;
mod transaction;

pub use changelog::{CHANGELOG_FILE, update_changelog};
pub use manifest::{find_manifests, read_repository, update_all_manifests};
pub use transaction::Transaction;
