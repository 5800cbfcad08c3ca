//! Directory enumeration for the scan client.
//!
//! Yields every regular file under a root, recursively. Entries that
//! cannot be read (permissions, races with deletion) are logged and
//! skipped; the walk itself never fails.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// List all regular files under `root`, recursively.
///
/// Symlinks are not followed. Unreadable entries are skipped with a
/// warning.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "walk entry skipped"),
        }
    }

    files
}
