//! Common test utilities for ingestion tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Write markdown files under `<tmp>/knowledge/profile`.
///
/// Returns the temp directory (which must be kept alive) and the profile root.
pub fn create_profile(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("knowledge").join("profile");
    for (name, content) in files {
        write_file(&root, name, content);
    }
    (temp_dir, root)
}

pub fn write_file(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}
