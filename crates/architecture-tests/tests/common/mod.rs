//! Workspace discovery shared by the architecture tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// The directory holding the `[workspace]` Cargo.toml.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .find(|dir| {
            fs::read_to_string(dir.join("Cargo.toml"))
                .is_ok_and(|content| content.contains("[workspace]"))
        })
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Every `.rs` file under `crates/`, skipping build output and this crate.
pub fn rust_files() -> Vec<PathBuf> {
    let crates_dir = workspace_root().join("crates");
    assert!(crates_dir.exists(), "crates/ directory not found at {:?}", crates_dir);

    WalkDir::new(&crates_dir)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name();
            name != "target" && name != "architecture-tests"
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|entry| entry.into_path())
        .collect()
}

/// Whether a path is test code: a `tests/` tree or a `*_tests.rs` file.
pub fn is_test_path(path: &Path) -> bool {
    path.components().any(|part| part.as_os_str() == "tests")
        || path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with("_tests.rs"))
}
