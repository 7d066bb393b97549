#![allow(clippy::module_name_repetitions)]
//! Canonical locations of output files.
//!
//! Output goes to `FIELDSCRAPE_DATA_DIR` when set, otherwise to `data/`
//! under the workspace root.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV_VAR: &str = "FIELDSCRAPE_DATA_DIR";

/// Returns the workspace root directory, resolved at compile time from
/// `CARGO_MANIFEST_DIR`.
#[must_use]
pub fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Returns the directory output files are written to.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV_VAR)
        .filter(|dir| !dir.is_empty())
        .map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the path of `filename` inside the data directory.
#[must_use]
pub fn output_path(filename: &str) -> PathBuf {
    data_dir().join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_root_contains_the_workspace_manifest() {
        assert!(project_root().join("Cargo.toml").exists());
        assert!(project_root().join("packages").is_dir());
    }
}
