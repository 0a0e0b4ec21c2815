//! Locations for files tests leave behind for manual inspection.

use std::path::PathBuf;

/// Directory under the workspace root that collects inspection output.
pub const TEST_OUTPUT_DIR: &str = "test_output";

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    match manifest_dir.parent() {
        Some(root) => root.to_path_buf(),
        None => manifest_dir,
    }
}

/// Path for `relative` under the test output directory, creating any missing
/// parent directories. `relative` may contain subdirectories, e.g.
/// `chanmerge/gradient.tif`.
pub fn test_output_path(relative: &str) -> PathBuf {
    let path = workspace_root().join(TEST_OUTPUT_DIR).join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Cannot create '{}': {}", parent.display(), e));
    }
    path
}
