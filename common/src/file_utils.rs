//! File utility functions for listing and filtering files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Supported TIFF file extensions.
pub const TIFF_EXTENSIONS: &[&str] = &["tif", "tiff"];

/// Returns true if the path has one of the given extensions.
/// Extensions are matched case-insensitively.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    extensions.contains(&ext.to_lowercase().as_str())
}

/// Returns paths to all regular files in a directory matching the given
/// extensions, sorted by path.
pub fn files_with_extensions(dir: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| path.is_file() && has_extension(path, extensions))
        .collect();

    files.sort();
    Ok(files)
}

/// Returns paths to all TIFF files in the given directory, sorted.
pub fn tiff_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    files_with_extensions(dir, TIFF_EXTENSIONS)
}
