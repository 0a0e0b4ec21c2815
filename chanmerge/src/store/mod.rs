//! Filesystem and codec access used by the pipeline.
//!
//! The merge logic never touches files directly; it goes through
//! [`ImageStore`] so the whole pipeline can run against an in-memory store in
//! tests.

#[cfg(test)]
pub(crate) mod memory;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::raster::{Raster, RgbRaster, tiff};

pub trait ImageStore: Send + Sync {
    /// TIFF files directly inside `dir`, sorted by path.
    fn list_tif_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    fn exists(&self, path: &Path) -> bool;

    /// Moves `from` to `to`, replacing anything already at `to`.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn create_dir_all(&self, dir: &Path) -> Result<()>;

    fn read_greyscale(&self, path: &Path) -> Result<Raster>;

    fn write_rgb(&self, path: &Path, raster: &RgbRaster) -> Result<()>;
}

/// The real filesystem with TIFF encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskStore;

impl ImageStore for DiskStore {
    fn list_tif_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        common::file_utils::tiff_files(dir).map_err(|e| Error::io(dir, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).map_err(|e| Error::io(from, e))
    }

    fn create_dir_all(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
    }

    fn read_greyscale(&self, path: &Path) -> Result<Raster> {
        tiff::read_greyscale(path)
    }

    fn write_rgb(&self, path: &Path, raster: &RgbRaster) -> Result<()> {
        tiff::write_rgb(path, raster)
    }
}
