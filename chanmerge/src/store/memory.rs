use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use common::file_utils::{TIFF_EXTENSIONS, has_extension};
use parking_lot::Mutex;

use super::ImageStore;
use crate::error::{Error, Result};
use crate::raster::{Raster, RgbRaster};

#[derive(Debug, Clone)]
pub(crate) enum Entry {
    Grey(Raster),
    Rgb(RgbRaster),
}

/// In-memory stand-in for the filesystem.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    files: Mutex<BTreeMap<PathBuf, Entry>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    renames: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl MemoryStore {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        let store = Self::default();
        store.dirs.lock().insert(dir.into());
        store
    }

    pub(crate) fn add_grey(&self, path: impl Into<PathBuf>, raster: Raster) {
        self.files.lock().insert(path.into(), Entry::Grey(raster));
    }

    pub(crate) fn add_rgb(&self, path: impl Into<PathBuf>, raster: RgbRaster) {
        self.files.lock().insert(path.into(), Entry::Rgb(raster));
    }

    pub(crate) fn rgb(&self, path: impl AsRef<Path>) -> Option<RgbRaster> {
        match self.files.lock().get(path.as_ref()) {
            Some(Entry::Rgb(raster)) => Some(raster.clone()),
            _ => None,
        }
    }

    pub(crate) fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().keys().cloned().collect()
    }

    pub(crate) fn renames(&self) -> Vec<(PathBuf, PathBuf)> {
        self.renames.lock().clone()
    }

    fn not_found(path: &Path) -> Error {
        Error::io(path, io::Error::from(io::ErrorKind::NotFound))
    }
}

impl ImageStore for MemoryStore {
    fn list_tif_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !self.dirs.lock().contains(dir) {
            return Err(Self::not_found(dir));
        }

        Ok(self
            .files
            .lock()
            .keys()
            .filter(|p| p.parent() == Some(dir) && has_extension(p, TIFF_EXTENSIONS))
            .cloned()
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path) || self.dirs.lock().contains(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut files = self.files.lock();
        let entry = files.remove(from).ok_or_else(|| Self::not_found(from))?;
        files.insert(to.to_path_buf(), entry);
        self.renames
            .lock()
            .push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }

    fn create_dir_all(&self, dir: &Path) -> Result<()> {
        self.dirs.lock().insert(dir.to_path_buf());
        Ok(())
    }

    fn read_greyscale(&self, path: &Path) -> Result<Raster> {
        match self.files.lock().get(path) {
            Some(Entry::Grey(raster)) => Ok(raster.clone()),
            Some(Entry::Rgb(_)) => Err(Error::tiff(path, "expected a greyscale image")),
            None => Err(Self::not_found(path)),
        }
    }

    fn write_rgb(&self, path: &Path, raster: &RgbRaster) -> Result<()> {
        let dir_known = path.parent().is_some_and(|dir| self.dirs.lock().contains(dir));
        if !dir_known {
            return Err(Self::not_found(path));
        }
        self.files
            .lock()
            .insert(path.to_path_buf(), Entry::Rgb(raster.clone()));
        Ok(())
    }
}
