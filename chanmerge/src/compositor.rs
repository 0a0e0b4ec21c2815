//! Stacks three corrected channels into one RGB composite.

use std::path::Path;

use crate::error::{Error, Result};
use crate::raster::{Raster, RgbRaster};
use crate::store::ImageStore;

/// Interleaves red, green and blue rasters.
///
/// All three must share width, height and sample depth. Nothing is cropped
/// or resampled to make them fit.
pub fn compose(red: &Raster, green: &Raster, blue: &Raster) -> Result<RgbRaster> {
    if red.dimensions() != green.dimensions() || red.dimensions() != blue.dimensions() {
        return Err(Error::DimensionMismatch {
            red: red.dimensions(),
            green: green.dimensions(),
            blue: blue.dimensions(),
        });
    }

    if red.depth != green.depth || red.depth != blue.depth {
        return Err(Error::SampleDepthMismatch {
            red: red.depth.to_string(),
            green: green.depth.to_string(),
            blue: blue.depth.to_string(),
        });
    }

    let pixels = red
        .pixels
        .iter()
        .zip(&green.pixels)
        .zip(&blue.pixels)
        .flat_map(|((&r, &g), &b)| [r, g, b])
        .collect();

    Ok(RgbRaster::new(red.width, red.height, red.depth, pixels))
}

/// Composes and writes to `path`. Writes nothing when composing fails.
pub fn write_composite(
    store: &dyn ImageStore,
    path: &Path,
    red: &Raster,
    green: &Raster,
    blue: &Raster,
) -> Result<()> {
    let rgb = compose(red, green, blue)?;
    store.write_rgb(path, &rgb)
}
