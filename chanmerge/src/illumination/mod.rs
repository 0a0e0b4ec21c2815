//! Illumination correction by Gaussian background estimation.
//!
//! A wide Gaussian blur of a channel keeps only the slowly varying
//! illumination pattern. Removing it from the original flattens the
//! background while leaving structure smaller than the kernel in place.
//! The result is clipped to the raster's range and never rescaled.


use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::error::{Error, Result};
use crate::raster::{Raster, SampleDepth};

/// Default Gaussian standard deviation in pixels. Usable values depend
/// heavily on magnification and sample, so it is meant to be overridden.
pub const DEFAULT_SIGMA: f32 = 50.0;

/// Kernel radius in multiples of sigma.
pub const KERNEL_TRUNCATE: f32 = 4.0;

/// Largest accepted sigma in pixels. Keeps the kernel at 80001 taps or fewer.
pub const MAX_SIGMA: f32 = 10_000.0;

/// How the background estimate is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionMethod {
    /// `pixel - background`, clipped at zero.
    #[default]
    Subtract,
    /// `pixel / background`, rounded for integer rasters, zero where the
    /// background is zero.
    Divide,
}

impl CorrectionMethod {
    pub fn name(self) -> &'static str {
        match self {
            CorrectionMethod::Subtract => "subtract",
            CorrectionMethod::Divide => "divide",
        }
    }
}

impl fmt::Display for CorrectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CorrectionMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CorrectionMethod::iter()
            .find(|method| method.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Unknown correction method '{}', expected subtract or divide",
                    s
                )
            })
    }
}

/// Rejects sigma values that cannot describe a Gaussian, and those above
/// [`MAX_SIGMA`].
pub fn validate_sigma(sigma: f32) -> Result<()> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(Error::Config(format!(
            "sigma must be a positive finite number, got {}",
            sigma
        )));
    }
    if sigma > MAX_SIGMA {
        return Err(Error::Config(format!(
            "sigma {} exceeds the maximum of {} pixels",
            sigma, MAX_SIGMA
        )));
    }
    Ok(())
}

/// Normalized 1D Gaussian kernel of radius `floor(KERNEL_TRUNCATE * sigma + 0.5)`,
/// at least 1.
///
/// # Panics
/// If sigma is not in `(0, MAX_SIGMA]`.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    assert!(sigma > 0.0, "Sigma must be positive");
    assert!(sigma <= MAX_SIGMA, "Sigma exceeds MAX_SIGMA");

    let radius = ((KERNEL_TRUNCATE * sigma + 0.5) as usize).max(1);
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

/// Maps any index onto `0..n` by symmetric reflection (`d c b a | a b c d | d c b a`),
/// repeating as often as needed.
#[inline]
pub(crate) fn reflect_index(i: isize, n: usize) -> usize {
    debug_assert!(n > 0);
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m < n { m } else { 2 * n - 1 - m }
}

/// Separable Gaussian blur with reflective boundaries.
///
/// Defined for every raster size; kernels wider than the raster fold back
/// onto it repeatedly.
pub fn gaussian_blur(raster: &Raster, sigma: f32) -> Raster {
    let kernel = gaussian_kernel_1d(sigma);
    let (width, height) = raster.dimensions();

    if width == 0 || height == 0 {
        return raster.clone();
    }

    let rows = convolve_rows(&raster.pixels, width, &kernel);
    let transposed = transpose(&rows, width, height);
    let cols = convolve_rows(&transposed, height, &kernel);
    let pixels = transpose(&cols, height, width);

    Raster::new(width, height, raster.depth, pixels)
}

/// Convolves every row of a `width`-wide row-major buffer in parallel.
fn convolve_rows(input: &[f32], width: usize, kernel: &[f32]) -> Vec<f32> {
    let radius = kernel.len() / 2;
    let mut output = vec![0.0f32; input.len()];

    output
        .par_chunks_mut(width)
        .zip(input.par_chunks(width))
        .for_each_init(
            || Vec::with_capacity(width + 2 * radius),
            |padded, (out_row, in_row)| {
                padded.clear();
                padded.extend(
                    (0..width + 2 * radius)
                        .map(|i| in_row[reflect_index(i as isize - radius as isize, width)]),
                );

                for (x, out) in out_row.iter_mut().enumerate() {
                    *out = padded[x..x + kernel.len()]
                        .iter()
                        .zip(kernel)
                        .map(|(p, k)| p * k)
                        .sum();
                }
            },
        );

    output
}

fn transpose(input: &[f32], width: usize, height: usize) -> Vec<f32> {
    let mut output = vec![0.0f32; input.len()];
    for y in 0..height {
        for x in 0..width {
            output[x * height + y] = input[y * width + x];
        }
    }
    output
}

/// Flattens the illumination of one channel.
///
/// Returns a raster of the same size and depth. Fails with
/// [`Error::Config`] for a non-positive or non-finite sigma.
pub fn correct_illumination(
    raster: &Raster,
    sigma: f32,
    method: CorrectionMethod,
) -> Result<Raster> {
    validate_sigma(sigma)?;

    let background = gaussian_blur(raster, sigma);
    let depth = raster.depth;

    let pixels = raster
        .pixels
        .iter()
        .zip(&background.pixels)
        .map(|(&value, &bg)| match method {
            CorrectionMethod::Subtract => depth.clip(value - bg),
            CorrectionMethod::Divide => {
                if bg == 0.0 {
                    0.0
                } else if depth == SampleDepth::F32 {
                    depth.clip(value / bg)
                } else {
                    depth.clip((value / bg).round())
                }
            }
        })
        .collect();

    Ok(Raster::new(raster.width, raster.height, depth, pixels))
}
