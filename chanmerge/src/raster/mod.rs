//! In-memory rasters used between decode and encode.
//!
//! Samples are held as `f32` in the numeric range of the source file
//! (`0..=255` for 8-bit, `0..=65535` for 16-bit) so arithmetic never wraps;
//! [`SampleDepth`] remembers the range for clipping and encoding.


pub mod tiff;

use std::fmt;

use crate::filename::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleDepth {
    U8,
    U16,
    F32,
}

impl SampleDepth {
    /// Largest representable sample. Float rasters are unbounded above.
    pub fn max_value(self) -> f32 {
        match self {
            SampleDepth::U8 => u8::MAX as f32,
            SampleDepth::U16 => u16::MAX as f32,
            SampleDepth::F32 => f32::INFINITY,
        }
    }

    /// Clamps `value` into the valid range `[0, max_value]`.
    #[inline]
    pub fn clip(self, value: f32) -> f32 {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, self.max_value())
    }
}

impl fmt::Display for SampleDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleDepth::U8 => "8-bit",
            SampleDepth::U16 => "16-bit",
            SampleDepth::F32 => "32-bit float",
        };
        f.write_str(name)
    }
}

/// Single-channel raster, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub depth: SampleDepth,
    pub pixels: Vec<f32>,
}

impl Raster {
    pub fn new(width: usize, height: usize, depth: SampleDepth, pixels: Vec<f32>) -> Self {
        assert_eq!(pixels.len(), width * height, "Pixel count mismatch");
        Self {
            width,
            height,
            depth,
            pixels,
        }
    }

    pub fn filled(width: usize, height: usize, depth: SampleDepth, value: f32) -> Self {
        Self::new(width, height, depth, vec![value; width * height])
    }

    pub fn from_fn(
        width: usize,
        height: usize,
        depth: SampleDepth,
        f: impl Fn(usize, usize) -> f32,
    ) -> Self {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(width, height, depth, pixels)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.pixels[y * self.width + x]
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Three-channel raster, interleaved `r g b r g b ...`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbRaster {
    pub width: usize,
    pub height: usize,
    pub depth: SampleDepth,
    pub pixels: Vec<f32>,
}

impl RgbRaster {
    pub fn new(width: usize, height: usize, depth: SampleDepth, pixels: Vec<f32>) -> Self {
        assert_eq!(pixels.len(), width * height * 3, "Pixel count mismatch");
        Self {
            width,
            height,
            depth,
            pixels,
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        let i = (y * self.width + x) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Extracts one color plane as a single-channel raster.
    pub fn plane(&self, color: Color) -> Raster {
        let offset = match color {
            Color::Red => 0,
            Color::Green => 1,
            Color::Blue => 2,
        };
        let pixels = self.pixels.iter().skip(offset).step_by(3).copied().collect();
        Raster::new(self.width, self.height, self.depth, pixels)
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}
