//! TIFF decode and encode through the `tiff` crate.
//!
//! Only what the merge needs: greyscale in (8-bit, 16-bit, 32-bit float),
//! RGB out at the same depth. Greyscale output exists for building inputs.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{TiffEncoder, colortype};

use super::{Raster, RgbRaster, SampleDepth};
use crate::error::{Error, Result};

pub fn read_greyscale(path: &Path) -> Result<Raster> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    // Microscopy scans can exceed the decoder's default buffer limit.
    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| Error::tiff(path, e))?
        .with_limits(Limits::unlimited());

    match decoder.colortype().map_err(|e| Error::tiff(path, e))? {
        ::tiff::ColorType::Gray(_) => {}
        other => {
            return Err(Error::tiff(
                path,
                format!("expected a greyscale image, found {:?}", other),
            ));
        }
    }

    let (width, height) = decoder.dimensions().map_err(|e| Error::tiff(path, e))?;
    let (width, height) = (width as usize, height as usize);

    let (depth, pixels) = match decoder.read_image().map_err(|e| Error::tiff(path, e))? {
        DecodingResult::U8(buf) => (SampleDepth::U8, buf.into_iter().map(f32::from).collect()),
        DecodingResult::U16(buf) => (SampleDepth::U16, buf.into_iter().map(f32::from).collect()),
        DecodingResult::F32(buf) => (SampleDepth::F32, buf),
        _ => {
            return Err(Error::tiff(
                path,
                "unsupported sample format, expected 8-bit, 16-bit or 32-bit float",
            ));
        }
    };

    if pixels.len() != width * height {
        return Err(Error::tiff(
            path,
            format!(
                "decoded {} samples for a {}x{} image",
                pixels.len(),
                width,
                height
            ),
        ));
    }

    Ok(Raster::new(width, height, depth, pixels))
}

pub fn write_rgb(path: &Path, raster: &RgbRaster) -> Result<()> {
    write_samples(
        path,
        raster.width,
        raster.height,
        raster.depth,
        &raster.pixels,
        Layout::Rgb,
    )
}

pub fn write_greyscale(path: &Path, raster: &Raster) -> Result<()> {
    write_samples(
        path,
        raster.width,
        raster.height,
        raster.depth,
        &raster.pixels,
        Layout::Gray,
    )
}

#[derive(Clone, Copy)]
enum Layout {
    Gray,
    Rgb,
}

fn write_samples(
    path: &Path,
    width: usize,
    height: usize,
    depth: SampleDepth,
    samples: &[f32],
    layout: Layout,
) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut encoder = TiffEncoder::new(&mut writer).map_err(|e| Error::tiff(path, e))?;
    let (w, h) = (width as u32, height as u32);

    let written = match (depth, layout) {
        (SampleDepth::U8, Layout::Gray) => {
            encoder.write_image::<colortype::Gray8>(w, h, &quantize_u8(samples))
        }
        (SampleDepth::U8, Layout::Rgb) => {
            encoder.write_image::<colortype::RGB8>(w, h, &quantize_u8(samples))
        }
        (SampleDepth::U16, Layout::Gray) => {
            encoder.write_image::<colortype::Gray16>(w, h, &quantize_u16(samples))
        }
        (SampleDepth::U16, Layout::Rgb) => {
            encoder.write_image::<colortype::RGB16>(w, h, &quantize_u16(samples))
        }
        (SampleDepth::F32, Layout::Gray) => {
            encoder.write_image::<colortype::Gray32Float>(w, h, samples)
        }
        (SampleDepth::F32, Layout::Rgb) => {
            encoder.write_image::<colortype::RGB32Float>(w, h, samples)
        }
    };
    written.map_err(|e| Error::tiff(path, e))?;

    drop(encoder);
    writer.flush().map_err(|e| Error::io(path, e))?;

    Ok(())
}

fn quantize_u8(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .map(|&v| SampleDepth::U8.clip(v.round()) as u8)
        .collect()
}

fn quantize_u16(samples: &[f32]) -> Vec<u16> {
    samples
        .iter()
        .map(|&v| SampleDepth::U16.clip(v.round()) as u16)
        .collect()
}
