//! Filename interpretation: canonical naming and metadata extraction.
//!
//! Raw acquisition names are noisy (`01 red 2.tif`, `01red2.tif`,
//! `44-guleinoiena.tif`). [`normalize_file_name`] rewrites them to
//! `<id>-<channel>[-<scan>].tif`, and [`ImageFile::parse`] reads the sample id,
//! channel and scan index back out of the canonical form.


mod normalize;
mod parse;

pub use normalize::{Rename, normalize_file_name, normalized_path, plan_renames};
pub use parse::{Channel, Color, ImageFile, ScanIndex};

/// Number of ASCII digits at the start of `s`.
fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Splits `name` at its last `.` into stem and extension (dot included).
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => name.split_at(pos),
        _ => (name, ""),
    }
}
