use std::fmt;
use std::path::PathBuf;

use strum_macros::{Display, EnumIter};

use super::{leading_digits, split_extension};
use crate::error::{Error, Result};

/// Color a channel contributes to in the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Blue,
}

/// Channel identity inferred from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
    Brightfield,
    Unknown,
}

impl Channel {
    /// Classifies a channel name.
    ///
    /// A `bf` prefix always means brightfield. Otherwise the first letter
    /// decides: `r`, `g`, `b` for the three colors, anything else is unknown.
    /// Matching is case-insensitive.
    pub fn from_name(name: &str) -> Channel {
        let lower = name.to_lowercase();
        if lower.starts_with("bf") {
            return Channel::Brightfield;
        }

        match lower.chars().next() {
            Some('r') => Channel::Red,
            Some('g') => Channel::Green,
            Some('b') => Channel::Blue,
            _ => Channel::Unknown,
        }
    }

    /// The composite color, or `None` for channels that never merge.
    pub fn color(self) -> Option<Color> {
        match self {
            Channel::Red => Some(Color::Red),
            Channel::Green => Some(Color::Green),
            Channel::Blue => Some(Color::Blue),
            Channel::Brightfield | Channel::Unknown => None,
        }
    }
}

/// Trailing scan number, kept as written so `02` and `2` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScanIndex(String);

impl ScanIndex {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, `None` if it does not fit in a `u64`.
    pub fn value(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ScanIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One greyscale acquisition on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub id: String,
    pub channel: Channel,
    pub channel_name: String,
    pub scan_index: Option<ScanIndex>,
    /// Canonical file name the metadata was read from.
    pub file_name: String,
    /// Where the pixels live. Differs from `file_name` only when renames are
    /// skipped.
    pub path: PathBuf,
}

impl ImageFile {
    /// Reads id, channel and scan index from a canonical file name.
    ///
    /// Fails only when the name has no leading digit run to use as id.
    pub fn parse(file_name: &str, path: PathBuf) -> Result<ImageFile> {
        let (stem, _) = split_extension(file_name);
        let id_len = leading_digits(stem);
        if id_len == 0 {
            return Err(Error::Parse {
                file_name: file_name.to_string(),
            });
        }

        let (id, rest) = stem.split_at(id_len);
        let rest = rest.strip_prefix('-').unwrap_or(rest);
        let (channel_name, scan_index) = split_scan_index(rest);

        Ok(ImageFile {
            id: id.to_string(),
            channel: Channel::from_name(channel_name),
            channel_name: channel_name.to_string(),
            scan_index,
            file_name: file_name.to_string(),
            path,
        })
    }

    pub fn color(&self) -> Option<Color> {
        self.channel.color()
    }
}

/// `blue-2` -> (`blue`, Some(2)); `blue` -> (`blue`, None); `-2` -> (`-2`, None).
fn split_scan_index(rest: &str) -> (&str, Option<ScanIndex>) {
    let Some(pos) = rest.rfind('-') else {
        return (rest, None);
    };

    let (name, suffix) = (&rest[..pos], &rest[pos + 1..]);
    let is_scan = !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit());
    if is_scan && !name.is_empty() {
        (name, Some(ScanIndex(suffix.to_string())))
    } else {
        (rest, None)
    }
}
