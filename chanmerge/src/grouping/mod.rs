//! Buckets parsed files into per-sample groups.


use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::filename::{Color, ImageFile};

/// How files are matched to a sample id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    /// A file joins the group whose id equals its own.
    #[default]
    Exact,
    /// Legacy behavior: a group keyed `k` takes every file whose name contains
    /// `k-`, so group `01` also absorbs `101-red.tif`. A file can end up in
    /// several groups.
    Substring,
}

impl GroupingMode {
    pub fn name(self) -> &'static str {
        match self {
            GroupingMode::Exact => "exact",
            GroupingMode::Substring => "substring",
        }
    }

    fn matches(self, key: &str, file: &ImageFile) -> bool {
        match self {
            GroupingMode::Exact => file.id == key,
            GroupingMode::Substring => file.file_name.contains(&format!("{}-", key)),
        }
    }
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GroupingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupingMode::iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown grouping mode '{}', expected exact or substring", s))
    }
}

/// All files of one sample, split by composite color.
///
/// Brightfield and unknown channels are never stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGroup {
    pub id: String,
    pub red: Vec<ImageFile>,
    pub green: Vec<ImageFile>,
    pub blue: Vec<ImageFile>,
}

impl ImageGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            red: Vec::new(),
            green: Vec::new(),
            blue: Vec::new(),
        }
    }

    pub fn channel(&self, color: Color) -> &[ImageFile] {
        match color {
            Color::Red => &self.red,
            Color::Green => &self.green,
            Color::Blue => &self.blue,
        }
    }

    fn channel_mut(&mut self, color: Color) -> &mut Vec<ImageFile> {
        match color {
            Color::Red => &mut self.red,
            Color::Green => &mut self.green,
            Color::Blue => &mut self.blue,
        }
    }

    /// Adds a file to its color bucket. Returns false if the file has no
    /// composite color and was dropped.
    pub fn push(&mut self, file: ImageFile) -> bool {
        match file.color() {
            Some(color) => {
                self.channel_mut(color).push(file);
                true
            }
            None => false,
        }
    }

    pub fn missing_colors(&self) -> Vec<Color> {
        Color::iter()
            .filter(|&color| self.channel(color).is_empty())
            .collect()
    }

    /// Eligible for merging: every color has at least one file.
    pub fn is_complete(&self) -> bool {
        self.missing_colors().is_empty()
    }

    /// Number of red x green x blue combinations this group expands to.
    pub fn combination_count(&self) -> usize {
        self.red.len() * self.green.len() * self.blue.len()
    }
}

/// Builds one group per distinct sample id, sorted by id.
///
/// Files keep their input order inside each color. Every id seen yields a
/// group, including ids whose files are all brightfield or unknown; callers
/// filter with [`ImageGroup::is_complete`].
pub fn build_groups(files: &[ImageFile], mode: GroupingMode) -> Vec<ImageGroup> {
    let ids: BTreeSet<&str> = files.iter().map(|f| f.id.as_str()).collect();

    ids.into_iter()
        .map(|id| {
            let mut group = ImageGroup::new(id);
            files
                .iter()
                .filter(|file| mode.matches(id, file))
                .for_each(|file| {
                    group.push(file.clone());
                });
            group
        })
        .collect()
}
