use std::path::{Path, PathBuf};

use super::{leading_digits, split_extension};

/// A pending on-disk rename from a raw name to its canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Rewrites a raw file name into `<id>-<channel>[-<scan>]<ext>`.
///
/// Whitespace runs collapse to a single `-`. When the name starts with a
/// numeric id, exactly one `-` follows it, and a digit run ending the channel
/// part is split off with a single `-`. The id itself and the extension are
/// never altered. Canonical names come back unchanged.
pub fn normalize_file_name(file_name: &str) -> String {
    let joined = file_name.split_whitespace().collect::<Vec<_>>().join("-");

    let (stem, ext) = split_extension(&joined);
    let id_len = leading_digits(stem);
    if id_len == 0 {
        return joined;
    }

    let (id, rest) = stem.split_at(id_len);
    let channel = rest.trim_start_matches('-');
    if channel.is_empty() {
        return joined;
    }

    format!("{}-{}{}", id, separate_trailing_digits(channel), ext)
}

/// `red2` -> `red-2`, `red--2` -> `red-2`. Leaves all-digit input alone.
fn separate_trailing_digits(channel: &str) -> String {
    let head = channel.trim_end_matches(|c: char| c.is_ascii_digit());
    if head.len() == channel.len() {
        return channel.to_string();
    }

    let digits = &channel[head.len()..];
    let head = head.trim_end_matches('-');
    if head.is_empty() {
        return channel.to_string();
    }

    format!("{}-{}", head, digits)
}

/// Canonical path for `path`, in the same directory.
///
/// Returns `None` when the file name is not valid UTF-8.
pub fn normalized_path(path: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_str()?;
    Some(path.with_file_name(normalize_file_name(file_name)))
}

/// Renames needed to bring every path to canonical form, in input order.
/// Paths that are already canonical (or not UTF-8) produce no entry.
pub fn plan_renames(paths: &[PathBuf]) -> Vec<Rename> {
    paths
        .iter()
        .filter_map(|from| {
            let to = normalized_path(from)?;
            (to != *from).then(|| Rename {
                from: from.clone(),
                to,
            })
        })
        .collect()
}
