//! Expands a group into every red x green x blue triple and names the output
//! of each one.

use std::collections::HashMap;

use crate::filename::{Color, ImageFile};
use crate::grouping::ImageGroup;

/// Groups expanding past this many combinations get a warning.
pub const LARGE_COMBINATION_COUNT: usize = 8;

/// Suffix of every composite file name.
pub const OUTPUT_SUFFIX: &str = "rgb";

/// Label used in output names for a file without a scan index.
const PRIMARY_LABEL: &str = "p";

/// One concrete triple to merge, with its destination file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination<'a> {
    pub group_id: &'a str,
    pub red: &'a ImageFile,
    pub green: &'a ImageFile,
    pub blue: &'a ImageFile,
    pub file_name: String,
}

impl<'a> Combination<'a> {
    pub fn file(&self, color: Color) -> &'a ImageFile {
        match color {
            Color::Red => self.red,
            Color::Green => self.green,
            Color::Blue => self.blue,
        }
    }
}

/// Cartesian product of the group's color sequences, red outermost, then
/// green, then blue.
///
/// A group with one file per color yields a single `<id>-rgb.tif`. Larger
/// products embed per-color labels, `<id>-rgb-r<R>-g<G>-b<B>.tif`, which are
/// unique within the group. An incomplete group yields nothing.
pub fn combinations(group: &ImageGroup) -> Vec<Combination<'_>> {
    let count = group.combination_count();
    if count == 0 {
        return Vec::new();
    }

    if count > LARGE_COMBINATION_COUNT {
        tracing::warn!(
            id = %group.id,
            red = group.red.len(),
            green = group.green.len(),
            blue = group.blue.len(),
            count,
            "Group expands to many combinations"
        );
    }

    let red_labels = scan_labels(&group.red);
    let green_labels = scan_labels(&group.green);
    let blue_labels = scan_labels(&group.blue);

    let mut result = Vec::with_capacity(count);
    for (red, r) in group.red.iter().zip(&red_labels) {
        for (green, g) in group.green.iter().zip(&green_labels) {
            for (blue, b) in group.blue.iter().zip(&blue_labels) {
                let file_name = if count == 1 {
                    format!("{}-{}.tif", group.id, OUTPUT_SUFFIX)
                } else {
                    format!("{}-{}-r{}-g{}-b{}.tif", group.id, OUTPUT_SUFFIX, r, g, b)
                };

                result.push(Combination {
                    group_id: &group.id,
                    red,
                    green,
                    blue,
                    file_name,
                });
            }
        }
    }

    result
}

/// Scan digits, or `p` for the primary scan. Labels shared by several files
/// get `.<position>` appended (1-based) so every label is unique.
fn scan_labels(files: &[ImageFile]) -> Vec<String> {
    let base: Vec<&str> = files
        .iter()
        .map(|f| f.scan_index.as_ref().map_or(PRIMARY_LABEL, |s| s.as_str()))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in &base {
        *counts.entry(*label).or_default() += 1;
    }

    base.iter()
        .enumerate()
        .map(|(i, label)| {
            if counts[label] > 1 {
                format!("{}.{}", label, i + 1)
            } else {
                label.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::PathBuf;

    use super::*;
    use crate::grouping::{GroupingMode, build_groups};

    fn group(names: &[&str]) -> ImageGroup {
        let files: Vec<ImageFile> = names
            .iter()
            .map(|name| ImageFile::parse(name, PathBuf::from(name)).unwrap())
            .collect();
        let mut groups = build_groups(&files, GroupingMode::Exact);
        assert_eq!(groups.len(), 1);
        groups.remove(0)
    }

    #[test]
    fn single_file_per_color_gives_one_plain_name() {
        let group = group(&["01-red.tif", "01-green.tif", "01-blue.tif"]);

        let combos = combinations(&group);

        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].file_name, "01-rgb.tif");
        assert_eq!(combos[0].group_id, "01");
        assert_eq!(combos[0].red.file_name, "01-red.tif");
        assert_eq!(combos[0].file(Color::Blue).file_name, "01-blue.tif");
    }

    #[test]
    fn alternate_blue_scans_give_two_named_outputs() {
        let group = group(&["02-red.tif", "02-green.tif", "02-blue-1.tif", "02-blue-2.tif"]);

        let combos = combinations(&group);

        let names: Vec<&str> = combos.iter().map(|c| c.file_name.as_str()).collect();
        assert_eq!(names, vec!["02-rgb-rp-gp-b1.tif", "02-rgb-rp-gp-b2.tif"]);
        assert!(combos.iter().all(|c| c.red.file_name == "02-red.tif"));
    }

    #[test]
    fn count_is_product_of_channel_lengths() {
        let group = group(&[
            "05-red.tif",
            "05-red-2.tif",
            "05-green.tif",
            "05-green-2.tif",
            "05-green-3.tif",
            "05-blue.tif",
            "05-blue-4.tif",
        ]);

        let combos = combinations(&group);

        assert_eq!(combos.len(), 2 * 3 * 2);
        assert_eq!(combos.len(), group.combination_count());
        let unique: HashSet<&str> = combos.iter().map(|c| c.file_name.as_str()).collect();
        assert_eq!(unique.len(), combos.len());
    }

    #[test]
    fn red_is_outermost_and_blue_innermost() {
        let group = group(&[
            "06-red-1.tif",
            "06-red-2.tif",
            "06-green.tif",
            "06-blue-1.tif",
            "06-blue-2.tif",
        ]);

        let order: Vec<(&str, &str)> = combinations(&group)
            .iter()
            .map(|c| (c.red.file_name.as_str(), c.blue.file_name.as_str()))
            .collect();

        assert_eq!(
            order,
            vec![
                ("06-red-1.tif", "06-blue-1.tif"),
                ("06-red-1.tif", "06-blue-2.tif"),
                ("06-red-2.tif", "06-blue-1.tif"),
                ("06-red-2.tif", "06-blue-2.tif"),
            ]
        );
    }

    #[test]
    fn duplicate_scan_labels_are_disambiguated() {
        // `blue-2` and `bleu-2` are both blue scan 2.
        let group = group(&["07-red.tif", "07-green.tif", "07-blue-2.tif", "07-bleu-2.tif"]);

        let names: Vec<String> = combinations(&group)
            .into_iter()
            .map(|c| c.file_name)
            .collect();

        assert_eq!(names, vec!["07-rgb-rp-gp-b2.1.tif", "07-rgb-rp-gp-b2.2.tif"]);
    }

    #[test]
    fn naming_is_deterministic_for_fixed_channel_order() {
        let names = [
            "08-red.tif",
            "08-green-3.tif",
            "08-green.tif",
            "08-blue.tif",
        ];
        let first: Vec<String> = combinations(&group(&names))
            .into_iter()
            .map(|c| c.file_name)
            .collect();
        let second: Vec<String> = combinations(&group(&names))
            .into_iter()
            .map(|c| c.file_name)
            .collect();

        assert_eq!(first, second);
        assert_eq!(first, vec!["08-rgb-rp-g3-bp.tif", "08-rgb-rp-gp-bp.tif"]);
    }

    #[test]
    fn incomplete_group_has_no_combinations() {
        let group = group(&["10-red.tif", "10-green.tif", "10-bfue.tif"]);
        assert!(combinations(&group).is_empty());
    }
}
