//! End-to-end merge run: normalize names, parse, group, expand, correct,
//! compose, write.
//!
//! Failures below the run level are isolated: a bad file, group or
//! combination is logged, recorded in the [`RunReport`] and skipped.


use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use strum::IntoEnumIterator;

use crate::combination::combinations;
use crate::compositor::write_composite;
use crate::config::{Config, ExistingPolicy};
use crate::error::{Error, Result};
use crate::filename::{Channel, Color, ImageFile, Rename, plan_renames};
use crate::grouping::{ImageGroup, build_groups};
use crate::illumination::correct_illumination;
use crate::raster::Raster;
use crate::store::ImageStore;

/// Something that was skipped, and why.
#[derive(Debug)]
pub struct Failure {
    /// File path, group id or output name the failure concerns.
    pub subject: String,
    pub error: Error,
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Renames performed on disk.
    pub renamed: Vec<Rename>,
    /// Composites written, sorted.
    pub written: Vec<PathBuf>,
    /// Groups not merged because a color had no files.
    pub incomplete_groups: Vec<String>,
    /// Output names not written because an input failed or the destination
    /// was kept.
    pub skipped: Vec<String>,
    pub failures: Vec<Failure>,
    /// Existing files that were, or would have been, overwritten.
    pub warnings: Vec<Error>,
}

impl RunReport {
    fn fail(&mut self, subject: impl Into<String>, error: Error) {
        let subject = subject.into();
        tracing::warn!(subject = %subject, error = %error, "Skipping");
        self.failures.push(Failure { subject, error });
    }

    fn destination_exists(&mut self, path: &Path) {
        tracing::warn!(path = %path.display(), "Destination already exists");
        self.warnings.push(Error::DestinationExists {
            path: path.to_path_buf(),
        });
    }

    fn absorb(&mut self, other: RunReport) {
        self.renamed.extend(other.renamed);
        self.written.extend(other.written);
        self.incomplete_groups.extend(other.incomplete_groups);
        self.skipped.extend(other.skipped);
        self.failures.extend(other.failures);
        self.warnings.extend(other.warnings);
    }
}

/// Runs the whole merge described by `config` against `store`.
///
/// Returns an error only for an invalid configuration or when the input or
/// output folder cannot be used at all.
pub fn run(config: &Config, store: &dyn ImageStore) -> Result<RunReport> {
    config.validate()?;

    let paths = store.list_tif_files(&config.input_dir)?;
    tracing::info!(
        dir = %config.input_dir.display(),
        count = paths.len(),
        "Found TIFF files"
    );

    let mut report = RunReport::default();

    let sources = normalize_names(config, store, &paths, &mut report);
    let files = parse_files(sources, &mut report);
    let groups = build_groups(&files, config.grouping);

    let eligible: Vec<&ImageGroup> = groups
        .iter()
        .filter(|group| {
            if group.is_complete() {
                return true;
            }
            let missing: Vec<String> = group
                .missing_colors()
                .iter()
                .map(Color::to_string)
                .collect();
            tracing::warn!(
                id = %group.id,
                missing = %missing.join(", "),
                "Group has no file for some colors, not merging"
            );
            report.incomplete_groups.push(group.id.clone());
            false
        })
        .collect();

    if eligible.is_empty() {
        tracing::info!("Nothing to merge");
        return Ok(report);
    }

    let output_dir = config.resolved_output_dir();
    store.create_dir_all(&output_dir)?;
    tracing::info!(dir = %output_dir.display(), groups = eligible.len(), "Merging");

    let outcomes: Vec<RunReport> = if config.parallel {
        eligible
            .par_iter()
            .map(|group| merge_group(config, store, group, &output_dir))
            .collect()
    } else {
        eligible
            .iter()
            .map(|group| merge_group(config, store, group, &output_dir))
            .collect()
    };

    for outcome in outcomes {
        report.absorb(outcome);
    }
    report.written.sort();

    tracing::info!(
        written = report.written.len(),
        failures = report.failures.len(),
        "Run complete"
    );

    Ok(report)
}

/// Brings every file name to canonical form, renaming on disk when
/// configured. Returns actual path -> canonical name, ordered by path.
fn normalize_names(
    config: &Config,
    store: &dyn ImageStore,
    paths: &[PathBuf],
    report: &mut RunReport,
) -> BTreeMap<PathBuf, String> {
    let plan = plan_renames(paths);
    let pending: HashSet<&Path> = plan.iter().map(|r| r.from.as_path()).collect();
    let mut sources = BTreeMap::new();

    for path in paths.iter().filter(|p| !pending.contains(p.as_path())) {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(file_name) => {
                sources.insert(path.clone(), file_name.to_string());
            }
            None => {
                let name = path.display().to_string();
                report.fail(name.clone(), Error::Parse { file_name: name });
            }
        }
    }

    for rename in plan {
        let Some(canonical) = rename.to.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let canonical = canonical.to_string();

        if !config.rename_files {
            sources.insert(rename.from, canonical);
            continue;
        }

        if store.exists(&rename.to) {
            report.destination_exists(&rename.to);
            if config.existing == ExistingPolicy::Skip {
                report.skipped.push(file_name_of(&rename.from));
                continue;
            }
        }

        match store.rename(&rename.from, &rename.to) {
            Ok(()) => {
                tracing::info!(
                    from = %rename.from.display(),
                    to = %canonical,
                    "Renamed"
                );
                sources.insert(rename.to.clone(), canonical);
                report.renamed.push(rename);
            }
            Err(error) => report.fail(rename.from.display().to_string(), error),
        }
    }

    sources
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parse_files(sources: BTreeMap<PathBuf, String>, report: &mut RunReport) -> Vec<ImageFile> {
    sources
        .into_iter()
        .filter_map(|(path, name)| match ImageFile::parse(&name, path) {
            Ok(file) if file.channel == Channel::Unknown => {
                tracing::warn!(
                    file = %file.file_name,
                    channel = %file.channel_name,
                    "Channel not recognized, file will not be merged"
                );
                Some(file)
            }
            Ok(file) => {
                tracing::debug!(
                    file = %file.file_name,
                    id = %file.id,
                    channel = %file.channel,
                    "Parsed"
                );
                Some(file)
            }
            Err(error) => {
                report.fail(name, error);
                None
            }
        })
        .collect()
}

/// Corrects each member file once, then writes every combination.
fn merge_group(
    config: &Config,
    store: &dyn ImageStore,
    group: &ImageGroup,
    output_dir: &Path,
) -> RunReport {
    let mut report = RunReport::default();
    let combos = combinations(group);
    tracing::info!(id = %group.id, combinations = combos.len(), "Merging group");

    let mut corrected: HashMap<&Path, Option<Raster>> = HashMap::new();
    for color in Color::iter() {
        for file in group.channel(color) {
            if corrected.contains_key(file.path.as_path()) {
                continue;
            }
            let raster = store
                .read_greyscale(&file.path)
                .and_then(|raw| correct_illumination(&raw, config.sigma, config.method));
            let raster = match raster {
                Ok(raster) => Some(raster),
                Err(error) => {
                    report.fail(file.path.display().to_string(), error);
                    None
                }
            };
            corrected.insert(&file.path, raster);
        }
    }

    for combo in &combos {
        let planes = (
            &corrected[combo.red.path.as_path()],
            &corrected[combo.green.path.as_path()],
            &corrected[combo.blue.path.as_path()],
        );
        let (Some(red), Some(green), Some(blue)) = planes else {
            tracing::debug!(output = %combo.file_name, "Input failed, skipping combination");
            report.skipped.push(combo.file_name.clone());
            continue;
        };

        let destination = output_dir.join(&combo.file_name);
        if store.exists(&destination) {
            report.destination_exists(&destination);
            if config.existing == ExistingPolicy::Skip {
                report.skipped.push(combo.file_name.clone());
                continue;
            }
        }

        match write_composite(store, &destination, red, green, blue) {
            Ok(()) => {
                tracing::info!(output = %destination.display(), "Wrote composite");
                report.written.push(destination);
            }
            Err(error) => report.fail(combo.file_name.clone(), error),
        }
    }

    report
}
