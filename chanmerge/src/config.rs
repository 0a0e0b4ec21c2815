//! Run configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::error::{Error, Result};
use crate::grouping::GroupingMode;
use crate::illumination::{CorrectionMethod, DEFAULT_SIGMA, validate_sigma};

/// Default output folder, relative to the input folder.
pub const DEFAULT_OUTPUT_DIR: &str = "merge_corrected";

/// What to do when a rename target or an output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingPolicy {
    /// Warn and replace the existing file.
    #[default]
    Overwrite,
    /// Warn and leave the existing file alone.
    Skip,
}

impl ExistingPolicy {
    pub fn name(self) -> &'static str {
        match self {
            ExistingPolicy::Overwrite => "overwrite",
            ExistingPolicy::Skip => "skip",
        }
    }
}

impl fmt::Display for ExistingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExistingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ExistingPolicy::iter()
            .find(|policy| policy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown policy '{}', expected overwrite or skip", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder holding the single-channel `.tif` files.
    pub input_dir: PathBuf,
    /// Destination folder. Relative paths are taken from `input_dir`.
    pub output_dir: PathBuf,
    /// Standard deviation of the background-estimating Gaussian, in pixels.
    pub sigma: f32,
    pub method: CorrectionMethod,
    pub grouping: GroupingMode,
    /// Rename files on disk to their canonical names. When false, names are
    /// only normalized in memory.
    pub rename_files: bool,
    pub existing: ExistingPolicy,
    /// Merge groups concurrently.
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            sigma: DEFAULT_SIGMA,
            method: CorrectionMethod::default(),
            grouping: GroupingMode::default(),
            rename_files: true,
            existing: ExistingPolicy::default(),
            parallel: true,
        }
    }
}

impl Config {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            ..Self::default()
        }
    }

    /// Checks everything that must hold before any file is touched.
    pub fn validate(&self) -> Result<()> {
        validate_sigma(self.sigma)?;

        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::Config("output_dir must not be empty".to_string()));
        }

        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_yml::from_str(&yaml)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Output folder with relative paths resolved against the input folder.
    pub fn resolved_output_dir(&self) -> PathBuf {
        if self.output_dir.is_absolute() {
            self.output_dir.clone()
        } else {
            self.input_dir.join(&self.output_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.sigma, 50.0);
        assert_eq!(config.output_dir, PathBuf::from("merge_corrected"));
        assert_eq!(config.grouping, GroupingMode::Exact);
        assert_eq!(config.method, CorrectionMethod::Subtract);
        assert_eq!(config.existing, ExistingPolicy::Overwrite);
        assert!(config.rename_files);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unusable_sigma_is_a_config_error() {
        for sigma in [0.0, -5.0, f32::NAN, 1e20] {
            let config = Config {
                sigma,
                ..Config::default()
            };
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn empty_output_dir_is_rejected() {
        let config = Config {
            output_dir: PathBuf::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn output_dir_resolves_against_input() {
        let config = Config::new("/data/plate1");
        assert_eq!(
            config.resolved_output_dir(),
            PathBuf::from("/data/plate1/merge_corrected")
        );

        let config = Config {
            output_dir: PathBuf::from("/tmp/out"),
            ..Config::new("/data/plate1")
        };
        assert_eq!(config.resolved_output_dir(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn yaml_fills_missing_fields_with_defaults() {
        let config = Config::from_yaml_str(
            "input_dir: plates/a\nsigma: 12.5\ngrouping: substring\nexisting: skip\n",
        )
        .unwrap();

        assert_eq!(config.input_dir, PathBuf::from("plates/a"));
        assert_eq!(config.sigma, 12.5);
        assert_eq!(config.grouping, GroupingMode::Substring);
        assert_eq!(config.existing, ExistingPolicy::Skip);
        assert_eq!(config.method, CorrectionMethod::Subtract);
        assert!(config.parallel);
    }

    #[test]
    fn yaml_with_unknown_variant_is_a_config_error() {
        let result = Config::from_yaml_str("method: multiply\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn yaml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chanmerge.yaml");
        let config = Config {
            sigma: 8.0,
            method: CorrectionMethod::Divide,
            parallel: false,
            ..Config::new("images")
        };

        std::fs::write(&path, serde_yml::to_string(&config).unwrap()).unwrap();

        assert_eq!(Config::from_yaml_file(&path).unwrap(), config);
    }

    #[test]
    fn policy_parses_by_name() {
        assert_eq!("skip".parse::<ExistingPolicy>(), Ok(ExistingPolicy::Skip));
        assert_eq!("OVERWRITE".parse::<ExistingPolicy>(), Ok(ExistingPolicy::Overwrite));
        assert!("ask".parse::<ExistingPolicy>().is_err());
    }
}
