use std::path::PathBuf;

use thiserror::Error;

/// Every failure the merge pipeline can report.
///
/// Only [`Error::Config`] and a failure to list the input directory abort a
/// run. Everything else is recorded against the file, group or combination it
/// concerns and the run moves on.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot extract a sample id from file name '{file_name}'")]
    Parse { file_name: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(
        "Channel rasters differ in size: red {red:?}, green {green:?}, blue {blue:?} (width, height)"
    )]
    DimensionMismatch {
        red: (usize, usize),
        green: (usize, usize),
        blue: (usize, usize),
    },

    #[error("Channel rasters differ in sample depth: red {red}, green {green}, blue {blue}")]
    SampleDepthMismatch {
        red: String,
        green: String,
        blue: String,
    },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TIFF error on '{path}': {reason}")]
    Tiff { path: PathBuf, reason: String },

    #[error("Destination '{path}' already exists")]
    DestinationExists { path: PathBuf },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn tiff(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Tiff {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors that must stop the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
