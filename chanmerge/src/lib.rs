//! Chanmerge - illumination-corrected RGB composites from single-channel
//! microscopy TIFFs.
//!
//! Sample identity, color and alternate-scan index come from file names
//! only:
//!
//! ```text
//! <id>-<channel_name>[-<scan>].tif
//! 01-red.tif
//! 23-blue-2.tif      # alternate blue scan of sample 23
//! 44-guleinoiena.tif # first letter wins: green
//! 10-bfue.tif        # `bf` prefix: brightfield, never merged
//! ```
//!
//! Each channel has its illumination flattened by subtracting a wide Gaussian
//! blur, then the three channels are stacked into `<id>-rgb.tif`. When a color
//! has several scans, every red x green x blue combination is written.
//!
//! Renaming to canonical names happens in place, and composites replace
//! existing files of the same name by default. Both cases are reported as
//! warnings; [`ExistingPolicy::Skip`] keeps existing files instead.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use chanmerge::{Config, DiskStore, run};
//!
//! let config = Config { sigma: 30.0, ..Config::new("plate_07") };
//! let report = run(&config, &DiskStore)?;
//! println!("Wrote {} composites", report.written.len());
//! ```

pub mod combination;
pub mod compositor;
pub mod config;
pub mod error;
pub mod filename;
pub mod grouping;
pub mod illumination;
pub mod pipeline;
pub mod raster;
pub mod store;

// ============================================================================
// Configuration and errors
// ============================================================================

pub use config::{Config, DEFAULT_OUTPUT_DIR, ExistingPolicy};
pub use error::{Error, Result};

// ============================================================================
// File names and grouping
// ============================================================================

pub use combination::{Combination, combinations};
pub use filename::{Channel, Color, ImageFile, Rename, ScanIndex, normalize_file_name, plan_renames};
pub use grouping::{GroupingMode, ImageGroup, build_groups};

// ============================================================================
// Image processing
// ============================================================================

pub use compositor::compose;
pub use illumination::{
    CorrectionMethod, DEFAULT_SIGMA, MAX_SIGMA, correct_illumination, gaussian_blur,
};
pub use raster::{Raster, RgbRaster, SampleDepth};

// ============================================================================
// Running
// ============================================================================

pub use pipeline::{Failure, RunReport, run};
pub use store::{DiskStore, ImageStore};
