use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chanmerge::{Config, CorrectionMethod, DiskStore, ExistingPolicy, GroupingMode};
use clap::Parser;
use common::log_setup::{LogOptions, setup_logging};

#[derive(Parser)]
#[command(name = "chanmerge")]
#[command(
    version,
    about = "Merge single-channel microscopy TIFFs into illumination-corrected RGB composites",
    long_about = "Merge single-channel microscopy TIFFs into illumination-corrected RGB composites.\n\n\
        Files must be named <id>-<channel>[-<scan>].tif. Noisy names are renamed in place \
        first, which can overwrite a file that already has the canonical name. Composites \
        overwrite existing outputs of the same name unless --skip-existing is given."
)]
struct Cli {
    /// Folder containing the images to merge
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output folder, relative to INPUT unless absolute [default: merge_corrected]
    #[arg(short = 'd', long, value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Gaussian sigma for illumination correction; usable values depend heavily
    /// on the image set [default: 50]
    #[arg(short, long, value_name = "FLOAT")]
    sigma: Option<f32>,

    /// YAML configuration file; command-line flags override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Id matching: "exact" or legacy "substring"
    #[arg(long, value_name = "MODE")]
    grouping: Option<GroupingMode>,

    /// Background removal: "subtract" or "divide"
    #[arg(long, value_name = "METHOD")]
    method: Option<CorrectionMethod>,

    /// Normalize names in memory only, leave files on disk untouched
    #[arg(long)]
    no_rename: bool,

    /// Keep existing files instead of overwriting them
    #[arg(long)]
    skip_existing: bool,

    /// Process groups one at a time
    #[arg(long)]
    sequential: bool,

    /// Base log level, overridden by RUST_LOG
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Folder for rolled log files
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: PathBuf,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_yaml_file(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => Config::default(),
        };

        config.input_dir = self.input;
        if let Some(outdir) = self.outdir {
            config.output_dir = outdir;
        }
        if let Some(sigma) = self.sigma {
            config.sigma = sigma;
        }
        if let Some(grouping) = self.grouping {
            config.grouping = grouping;
        }
        if let Some(method) = self.method {
            config.method = method;
        }
        if self.no_rename {
            config.rename_files = false;
        }
        if self.skip_existing {
            config.existing = ExistingPolicy::Skip;
        }
        if self.sequential {
            config.parallel = false;
        }

        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_options = LogOptions {
        base_level: &cli.log_level,
        app_name: "chanmerge",
        log_dir: &cli.log_dir,
    };
    if let Err(e) = setup_logging(&log_options) {
        eprintln!("chanmerge: {}", e);
        return ExitCode::FAILURE;
    }

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config()?;
    tracing::info!(
        input = %config.input_dir.display(),
        sigma = config.sigma,
        method = %config.method,
        grouping = %config.grouping,
        "Starting"
    );

    let report = chanmerge::run(&config, &DiskStore).context("Merge run failed")?;

    println!(
        "Wrote {} composite(s) to {}",
        report.written.len(),
        config.resolved_output_dir().display()
    );
    if !report.incomplete_groups.is_empty() {
        println!(
            "Not merged (missing a color): {}",
            report.incomplete_groups.join(", ")
        );
    }
    if !report.failures.is_empty() {
        println!("{} item(s) failed:", report.failures.len());
        for failure in &report.failures {
            println!("  {}: {}", failure.subject, failure.error);
        }
    }
    if !report.warnings.is_empty() {
        println!("{} existing file(s) were overwritten or kept", report.warnings.len());
    }

    Ok(())
}
