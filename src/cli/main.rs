use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use exif_orient::config;
use exif_orient::normalize::{FileStatus, NormalizeOptions};
use exif_orient::pipeline::{self, FileReport};

#[derive(Parser, Debug)]
#[command(
    name = "exif-orient",
    version,
    about = "Rotate JPEG pixels to match their EXIF orientation and reset the tag to normal"
)]
struct Cli {
    /// Directory to scan for .jpg files
    #[arg(value_name = "ROOT_DIR", env = "EXIF_ORIENT_ROOT", required_unless_present = "init")]
    root_dir: Option<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Also process subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Report what would change without writing to files
    #[arg(long)]
    dry_run: bool,

    /// JPEG quality for rewritten images (1-100)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let Some(root) = cli.root_dir else {
        anyhow::bail!("No root directory specified. Use --help for usage.");
    };

    // Load config, CLI flags win
    let mut config = config::Config::load(cli.config.as_deref())?;
    if cli.recursive {
        config.recursive = true;
    }
    if cli.dry_run {
        config.dry_run = true;
    }
    if let Some(quality) = cli.quality {
        config.jpeg_quality = quality;
    }

    let images = pipeline::collect_jpegs(&root, config.recursive)?;
    if images.is_empty() {
        log::warn!("No .jpg files found in {}", root.display());
        return Ok(ExitCode::SUCCESS);
    }

    log::info!("Found {} image(s) to process", images.len());
    if config.dry_run {
        log::info!("DRY RUN — no files will be modified");
    }

    let options = NormalizeOptions::from(&config);
    let report = pipeline::run_batch(&images, &options, print_file);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    }

    // Summary
    let verb = if config.dry_run { "would rotate" } else { "rotated" };
    log::info!(
        "Done: {} {verb}, {} unchanged, {} skipped, {} failed out of {} images",
        report.processed(),
        report.unchanged(),
        report.skipped(),
        report.failed(),
        report.total()
    );

    Ok(if report.failed() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Print the per-file progress lines.
fn print_file(i: usize, total: usize, file: &FileReport) {
    log::info!("[{}/{}] {}", i + 1, total, file.path.display());

    let outcome = match &file.result {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("  Error: {e}");
            return;
        }
    };

    if let FileStatus::Skipped { reason } = outcome.status {
        log::info!("  Skipped: {reason}");
        if outcome.orientation.is_known() {
            return;
        }
    }

    log::info!(
        "  Original Orientation: {} - {}",
        outcome.orientation.value(),
        outcome.description
    );
    log::info!("  Dimensions: {} x {}", outcome.width, outcome.height);
    if let Some(ref camera) = outcome.camera {
        log::debug!("  Camera: {camera}");
    }

    match outcome.status {
        FileStatus::Rotated { dry_run: false } => log::info!(
            "  Rotated to Orientation 1 ({} x {})",
            outcome.visual_width,
            outcome.visual_height
        ),
        FileStatus::Rotated { dry_run: true } => log::info!(
            "  Would rotate to Orientation 1 ({} x {})",
            outcome.visual_width,
            outcome.visual_height
        ),
        FileStatus::Unchanged => log::info!("  Already normal"),
        FileStatus::Skipped { .. } => {}
    }
}
