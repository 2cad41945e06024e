//! # exif-orient
//!
//! Normalize JPEG orientation: read the EXIF Orientation tag, physically rotate
//! or flip the pixels so a naive viewer shows the picture upright, reset the tag
//! to 1 ("normal"), and write the result back in place.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_orient::config::Config;
//! use exif_orient::normalize::NormalizeOptions;
//! use exif_orient::pipeline::{collect_jpegs, run_batch};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let files = collect_jpegs(Path::new("./photos"), config.recursive)?;
//!
//!     let report = run_batch(&files, &NormalizeOptions::from(&config), |i, total, file| {
//!         println!("[{}/{}] {}", i + 1, total, file.path.display());
//!     });
//!
//!     println!(
//!         "{} rotated, {} unchanged, {} skipped, {} failed",
//!         report.processed(),
//!         report.unchanged(),
//!         report.skipped(),
//!         report.failed()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Behavior
//!
//! | Orientation | Action |
//! |-------------|--------|
//! | 1, or tag absent | Nothing written |
//! | 2–8 | Pixels transformed, re-encoded, Orientation set to 1, other EXIF kept |
//! | outside 1–8 | Reported as "Unknown", nothing written |
//! | no EXIF block | Reported, nothing written |
//!
//! Rewrites go through a temporary file and an atomic rename, so an
//! interrupted run never leaves a truncated image behind.
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`error`] — Per-file error taxonomy
//! - [`exif`] — Raw EXIF orientation access and JPEG metadata splicing
//! - [`normalize`] — Single-file orientation normalizer
//! - [`orientation`] — Orientation codes and their meaning
//! - [`pipeline`] — Directory walking and batch reporting

pub mod config;
pub mod error;
pub mod exif;
pub mod normalize;
pub mod orientation;
pub mod pipeline;

#[cfg(test)]
mod test_support;
