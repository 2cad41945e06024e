use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::NormalizeError;
use crate::normalize::{self, FileOutcome, FileStatus, NormalizeOptions};

/// The only file name suffix that is processed. Matched case-sensitively.
pub const JPEG_SUFFIX: &str = ".jpg";

/// Collect the JPEG files under `root`, sorted by file name.
///
/// Only names ending in exactly `.jpg` are returned; `.JPG`, `.jpeg` and
/// everything else are ignored. Without `recursive` only direct children are
/// listed. Fails when `root` does not exist, is not a directory, or cannot be
/// listed.
///
/// # Example
///
/// ```rust,no_run
/// use exif_orient::pipeline::collect_jpegs;
/// use std::path::Path;
///
/// let files = collect_jpegs(Path::new("./photos"), false)?;
/// println!("Found {} JPEG(s)", files.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn collect_jpegs(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(root)
        .with_context(|| format!("Root directory {} does not exist", root.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }
    std::fs::read_dir(root)
        .with_context(|| format!("Cannot list directory {}", root.display()))?;

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        if entry.file_type().is_file() && is_jpeg_name(entry.path()) {
            files.push(entry.into_path());
        }
    }

    log::debug!("Collected {} file(s) under {}", files.len(), root.display());
    Ok(files)
}

/// Check if a path's file name ends in the exact `.jpg` suffix.
///
/// Compared on the raw encoded bytes, so names that are not valid UTF-8 still match.
fn is_jpeg_name(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().ends_with(JPEG_SUFFIX.as_bytes()))
}

/// The result of processing one file in a batch.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: Result<FileOutcome, NormalizeError>,
}

impl FileReport {
    /// JSON view: the outcome fields plus `path`, or `status: "failed"` with the error.
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = match &self.result {
            Ok(outcome) => serde_json::to_value(outcome).unwrap_or_default(),
            Err(e) => serde_json::json!({
                "status": "failed",
                "error_kind": e.kind(),
                "error": e.to_string(),
            }),
        };
        if let Some(map) = value.as_object_mut() {
            map.insert(
                "path".to_string(),
                serde_json::Value::String(self.path.display().to_string()),
            );
        }
        value
    }
}

/// Results of a whole batch, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Files rewritten (or that would be, on a dry run).
    pub fn processed(&self) -> usize {
        self.count(|r| r.as_ref().is_ok_and(FileOutcome::is_rotated))
    }

    /// Files already at orientation 1.
    pub fn unchanged(&self) -> usize {
        self.count(|r| matches!(r, Ok(o) if o.status == FileStatus::Unchanged))
    }

    /// Files with no EXIF or an unknown orientation code.
    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, Ok(o) if matches!(o.status, FileStatus::Skipped { .. })))
    }

    pub fn failed(&self) -> usize {
        self.count(Result::is_err)
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// JSON view of every file plus the summary counts.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "files": self.files.iter().map(FileReport::to_json).collect::<Vec<_>>(),
            "summary": {
                "total": self.total(),
                "processed": self.processed(),
                "unchanged": self.unchanged(),
                "skipped": self.skipped(),
                "failed": self.failed(),
            },
        })
    }

    fn count(&self, pred: impl Fn(&Result<FileOutcome, NormalizeError>) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.result)).count()
    }
}

/// Normalize every file in order, never stopping on a failure.
///
/// `on_file` is called after each file with its index, the batch size and
/// its report, so callers can print progress as it happens.
pub fn run_batch(
    files: &[PathBuf],
    options: &NormalizeOptions,
    mut on_file: impl FnMut(usize, usize, &FileReport),
) -> BatchReport {
    let total = files.len();
    let mut report = BatchReport::default();

    for (i, path) in files.iter().enumerate() {
        let result = normalize::normalize_file(path, options);
        if let Err(ref e) = result {
            log::debug!("{} failed ({}): {e}", path.display(), e.kind());
        }
        let file = FileReport {
            path: path.clone(),
            result,
        };
        on_file(i, total, &file);
        report.files.push(file);
    }

    report
}
