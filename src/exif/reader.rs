use anyhow::{Context, Result};
use nom_exif::*;
use std::path::Path;

/// Descriptive EXIF fields shown alongside the orientation report.
///
/// Everything is best effort: a file nom-exif cannot parse yields the
/// default (all `None`). Orientation itself is read from the raw block by
/// [`crate::exif::read_orientation`], not from here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifSummary {
    pub make: Option<String>,
    pub model: Option<String>,
    pub date_time: Option<String>,
}

impl ExifSummary {
    /// One-line camera description, e.g. `"Canon EOS R5 (2023:06:01 10:00:00)"`.
    pub fn camera_line(&self) -> Option<String> {
        let camera = match (&self.make, &self.model) {
            (Some(make), Some(model)) if model.starts_with(make.as_str()) => model.clone(),
            (Some(make), Some(model)) => format!("{make} {model}"),
            (Some(one), None) | (None, Some(one)) => one.clone(),
            (None, None) => return self.date_time.clone(),
        };
        Some(match &self.date_time {
            Some(dt) => format!("{camera} ({dt})"),
            None => camera,
        })
    }
}

/// Read descriptive EXIF fields from an image file.
pub fn read_summary(path: &Path) -> Result<ExifSummary> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path).context("Failed to open image file")?;

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return Ok(ExifSummary::default());
        }
    };
    let exif: Exif = iter.into();

    Ok(ExifSummary {
        make: exif.get(ExifTag::Make).and_then(entry_to_string),
        model: exif.get(ExifTag::Model).and_then(entry_to_string),
        date_time: exif
            .get(ExifTag::DateTimeOriginal)
            .or_else(|| exif.get(ExifTag::ModifyDate))
            .and_then(entry_to_string),
    })
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s.trim().trim_matches('"').trim_end_matches('\0').trim().to_string();
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_jpeg;
    use tempfile::TempDir;

    #[test]
    fn camera_line_merges_make_and_model() {
        let summary = ExifSummary {
            make: Some("Canon".into()),
            model: Some("EOS R5".into()),
            date_time: Some("2023:06:01 10:00:00".into()),
        };
        assert_eq!(
            summary.camera_line().as_deref(),
            Some("Canon EOS R5 (2023:06:01 10:00:00)")
        );
    }

    #[test]
    fn camera_line_avoids_repeating_make() {
        let summary = ExifSummary {
            make: Some("Canon".into()),
            model: Some("Canon EOS R5".into()),
            ..Default::default()
        };
        assert_eq!(summary.camera_line().as_deref(), Some("Canon EOS R5"));
    }

    #[test]
    fn camera_line_empty() {
        assert_eq!(ExifSummary::default().camera_line(), None);
    }

    #[test]
    fn summary_of_jpeg_without_exif_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_jpeg(dir.path(), "plain.jpg", None);
        assert_eq!(read_summary(&path).unwrap(), ExifSummary::default());
    }

    #[test]
    fn summary_reads_make() {
        let dir = TempDir::new().unwrap();
        let path = write_jpeg(dir.path(), "cam.jpg", Some(6));
        let summary = read_summary(&path).unwrap();
        assert_eq!(summary.make.as_deref(), Some("TestCam"));
    }

    #[test]
    fn summary_missing_file_is_error() {
        assert!(read_summary(Path::new("/nonexistent/photo.jpg")).is_err());
    }
}
