use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use img_parts::Bytes;
use serde::Serialize;
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::Path;

use crate::config::{Config, DEFAULT_JPEG_QUALITY};
use crate::error::NormalizeError;
use crate::exif::{self, CarriedMetadata};
use crate::orientation::OrientationCode;

/// Per-file knobs, usually derived from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub jpeg_quality: u8,
    pub dry_run: bool,
    pub keep_icc_profile: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            dry_run: false,
            keep_icc_profile: true,
        }
    }
}

impl From<&Config> for NormalizeOptions {
    fn from(config: &Config) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            dry_run: config.dry_run,
            keep_icc_profile: config.keep_icc_profile,
        }
    }
}

/// Why a file was left alone without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The file has no EXIF APP1 segment.
    NoExif,
    /// The Orientation code is outside 1..=8.
    UnknownOrientation,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoExif => f.write_str("no EXIF data found"),
            Self::UnknownOrientation => f.write_str("unknown orientation, left as-is"),
        }
    }
}

/// What happened to a file that was processed without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Pixels were rotated and Orientation reset to 1 (or would be, on a dry run).
    Rotated { dry_run: bool },
    /// Orientation already 1; the file was not touched.
    Unchanged,
    /// Nothing to do; the file was not touched.
    Skipped { reason: SkipReason },
}

/// Report for one successfully handled file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    /// Orientation code as found in the file (1 when the tag is absent).
    pub orientation: OrientationCode,
    pub description: &'static str,
    /// Stored pixel dimensions before processing.
    pub width: u32,
    pub height: u32,
    /// Dimensions as a top-left viewer shows them after processing.
    pub visual_width: u32,
    pub visual_height: u32,
    /// Camera make/model/date, when nom-exif could read them.
    pub camera: Option<String>,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileOutcome {
    fn new(orientation: OrientationCode, (width, height): (u32, u32), status: FileStatus) -> Self {
        let (visual_width, visual_height) = orientation.visual_dimensions(width, height);
        Self {
            orientation,
            description: orientation.description(),
            width,
            height,
            visual_width,
            visual_height,
            camera: None,
            status,
        }
    }

    /// True when the file on disk was (or, on a dry run, would be) rewritten.
    pub fn is_rotated(&self) -> bool {
        matches!(self.status, FileStatus::Rotated { .. })
    }
}

/// Bring one JPEG to orientation 1.
///
/// 1. **Open** — the file must decode as JPEG; dimensions come from the header
/// 2. **Detect** — the Orientation tag is read from the raw EXIF block
///    (missing tag → 1, missing EXIF → skipped)
/// 3. **Transform** — for codes 2..=8 the stream must run through to EOI; the
///    pixels are then rotated/flipped and re-encoded
/// 4. **Reset** — the original EXIF block, with Orientation rewritten to 1 and
///    the stale IFD1 thumbnail unlinked, is spliced into the new stream together
///    with the ICC profile
/// 5. **Persist** — written to a temporary file next to the resolved original
///    and renamed over it; a symlink stays a symlink
///
/// Files already at orientation 1, without EXIF, or with an unknown code are
/// never written, which makes a second run a no-op.
///
/// # Example
///
/// ```rust,no_run
/// use exif_orient::normalize::{NormalizeOptions, normalize_file};
/// use std::path::Path;
///
/// let outcome = normalize_file(Path::new("photo.jpg"), &NormalizeOptions::default())?;
/// println!("{} → {:?}", outcome.orientation, outcome.status);
/// # Ok::<(), exif_orient::error::NormalizeError>(())
/// ```
pub fn normalize_file(
    path: &Path,
    options: &NormalizeOptions,
) -> Result<FileOutcome, NormalizeError> {
    let decode_err = |reason: String| NormalizeError::Decode {
        path: path.to_path_buf(),
        reason,
    };
    let encode_err = |reason: String| NormalizeError::Encode {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = fs::read(path).map_err(|source| NormalizeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .map_err(|e| decode_err(e.to_string()))?;
    if reader.format() != Some(ImageFormat::Jpeg) {
        return Err(decode_err("not a JPEG stream".to_string()));
    }
    let decoder = reader.into_decoder().map_err(|e| decode_err(e.to_string()))?;
    let dimensions = decoder.dimensions();

    let metadata = exif::extract_metadata(&bytes).map_err(|e| decode_err(e.to_string()))?;
    let camera = camera_line(path);

    let Some(raw_exif) = metadata.exif.as_deref() else {
        log::debug!("{}: no EXIF block", path.display());
        let mut outcome = FileOutcome::new(
            OrientationCode::NORMAL,
            dimensions,
            FileStatus::Skipped { reason: SkipReason::NoExif },
        );
        outcome.camera = camera;
        return Ok(outcome);
    };

    let metadata_err = |source| NormalizeError::MetadataParse {
        path: path.to_path_buf(),
        source,
    };
    let orientation = exif::read_orientation(raw_exif)
        .map_err(metadata_err)?
        .unwrap_or_default();
    log::debug!("{}: orientation {orientation}", path.display());

    let status = if orientation.is_normal() {
        FileStatus::Unchanged
    } else if !orientation.is_known() {
        FileStatus::Skipped { reason: SkipReason::UnknownOrientation }
    } else {
        FileStatus::Rotated { dry_run: options.dry_run }
    };
    if matches!(status, FileStatus::Rotated { .. }) && !has_complete_scan(&bytes) {
        return Err(decode_err("truncated JPEG stream (missing EOI)".to_string()));
    }
    let mut outcome = FileOutcome::new(orientation, dimensions, status);
    outcome.camera = camera;

    let FileStatus::Rotated { dry_run: false } = status else {
        return Ok(outcome);
    };
    let Some(transform) = orientation.transform() else {
        return Ok(outcome);
    };

    // Pixels
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| decode_err(e.to_string()))?;
    img.apply_orientation(transform);
    let encoded = encode_jpeg(&img, options.jpeg_quality).map_err(|e| encode_err(e.to_string()))?;

    // Metadata
    let reset = exif::reset_orientation(raw_exif)
        .and_then(|tiff| exif::unlink_thumbnail(&tiff))
        .map_err(metadata_err)?;
    let carried = CarriedMetadata {
        exif: Some(Bytes::from(reset)),
        icc_profile: metadata.icc_profile.filter(|_| options.keep_icc_profile),
    };
    let output = exif::embed_metadata(encoded, &carried).map_err(|e| encode_err(e.to_string()))?;

    replace_file(path, &output).map_err(|source| NormalizeError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!(
        "{}: rewritten as {}x{} ({} bytes)",
        path.display(),
        img.width(),
        img.height(),
        output.len()
    );

    Ok(outcome)
}

fn camera_line(path: &Path) -> Option<String> {
    match exif::read_summary(path) {
        Ok(summary) => summary.camera_line(),
        Err(e) => {
            log::debug!("Could not read camera info from {}: {e}", path.display());
            None
        }
    }
}

/// Walk the marker segments and the entropy-coded data after each SOS, and
/// report whether the stream reaches its EOI marker.
///
/// The decoder may fill missing scan data with grey instead of failing, so a
/// file cut short would otherwise be rotated and saved with the damage baked in.
fn has_complete_scan(bytes: &[u8]) -> bool {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return false;
    }

    let mut pos = 2;
    while pos + 1 < bytes.len() {
        if bytes[pos] != 0xFF {
            return false;
        }
        let marker = bytes[pos + 1];
        match marker {
            // fill byte before a marker
            0xFF => {
                pos += 1;
                continue;
            }
            0xD9 => return true,
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let Some(&[hi, lo]) = bytes.get(pos + 2..pos + 4) else {
            return false;
        };
        pos += 2 + usize::from(u16::from_be_bytes([hi, lo]));

        if marker == 0xDA {
            // scan data ends at the first marker that is neither stuffing nor a restart
            loop {
                match bytes.get(pos..pos + 2) {
                    None => return false,
                    Some([0xFF, 0x00 | 0xD0..=0xD7]) => pos += 2,
                    Some([0xFF, _]) => break,
                    Some(_) => pos += 1,
                }
            }
        }
    }
    false
}

/// Encode as baseline JPEG. Formats the encoder cannot take are widened to RGB8.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img.write_with_encoder(encoder)?,
        other => DynamicImage::ImageRgb8(other.to_rgb8()).write_with_encoder(encoder)?,
    }
    Ok(buf)
}

/// Replace `path` with `data` via a temporary file in the same directory and
/// an atomic rename. The original stays intact if anything fails.
///
/// Symlinks are resolved first so the rename lands on the target file and the
/// link itself is left in place.
fn replace_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let target = fs::canonicalize(path)?;
    let permissions = fs::metadata(&target)?.permissions();
    if permissions.readonly() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "file is read-only",
        ));
    }

    let dir = target.parent().unwrap_or(Path::new("/"));
    let mut tmp = tempfile::Builder::new()
        .prefix(".exif-orient-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}
