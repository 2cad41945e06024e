use std::path::PathBuf;
use thiserror::Error;

use crate::exif::TiffError;

/// Why normalizing a single file failed.
///
/// Every variant is local to one file; the batch runner records it and moves
/// on to the next file.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot decode {} as JPEG: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("cannot parse EXIF metadata of {}: {source}", path.display())]
    MetadataParse { path: PathBuf, source: TiffError },

    #[error("failed to re-encode {}: {reason}", path.display())]
    Encode { path: PathBuf, reason: String },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl NormalizeError {
    /// Short category name used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Decode { .. } => "decode",
            Self::MetadataParse { .. } => "metadata",
            Self::Encode { .. } => "encode",
            Self::Write { .. } => "write",
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. }
            | Self::Decode { path, .. }
            | Self::MetadataParse { path, .. }
            | Self::Encode { path, .. }
            | Self::Write { path, .. } => path,
        }
    }
}
