//! EXIF reading, orientation reset, and JPEG metadata splicing.
//!
//! - [`read_orientation`] / [`reset_orientation`] — walk the raw TIFF block of an
//!   EXIF APP1 segment and read or rewrite the IFD0 Orientation entry
//! - [`unlink_thumbnail`] — drop the IFD1 thumbnail link after a rotation
//! - [`extract_metadata`] / [`embed_metadata`] — move the EXIF block and ICC
//!   profile between JPEG streams with img-parts
//! - [`read_summary`] — descriptive camera fields for reporting (nom-exif)

mod reader;
mod tiff;
mod writer;

pub use reader::{ExifSummary, read_summary};
pub use tiff::{TiffError, read_orientation, reset_orientation, unlink_thumbnail};
pub use writer::{CarriedMetadata, embed_metadata, extract_metadata};
