//! Minimal TIFF/EXIF block walking.
//!
//! Only IFD0 is visited: that is where the Orientation tag lives. The block is
//! patched in place, so every other entry and sub-IFD keeps its exact bytes and
//! offsets. The IFD1 thumbnail can be unlinked once the pixels it previews have
//! been rotated.

use thiserror::Error;

use crate::orientation::{OrientationCode, TAG_ORIENTATION};

const TIFF_MAGIC: u16 = 42;
const IFD_ENTRY_LEN: usize = 12;

// TIFF data formats an Orientation value may be stored with
const FORMAT_SHORT: u16 = 3;
const FORMAT_LONG: u16 = 4;

/// Why a raw EXIF block could not be read or rewritten.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TiffError {
    #[error("EXIF block too short ({0} bytes)")]
    TooShort(usize),
    #[error("invalid TIFF byte order marker")]
    ByteOrder,
    #[error("invalid TIFF magic number {0}")]
    Magic(u16),
    #[error("{0} out of bounds")]
    OutOfBounds(&'static str),
    #[error("Orientation tag stored with unsupported format {0}")]
    Format(u16),
    #[error("no Orientation tag in IFD0")]
    MissingOrientation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    fn u16(self, data: &[u8], offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = data.get(offset..offset + 2)?.try_into().ok()?;
        Some(match self {
            Self::Big => u16::from_be_bytes(bytes),
            Self::Little => u16::from_le_bytes(bytes),
        })
    }

    fn u32(self, data: &[u8], offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
        Some(match self {
            Self::Big => u32::from_be_bytes(bytes),
            Self::Little => u32::from_le_bytes(bytes),
        })
    }

    fn encode_u16(self, val: u16) -> [u8; 2] {
        match self {
            Self::Big => val.to_be_bytes(),
            Self::Little => val.to_le_bytes(),
        }
    }

    fn encode_u32(self, val: u32) -> [u8; 4] {
        match self {
            Self::Big => val.to_be_bytes(),
            Self::Little => val.to_le_bytes(),
        }
    }
}

/// Location of the Orientation entry inside the block.
struct OrientationEntry {
    offset: usize,
    format: u16,
}

/// What [`locate`] found in IFD0.
struct Ifd0 {
    order: ByteOrder,
    entry: Option<OrientationEntry>,
    /// Offset of the 4-byte pointer to IFD1 that follows the entries.
    next_at: usize,
}

/// Parse the TIFF header and find the Orientation entry of IFD0, if any.
fn locate(tiff: &[u8]) -> Result<Ifd0, TiffError> {
    if tiff.len() < 8 {
        return Err(TiffError::TooShort(tiff.len()));
    }

    let order = match &tiff[0..2] {
        b"MM" => ByteOrder::Big,
        b"II" => ByteOrder::Little,
        _ => return Err(TiffError::ByteOrder),
    };

    let magic = order.u16(tiff, 2).ok_or(TiffError::TooShort(tiff.len()))?;
    if magic != TIFF_MAGIC {
        return Err(TiffError::Magic(magic));
    }

    let ifd0_offset = order
        .u32(tiff, 4)
        .ok_or(TiffError::TooShort(tiff.len()))? as usize;
    let count = order
        .u16(tiff, ifd0_offset)
        .ok_or(TiffError::OutOfBounds("IFD0 offset"))? as usize;
    let entries_start = ifd0_offset + 2;
    if entries_start + count * IFD_ENTRY_LEN > tiff.len() {
        return Err(TiffError::OutOfBounds("IFD0 entries"));
    }

    let entry = (0..count)
        .map(|i| entries_start + i * IFD_ENTRY_LEN)
        .find(|&eo| order.u16(tiff, eo) == Some(TAG_ORIENTATION))
        .map(|eo| OrientationEntry {
            offset: eo,
            format: order.u16(tiff, eo + 2).unwrap_or_default(),
        });

    Ok(Ifd0 {
        order,
        entry,
        next_at: entries_start + count * IFD_ENTRY_LEN,
    })
}

/// Read the Orientation code stored in IFD0.
///
/// Returns `Ok(None)` when the block is well-formed but has no Orientation tag.
pub fn read_orientation(tiff: &[u8]) -> Result<Option<OrientationCode>, TiffError> {
    let Ifd0 { order, entry, .. } = locate(tiff)?;
    let Some(entry) = entry else {
        return Ok(None);
    };

    // value field sits after tag (2), format (2) and count (4)
    let value_at = entry.offset + 8;
    let value = match entry.format {
        FORMAT_SHORT => order.u16(tiff, value_at),
        FORMAT_LONG => order
            .u32(tiff, value_at)
            .map(|v| u16::try_from(v).unwrap_or(u16::MAX)),
        other => return Err(TiffError::Format(other)),
    };

    Ok(value.map(OrientationCode::new))
}

/// Return a copy of the block with the Orientation entry set to 1.
///
/// The entry is rewritten in place in the block's own byte order; nothing
/// else moves.
pub fn reset_orientation(tiff: &[u8]) -> Result<Vec<u8>, TiffError> {
    let Ifd0 { order, entry, .. } = locate(tiff)?;
    let entry = entry.ok_or(TiffError::MissingOrientation)?;

    let mut out = tiff.to_vec();
    let value_at = entry.offset + 8;
    let normal = OrientationCode::NORMAL.value();
    match entry.format {
        FORMAT_SHORT => {
            out[value_at..value_at + 2].copy_from_slice(&order.encode_u16(normal));
        }
        FORMAT_LONG => {
            out[value_at..value_at + 4].copy_from_slice(&order.encode_u32(u32::from(normal)));
        }
        other => return Err(TiffError::Format(other)),
    }

    log::debug!("Orientation entry at offset {} reset to 1", entry.offset);
    Ok(out)
}

/// Return a copy of the block with the IFD0 → IFD1 link cleared.
///
/// IFD1 holds the embedded thumbnail, which still shows the unrotated pixels.
/// Its bytes stay where they are but nothing points at them any more, so
/// readers no longer find a thumbnail that disagrees with the main image.
pub fn unlink_thumbnail(tiff: &[u8]) -> Result<Vec<u8>, TiffError> {
    let Ifd0 { order, next_at, .. } = locate(tiff)?;
    let next = order
        .u32(tiff, next_at)
        .ok_or(TiffError::OutOfBounds("IFD0 next pointer"))?;

    let mut out = tiff.to_vec();
    if next != 0 {
        out[next_at..next_at + 4].copy_from_slice(&order.encode_u32(0));
        log::debug!("Unlinked IFD1 thumbnail at offset {next}");
    }
    Ok(out)
}
