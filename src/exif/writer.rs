use img_parts::jpeg::{Jpeg, JpegSegment};
use img_parts::{Bytes, ImageEXIF, ImageICC};

/// EXIF APP1 segments start with this identifier, followed by the TIFF data.
const EXIF_PREFIX: &[u8] = b"Exif\0\0";

const MARKER_APP0: u8 = 0xE0;
const MARKER_APP1: u8 = 0xE1;

/// Metadata carried from the original file into the re-encoded one.
#[derive(Debug, Clone, Default)]
pub struct CarriedMetadata {
    /// Raw TIFF data of the EXIF block (without the `Exif\0\0` prefix).
    pub exif: Option<Bytes>,
    /// Embedded ICC colour profile.
    pub icc_profile: Option<Bytes>,
}

/// Split a JPEG into segments and pull out the EXIF block and ICC profile.
pub fn extract_metadata(jpeg_bytes: &[u8]) -> Result<CarriedMetadata, img_parts::Error> {
    let jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(jpeg_bytes))?;
    let exif = jpeg.exif().filter(|e| !e.is_empty());
    let icc_profile = jpeg.icc_profile().filter(|p| !p.is_empty());
    log::debug!(
        "EXIF block: {} bytes, ICC profile: {} bytes",
        exif.as_ref().map_or(0, |e| e.len()),
        icc_profile.as_ref().map_or(0, |p| p.len())
    );
    Ok(CarriedMetadata { exif, icc_profile })
}

/// Splice metadata into a freshly encoded JPEG stream.
///
/// The encoder output has no EXIF of its own, so `metadata.exif` becomes the
/// only APP1 EXIF segment. It is placed directly after the JFIF APP0 header
/// (or first, when there is none) where EXIF readers expect it.
pub fn embed_metadata(
    encoded: Vec<u8>,
    metadata: &CarriedMetadata,
) -> Result<Vec<u8>, img_parts::Error> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(encoded))?;

    if let Some(ref icc) = metadata.icc_profile {
        jpeg.set_icc_profile(Some(icc.clone()));
    }

    if let Some(ref exif) = metadata.exif {
        jpeg.set_exif(Some(exif.clone()));

        let segments = jpeg.segments_mut();
        let target = usize::from(segments.first().is_some_and(|s| s.marker() == MARKER_APP0));
        if let Some(pos) = find_exif_segment_pos(segments) {
            if pos != target {
                let seg = segments.remove(pos);
                segments.insert(target, seg);
            }
        }
    }

    Ok(jpeg.encoder().bytes().to_vec())
}

/// Find the position of the EXIF APP1 segment.
fn find_exif_segment_pos(segments: &[JpegSegment]) -> Option<usize> {
    segments
        .iter()
        .position(|s| s.marker() == MARKER_APP1 && s.contents().starts_with(EXIF_PREFIX))
}
