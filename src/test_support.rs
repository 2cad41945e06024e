//! JPEG and EXIF fixtures synthesised for tests.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::path::{Path, PathBuf};

use crate::orientation::TAG_ORIENTATION;

const TAG_MAKE: u16 = 0x010F;

pub const RED: Rgb<u8> = Rgb([220, 20, 20]);
pub const BLUE: Rgb<u8> = Rgb([20, 20, 220]);

/// Build a TIFF/EXIF block with an IFD0 holding an optional Make string
/// and an optional Orientation SHORT.
pub fn build_exif(big_endian: bool, orientation: Option<u16>, make: Option<&str>) -> Vec<u8> {
    let u16b = |v: u16| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let u32b = |v: u32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };

    let count = usize::from(make.is_some()) + usize::from(orientation.is_some());
    let data_start = (8 + 2 + count * 12 + 4) as u32;

    let mut out = Vec::new();
    out.extend_from_slice(if big_endian { b"MM" } else { b"II" });
    out.extend_from_slice(&u16b(42));
    out.extend_from_slice(&u32b(8));
    out.extend_from_slice(&u16b(count as u16));

    let mut data = Vec::new();
    // entries in ascending tag order
    if let Some(make) = make {
        let mut s = make.as_bytes().to_vec();
        s.push(0);
        out.extend_from_slice(&u16b(TAG_MAKE));
        out.extend_from_slice(&u16b(2));
        out.extend_from_slice(&u32b(s.len() as u32));
        if s.len() <= 4 {
            s.resize(4, 0);
            out.extend_from_slice(&s);
        } else {
            out.extend_from_slice(&u32b(data_start));
            data.extend_from_slice(&s);
        }
    }
    if let Some(code) = orientation {
        out.extend_from_slice(&u16b(TAG_ORIENTATION));
        out.extend_from_slice(&u16b(3));
        out.extend_from_slice(&u32b(1));
        out.extend_from_slice(&u16b(code));
        out.extend_from_slice(&[0, 0]);
    }
    out.extend_from_slice(&u32b(0));
    out.extend_from_slice(&data);
    out
}

/// A `width` × `height` image, left half red and right half blue.
pub fn two_tone(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, _| if x < width / 2 { RED } else { BLUE });
    DynamicImage::ImageRgb8(img)
}

/// Encode `img` as JPEG and splice in `exif` when given.
pub fn jpeg_bytes(img: &DynamicImage, exif: Option<Vec<u8>>) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 95))
        .unwrap();

    let Some(exif) = exif else {
        return buf;
    };
    let mut jpeg = Jpeg::from_bytes(Bytes::from(buf)).unwrap();
    jpeg.set_exif(Some(Bytes::from(exif)));
    jpeg.encoder().bytes().to_vec()
}

/// Write a 32×16 two-tone JPEG with the given orientation (no EXIF when `None`).
pub fn write_jpeg(dir: &Path, name: &str, orientation: Option<u16>) -> PathBuf {
    let exif = orientation.map(|code| build_exif(false, Some(code), Some("TestCam")));
    let path = dir.join(name);
    std::fs::write(&path, jpeg_bytes(&two_tone(32, 16), exif)).unwrap();
    path
}

/// True when `px` is much closer to `expected` than to the other test colour.
pub fn is_close(px: Rgb<u8>, expected: Rgb<u8>) -> bool {
    px.0.iter()
        .zip(expected.0.iter())
        .all(|(&a, &b)| a.abs_diff(b) < 60)
}
