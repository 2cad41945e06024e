use image::metadata::Orientation;
use serde::Serialize;

/// EXIF tag ID of the Orientation field (IFD0).
pub const TAG_ORIENTATION: u16 = 0x0112;

/// An EXIF orientation code as stored in the file.
///
/// Valid codes are 1 through 8. Anything else is kept as-is so it can be
/// reported, but [`OrientationCode::transform`] returns `None` for it and the
/// file is left alone.
///
/// # Example
///
/// ```rust
/// use exif_orient::orientation::OrientationCode;
///
/// let code = OrientationCode::new(6);
/// assert_eq!(code.description(), "Rotated 90 degrees counterclockwise");
/// assert!(code.needs_transform());
/// assert!(code.swaps_dimensions());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrientationCode(u16);

impl OrientationCode {
    /// The "top-left, unrotated" orientation.
    pub const NORMAL: Self = Self(1);

    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    pub fn is_normal(self) -> bool {
        self.0 == 1
    }

    pub fn is_known(self) -> bool {
        (1..=8).contains(&self.0)
    }

    /// Human-readable description, `"Unknown"` outside 1..=8.
    pub fn description(self) -> &'static str {
        match self.0 {
            1 => "Normal",
            2 => "Flipped horizontally",
            3 => "Upside down",
            4 => "Flipped vertically",
            5 => "Rotated 90 degrees counterclockwise and flipped horizontally",
            6 => "Rotated 90 degrees counterclockwise",
            7 => "Rotated 90 degrees counterclockwise and flipped vertically",
            8 => "Rotated 90 degrees clockwise",
            _ => "Unknown",
        }
    }

    /// True when the pixels must be rewritten to display correctly.
    pub fn needs_transform(self) -> bool {
        self.transform().is_some_and(|t| t != Orientation::NoTransforms)
    }

    /// True for codes 5..=8, where width and height trade places.
    pub fn swaps_dimensions(self) -> bool {
        (5..=8).contains(&self.0)
    }

    /// The pixel transform that brings stored data to the viewing orientation.
    pub fn transform(self) -> Option<Orientation> {
        u8::try_from(self.0).ok().and_then(Orientation::from_exif)
    }

    /// Width and height as a top-left viewer should display them.
    pub fn visual_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl Default for OrientationCode {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl std::fmt::Display for OrientationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.0, self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_cover_all_codes() {
        assert_eq!(OrientationCode::new(1).description(), "Normal");
        assert_eq!(OrientationCode::new(3).description(), "Upside down");
        assert_eq!(OrientationCode::new(8).description(), "Rotated 90 degrees clockwise");
        for code in 1..=8 {
            assert_ne!(OrientationCode::new(code).description(), "Unknown");
        }
    }

    #[test]
    fn out_of_range_is_unknown_and_untouched() {
        for code in [0, 9, 42, u16::MAX] {
            let c = OrientationCode::new(code);
            assert_eq!(c.description(), "Unknown");
            assert!(!c.is_known());
            assert!(c.transform().is_none());
            assert!(!c.needs_transform());
        }
    }

    #[test]
    fn normal_needs_no_transform() {
        assert!(OrientationCode::NORMAL.is_normal());
        assert!(!OrientationCode::NORMAL.needs_transform());
        assert_eq!(OrientationCode::default(), OrientationCode::NORMAL);
    }

    #[test]
    fn transforms_match_exif_table() {
        let expected = [
            (2, Orientation::FlipHorizontal),
            (3, Orientation::Rotate180),
            (4, Orientation::FlipVertical),
            (5, Orientation::Rotate90FlipH),
            (6, Orientation::Rotate90),
            (7, Orientation::Rotate270FlipH),
            (8, Orientation::Rotate270),
        ];
        for (code, transform) in expected {
            let c = OrientationCode::new(code);
            assert!(c.needs_transform(), "code {code}");
            assert_eq!(c.transform(), Some(transform), "code {code}");
        }
    }

    #[test]
    fn visual_dimensions_swap_for_quarter_turns() {
        assert_eq!(OrientationCode::new(6).visual_dimensions(4000, 3000), (3000, 4000));
        assert_eq!(OrientationCode::new(8).visual_dimensions(4000, 3000), (3000, 4000));
        assert_eq!(OrientationCode::new(3).visual_dimensions(4000, 3000), (4000, 3000));
        assert_eq!(OrientationCode::new(1).visual_dimensions(4000, 3000), (4000, 3000));
    }

    #[test]
    fn display_includes_code_and_description() {
        assert_eq!(OrientationCode::new(2).to_string(), "2 - Flipped horizontally");
    }
}
