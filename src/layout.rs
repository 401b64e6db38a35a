//! Page geometry types
//!
//! All lengths are PDF points (1/72 inch) in the PDF user space, with the
//! origin at the bottom-left corner of the page and y increasing upward.

use crate::error::{Error, Result};

const POINTS_PER_INCH: f64 = 72.0;
const MM_PER_INCH: f64 = 25.4;

/// Width and height of a page in points. Both are always positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    width: f64,
    height: f64,
}

impl PageSize {
    /// A4 (210mm × 297mm)
    pub const A4: PageSize = PageSize {
        width: 210.0 * POINTS_PER_INCH / MM_PER_INCH,
        height: 297.0 * POINTS_PER_INCH / MM_PER_INCH,
    };

    /// US Letter (8.5" × 11")
    pub const LETTER: PageSize = PageSize {
        width: 8.5 * POINTS_PER_INCH,
        height: 11.0 * POINTS_PER_INCH,
    };

    /// Create a page size, rejecting zero, negative and non-finite dimensions.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::InvalidPageSize { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// A page boundary rectangle as stored in a PDF (`[llx lly urx ury]`).
///
/// Unlike [`PageSize`] this is read from input files and may be degenerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl PageBox {
    pub fn new(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self { llx, lly, urx, ury }
    }

    /// Box anchored at the origin
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_in_points() {
        assert!((PageSize::A4.width() - 595.2756).abs() < 0.001);
        assert!((PageSize::A4.height() - 841.8898).abs() < 0.001);
    }

    #[test]
    fn test_letter_in_points() {
        assert!((PageSize::LETTER.width() - 612.0).abs() < 1e-9);
        assert!((PageSize::LETTER.height() - 792.0).abs() < 1e-9);
    }

    #[test]
    fn test_page_size_rejects_non_positive() {
        assert!(PageSize::new(0.0, 100.0).is_err());
        assert!(PageSize::new(100.0, -1.0).is_err());
        assert!(PageSize::new(f64::NAN, 100.0).is_err());
        assert!(PageSize::new(100.0, 200.0).is_ok());
    }

    #[test]
    fn test_page_box_dimensions() {
        let b = PageBox::new(10.0, 20.0, 110.0, 220.0);
        assert_eq!(b.width(), 100.0);
        assert_eq!(b.height(), 200.0);
    }
}
