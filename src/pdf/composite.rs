//! Merging the watermark overlay onto fitted pages

use lopdf::{Dictionary, Stream};

use crate::layout::PageSize;

use super::fit::FittedPage;
use super::overlay::OverlayPage;

/// A fitted page with the overlay drawn on top. This is what gets appended
/// to the output document.
#[derive(Debug, Clone)]
pub struct CompositePage {
    pub(crate) size: PageSize,
    pub(crate) source_form: Stream,
    pub(crate) content: Vec<u8>,
    pub(crate) fonts: Dictionary,
}

impl CompositePage {
    pub fn size(&self) -> PageSize {
        self.size
    }

    /// Page content: the fitted source first, then the overlay
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn fonts(&self) -> &Dictionary {
        &self.fonts
    }
}

/// Draw `overlay` over `base`.
///
/// Both pages share the target size, so the overlay operators are appended
/// untransformed. The overlay is only read and can be reused for every page
/// of a file.
pub fn composite(base: FittedPage, overlay: &OverlayPage) -> CompositePage {
    let FittedPage {
        size,
        source_form,
        mut content,
        ..
    } = base;

    // The fitted operators end in Q, so the overlay starts from the page's
    // untransformed graphics state.
    content.extend_from_slice(overlay.content());

    CompositePage {
        size,
        source_form,
        content,
        fonts: overlay.font_resources(),
    }
}
