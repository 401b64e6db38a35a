//! Fitting source pages onto a fixed target page size
//!
//! Every source page is scaled uniformly so that it fits inside the target
//! page, shrunk by a further safety factor, and centered:
//!
//! ```text
//! scale   = min(Tw / W, Th / H) * 0.9
//! xOffset = (Tw - W * scale) / 2
//! yOffset = (Th - H * scale) / 2
//! ```
//!
//! The source page's content is wrapped in a Form XObject and drawn on a new,
//! blank page of the target size through the matrix `[scale 0 0 scale e f]`.

use lopdf::{Dictionary, Object, Stream};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::layout::{PageBox, PageSize};

use super::source::SourcePage;

/// Content is shrunk by this factor beyond the tight fit, so it never touches
/// the edges of the target page. Applied even when no other scaling is needed.
pub const SCALE_SAFETY_FACTOR: f64 = 0.9;

/// Resource name under which the source page's Form XObject is drawn
pub const SOURCE_FORM_NAME: &str = "SrcPage";

/// Represents a PDF transformation matrix [a b c d e f]
/// where: x' = a*x + c*y + e, y' = b*x + d*y + f
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformMatrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl TransformMatrix {
    /// Uniform scale followed by a translation
    pub fn scale_translate(scale: f64, e: f64, f: f64) -> Self {
        Self { a: scale, b: 0.0, c: 0.0, d: scale, e, f }
    }

    /// Map a point through this matrix
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Render as a `cm` operator
    fn to_operator(&self) -> String {
        format!(
            "{} {} {} {} {} {} cm",
            fmt_num(self.a),
            fmt_num(self.b),
            fmt_num(self.c),
            fmt_num(self.d),
            fmt_num(self.e),
            fmt_num(self.f),
        )
    }
}

/// A source page that cannot be fitted because one of its sides is not positive.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("degenerate page size {width} x {height}")]
pub struct DegenerateSize {
    pub width: f64,
    pub height: f64,
}

/// Scale and centering offsets for one source page size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    /// Uniform scale factor, safety factor included
    pub scale: f64,
    /// Left edge of the scaled content on the target page
    pub x_offset: f64,
    /// Bottom edge of the scaled content on the target page
    pub y_offset: f64,
    /// Size of the content after scaling
    pub scaled_width: f64,
    pub scaled_height: f64,
}

impl FitTransform {
    /// Compute the fit of a `width` × `height` page onto `target`.
    pub fn compute(
        width: f64,
        height: f64,
        target: PageSize,
    ) -> std::result::Result<Self, DegenerateSize> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(DegenerateSize { width, height });
        }

        let scale_x = target.width() / width;
        let scale_y = target.height() / height;
        let scale = scale_x.min(scale_y) * SCALE_SAFETY_FACTOR;

        let scaled_width = width * scale;
        let scaled_height = height * scale;

        Ok(Self {
            scale,
            x_offset: (target.width() - scaled_width) / 2.0,
            y_offset: (target.height() - scaled_height) / 2.0,
            scaled_width,
            scaled_height,
        })
    }

    /// Matrix mapping the source page's user space onto the target page.
    ///
    /// The box's lower-left corner lands on `(x_offset, y_offset)`; for a box
    /// anchored at the origin this is exactly `[scale 0 0 scale x_offset y_offset]`.
    pub fn matrix_for(&self, media_box: &PageBox) -> TransformMatrix {
        TransformMatrix::scale_translate(
            self.scale,
            self.x_offset - media_box.llx * self.scale,
            self.y_offset - media_box.lly * self.scale,
        )
    }
}

/// A blank target-size page with one source page's content drawn on it.
///
/// The source content is carried as a Form XObject that is not yet part of any
/// document; it is added when the page is appended to the output.
#[derive(Debug, Clone)]
pub struct FittedPage {
    pub(crate) size: PageSize,
    pub(crate) transform: FitTransform,
    pub(crate) source_form: Stream,
    pub(crate) content: Vec<u8>,
}

impl FittedPage {
    /// Always the target size, whatever the source size was
    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn transform(&self) -> &FitTransform {
        &self.transform
    }

    /// Operators drawing the source content onto the page
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn source_form(&self) -> &Stream {
        &self.source_form
    }
}

/// Scale and center `page` onto a new page of `target` size.
///
/// A page whose MediaBox has a zero, negative or non-finite side is rejected
/// with [`Error::DegeneratePage`].
pub fn fit_to_target(page: &SourcePage, target: PageSize) -> Result<FittedPage> {
    let media_box = page.media_box;
    let transform = FitTransform::compute(media_box.width(), media_box.height(), target)
        .map_err(|DegenerateSize { width, height }| Error::DegeneratePage {
            path: page.path.clone(),
            page: page.number,
            width,
            height,
        })?;

    let matrix = transform.matrix_for(&media_box);
    tracing::debug!(
        page = page.number,
        scale = transform.scale,
        x_offset = transform.x_offset,
        y_offset = transform.y_offset,
        "Fitting page"
    );

    let content = format!(
        "q\n{}\n/{} Do\nQ\n",
        matrix.to_operator(),
        SOURCE_FORM_NAME
    );

    Ok(FittedPage {
        size: target,
        transform,
        source_form: source_form_xobject(page),
        content: content.into_bytes(),
    })
}

/// Wrap a page's content in a Form XObject clipped to its MediaBox
fn source_form_xobject(page: &SourcePage) -> Stream {
    let media_box = page.media_box;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Real(media_box.llx as f32),
            Object::Real(media_box.lly as f32),
            Object::Real(media_box.urx as f32),
            Object::Real(media_box.ury as f32),
        ]),
    );
    xobject_dict.set(
        "Resources",
        Object::Dictionary(page.resources.clone().unwrap_or_default()),
    );

    Stream::new(xobject_dict, page.content.clone())
}

/// Format a number for a content stream: fixed precision, no trailing zeros
pub(crate) fn fmt_num(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
