//! PDF manipulation module

pub mod assemble;
pub mod composite;
pub mod fit;
pub mod metadata;
pub mod output;
pub mod overlay;
pub mod source;

// Re-export commonly used items
pub use assemble::{
    assemble, combine, AssembleOptions, Assembly, CombineOptions, CombineReport, FailurePolicy,
    FileOutcome, FileReport, DEFAULT_OUTPUT_PATH,
};
pub use composite::{composite, CompositePage};
pub use fit::{fit_to_target, FitTransform, FittedPage, TransformMatrix, SCALE_SAFETY_FACTOR};
pub use metadata::{count_pages, extract_metadata, page_boxes, PdfMetadata};
pub use output::{write_output, OutputDocument};
pub use overlay::{make_overlay, text_width, OverlayOptions, OverlayPage};
pub use source::{SourceDocument, SourcePage};
