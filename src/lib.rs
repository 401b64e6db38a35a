//! PDF Stamp & Combine Library
//!
//! Batch-processes a folder tree of PDF files into one combined PDF:
//! - Finds every `*.pdf` below a root folder, in ordinal file name order
//! - Scales and centers every page onto one target page size (A4 by default)
//! - Stamps each page with its source file name, near the top and bottom edge
//! - Concatenates all pages and writes a single output file
//!
//! # Example
//!
//! ```no_run
//! use pdf_stamp_combine::pdf::{combine, CombineOptions};
//!
//! let options = CombineOptions::new("/path/to/pdf/files");
//! let report = combine(&options).expect("Failed to combine PDFs");
//! println!("{} pages written", report.total_pages);
//! ```

pub mod discovery;
pub mod error;
pub mod layout;
pub mod pdf;

// Re-export commonly used items
pub use error::{Error, Result};
pub use layout::PageSize;
