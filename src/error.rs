//! Error types for the stamp-and-combine library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the stamp-and-combine library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input root directory does not exist
    #[error("Input folder not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Directory walk failed
    #[error("Failed to scan {}: {message}", path.display())]
    Discovery { path: PathBuf, message: String },

    /// Invalid file name pattern
    #[error("Invalid file name pattern: {0}")]
    InvalidPattern(String),

    /// Input file could not be opened or parsed as a PDF
    #[error("Cannot open {}: {source}", path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// Page has no MediaBox anywhere in its page tree
    #[error("Page {page} of {} has no MediaBox", path.display())]
    MissingMediaBox { path: PathBuf, page: u32 },

    /// Page reports a zero, negative or non-finite size
    #[error("Page {page} of {} has degenerate size {width} x {height}", path.display())]
    DegeneratePage {
        path: PathBuf,
        page: u32,
        width: f64,
        height: f64,
    },

    /// Target page size is not strictly positive
    #[error("Invalid page size {width} x {height}")]
    InvalidPageSize { width: f64, height: f64 },

    /// Nothing to write
    #[error("Output document has no pages")]
    EmptyOutput,

    /// Serializing the output document failed
    #[error("Failed to serialize output document: {0}")]
    Serialize(String),

    /// Output file or its folder could not be written
    #[error("Cannot write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General error
    #[error("{0}")]
    General(String),
}
