//! Stamping, fitting and combining a set of input files

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::discovery::{discover_pdfs, sort_entries, FileEntry, DEFAULT_PATTERN};
use crate::error::Result;
use crate::layout::PageSize;

use super::composite::{composite, CompositePage};
use super::fit::fit_to_target;
use super::output::{write_output, OutputDocument};
use super::overlay::{make_overlay, OverlayOptions};
use super::source::SourceDocument;

/// Default location of the combined file, relative to the working directory
pub const DEFAULT_OUTPUT_PATH: &str = "output/Combined_pdf_with_watermark.pdf";

/// What to do when one input file cannot be processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the whole run; no output is written
    #[default]
    Abort,
    /// Leave the file out, log a warning and carry on with the next file
    Skip,
}

/// Options for assembling the combined document
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    /// Size of every output page
    pub target: PageSize,
    /// Watermark text settings
    pub overlay: OverlayOptions,
    /// Handling of unreadable files and degenerate pages
    pub failure_policy: FailurePolicy,
    /// Creation date for the information dictionary
    pub creation_date: Option<NaiveDateTime>,
}

/// Options for a complete run from input folder to output file
#[derive(Debug, Clone)]
pub struct CombineOptions {
    /// Folder searched recursively for input files
    pub root: PathBuf,
    /// Where the combined PDF is written
    pub output_path: PathBuf,
    /// File name pattern, matched case-insensitively
    pub include_pattern: String,
    pub assemble: AssembleOptions,
}

impl CombineOptions {
    /// Options with defaults for everything except the input folder
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            include_pattern: DEFAULT_PATTERN.to_string(),
            assemble: AssembleOptions::default(),
        }
    }
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// All pages were added to the output
    Combined { pages: usize },
    /// The file was left out
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub file_name: String,
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Result of [`assemble`]: the unserialized document and a report per file,
/// both in processing order
#[derive(Debug)]
pub struct Assembly {
    pub document: OutputDocument,
    pub files: Vec<FileReport>,
}

/// Summary of a finished [`combine`] run
#[derive(Debug, Clone)]
pub struct CombineReport {
    pub output_path: PathBuf,
    pub files: Vec<FileReport>,
    pub total_pages: usize,
}

impl CombineReport {
    pub fn skipped(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Skipped { .. }))
    }
}

/// Stamp, fit and concatenate the pages of `entries`.
///
/// Files are processed in ordinal file name order, each file's pages in
/// document order. One overlay is built per file and shared by all its pages.
/// A file either contributes all of its pages or none of them.
pub fn assemble(mut entries: Vec<FileEntry>, options: &AssembleOptions) -> Result<Assembly> {
    sort_entries(&mut entries);

    let mut document = OutputDocument::new(options.creation_date);
    let mut files = Vec::with_capacity(entries.len());

    for entry in entries {
        tracing::info!("Processing: {}", entry.file_name);

        let outcome = match add_file(&mut document, &entry, options) {
            Ok(pages) => FileOutcome::Combined { pages },
            Err(err) if options.failure_policy == FailurePolicy::Skip => {
                tracing::warn!("Skipping {}: {}", entry.path.display(), err);
                FileOutcome::Skipped {
                    reason: err.to_string(),
                }
            }
            Err(err) => return Err(err),
        };

        files.push(FileReport {
            file_name: entry.file_name,
            path: entry.path,
            outcome,
        });
    }

    Ok(Assembly { document, files })
}

/// Add every page of one file. Nothing is added if any page fails.
fn add_file(
    document: &mut OutputDocument,
    entry: &FileEntry,
    options: &AssembleOptions,
) -> Result<usize> {
    let mut source = SourceDocument::open(&entry.path)?;
    source.renumber_from(document.next_object_number());

    let overlay = make_overlay(&entry.file_name, options.target, &options.overlay);

    let pages = source
        .pages()?
        .iter()
        .map(|page| -> Result<CompositePage> {
            let fitted = fit_to_target(page, options.target)?;
            Ok(composite(fitted, &overlay))
        })
        .collect::<Result<Vec<CompositePage>>>()?;

    let count = pages.len();
    document.adopt(source);
    for page in pages {
        document.append(page);
    }

    tracing::debug!("Added {} pages from {}", count, entry.path.display());
    Ok(count)
}

/// Run the whole pipeline: find the input files, build the combined document
/// and write it.
///
/// The document is serialized completely before anything is written, so a
/// failed run leaves no output file behind. An input folder without usable
/// files is reported as [`Error::EmptyOutput`](crate::Error::EmptyOutput).
pub fn combine(options: &CombineOptions) -> Result<CombineReport> {
    let entries = discover_pdfs(&options.root, &options.include_pattern)?;
    tracing::info!("Found {} PDF files under {}", entries.len(), options.root.display());

    let Assembly { document, files } = assemble(entries, &options.assemble)?;
    let total_pages = document.page_count();

    let bytes = document.to_bytes()?;
    write_output(&options.output_path, &bytes)?;

    tracing::info!(
        "Wrote {} pages to {}",
        total_pages,
        options.output_path.display()
    );

    Ok(CombineReport {
        output_path: options.output_path.clone(),
        files,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_options_defaults() {
        let options = CombineOptions::new("/data/pdfs");
        assert_eq!(options.root, PathBuf::from("/data/pdfs"));
        assert_eq!(
            options.output_path,
            PathBuf::from("output/Combined_pdf_with_watermark.pdf")
        );
        assert_eq!(options.include_pattern, "*.pdf");
        assert_eq!(options.assemble.target, PageSize::A4);
        assert_eq!(options.assemble.failure_policy, FailurePolicy::Abort);
        assert!(options.assemble.creation_date.is_none());
    }

    #[test]
    fn test_assemble_nothing() {
        let assembly = assemble(Vec::new(), &AssembleOptions::default()).unwrap();
        assert!(assembly.document.is_empty());
        assert!(assembly.files.is_empty());
    }

    #[test]
    fn test_missing_file_aborts_by_default() {
        let entries = vec![FileEntry::from_path("does/not/exist.pdf")];
        let result = assemble(entries, &AssembleOptions::default());
        assert!(matches!(result, Err(crate::Error::InputOpen { .. })));
    }

    #[test]
    fn test_missing_file_is_skipped_on_request() {
        let options = AssembleOptions {
            failure_policy: FailurePolicy::Skip,
            ..Default::default()
        };
        let entries = vec![FileEntry::from_path("does/not/exist.pdf")];
        let assembly = assemble(entries, &options).unwrap();

        assert_eq!(assembly.document.page_count(), 0);
        assert_eq!(assembly.files.len(), 1);
        assert!(matches!(assembly.files[0].outcome, FileOutcome::Skipped { .. }));
    }
}
