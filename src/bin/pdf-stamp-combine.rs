//! PDF Stamp & Combine CLI tool
//!
//! Stamps every PDF below a folder with its file name, fits all pages to one
//! page size and writes them into a single combined PDF.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use pdf_stamp_combine::discovery::{discover_pdfs, sort_entries, DEFAULT_PATTERN};
use pdf_stamp_combine::pdf::{
    combine, extract_metadata, page_boxes, AssembleOptions, CombineOptions, FailurePolicy,
    FileOutcome, OverlayOptions, DEFAULT_OUTPUT_PATH,
};
use pdf_stamp_combine::PageSize;

/// PDF Stamp & Combine - watermark PDFs with their file name and combine them
#[derive(Parser)]
#[command(name = "pdf-stamp-combine")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Combine every PDF below ./handouts into output/Combined_pdf_with_watermark.pdf
    pdf-stamp-combine combine ./handouts

    # Letter-sized output, skipping files that cannot be read
    pdf-stamp-combine combine ./handouts -o all.pdf --page-size letter --skip-failed

    # Show the order files would be combined in
    pdf-stamp-combine list ./handouts")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stamp, fit and combine all PDFs below a folder
    Combine {
        /// Folder searched recursively for PDF files
        root: PathBuf,

        /// Output PDF file path
        #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        /// Size of every output page
        #[arg(long, value_enum, default_value_t = PageSizeArg::A4)]
        page_size: PageSizeArg,

        /// File name pattern (case-insensitive)
        #[arg(long, default_value = DEFAULT_PATTERN)]
        pattern: String,

        /// Leave out unreadable files instead of aborting
        #[arg(long)]
        skip_failed: bool,

        /// Record the current time as the document creation date
        #[arg(long)]
        timestamp: bool,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// List the files that would be combined, in processing order
    List {
        /// Folder searched recursively for PDF files
        root: PathBuf,

        /// File name pattern (case-insensitive)
        #[arg(long, default_value = DEFAULT_PATTERN)]
        pattern: String,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::LETTER,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Level::WARN
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Combine {
            root,
            output,
            page_size,
            pattern,
            skip_failed,
            timestamp,
            open,
        } => cmd_combine(root, output, page_size.into(), pattern, skip_failed, timestamp, open),
        Commands::List { root, pattern } => cmd_list(&root, &pattern),
        Commands::Info { input } => cmd_info(&input),
    }
}

/// Stamp, fit and combine all PDFs below `root`
fn cmd_combine(
    root: PathBuf,
    output: PathBuf,
    target: PageSize,
    pattern: String,
    skip_failed: bool,
    timestamp: bool,
    open: bool,
) -> Result<()> {
    let options = CombineOptions {
        root,
        output_path: output,
        include_pattern: pattern,
        assemble: AssembleOptions {
            target,
            overlay: OverlayOptions::default(),
            failure_policy: if skip_failed {
                FailurePolicy::Skip
            } else {
                FailurePolicy::Abort
            },
            creation_date: timestamp.then(|| chrono::Local::now().naive_local()),
        },
    };

    let report = combine(&options).context("Failed to combine PDFs")?;

    for file in report.skipped() {
        if let FileOutcome::Skipped { reason } = &file.outcome {
            eprintln!("Skipped {}: {}", file.path.display(), reason);
        }
    }
    eprintln!(
        "Combined {} pages from {} files into {}",
        report.total_pages,
        report.files.len() - report.skipped().count(),
        report.output_path.display()
    );

    if open {
        open_file(&report.output_path)?;
    }

    Ok(())
}

/// Print the files below `root` in the order they would be combined
fn cmd_list(root: &Path, pattern: &str) -> Result<()> {
    let mut entries = discover_pdfs(root, pattern)
        .with_context(|| format!("Failed to scan {}", root.display()))?;
    sort_entries(&mut entries);

    for entry in &entries {
        println!("{}", entry.path.display());
    }
    eprintln!("{} files", entries.len());

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: &Path) -> Result<()> {
    let metadata = extract_metadata(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(producer) = metadata.producer {
        println!("Producer: {}", producer);
    }
    if let Some(date) = metadata.creation_date {
        println!("Created: {}", date);
    }

    for (i, page_box) in page_boxes(input)?.iter().enumerate() {
        println!(
            "  Page {}: {:.2} x {:.2} pt",
            i + 1,
            page_box.width(),
            page_box.height()
        );
    }

    Ok(())
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}
