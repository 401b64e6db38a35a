//! Recursive discovery of input PDF files

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Default file name pattern. Matched case-insensitively, so `.PDF` is found too.
pub const DEFAULT_PATTERN: &str = "*.pdf";

/// One discovered input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path to the file
    pub path: PathBuf,
    /// File name without directories; used as the sort key and watermark label
    pub file_name: String,
}

impl FileEntry {
    /// Build an entry from a path, taking the file name from its last component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, file_name }
    }
}

/// Recursively list files under `root` whose name matches `pattern`.
///
/// Entries come back in walk order; call [`sort_entries`] to get processing order.
/// There is no depth limit and symbolic links to directories are not followed.
pub fn discover_pdfs(root: &Path, pattern: &str) -> Result<Vec<FileEntry>> {
    if !root.is_dir() {
        return Err(Error::RootNotFound(root.to_path_buf()));
    }

    let pattern = Pattern::new(pattern).map_err(|e| Error::InvalidPattern(e.to_string()))?;
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    let mut entries = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Discovery {
            path: e.path().unwrap_or(root).to_path_buf(),
            message: e.to_string(),
        })?;

        if !entry.path().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if pattern.matches_with(&file_name, options) {
            entries.push(FileEntry::from_path(entry.into_path()));
        }
    }

    tracing::debug!("Found {} matching files under {}", entries.len(), root.display());
    Ok(entries)
}

/// Ordinal comparison of two file names.
///
/// Compares the raw UTF-8 bytes, which is the same as comparing code points.
/// There is no case folding, so every uppercase ASCII letter sorts before
/// every lowercase one.
pub fn compare_file_names(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Stable sort of entries by file name. Entries with equal names keep their
/// relative order.
pub fn sort_entries(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| compare_file_names(&a.file_name, &b.file_name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.file_name.as_str()).collect()
    }

    #[test]
    fn test_uppercase_sorts_before_lowercase() {
        let mut entries = vec![
            FileEntry::from_path("dir/b.pdf"),
            FileEntry::from_path("dir/A.pdf"),
            FileEntry::from_path("dir/c.pdf"),
        ];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), vec!["A.pdf", "b.pdf", "c.pdf"]);

        assert_eq!(compare_file_names("Z.pdf", "a.pdf"), Ordering::Less);
        assert_eq!(compare_file_names("10.pdf", "9.pdf"), Ordering::Less);
    }

    #[test]
    fn test_sort_is_by_file_name_not_path() {
        let mut entries = vec![
            FileEntry::from_path("a/zeta.pdf"),
            FileEntry::from_path("z/alpha.pdf"),
        ];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), vec!["alpha.pdf", "zeta.pdf"]);
    }

    #[test]
    fn test_sort_is_stable_for_duplicate_names() {
        let mut entries = vec![
            FileEntry::from_path("second/same.pdf"),
            FileEntry::from_path("first/same.pdf"),
        ];
        sort_entries(&mut entries);
        assert_eq!(entries[0].path, PathBuf::from("second/same.pdf"));
        assert_eq!(entries[1].path, PathBuf::from("first/same.pdf"));
    }

    #[test]
    fn test_discover_recurses_and_matches_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("one").join("two");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("top.pdf"), b"x").unwrap();
        fs::write(nested.join("DEEP.PDF"), b"x").unwrap();
        fs::write(nested.join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("pdf"), b"x").unwrap();

        let mut entries = discover_pdfs(dir.path(), DEFAULT_PATTERN).unwrap();
        sort_entries(&mut entries);

        assert_eq!(names(&entries), vec!["DEEP.PDF", "top.pdf"]);
        assert_eq!(entries[0].path, nested.join("DEEP.PDF"));
    }

    #[test]
    fn test_discover_skips_directories_named_like_pdfs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("folder.pdf")).unwrap();

        let entries = discover_pdfs(dir.path(), DEFAULT_PATTERN).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_discover_missing_root() {
        let result = discover_pdfs(Path::new("definitely/not/here"), DEFAULT_PATTERN);
        assert!(matches!(result, Err(Error::RootNotFound(_))));
    }

    #[test]
    fn test_discover_invalid_pattern() {
        let dir = TempDir::new().unwrap();
        let result = discover_pdfs(dir.path(), "[");
        assert!(matches!(result, Err(Error::InvalidPattern(_))));
    }
}
