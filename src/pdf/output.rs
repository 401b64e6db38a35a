//! The combined output document

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};

use super::composite::CompositePage;
use super::fit::SOURCE_FORM_NAME;
use super::overlay::media_box;
use super::source::SourceDocument;

/// Producer string written to the document information dictionary
pub const PRODUCER: &str = concat!("pdf-stamp-combine ", env!("CARGO_PKG_VERSION"));

/// Append-only sequence of output pages backed by one lopdf document.
///
/// Objects of every adopted input document live in this document; objects no
/// page ends up referring to are dropped when the document is serialized.
#[derive(Debug)]
pub struct OutputDocument {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    creation_date: Option<NaiveDateTime>,
}

impl OutputDocument {
    /// Create an empty output document.
    ///
    /// `creation_date` is written to the information dictionary if given.
    /// Leave it out for byte-identical output across runs.
    pub fn new(creation_date: Option<NaiveDateTime>) -> Self {
        let mut doc = Document::with_version("1.5");
        // Reserve the page tree root before anything else claims an ID
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            creation_date,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_ids.is_empty()
    }

    /// First object number that is guaranteed to be free
    pub fn next_object_number(&self) -> u32 {
        self.doc.max_id + 1
    }

    /// Move all objects of `source` into this document.
    ///
    /// `source` must have been renumbered to start at
    /// [`next_object_number`](Self::next_object_number) first, otherwise its
    /// objects would overwrite ours.
    pub fn adopt(&mut self, source: SourceDocument) {
        let max_id = source.max_id();
        self.doc.objects.extend(source.into_objects());
        // new_object_id() must hand out IDs above everything just added
        self.doc.max_id = self.doc.max_id.max(max_id);
    }

    /// Append a page at the end of the document.
    pub fn append(&mut self, page: CompositePage) -> ObjectId {
        let CompositePage {
            size,
            source_form,
            content,
            fonts,
        } = page;

        let form_id = self.doc.add_object(Object::Stream(source_form));
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let mut xobjects = Dictionary::new();
        xobjects.set(SOURCE_FORM_NAME, Object::Reference(form_id));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));
        resources.set("Font", Object::Dictionary(fonts));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_id));
        page_dict.set("MediaBox", media_box(size));
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set("Contents", Object::Reference(content_id));

        let page_id = self.doc.add_object(Object::Dictionary(page_dict));
        self.page_ids.push(page_id);
        page_id
    }

    /// Finish the page tree and return the complete document.
    ///
    /// A document without pages is an error rather than an empty file.
    pub fn into_document(self) -> Result<Document> {
        if self.page_ids.is_empty() {
            return Err(Error::EmptyOutput);
        }

        let OutputDocument {
            mut doc,
            pages_id,
            page_ids,
            creation_date,
        } = self;

        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(page_ids.len() as i64));
        pages_object.set("Kids", Object::Array(kids));
        doc.objects.insert(pages_id, Object::Dictionary(pages_object));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut info = Dictionary::new();
        info.set("Producer", Object::string_literal(PRODUCER));
        if let Some(date) = creation_date {
            info.set(
                "CreationDate",
                Object::string_literal(date.format("D:%Y%m%d%H%M%S").to_string()),
            );
        }
        let info_id = doc.add_object(Object::Dictionary(info));
        doc.trailer.set("Info", Object::Reference(info_id));

        // Drop catalogs, page trees and pages of the input documents
        let pruned = doc.prune_objects();
        tracing::debug!("Pruned {} unreferenced objects", pruned.len());
        doc.renumber_objects();
        doc.compress();

        Ok(doc)
    }

    /// Serialize the finished document to bytes.
    pub fn to_bytes(self) -> Result<Vec<u8>> {
        let mut doc = self.into_document()?;
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| Error::Serialize(e.to_string()))?;
        Ok(bytes)
    }
}

/// Write `bytes` to `path`, creating the parent folder if needed.
///
/// An existing file is overwritten.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let to_write_error = |source| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_write_error)?;
    }
    fs::write(path, bytes).map_err(to_write_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageBox, PageSize};
    use crate::pdf::composite::composite;
    use crate::pdf::fit::fit_to_target;
    use crate::pdf::overlay::{make_overlay, OverlayOptions};
    use crate::pdf::source::SourcePage;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn composite_page(label: &str) -> CompositePage {
        let page = SourcePage {
            path: PathBuf::from(label),
            number: 1,
            media_box: PageBox::from_size(612.0, 792.0),
            content: b"0 0 m 10 10 l S\n".to_vec(),
            resources: None,
        };
        let fitted = fit_to_target(&page, PageSize::A4).unwrap();
        let overlay = make_overlay(label, PageSize::A4, &OverlayOptions::default());
        composite(fitted, &overlay)
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let output = OutputDocument::new(None);
        assert!(output.is_empty());
        assert!(matches!(output.to_bytes(), Err(Error::EmptyOutput)));
    }

    #[test]
    fn test_pages_keep_append_order() {
        let mut output = OutputDocument::new(None);
        output.append(composite_page("first.pdf"));
        output.append(composite_page("second.pdf"));
        assert_eq!(output.page_count(), 2);

        let bytes = output.to_bytes().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let labels: Vec<String> = pages
            .values()
            .map(|&id| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
            .collect();
        assert!(labels[0].contains("Filename: first.pdf"));
        assert!(labels[1].contains("Filename: second.pdf"));
    }

    #[test]
    fn test_serialization_is_deterministic_without_date() {
        let build = || {
            let mut output = OutputDocument::new(None);
            output.append(composite_page("same.pdf"));
            output.to_bytes().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_creation_date_is_written() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        let mut output = OutputDocument::new(Some(date));
        output.append(composite_page("dated.pdf"));
        let doc = output.into_document().unwrap();

        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        assert_eq!(info.get(b"CreationDate").unwrap().as_str().unwrap(), b"D:20240309140500");
    }

    #[test]
    fn test_write_output_creates_folder_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output").join("combined.pdf");

        write_output(&path, b"first").unwrap();
        write_output(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }
}
