//! Reading input PDFs: page boxes, content and resources

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::layout::PageBox;

/// Guard against Parent loops in malformed page trees
const MAX_TREE_DEPTH: usize = 64;

/// An opened input document
#[derive(Debug)]
pub struct SourceDocument {
    path: PathBuf,
    doc: Document,
}

/// One page of an input document, detached from its page tree.
///
/// Object references inside `resources` point into the document the page was
/// read from, so the page must end up in the same object space as those objects.
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// File the page was read from
    pub path: PathBuf,
    /// 1-based page number in document order
    pub number: u32,
    /// The page's MediaBox, inherited from the page tree if needed
    pub media_box: PageBox,
    /// All content streams of the page, decompressed and concatenated
    pub content: Vec<u8>,
    /// The page's resource dictionary, inherited from the page tree if needed
    pub resources: Option<Dictionary>,
}

impl SourceDocument {
    /// Load a PDF from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let doc = Document::load(path).map_err(|source| Error::InputOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_document(path, doc))
    }

    /// Wrap an already loaded document
    pub fn from_document(path: &Path, doc: Document) -> Self {
        Self {
            path: path.to_path_buf(),
            doc,
        }
    }

    /// Highest object number in use
    pub fn max_id(&self) -> u32 {
        self.doc.max_id
    }

    /// Renumber every object so that numbering starts at `start`.
    ///
    /// Must happen before [`pages`](Self::pages) is called, so the extracted
    /// resources refer to the new numbers.
    pub fn renumber_from(&mut self, start: u32) {
        self.doc.renumber_objects_with(start);
    }

    /// Extract all pages in document order.
    pub fn pages(&self) -> Result<Vec<SourcePage>> {
        let mut pages = Vec::new();

        for (number, page_id) in self.doc.get_pages() {
            let media_box = inherited_attribute(&self.doc, page_id, b"MediaBox")
                .and_then(|obj| parse_page_box(&self.doc, obj))
                .ok_or_else(|| Error::MissingMediaBox {
                    path: self.path.clone(),
                    page: number,
                })?;

            let content = page_content(&self.doc, page_id);

            let resources = inherited_attribute(&self.doc, page_id, b"Resources")
                .and_then(|obj| resolve(&self.doc, obj))
                .and_then(|obj| obj.as_dict().ok())
                .cloned();

            pages.push(SourcePage {
                path: self.path.clone(),
                number,
                media_box,
                content,
                resources,
            });
        }

        Ok(pages)
    }

    /// Give up the document's objects, e.g. to move them into another document.
    pub fn into_objects(self) -> BTreeMap<ObjectId, Object> {
        self.doc.objects
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys.
fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

/// Concatenate a page's content streams, one per line.
///
/// Streams with a filter lopdf cannot decode are passed through unchanged.
fn page_content(doc: &Document, page_id: ObjectId) -> Vec<u8> {
    let mut content = Vec::new();
    for stream_id in doc.get_page_contents(page_id) {
        if let Ok(stream) = doc.get_object(stream_id).and_then(Object::as_stream) {
            match stream.decompressed_content() {
                Ok(data) => content.extend_from_slice(&data),
                Err(_) => content.extend_from_slice(&stream.content),
            }
            content.push(b'\n');
        }
    }
    content
}

/// Follow a reference to the object it points at
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Parse a `[llx lly urx ury]` rectangle as stored.
///
/// Corners are not reordered: a box whose upper-right corner lies left of or
/// below its lower-left corner has a negative size and is rejected when fitted.
fn parse_page_box(doc: &Document, obj: &Object) -> Option<PageBox> {
    let values = resolve(doc, obj)?.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }

    let mut nums = [0.0f64; 4];
    for (slot, value) in nums.iter_mut().zip(values) {
        *slot = f64::from(resolve(doc, value)?.as_float().ok()?);
    }

    let [llx, lly, urx, ury] = nums;
    Some(PageBox::new(llx, lly, urx, ury))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// Two-page document whose MediaBox and Resources live on the Pages node
    fn inherited_doc() -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let content_id = doc.add_object(Stream::new(dictionary! {}, b"0 0 m 10 10 l S".to_vec()));
        let first = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let second = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 300.into(), Object::Real(150.5)],
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![first.into(), second.into()],
                "Count" => 2,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => dictionary! { "ProcSet" => vec!["PDF".into()] },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_pages_inherit_media_box_and_resources() {
        let source = SourceDocument::from_document(Path::new("inherited.pdf"), inherited_doc());
        let pages = source.pages().unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[0].path, PathBuf::from("inherited.pdf"));
        assert_eq!(pages[0].media_box, PageBox::from_size(612.0, 792.0));
        assert_eq!(pages[0].content, b"0 0 m 10 10 l S\n".to_vec());
        assert!(pages[0].resources.as_ref().unwrap().has(b"ProcSet"));

        assert_eq!(pages[1].media_box, PageBox::from_size(300.0, 150.5));
        assert!(pages[1].content.is_empty());
        assert!(pages[1].resources.is_some());
    }

    #[test]
    fn test_reversed_corners_give_negative_size() {
        let doc = Document::with_version("1.5");
        let rect: Object = vec![0.into(), 0.into(), (-612).into(), 792.into()].into();
        let page_box = parse_page_box(&doc, &rect).unwrap();
        assert_eq!(page_box, PageBox::new(0.0, 0.0, -612.0, 792.0));
        assert_eq!(page_box.width(), -612.0);
    }

    #[test]
    fn test_missing_media_box_is_reported() {
        let mut doc = inherited_doc();
        let pages_id = doc.catalog().unwrap().get(b"Pages").unwrap().as_reference().unwrap();
        doc.get_dictionary_mut(pages_id).unwrap().remove(b"MediaBox");

        let source = SourceDocument::from_document(Path::new("nobox.pdf"), doc);
        let result = source.pages();
        assert!(matches!(result, Err(Error::MissingMediaBox { page: 1, .. })));
    }

    #[test]
    fn test_open_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let result = SourceDocument::open(&path);
        assert!(matches!(result, Err(Error::InputOpen { .. })));
    }
}
