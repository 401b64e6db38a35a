//! Filename watermark overlay
//!
//! The overlay draws `"Filename: <label>"` twice, right-aligned, once near the
//! bottom edge and once near the top edge of a target-size page. Text is set in
//! Helvetica-Bold, one of the standard 14 PDF fonts, so nothing is embedded; the
//! same font's metrics are used to measure the text for right alignment.

use lopdf::{Dictionary, Document, Object, Stream};

use crate::layout::PageSize;

use super::fit::fmt_num;

/// Resource name of the watermark font
pub const OVERLAY_FONT_NAME: &str = "WmF1";

/// PostScript name of the watermark font
pub const OVERLAY_BASE_FONT: &str = "Helvetica-Bold";

/// Byte drawn for characters WinAnsiEncoding cannot represent
const REPLACEMENT_BYTE: u8 = b'?';

/// Options for the watermark text
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayOptions {
    /// Text placed before the label
    pub prefix: String,
    /// Font size in points
    pub font_size: f64,
    /// Distance from the right edge to the end of the text, and from the
    /// bottom/top edge to the baseline
    pub margin: f64,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            prefix: "Filename: ".to_string(),
            font_size: 16.0,
            margin: 25.0,
        }
    }
}

/// A page containing only the watermark text
#[derive(Debug, Clone)]
pub struct OverlayPage {
    size: PageSize,
    text: String,
    text_width: f64,
    baselines: [(f64, f64); 2],
    content: Vec<u8>,
}

impl OverlayPage {
    pub fn size(&self) -> PageSize {
        self.size
    }

    /// The full string drawn, prefix included
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Width of the drawn text in points
    pub fn text_width(&self) -> f64 {
        self.text_width
    }

    /// Start of each baseline, bottom copy first
    pub fn baselines(&self) -> [(f64, f64); 2] {
        self.baselines
    }

    /// Content stream operators, wrapped in `q`/`Q`
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Font resources the content stream needs
    pub fn font_resources(&self) -> Dictionary {
        let mut fonts = Dictionary::new();
        fonts.set(OVERLAY_FONT_NAME, Object::Dictionary(overlay_font()));
        fonts
    }

    /// Export the overlay as a standalone single-page document
    pub fn to_document(&self) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let content_id = doc.add_object(Stream::new(Dictionary::new(), self.content.clone()));

        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(self.font_resources()));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("MediaBox", media_box(self.size));
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Reference(content_id));
        let page_id = doc.add_object(Object::Dictionary(page));

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        pages.set("Count", Object::Integer(1));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        doc
    }
}

/// Build the watermark overlay for one file.
///
/// Any label is accepted. A label too long for the page only pushes the text
/// past the left edge.
pub fn make_overlay(label: &str, size: PageSize, options: &OverlayOptions) -> OverlayPage {
    let text = format!("{}{}", options.prefix, label);
    let encoded = encode_win_ansi(&text);
    let text_width = encoded_width(&encoded, options.font_size);

    let x = size.width() - text_width - options.margin;
    let baselines = [
        (x, options.margin),
        (x, size.height() - options.margin),
    ];

    let mut content = Vec::new();
    content.extend_from_slice(b"q\n1 0 0 rg\n");
    for (x, y) in baselines {
        content.extend_from_slice(b"BT\n");
        content.extend_from_slice(
            format!("/{} {} Tf\n", OVERLAY_FONT_NAME, fmt_num(options.font_size)).as_bytes(),
        );
        content.extend_from_slice(format!("1 0 0 1 {} {} Tm\n", fmt_num(x), fmt_num(y)).as_bytes());
        content.push(b'(');
        content.extend_from_slice(&escape_pdf_string(&encoded));
        content.extend_from_slice(b") Tj\nET\n");
    }
    content.extend_from_slice(b"Q\n");

    OverlayPage {
        size,
        text,
        text_width,
        baselines,
        content,
    }
}

/// Width of `text` in points when set in Helvetica-Bold at `font_size`
pub fn text_width(text: &str, font_size: f64) -> f64 {
    encoded_width(&encode_win_ansi(text), font_size)
}

fn encoded_width(encoded: &[u8], font_size: f64) -> f64 {
    let units: u32 = encoded.iter().map(|&b| u32::from(glyph_width(b))).sum();
    f64::from(units) * font_size / 1000.0
}

/// Helvetica-Bold font dictionary (standard 14, not embedded)
fn overlay_font() -> Dictionary {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(OVERLAY_BASE_FONT.as_bytes().to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    font
}

pub(crate) fn media_box(size: PageSize) -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(size.width() as f32),
        Object::Real(size.height() as f32),
    ])
}

/// Encode text as WinAnsiEncoding bytes
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => WIN_ANSI_HIGH
                .iter()
                .find(|&&(ch, _, _)| ch == c)
                .map_or(REPLACEMENT_BYTE, |&(_, code, _)| code),
        })
        .collect()
}

/// Escape special characters in PDF literal strings
fn escape_pdf_string(bytes: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            escaped.push(b'\\');
        }
        escaped.push(b);
    }
    escaped
}

/// Helvetica-Bold advance width of a WinAnsi byte, in 1/1000 em
fn glyph_width(byte: u8) -> u16 {
    match byte {
        0x20..=0x7E => HELVETICA_BOLD_ASCII[usize::from(byte - 0x20)],
        0xA0..=0xFF => HELVETICA_BOLD_LATIN1[usize::from(byte - 0xA0)],
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|&&(_, code, _)| code == byte)
            .map_or(
                HELVETICA_BOLD_ASCII[usize::from(REPLACEMENT_BYTE - 0x20)],
                |&(_, _, width)| width,
            ),
    }
}

/// WinAnsi codes 128-159 that differ from Latin-1: character, code,
/// Helvetica-Bold width. 0x81, 0x8D, 0x8F, 0x90 and 0x9D are unassigned.
const WIN_ANSI_HIGH: [(char, u8, u16); 27] = [
    ('€', 0x80, 556),
    ('‚', 0x82, 278),
    ('ƒ', 0x83, 556),
    ('„', 0x84, 500),
    ('…', 0x85, 1000),
    ('†', 0x86, 556),
    ('‡', 0x87, 556),
    ('ˆ', 0x88, 333),
    ('‰', 0x89, 1000),
    ('Š', 0x8A, 667),
    ('‹', 0x8B, 333),
    ('Œ', 0x8C, 1000),
    ('Ž', 0x8E, 611),
    ('‘', 0x91, 278),
    ('’', 0x92, 278),
    ('“', 0x93, 500),
    ('”', 0x94, 500),
    ('•', 0x95, 350),
    ('–', 0x96, 556),
    ('—', 0x97, 1000),
    ('˜', 0x98, 333),
    ('™', 0x99, 1000),
    ('š', 0x9A, 556),
    ('›', 0x9B, 333),
    ('œ', 0x9C, 944),
    ('ž', 0x9E, 500),
    ('Ÿ', 0x9F, 667),
];

/// Helvetica-Bold widths for codes 32-126
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
    333, 333, 584, 584, 584, 611, 975, // : - @
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A - M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
    333, 278, 333, 584, 556, 333, // [ - `
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a - m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n - z
    389, 280, 389, 584, // { - ~
];

/// Helvetica-Bold widths for codes 160-255
const HELVETICA_BOLD_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // nbsp - macron
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // degree - questiondown
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // Agrave - Idieresis
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // Eth - germandbls
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // agrave - idieresis
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // eth - ydieresis
];
