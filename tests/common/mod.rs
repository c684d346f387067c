//! Fixture PDFs built in memory with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfhighlight::model::number;
use pdfhighlight::SourcePage;

pub const A4: [f32; 4] = [0.0, 0.0, 595.2756, 841.8898];
pub const LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Baseline of the first line on every fixture page.
pub const FIRST_BASELINE: f32 = 700.0;

/// Distance between consecutive lines.
pub const LEADING: f32 = 20.0;

/// One fixture page: its lines of text and its media box.
pub struct FixturePage<'a> {
    pub lines: &'a [&'a str],
    pub media_box: [f32; 4],
}

impl<'a> FixturePage<'a> {
    pub fn a4(lines: &'a [&'a str]) -> Self {
        Self {
            lines,
            media_box: A4,
        }
    }
}

/// Baseline of the `index`-th line (0-based).
pub fn baseline(index: usize) -> f32 {
    FIRST_BASELINE - LEADING * index as f32
}

/// Build a PDF with one text line per entry, using Helvetica.
pub fn build_pdf(pages: &[FixturePage<'_>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for page in pages {
        let mut content = format!("BT /F1 12 Tf {} TL 72 {} Td\n", LEADING, FIRST_BASELINE);
        for (i, line) in page.lines.iter().enumerate() {
            if i > 0 {
                content.push_str("T*\n");
            }
            content.push_str(&format!("({}) Tj\n", escape(line)));
        }
        content.push_str("ET\n");

        let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => page.media_box.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture serializes");
    bytes
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Operations of a page's content streams, in painting order.
pub fn page_operations(page: &SourcePage<'_>) -> Vec<Operation> {
    let content = page.content().expect("page content");
    Content::decode(&content).expect("content decodes").operations
}

/// `(x, y)` of every rounded-rectangle start point (`m`) on a page.
pub fn moveto_points(page: &SourcePage<'_>) -> Vec<(f32, f32)> {
    page_operations(page)
        .into_iter()
        .filter(|op| op.operator == "m")
        .map(|op| {
            let x = number(&op.operands[0]).expect("x");
            let y = number(&op.operands[1]).expect("y");
            (x, y)
        })
        .collect()
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}
