//! Output page type.

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::parser::SourcePage;

use super::Rect;

/// A single output page.
///
/// A page starts life as a finished [`Canvas`](crate::render::Canvas)
/// holding only the highlight overlay, stored as a standalone one-page
/// document. [`Page::merge`] then records an input page to paint over
/// it. The input page's objects stay in the input document until
/// [`PdfWriter`](crate::render::PdfWriter) copies them, so objects
/// shared between pages are written once.
#[derive(Debug, Clone)]
pub struct Page {
    doc: LopdfDocument,
    id: ObjectId,
    highlights: Vec<Rect>,
    source: Option<MergedSource>,
}

/// Parts of an input page painted over the overlay.
///
/// Every object here belongs to the input document.
#[derive(Debug, Clone)]
pub struct MergedSource {
    /// Page number in the input (1-indexed)
    pub number: u32,
    /// Object id of the input page dictionary
    pub page_id: ObjectId,
    /// Content streams, in painting order
    pub contents: Vec<ObjectId>,
    /// Effective `/Resources` entry, as stored (often a reference)
    pub resources: Option<Object>,
    /// Effective `/CropBox`
    pub crop_box: Option<Object>,
    /// `/Annots` of the page itself
    pub annots: Option<Object>,
    /// Effective rotation in degrees
    pub rotation: i64,
}

impl Page {
    /// Wrap a one-page document and the shapes drawn on it.
    pub fn new(doc: LopdfDocument, id: ObjectId, highlights: Vec<Rect>) -> Self {
        Self {
            doc,
            id,
            highlights,
            source: None,
        }
    }

    /// The document holding the overlay page.
    pub fn document(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Object id of the page dictionary within [`Page::document`].
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Highlight rectangles drawn behind the content.
    pub fn highlights(&self) -> &[Rect] {
        &self.highlights
    }

    /// Number of highlight rectangles.
    pub fn highlight_count(&self) -> usize {
        self.highlights.len()
    }

    /// The input page merged over the overlay, if any.
    pub fn source(&self) -> Option<&MergedSource> {
        self.source.as_ref()
    }

    /// The page's media box.
    pub fn media_box(&self) -> Result<Rect> {
        let obj = self
            .dictionary()?
            .get(b"MediaBox")
            .map_err(|_| Error::Corrupted("page has no MediaBox".to_string()))?;
        Rect::from_object(obj)
    }

    /// Replace the page's media box.
    pub fn set_media_box(&mut self, rect: Rect) -> Result<()> {
        self.doc
            .get_dictionary_mut(self.id)?
            .set("MediaBox", rect.to_object());
        Ok(())
    }

    /// Paint `source`'s content on top of this page.
    ///
    /// The media box is taken from the source page right away. Content
    /// streams, resources, crop box, rotation and annotations are
    /// recorded by id and copied when the page is written, after the
    /// overlay's own content.
    pub fn merge(&mut self, source: &SourcePage<'_>) -> Result<()> {
        let merged = MergedSource {
            number: source.number(),
            page_id: source.id(),
            contents: source.content_ids()?,
            resources: source.attribute(b"Resources")?.cloned(),
            crop_box: source.attribute(b"CropBox")?.cloned(),
            annots: source.dictionary()?.get(b"Annots").ok().cloned(),
            rotation: source.rotation()?,
        };
        log::debug!(
            "Merged page {}: {} content streams",
            merged.number,
            merged.contents.len()
        );

        self.set_media_box(source.media_box()?)?;
        self.source = Some(merged);
        Ok(())
    }

    fn dictionary(&self) -> Result<&Dictionary> {
        Ok(self.doc.get_dictionary(self.id)?)
    }
}
