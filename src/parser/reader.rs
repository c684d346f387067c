//! PDF document reader using lopdf.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::Rect;

use super::resources::{inherited, page_resources, resolve, stream_bytes};
use super::text::TextRuns;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// How far into the file the header may start (some producers emit junk first).
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Default media box when a page declares none (US Letter).
const DEFAULT_MEDIA_BOX: Rect = Rect {
    llx: 0.0,
    lly: 0.0,
    urx: 612.0,
    ury: 792.0,
};

/// Read-only view of an input PDF.
pub struct PdfReader {
    doc: LopdfDocument,
    /// Page number (1-indexed) to page object id.
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfReader {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data)
    }

    /// Open a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        check_header(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded lopdf document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages();
        Self { doc, pages }
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// PDF version string (e.g. "1.7").
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Page by 1-indexed page number.
    pub fn page(&self, number: u32) -> Result<SourcePage<'_>> {
        let id = self
            .pages
            .get(&number)
            .ok_or(Error::PageOutOfRange(number, self.page_count()))?;
        Ok(SourcePage {
            doc: &self.doc,
            id: *id,
            number,
        })
    }

    /// All pages in document order.
    pub fn pages(&self) -> impl Iterator<Item = SourcePage<'_>> + '_ {
        self.pages.iter().map(move |(number, id)| SourcePage {
            doc: &self.doc,
            id: *id,
            number: *number,
        })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }
}

/// A borrowed page of a [`PdfReader`].
#[derive(Clone, Copy)]
pub struct SourcePage<'a> {
    doc: &'a LopdfDocument,
    id: ObjectId,
    number: u32,
}

impl<'a> SourcePage<'a> {
    /// Page number (1-indexed).
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Object id of the page dictionary.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The document this page belongs to.
    pub fn document(&self) -> &'a LopdfDocument {
        self.doc
    }

    /// The page dictionary itself (without inherited attributes).
    pub fn dictionary(&self) -> Result<&'a Dictionary> {
        Ok(self.doc.get_dictionary(self.id)?)
    }

    /// A page attribute, looked up through the page tree.
    pub fn attribute(&self, key: &[u8]) -> Result<Option<&'a Object>> {
        inherited(self.doc, self.id, key)
    }

    /// Effective media box, inherited from the page tree if necessary.
    pub fn media_box(&self) -> Result<Rect> {
        match self.attribute(b"MediaBox")? {
            Some(obj) => Rect::from_object(resolve(self.doc, obj)?),
            None => {
                log::warn!(
                    "Page {} has no MediaBox, assuming US Letter",
                    self.number
                );
                Ok(DEFAULT_MEDIA_BOX)
            }
        }
    }

    /// Effective page rotation in degrees.
    pub fn rotation(&self) -> Result<i64> {
        match self.attribute(b"Rotate")? {
            Some(obj) => Ok(resolve(self.doc, obj)?.as_i64().unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Effective resource dictionary.
    pub fn resources(&self) -> Result<Option<&'a Dictionary>> {
        page_resources(self.doc, self.id)
    }

    /// Object ids of the page's content streams, in painting order.
    pub fn content_ids(&self) -> Result<Vec<ObjectId>> {
        let page = self.dictionary()?;
        let contents = match page.get(b"Contents") {
            Ok(contents) => contents,
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r)? {
                Object::Stream(_) => Ok(vec![*r]),
                Object::Array(arr) => Ok(arr.iter().filter_map(|o| o.as_reference().ok()).collect()),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(arr.iter().filter_map(|o| o.as_reference().ok()).collect()),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// The concatenated (decompressed) content stream bytes.
    pub fn content(&self) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        for id in self.content_ids()? {
            match self.doc.get_object(id)? {
                Object::Stream(s) => {
                    content.extend_from_slice(&stream_bytes(s));
                    content.push(b'\n');
                }
                _ => return Err(Error::PdfParse("Invalid content stream".to_string())),
            }
        }
        Ok(content)
    }

    /// Lazily walk the text runs of this page in content order.
    pub fn text_runs(&self) -> Result<TextRuns<'a>> {
        let content = self.content()?;
        TextRuns::new(self.doc, &content, self.resources()?)
    }
}

/// Verify the data starts with a PDF header.
fn check_header(data: &[u8]) -> Result<()> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        Ok(())
    } else {
        Err(Error::UnknownFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn sample_document() -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content_a = doc.add_object(Stream::new(
            lopdf::Dictionary::new(),
            b"BT /F1 12 Tf 72 700 Td (Hello) Tj ET".to_vec(),
        ));
        let content_b = doc.add_object(Stream::new(
            lopdf::Dictionary::new(),
            b"BT /F1 12 Tf 72 680 Td (World) Tj ET".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => vec![content_a.into(), content_b.into()],
            "Rotate" => 90,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_open_and_page_attributes() {
        let reader = PdfReader::from_bytes(&sample_document()).unwrap();
        assert_eq!(reader.page_count(), 1);

        let page = reader.page(1).unwrap();
        assert_eq!(page.number(), 1);
        assert_eq!(page.media_box().unwrap(), Rect::new(0.0, 0.0, 300.0, 400.0));
        assert_eq!(page.rotation().unwrap(), 90);
        assert!(page.resources().unwrap().is_some());
        assert_eq!(page.content_ids().unwrap().len(), 2);
    }

    #[test]
    fn test_text_runs_across_content_streams() {
        let reader = PdfReader::from_bytes(&sample_document()).unwrap();
        let page = reader.page(1).unwrap();
        let runs: Vec<_> = page
            .text_runs()
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Hello");
        assert_eq!(runs[0].font.base_font, "Helvetica");
        assert_eq!(runs[1].text, "World");
        assert_eq!(runs[1].baseline(), 680.0);
    }

    #[test]
    fn test_page_out_of_range() {
        let reader = PdfReader::from_bytes(&sample_document()).unwrap();
        assert!(matches!(reader.page(2), Err(Error::PageOutOfRange(2, 1))));
    }

    #[test]
    fn test_rejects_non_pdf() {
        let result = PdfReader::from_bytes(b"<!DOCTYPE html><html></html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_pages_iterates_in_order() {
        let reader = PdfReader::from_bytes(&sample_document()).unwrap();
        let numbers: Vec<_> = reader.pages().map(|p| p.number()).collect();
        assert_eq!(numbers, [1]);
    }
}
