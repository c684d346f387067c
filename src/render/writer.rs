//! Output document assembly.

use std::path::Path;

use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{MergedSource, Page};
use crate::parser::resources::{inherited, resolve_dict, INHERITABLE_KEYS};

use super::ObjectImporter;

/// PDF version written when none is requested.
const DEFAULT_VERSION: &str = "1.5";

/// Accumulates pages and serializes them as one PDF.
///
/// Overlay pages are deep-copied into the writer's own document when
/// added, so the source [`Page`] can be dropped right after. Objects of
/// the input document go through one importer for the whole run: an
/// object shared by many pages (a font, an image, a resource
/// dictionary) is written once.
pub struct PdfWriter<'a> {
    doc: LopdfDocument,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    source: Option<ObjectImporter<'a>>,
}

impl<'a> PdfWriter<'a> {
    /// Create an empty output document.
    pub fn new() -> Self {
        Self::with_version(DEFAULT_VERSION)
    }

    /// Create an empty output document with the given PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        let mut doc = LopdfDocument::with_version(version);
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            source: None,
        }
    }

    /// Set the input document that merged pages refer to.
    pub fn with_source(mut self, source: &'a LopdfDocument) -> Self {
        self.source = Some(ObjectImporter::new(source));
        self
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a page at the end of the document.
    ///
    /// Fails if the page was merged from an input page but the writer
    /// has no source document.
    pub fn add_page(&mut self, page: &Page) -> Result<ObjectId> {
        let overlay = page.document();
        let overlay_dict = overlay.get_dictionary(page.id())?;
        let new_id = self.doc.new_object_id();

        let mut importer = ObjectImporter::new(overlay);
        importer.bind(page.id(), new_id);

        let mut dict = Dictionary::new();
        for (key, value) in overlay_dict.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            dict.set(key.clone(), importer.import(&mut self.doc, value)?);
        }
        // The parent chain is not copied, so inherited attributes move onto the page.
        for key in INHERITABLE_KEYS {
            if dict.has(key) {
                continue;
            }
            if let Some(value) = inherited(overlay, page.id(), key)? {
                dict.set(key.to_vec(), importer.import(&mut self.doc, value)?);
            }
        }

        if let Some(merged) = page.source() {
            self.add_source(&mut dict, merged, new_id)?;
        }
        dict.set("Parent", self.pages_id);

        self.doc.objects.insert(new_id, Object::Dictionary(dict));
        self.kids.push(new_id);
        Ok(new_id)
    }

    /// Copy the input page parts of `merged` onto the page dictionary `dict`.
    fn add_source(
        &mut self,
        dict: &mut Dictionary,
        merged: &MergedSource,
        new_id: ObjectId,
    ) -> Result<()> {
        let importer = self.source.as_mut().ok_or_else(|| {
            Error::Write(format!(
                "page {} was merged from an input document the writer does not have",
                merged.number
            ))
        })?;
        importer.bind(merged.page_id, new_id);
        let before = importer.mapped();

        let mut contents = match dict.get(b"Contents") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(other) => vec![other.clone()],
            Err(_) => Vec::new(),
        };
        for id in &merged.contents {
            contents.push(importer.import(&mut self.doc, &Object::Reference(*id))?);
        }
        dict.set("Contents", Object::Array(contents));

        if let Some(resources) = &merged.resources {
            let imported = importer.import(&mut self.doc, resources)?;
            let overlay_resources = dict
                .get(b"Resources")
                .and_then(Object::as_dict)
                .ok()
                .filter(|r| !r.is_empty())
                .cloned();
            match overlay_resources {
                // Keep the input's resources shared when there is nothing to add.
                None => dict.set("Resources", imported),
                Some(extra) => {
                    let mut combined = resolve_dict(&self.doc, &imported)?.clone();
                    merge_resources(&mut combined, &extra);
                    dict.set("Resources", Object::Dictionary(combined));
                }
            }
        }
        if let Some(crop_box) = &merged.crop_box {
            dict.set("CropBox", importer.import(&mut self.doc, crop_box)?);
        }
        if let Some(annots) = &merged.annots {
            dict.set("Annots", importer.import(&mut self.doc, annots)?);
        }
        if merged.rotation != 0 {
            dict.set("Rotate", Object::Integer(merged.rotation));
        }

        log::debug!(
            "Page {}: {} new input objects copied",
            merged.number,
            importer.mapped() - before
        );
        Ok(())
    }

    /// Finalize and serialize the document into memory.
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        self.finalize();
        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| Error::Write(e.to_string()))?;
        Ok(bytes)
    }

    /// Finalize and write the document to `path`, replacing any existing file.
    ///
    /// The document is serialized fully before the file is touched.
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Write the page tree, catalog and info dictionary.
    fn finalize(&mut self) {
        let kids: Vec<Object> = self.kids.iter().map(|id| Object::Reference(*id)).collect();
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.kids.len() as i64,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let created = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let info_id = self.doc.add_object(dictionary! {
            "Producer" => Object::string_literal(concat!("pdfhighlight ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(created),
        });
        self.doc.trailer.set("Info", info_id);

        self.doc.compress();
    }
}

impl Default for PdfWriter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Add entries of `extra` that `base` does not define.
///
/// Both arguments are resource dictionaries; categories present in both
/// are merged name by name when `base` holds them directly.
fn merge_resources(base: &mut Dictionary, extra: &Dictionary) {
    for (category, entries) in extra.iter() {
        match base.get_mut(category) {
            Ok(Object::Dictionary(existing)) => {
                if let Ok(entries) = entries.as_dict() {
                    for (name, value) in entries.iter() {
                        if !existing.has(name) {
                            existing.set(name.clone(), value.clone());
                        }
                    }
                }
            }
            Ok(_) => log::warn!(
                "Resource category /{} is indirect, overlay entries dropped",
                String::from_utf8_lossy(category)
            ),
            Err(_) => base.set(category.clone(), entries.clone()),
        }
    }
}
