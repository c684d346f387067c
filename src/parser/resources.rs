//! Object resolution helpers shared by the reader and the page merger.
//!
//! Pages inherit `Resources`, `MediaBox`, `CropBox` and `Rotate` from
//! their ancestors in the page tree; these helpers walk the `/Parent`
//! chain so callers see the effective value.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

/// Attributes a page may inherit from its `/Pages` ancestors.
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Upper bound on reference chains and page-tree depth.
const MAX_DEPTH: usize = 64;

/// Follow indirect references until a direct object is reached.
pub fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Result<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id)?,
            other => return Ok(other),
        }
    }
    Err(Error::Corrupted("reference chain too deep".to_string()))
}

/// Resolve an object that must be a dictionary (or a stream's dictionary).
pub fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Result<&'a Dictionary> {
    match resolve(doc, obj)? {
        Object::Dictionary(dict) => Ok(dict),
        Object::Stream(stream) => Ok(&stream.dict),
        _ => Err(Error::Corrupted("expected a dictionary".to_string())),
    }
}

/// Look up a page attribute, falling back to the page-tree ancestors.
pub fn inherited<'a>(
    doc: &'a LopdfDocument,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>> {
    let mut node = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(value));
        }
        match node.get(b"Parent") {
            Ok(parent) => node = resolve_dict(doc, parent)?,
            Err(_) => return Ok(None),
        }
    }
    Err(Error::Corrupted("page tree too deep".to_string()))
}

/// Effective resource dictionary of a page, if any.
pub fn page_resources(doc: &LopdfDocument, page_id: ObjectId) -> Result<Option<&Dictionary>> {
    match inherited(doc, page_id, b"Resources")? {
        Some(obj) => resolve_dict(doc, obj).map(Some),
        None => Ok(None),
    }
}

/// Fonts declared in a resource dictionary, keyed by resource name.
///
/// Entries that do not resolve to a dictionary are skipped.
pub fn resource_fonts<'a>(
    doc: &'a LopdfDocument,
    resources: Option<&'a Dictionary>,
) -> BTreeMap<Vec<u8>, &'a Dictionary> {
    let mut fonts = BTreeMap::new();
    let Some(font_dict) = resources
        .and_then(|r| r.get(b"Font").ok())
        .and_then(|f| resolve_dict(doc, f).ok())
    else {
        return fonts;
    };

    for (name, value) in font_dict.iter() {
        match resolve_dict(doc, value) {
            Ok(font) => {
                fonts.insert(name.clone(), font);
            }
            Err(e) => log::warn!(
                "Skipping font /{}: {}",
                String::from_utf8_lossy(name),
                e
            ),
        }
    }
    fonts
}

/// Base font name of a font dictionary (e.g. "Helvetica-Bold").
pub fn base_font_name(font: &Dictionary) -> String {
    font.get(b"BaseFont")
        .ok()
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Raw (decompressed) bytes of a stream object.
///
/// Streams with an unsupported or missing filter are returned as stored.
pub fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Simple text decoding fallback when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
