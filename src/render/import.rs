//! Deep copy of objects between lopdf documents.
//!
//! Object ids differ between documents, so every indirect object reached
//! from the copied value is given a fresh id in the destination and the
//! mapping is remembered; shared objects are copied once and cycles
//! terminate.

use std::collections::HashMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::Result;

/// Copies objects from one document into another, keeping an id map.
pub struct ObjectImporter<'a> {
    src: &'a LopdfDocument,
    map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectImporter<'a> {
    /// Create an importer reading from `src`.
    pub fn new(src: &'a LopdfDocument) -> Self {
        Self {
            src,
            map: HashMap::new(),
        }
    }

    /// Declare that `src_id` is already represented by `dst_id`.
    ///
    /// Used for the page being copied, so that annotations pointing
    /// back at it (`/P`) land on the new page.
    pub fn bind(&mut self, src_id: ObjectId, dst_id: ObjectId) {
        self.map.insert(src_id, dst_id);
    }

    /// Number of source objects mapped so far.
    pub fn mapped(&self) -> usize {
        self.map.len()
    }

    /// Copy `obj` (and everything it references) into `dst`.
    pub fn import(&mut self, dst: &mut LopdfDocument, obj: &Object) -> Result<Object> {
        Ok(match obj {
            Object::Reference(id) => self.import_reference(dst, *id)?,
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.import(dst, item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Object::Dictionary(dict) => Object::Dictionary(self.import_dict(dst, dict)?),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.import_dict(dst, &stream.dict)?;
                Object::Stream(copy)
            }
            other => other.clone(),
        })
    }

    /// Copy every entry of a dictionary.
    pub fn import_dict(&mut self, dst: &mut LopdfDocument, dict: &Dictionary) -> Result<Dictionary> {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            copy.set(key.clone(), self.import(dst, value)?);
        }
        Ok(copy)
    }

    fn import_reference(&mut self, dst: &mut LopdfDocument, id: ObjectId) -> Result<Object> {
        if let Some(mapped) = self.map.get(&id) {
            return Ok(Object::Reference(*mapped));
        }

        let src = self.src;
        let source = match src.get_object(id) {
            Ok(obj) => obj,
            Err(_) => {
                // Dangling references read as null.
                log::debug!("Dropping dangling reference {} {} R", id.0, id.1);
                return Ok(Object::Null);
            }
        };

        // Other pages are reachable through links and annotations; copying
        // them would drag in the whole page tree.
        if is_page_node(source) {
            log::debug!("Dropping reference to foreign page {} {} R", id.0, id.1);
            return Ok(Object::Null);
        }

        let new_id = dst.new_object_id();
        self.map.insert(id, new_id);
        let copy = self.import(dst, source)?;
        dst.objects.insert(new_id, copy);
        Ok(Object::Reference(new_id))
    }
}

/// Whether an object is a `/Page` or `/Pages` dictionary.
fn is_page_node(obj: &Object) -> bool {
    match obj {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type").and_then(Object::as_name),
            Ok(b"Page") | Ok(b"Pages")
        ),
        _ => false,
    }
}
