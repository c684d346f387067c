//! Text-run traversal of page content streams.
//!
//! [`TextRuns`] walks a page's content stream lazily and yields one
//! [`TextRun`] per text-showing operator (`Tj`, `TJ`, `'`, `"`), in the
//! order the operators appear. Form XObjects invoked with `Do` are
//! entered in place, so their text shows up where the form is painted.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::error::{Error, Result};
use crate::model::{number, Matrix};

use super::resources::{base_font_name, decode_text_simple, resolve, resource_fonts, stream_bytes};

/// Nesting limit for Form XObjects (guards against self-referencing forms).
const MAX_FORM_DEPTH: usize = 8;

/// TJ adjustment (thousandths of text space) treated as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Font in effect when a run was shown.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMeta {
    /// Resource name used by `Tf` (e.g. "F1").
    pub resource: String,
    /// Base font name from the font dictionary (e.g. "Helvetica").
    pub base_font: String,
    /// Font size operand of `Tf`.
    pub size: f32,
}

/// A fragment of rendered text with its positioning state.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Decoded text.
    pub text: String,
    /// Text matrix at the start of the run.
    pub text_matrix: Matrix,
    /// Current transformation matrix at the start of the run.
    pub ctm: Matrix,
    /// Font metadata.
    pub font: FontMeta,
}

impl TextRun {
    /// Vertical offset of the run's baseline (the `f` entry of the text matrix).
    pub fn baseline(&self) -> f32 {
        self.text_matrix.f
    }
}

/// Graphics state entries that matter for text positioning.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_resource: Vec<u8>,
    font_size: f32,
    leading: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font_resource: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

/// One content stream being walked: the page itself or a Form XObject.
struct Frame<'a> {
    ops: std::vec::IntoIter<Operation>,
    resources: Option<&'a Dictionary>,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    /// Graphics state stack height when the frame was entered.
    stack_base: usize,
    /// State to restore when a form frame ends.
    saved: Option<GraphicsState>,
}

/// Lazy iterator over the text runs of a content stream.
pub struct TextRuns<'a> {
    doc: &'a LopdfDocument,
    frames: Vec<Frame<'a>>,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    in_text_block: bool,
}

impl<'a> TextRuns<'a> {
    /// Start walking `content` with the given resource dictionary.
    pub fn new(
        doc: &'a LopdfDocument,
        content: &[u8],
        resources: Option<&'a Dictionary>,
    ) -> Result<Self> {
        let content = Content::decode(content)?;
        let frame = Frame {
            ops: content.operations.into_iter(),
            resources,
            fonts: resource_fonts(doc, resources),
            stack_base: 0,
            saved: None,
        };
        Ok(Self {
            doc,
            frames: vec![frame],
            state: GraphicsState::default(),
            stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            in_text_block: false,
        })
    }

    fn apply(&mut self, op: Operation) -> Result<Option<TextRun>> {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                let base = self.frames.last().map_or(0, |f| f.stack_base);
                if self.stack.len() > base {
                    if let Some(state) = self.stack.pop() {
                        self.state = state;
                    }
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_objects(operands) {
                    self.state.ctm = m.multiply(&self.state.ctm);
                }
            }
            "BT" => {
                self.in_text_block = true;
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "ET" => self.in_text_block = false,
            "Tf" => {
                if operands.len() >= 2 {
                    if let Object::Name(name) = &operands[0] {
                        self.state.font_resource = name.clone();
                    }
                    self.state.font_size = number(&operands[1]).unwrap_or(12.0);
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    self.state.leading = leading;
                }
            }
            "Td" | "TD" => {
                if operands.len() >= 2 {
                    let tx = number(&operands[0]).unwrap_or(0.0);
                    let ty = number(&operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        self.state.leading = -ty;
                    }
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_objects(operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => return Ok(self.show(operands.first())),
            "TJ" => return Ok(self.show(operands.first())),
            "'" => {
                self.next_line();
                return Ok(self.show(operands.first()));
            }
            "\"" => {
                self.next_line();
                return Ok(self.show(operands.get(2)));
            }
            "Do" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.enter_form(name)?;
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.state.leading;
        self.move_line(0.0, -leading);
    }

    /// Build a run from a string or TJ array operand.
    fn show(&self, operand: Option<&Object>) -> Option<TextRun> {
        if !self.in_text_block {
            return None;
        }
        let frame = self.frames.last()?;
        let font = frame.fonts.get(&self.state.font_resource).copied();
        let encoding = font.and_then(|f| f.get_font_encoding(self.doc).ok());
        let decode = |bytes: &[u8]| match &encoding {
            Some(enc) => LopdfDocument::decode_text(enc, bytes).unwrap_or_default(),
            None => decode_text_simple(bytes),
        };

        let text = match operand? {
            Object::String(bytes, _) => decode(bytes),
            Object::Array(items) => {
                let mut combined = String::new();
                for item in items {
                    match item {
                        Object::String(bytes, _) => combined.push_str(&decode(bytes)),
                        other => {
                            // Large negative adjustments advance the pen by a word gap.
                            let gap = number(other).map_or(0.0, |n| -n);
                            if gap > TJ_SPACE_THRESHOLD && needs_space(&combined) {
                                combined.push(' ');
                            }
                        }
                    }
                }
                combined
            }
            _ => return None,
        };

        if text.is_empty() {
            return None;
        }

        Some(TextRun {
            text,
            text_matrix: self.text_matrix,
            ctm: self.state.ctm,
            font: FontMeta {
                resource: String::from_utf8_lossy(&self.state.font_resource).to_string(),
                base_font: font.map(base_font_name).unwrap_or_else(|| "Unknown".to_string()),
                size: self.state.font_size,
            },
        })
    }

    /// Push a frame for the Form XObject named `name`, if it is one.
    fn enter_form(&mut self, name: &[u8]) -> Result<()> {
        if self.frames.len() > MAX_FORM_DEPTH {
            log::warn!(
                "Form XObject /{} nested too deeply, skipping",
                String::from_utf8_lossy(name)
            );
            return Ok(());
        }
        let doc = self.doc;
        let Some(resources) = self.frames.last().and_then(|f| f.resources) else {
            return Ok(());
        };
        let Some(xobject) = resources
            .get(b"XObject")
            .ok()
            .and_then(|x| resolve(doc, x).ok())
            .and_then(|x| x.as_dict().ok())
            .and_then(|x| x.get(name).ok())
        else {
            return Ok(());
        };
        let Object::Stream(stream) = resolve(doc, xobject)? else {
            return Ok(());
        };
        if stream.dict.get(b"Subtype").and_then(Object::as_name).ok() != Some(b"Form".as_slice()) {
            return Ok(());
        }

        let content = Content::decode(&stream_bytes(stream)).map_err(|e| {
            Error::PdfParse(format!(
                "form XObject /{}: {}",
                String::from_utf8_lossy(name),
                e
            ))
        })?;
        let form_resources = match stream.dict.get(b"Resources") {
            Ok(obj) => resolve(doc, obj)?.as_dict().ok(),
            Err(_) => Some(resources),
        };
        let form_matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|m| m.as_array().ok())
            .and_then(|m| Matrix::from_objects(m))
            .unwrap_or(Matrix::IDENTITY);

        let saved = self.state.clone();
        self.state.ctm = form_matrix.multiply(&self.state.ctm);
        self.frames.push(Frame {
            ops: content.operations.into_iter(),
            resources: form_resources,
            fonts: resource_fonts(doc, form_resources),
            stack_base: self.stack.len(),
            saved: Some(saved),
        });
        Ok(())
    }

    fn leave_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.stack.truncate(frame.stack_base);
            if let Some(saved) = frame.saved {
                self.state = saved;
            }
        }
    }
}

impl<'a> Iterator for TextRuns<'a> {
    type Item = Result<TextRun>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let op = match self.frames.last_mut()?.ops.next() {
                Some(op) => op,
                None => {
                    self.leave_frame();
                    continue;
                }
            };
            match self.apply(op) {
                Ok(Some(run)) => return Some(Ok(run)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Whether a word gap should become a space at the end of `text`.
fn needs_space(text: &str) -> bool {
    match text.chars().last() {
        None | Some(' ') | Some('\u{00A0}') => false,
        Some(c) => !is_spaceless_script_char(c),
    }
}

/// Chinese and Japanese scripts do not separate words with spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
}
