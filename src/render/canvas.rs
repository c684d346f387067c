//! Vector drawing surface that finalizes into a one-page PDF.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, Stream};

use crate::error::{Error, Result};
use crate::model::{Page, PageSize, Rect, Rgb};

/// Control-point distance for approximating a quarter circle with a cubic Bézier.
const KAPPA: f32 = 0.5523;

/// How a path is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintMode {
    /// Fill the interior only
    #[default]
    Fill,
    /// Stroke the outline only
    Stroke,
    /// Fill, then stroke
    FillStroke,
    /// End the path without painting
    None,
}

impl PaintMode {
    /// Build a mode from separate stroke/fill flags.
    pub fn from_flags(stroke: bool, fill: bool) -> Self {
        match (stroke, fill) {
            (false, true) => PaintMode::Fill,
            (true, false) => PaintMode::Stroke,
            (true, true) => PaintMode::FillStroke,
            (false, false) => PaintMode::None,
        }
    }

    fn operator(self) -> &'static str {
        match self {
            PaintMode::Fill => "f",
            PaintMode::Stroke => "S",
            PaintMode::FillStroke => "B",
            PaintMode::None => "n",
        }
    }
}

/// A blank page that shapes are drawn onto.
///
/// Operations are recorded in order and wrapped in `q … Q` when the
/// canvas is finished, so the graphics state never leaks into content
/// painted after it.
#[derive(Debug)]
pub struct Canvas {
    size: PageSize,
    operations: Vec<Operation>,
    shapes: Vec<Rect>,
}

impl Canvas {
    /// Create an empty canvas of the given page size.
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            operations: vec![Operation::new("q", vec![])],
            shapes: Vec::new(),
        }
    }

    /// Bounding boxes of the shapes drawn so far.
    pub fn shapes(&self) -> &[Rect] {
        &self.shapes
    }

    /// Set the non-stroking (fill) color.
    pub fn set_fill_color(&mut self, color: Rgb) {
        self.operations.push(Operation::new("rg", color.operands()));
    }

    /// Set the stroking color.
    pub fn set_stroke_color(&mut self, color: Rgb) {
        self.operations.push(Operation::new("RG", color.operands()));
    }

    /// Draw a rectangle with rounded corners.
    ///
    /// Negative sizes are normalized and the radius is clamped to half
    /// the shorter side.
    pub fn round_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32, mode: PaintMode) {
        let rect = Rect::from_origin(x, y, width, height).normalized();
        let (x0, y0, x1, y1) = (rect.llx, rect.lly, rect.urx, rect.ury);
        let r = radius.max(0.0).min(rect.width() / 2.0).min(rect.height() / 2.0);
        let k = r * KAPPA;

        let ops = &mut self.operations;
        ops.push(op("m", &[x0 + r, y0]));
        ops.push(op("l", &[x1 - r, y0]));
        ops.push(op("c", &[x1 - r + k, y0, x1, y0 + r - k, x1, y0 + r]));
        ops.push(op("l", &[x1, y1 - r]));
        ops.push(op("c", &[x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1]));
        ops.push(op("l", &[x0 + r, y1]));
        ops.push(op("c", &[x0 + r - k, y1, x0, y1 - r + k, x0, y1 - r]));
        ops.push(op("l", &[x0, y0 + r]));
        ops.push(op("c", &[x0, y0 + r - k, x0 + r - k, y0, x0 + r, y0]));
        ops.push(Operation::new("h", vec![]));
        ops.push(Operation::new(mode.operator(), vec![]));

        self.shapes.push(rect);
    }

    /// Encode the recorded operations as a content stream.
    pub fn content(&self) -> Result<Vec<u8>> {
        let mut operations = self.operations.clone();
        operations.push(Operation::new("Q", vec![]));
        Content { operations }
            .encode()
            .map_err(|e| Error::Write(format!("failed to encode canvas: {}", e)))
    }

    /// Finalize the canvas into a standalone one-page document.
    pub fn finish(self) -> Result<Page> {
        let content = self.content()?;

        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => self.size.media_box().to_object(),
            "Contents" => content_id,
            "Resources" => Dictionary::new(),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(Page::new(doc, page_id, self.shapes))
    }
}

fn op(operator: &str, values: &[f32]) -> Operation {
    Operation::new(operator, values.iter().map(|v| Object::Real(*v)).collect())
}
