//! Drawing and output assembly.

mod canvas;
mod import;
mod writer;

pub use canvas::{Canvas, PaintMode};
pub use import::ObjectImporter;
pub use writer::PdfWriter;
