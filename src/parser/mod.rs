//! PDF reading: documents, pages and text runs.

mod reader;
pub(crate) mod resources;
mod text;

pub use reader::{PdfReader, SourcePage};
pub use resources::decode_text_simple;
pub use text::{FontMeta, TextRun, TextRuns};
