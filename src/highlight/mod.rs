//! Regex-driven line highlighting.
//!
//! [`PageHighlighter`] turns one input page into an output page with a
//! highlight drawn behind every matching text run; [`DocumentProcessor`]
//! runs it over a whole document and writes the result.

mod highlighter;
mod options;
mod processor;

pub use highlighter::PageHighlighter;
pub use options::{HighlightGeometry, HighlightOptions};
pub use processor::{DocumentProcessor, HighlightSummary, PageEvent};
