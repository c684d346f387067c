//! # pdfhighlight
//!
//! Highlight the lines of a PDF whose text matches a regular expression.
//!
//! Every page of the input is copied to the output with a colored,
//! rounded rectangle painted behind each matching line. The original
//! page content is merged on top, so text stays selectable and the
//! document keeps its page count and page sizes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfhighlight::{compile_pattern, process};
//!
//! fn main() -> pdfhighlight::Result<()> {
//!     let pattern = compile_pattern(r"total\s+\d+", false)?;
//!     let summary = process(&pattern, "invoice.pdf", "invoice-highlighted.pdf")?;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Regex search**: full `regex` syntax, optional case-insensitive matching
//! - **Literal search**: [`compile_literal`] matches the term as plain text
//! - **Non-destructive**: highlights sit behind the original content
//! - **Configurable**: highlight color and geometry via [`HighlightOptions`]
//! - **Form XObjects**: text inside forms is searched too

pub mod error;
pub mod highlight;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use highlight::{
    DocumentProcessor, HighlightGeometry, HighlightOptions, HighlightSummary, PageEvent,
    PageHighlighter,
};
pub use model::{Matrix, MergedSource, Page, PageSize, Rect, Rgb};
pub use parser::{PdfReader, SourcePage, TextRun};
pub use render::{Canvas, PaintMode, PdfWriter};

use std::path::Path;

use regex::{Regex, RegexBuilder};

/// Compile a search term into a pattern.
///
/// # Example
///
/// ```
/// use pdfhighlight::compile_pattern;
///
/// let pattern = compile_pattern("total", true).unwrap();
/// assert!(pattern.is_match("TOTAL: 42"));
/// ```
pub fn compile_pattern(term: &str, ignore_case: bool) -> Result<Regex> {
    Ok(RegexBuilder::new(term).case_insensitive(ignore_case).build()?)
}

/// Compile a search term that is matched as plain text.
///
/// Regex metacharacters in `term` have no special meaning.
///
/// # Example
///
/// ```
/// use pdfhighlight::compile_literal;
///
/// let pattern = compile_literal("1.00 (net)", false).unwrap();
/// assert!(pattern.is_match("Total 1.00 (net)"));
/// assert!(!pattern.is_match("Total 1x00 net"));
/// ```
pub fn compile_literal(term: &str, ignore_case: bool) -> Result<Regex> {
    compile_pattern(&regex::escape(term), ignore_case)
}

/// Highlight `input` with default options and write the result to `output`.
///
/// # Example
///
/// ```no_run
/// use pdfhighlight::{compile_pattern, process};
///
/// let pattern = compile_pattern("error", false).unwrap();
/// let summary = process(&pattern, "log.pdf", "log-highlighted.pdf").unwrap();
/// println!("Highlighted {} lines", summary.highlights);
/// ```
pub fn process<P: AsRef<Path>, Q: AsRef<Path>>(
    pattern: &Regex,
    input: P,
    output: Q,
) -> Result<HighlightSummary> {
    DocumentProcessor::new().process(pattern, input, output)
}

/// Highlight an in-memory PDF with default options.
pub fn process_bytes(pattern: &Regex, data: &[u8]) -> Result<(Vec<u8>, HighlightSummary)> {
    DocumentProcessor::new().process_bytes(pattern, data)
}

/// Highlight a single page with default options.
pub fn highlight_page(pattern: &Regex, page: &SourcePage<'_>) -> Result<Page> {
    PageHighlighter::default().highlight(pattern, page)
}
