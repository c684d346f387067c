//! Whole-document processing.

use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::error::Result;
use crate::parser::PdfReader;
use crate::render::PdfWriter;

use super::{HighlightOptions, PageHighlighter};

/// Progress notification sent after each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEvent {
    /// Page number (1-indexed)
    pub page: u32,
    /// Total number of pages in the input
    pub total: u32,
    /// Highlights drawn on this page
    pub highlights: usize,
}

/// Totals for one processed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightSummary {
    /// Pages written to the output
    pub pages: u32,
    /// Highlights drawn across all pages
    pub highlights: usize,
    /// Pages with at least one highlight
    pub pages_with_matches: u32,
}

impl HighlightSummary {
    fn record(&mut self, highlights: usize) {
        self.pages += 1;
        self.highlights += highlights;
        if highlights > 0 {
            self.pages_with_matches += 1;
        }
    }
}

impl fmt::Display for HighlightSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} highlights on {} of {} pages",
            self.highlights, self.pages_with_matches, self.pages
        )
    }
}

type Observer<'a> = Box<dyn FnMut(&PageEvent) + 'a>;

/// Highlights every page of a document and writes the result.
///
/// # Example
///
/// ```no_run
/// use pdfhighlight::{DocumentProcessor, compile_pattern};
///
/// let pattern = compile_pattern("total", false)?;
/// let summary = DocumentProcessor::new()
///     .on_page(|event| println!("page {}/{}", event.page, event.total))
///     .process(&pattern, "invoice.pdf", "invoice-highlighted.pdf")?;
/// println!("{}", summary);
/// # Ok::<(), pdfhighlight::Error>(())
/// ```
#[derive(Default)]
pub struct DocumentProcessor<'a> {
    highlighter: PageHighlighter,
    observer: Option<Observer<'a>>,
}

impl<'a> DocumentProcessor<'a> {
    /// Create a processor with default highlight options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor with the given highlight options.
    pub fn with_options(options: HighlightOptions) -> Self {
        Self {
            highlighter: PageHighlighter::new(options),
            observer: None,
        }
    }

    /// Call `observer` after each page has been appended.
    pub fn on_page<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&PageEvent) + 'a,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Highlight `input` and write the result to `output`.
    ///
    /// The output file is replaced if it exists. Nothing is written when
    /// reading or highlighting fails.
    pub fn process<P, Q>(&mut self, pattern: &Regex, input: P, output: Q) -> Result<HighlightSummary>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let reader = PdfReader::open(input.as_ref())?;
        log::info!(
            "Highlighting {:?} in {} ({} pages)",
            pattern.as_str(),
            input.as_ref().display(),
            reader.page_count()
        );
        let (bytes, summary) = self.run(&reader, pattern)?;
        std::fs::write(output.as_ref(), bytes)?;
        log::info!("Wrote {}: {}", output.as_ref().display(), summary);
        Ok(summary)
    }

    /// Highlight an in-memory document and return the output bytes.
    pub fn process_bytes(&mut self, pattern: &Regex, data: &[u8]) -> Result<(Vec<u8>, HighlightSummary)> {
        let reader = PdfReader::from_bytes(data)?;
        self.run(&reader, pattern)
    }

    fn run(&mut self, reader: &PdfReader, pattern: &Regex) -> Result<(Vec<u8>, HighlightSummary)> {
        let total = reader.page_count();
        let mut writer = PdfWriter::with_version(reader.version()).with_source(reader.raw_doc());
        let mut summary = HighlightSummary::default();

        for page in reader.pages() {
            let highlighted = self.highlighter.highlight(pattern, &page)?;
            let highlights = highlighted.highlight_count();
            writer.add_page(&highlighted)?;
            log::debug!("Page {}/{}: {} highlights", page.number(), total, highlights);

            summary.record(highlights);
            if let Some(observer) = self.observer.as_mut() {
                observer(&PageEvent {
                    page: page.number(),
                    total,
                    highlights,
                });
            }
        }

        Ok((writer.to_bytes()?, summary))
    }
}
