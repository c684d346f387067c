//! Per-page highlighting.

use regex::Regex;

use crate::error::Result;
use crate::model::Page;
use crate::parser::SourcePage;
use crate::render::{Canvas, PaintMode};

use super::HighlightOptions;

/// Draws a highlight behind every text run of a page that matches a pattern.
///
/// The highlights are painted on a blank overlay page first and the
/// original page content is merged on top, so the text stays readable.
#[derive(Debug, Clone, Default)]
pub struct PageHighlighter {
    options: HighlightOptions,
}

impl PageHighlighter {
    /// Create a highlighter with the given options.
    pub fn new(options: HighlightOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> &HighlightOptions {
        &self.options
    }

    /// Produce the highlighted version of `page`.
    ///
    /// A run matches when `pattern` is found anywhere in its text. Each
    /// matching run gets its own rectangle, even when several runs share
    /// a line. Pages without matches still go through the merge and come
    /// back with no highlights.
    pub fn highlight(&self, pattern: &Regex, page: &SourcePage<'_>) -> Result<Page> {
        let geometry = &self.options.geometry;
        let mut canvas = Canvas::new(self.options.page_size);
        canvas.set_fill_color(self.options.color);
        if let Some(outline) = self.options.outline {
            canvas.set_stroke_color(outline);
        }
        let mode = PaintMode::from_flags(self.options.outline.is_some(), true);

        for run in page.text_runs()? {
            let run = run?;
            if !pattern.is_match(&run.text) {
                continue;
            }
            let baseline = run.baseline();
            log::debug!(
                "Page {}: match at y={:.2} in {:?}",
                page.number(),
                baseline,
                run.text
            );
            let rect = geometry.rect_for(baseline);
            canvas.round_rect(
                rect.llx,
                rect.lly,
                rect.width(),
                rect.height(),
                geometry.radius,
                mode,
            );
        }

        let mut output = canvas.finish()?;
        output.merge(page)?;
        Ok(output)
    }
}
