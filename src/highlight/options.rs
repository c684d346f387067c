//! Highlight options and configuration.

use crate::model::{PageSize, Rect, Rgb};

/// Placement and shape of a highlight rectangle.
///
/// The rectangle spans a fixed horizontal band; only its vertical
/// position follows the matched text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightGeometry {
    /// Left edge of the rectangle
    pub x: f32,

    /// Rectangle width
    pub width: f32,

    /// Rectangle height
    pub height: f32,

    /// Corner radius
    pub radius: f32,

    /// Offset from the text baseline to the bottom edge
    pub baseline_offset: f32,
}

impl HighlightGeometry {
    /// Rectangle for a run whose baseline sits at `baseline`.
    pub fn rect_for(&self, baseline: f32) -> Rect {
        Rect::from_origin(
            self.x,
            baseline + self.baseline_offset,
            self.width,
            self.height,
        )
    }
}

impl Default for HighlightGeometry {
    fn default() -> Self {
        Self {
            x: 10.0,
            width: 550.0,
            height: 14.0,
            radius: 3.0,
            baseline_offset: -2.0,
        }
    }
}

/// Options for highlighting pages.
#[derive(Debug, Clone, Default)]
pub struct HighlightOptions {
    /// Fill color of the highlight rectangles
    pub color: Rgb,

    /// Outline color; rectangles are not stroked when unset
    pub outline: Option<Rgb>,

    /// Rectangle geometry
    pub geometry: HighlightGeometry,

    /// Size of the overlay page the rectangles are drawn on
    pub page_size: PageSize,
}

impl HighlightOptions {
    /// Create new highlight options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fill color.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Stroke the rectangles with `color` in addition to filling them.
    pub fn with_outline(mut self, color: Rgb) -> Self {
        self.outline = Some(color);
        self
    }

    /// Set the rectangle geometry.
    pub fn with_geometry(mut self, geometry: HighlightGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the overlay page size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }
}
