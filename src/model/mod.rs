//! Geometry and output page types.
//!
//! Everything here is independent of how a page was produced: the
//! [`Page`] type wraps a standalone one-page document that the writer
//! can copy into the final output.

mod geometry;
mod page;

pub use geometry::{number, Matrix, PageSize, Rect, Rgb};
pub use page::{MergedSource, Page};
