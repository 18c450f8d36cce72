//! Text surface capability set.
//!
//! Everything host-specific sits behind this trait: reading the text,
//! geometry, range measurement, replacement and hit testing. Resolution,
//! segmentation and merging never see a surface; only measurement and fix
//! application do.
//!
//! Coordinate conventions:
//! - `bounding_box` and `hit_test` use viewport coordinates.
//! - `measure_range` returns element coordinates (relative to the border box,
//!   internal scroll already subtracted).

use crate::error::MeasureError;
use crate::geometry::{Point, Rect, ScrollOffset};
use ahash::AHasher;
use core_text::Span;
use std::hash::{Hash, Hasher};

/// What is rendered on top at a given viewport point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Surface,
    /// A rendered descendant of the surface (rich text blocks).
    Descendant,
    /// Anything else: another layer, or outside the surface.
    Foreign,
}

impl HitTarget {
    pub fn is_own(&self) -> bool {
        matches!(self, HitTarget::Surface | HitTarget::Descendant)
    }
}

pub trait TextSurface {
    fn text(&self) -> &str;
    /// Bumped on every content change.
    fn revision(&self) -> u64;
    fn bounding_box(&self) -> Rect;
    fn scroll_offset(&self) -> ScrollOffset;
    fn measure_range(&self, span: Span) -> Result<Vec<Rect>, MeasureError>;
    /// Replace `span` with `replacement`. Returns false when the surface
    /// refuses the edit; the text is then unchanged.
    fn replace_range(&mut self, span: Span, replacement: &str) -> bool;
    fn hit_test(&self, point: Point) -> HitTarget;
    /// Cheap signature of layout-affecting style, compared by periodic polls.
    fn style_signature(&self) -> u64;
}

pub(crate) fn check_span(text: &str, span: Span) -> Result<(), MeasureError> {
    if span.end > text.len() || span.start > span.end {
        return Err(MeasureError::OutOfBounds {
            start: span.start,
            end: span.end,
            len: text.len(),
        });
    }
    if !text.is_char_boundary(span.start) || !text.is_char_boundary(span.end) {
        return Err(MeasureError::NotCharBoundary {
            start: span.start,
            end: span.end,
        });
    }
    Ok(())
}

/// Hash of float-valued style parameters.
pub(crate) fn float_signature(values: &[f64]) -> u64 {
    let mut hasher = AHasher::default();
    for v in values {
        v.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}
