//! Plain text fields (single-line inputs and multi-line text areas).
//!
//! Measured through a `MirrorLayout` rebuilt on every content, size or style
//! change, so `measure_range` is a pure lookup.

use crate::error::MeasureError;
use crate::geometry::{Point, Rect, ScrollOffset};
use crate::mirror::{MirrorLayout, MirrorStyle, WrapMode};
use crate::surface::{HitTarget, TextSurface, check_span, float_signature};
use core_text::Span;

#[derive(Debug, Clone)]
pub struct PlainTextSurface {
    text: String,
    revision: u64,
    bounding_box: Rect,
    scroll: ScrollOffset,
    style: MirrorStyle,
    occluders: Vec<Rect>,
    read_only: bool,
    mirror: MirrorLayout,
}

impl PlainTextSurface {
    pub fn new(text: impl Into<String>, bounding_box: Rect, style: MirrorStyle) -> Self {
        let text = text.into();
        let mirror = MirrorLayout::new(&text, bounding_box.width, style);
        Self {
            text,
            revision: 0,
            bounding_box,
            scroll: ScrollOffset::default(),
            style,
            occluders: Vec::new(),
            read_only: false,
            mirror,
        }
    }

    /// `<input>`-like field: no wrapping, scrolls horizontally.
    pub fn single_line(text: impl Into<String>, bounding_box: Rect) -> Self {
        let style = MirrorStyle {
            wrap: WrapMode::NoWrap,
            ..MirrorStyle::default()
        };
        Self::new(text, bounding_box, style)
    }

    /// `<textarea>`-like field: word wrap, scrolls vertically.
    pub fn multi_line(text: impl Into<String>, bounding_box: Rect) -> Self {
        Self::new(text, bounding_box, MirrorStyle::default())
    }

    fn relayout(&mut self) {
        self.mirror = MirrorLayout::new(&self.text, self.bounding_box.width, self.style);
    }

    pub fn mirror(&self) -> &MirrorLayout {
        &self.mirror
    }

    /// Replace the whole text, as if the user typed.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.revision += 1;
        self.relayout();
    }

    pub fn set_bounding_box(&mut self, bounding_box: Rect) {
        let width_changed = bounding_box.width != self.bounding_box.width;
        self.bounding_box = bounding_box;
        if width_changed {
            self.relayout();
        }
    }

    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = scroll;
    }

    pub fn set_style(&mut self, style: MirrorStyle) {
        self.style = style;
        self.relayout();
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Register a layer drawn above the surface (viewport coordinates).
    pub fn add_occluder(&mut self, rect: Rect) {
        self.occluders.push(rect);
    }

    pub fn clear_occluders(&mut self) {
        self.occluders.clear();
    }
}

impl TextSurface for PlainTextSurface {
    fn text(&self) -> &str {
        &self.text
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn bounding_box(&self) -> Rect {
        self.bounding_box
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }

    fn measure_range(&self, span: Span) -> Result<Vec<Rect>, MeasureError> {
        check_span(&self.text, span)?;
        Ok(self.mirror.measure(span, self.scroll))
    }

    fn replace_range(&mut self, span: Span, replacement: &str) -> bool {
        if self.read_only || check_span(&self.text, span).is_err() {
            return false;
        }
        if self.style.wrap == WrapMode::NoWrap && replacement.contains('\n') {
            return false;
        }
        self.text.replace_range(span.start..span.end, replacement);
        self.revision += 1;
        self.relayout();
        true
    }

    fn hit_test(&self, point: Point) -> HitTarget {
        if self.occluders.iter().any(|r| r.contains(point)) {
            return HitTarget::Foreign;
        }
        if self.bounding_box.contains(point) {
            HitTarget::Surface
        } else {
            HitTarget::Foreign
        }
    }

    fn style_signature(&self) -> u64 {
        let m = self.style.metrics;
        let p = self.style.padding;
        float_signature(&[
            self.bounding_box.width,
            self.bounding_box.height,
            m.cell_width,
            m.line_height,
            p.top,
            p.right,
            p.bottom,
            p.left,
            if self.style.wrap == WrapMode::Word { 1.0 } else { 0.0 },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_bumps_revision_and_relayouts() {
        let mut s = PlainTextSurface::multi_line("teh cat", Rect::new(0.0, 0.0, 200.0, 40.0));
        assert!(s.replace_range(Span::new(0, 3), "the"));
        assert_eq!(s.text(), "the cat");
        assert_eq!(s.revision(), 1);
        assert!(!s.replace_range(Span::new(5, 99), "x"));
        s.set_read_only(true);
        assert!(!s.replace_range(Span::new(0, 3), "a"));
    }

    #[test]
    fn single_line_rejects_newlines() {
        let mut s = PlainTextSurface::single_line("ab", Rect::new(0.0, 0.0, 200.0, 20.0));
        assert!(!s.replace_range(Span::new(0, 1), "x\ny"));
    }

    #[test]
    fn hit_test_respects_occluders() {
        let mut s = PlainTextSurface::multi_line("abc", Rect::new(10.0, 10.0, 100.0, 50.0));
        assert_eq!(s.hit_test(Point::new(20.0, 20.0)), HitTarget::Surface);
        assert_eq!(s.hit_test(Point::new(5.0, 20.0)), HitTarget::Foreign);
        s.add_occluder(Rect::new(0.0, 0.0, 30.0, 30.0));
        assert_eq!(s.hit_test(Point::new(20.0, 20.0)), HitTarget::Foreign);
    }

    #[test]
    fn style_signature_changes_with_width() {
        let mut s = PlainTextSurface::multi_line("abc", Rect::new(0.0, 0.0, 100.0, 50.0));
        let before = s.style_signature();
        s.set_bounding_box(Rect::new(0.0, 0.0, 120.0, 50.0));
        assert_ne!(before, s.style_signature());
    }

    #[test]
    fn measure_rejects_bad_ranges() {
        let s = PlainTextSurface::single_line("é", Rect::new(0.0, 0.0, 100.0, 20.0));
        assert!(s.measure_range(Span::new(0, 1)).is_err());
        assert_eq!(s.measure_range(Span::new(0, 2)).unwrap().len(), 1);
    }
}
