//! Structured (rich) editable regions.
//!
//! The region is a vertical stack of rendered text blocks (paragraphs). Its
//! text is the block texts joined by `'\n'`. Measurement walks the blocks a
//! range touches and measures each with its own layout, offset by the
//! block's position. A replacement must stay inside one block; anything
//! touching a separator is refused, since that would merge or split blocks.

use crate::error::MeasureError;
use crate::geometry::{Point, Rect, ScrollOffset};
use crate::mirror::{MirrorLayout, MirrorStyle};
use crate::surface::{HitTarget, TextSurface, check_span, float_signature};
use core_text::Span;

#[derive(Debug, Clone)]
struct Block {
    text: String,
    attached: bool,
    layout: MirrorLayout,
    /// Offset of the block's text within the joined text.
    start: usize,
    /// Element-space frame (before internal scroll).
    frame: Rect,
}

#[derive(Debug, Clone)]
pub struct RichTextSurface {
    blocks: Vec<Block>,
    text: String,
    revision: u64,
    bounding_box: Rect,
    scroll: ScrollOffset,
    style: MirrorStyle,
    occluders: Vec<Rect>,
}

impl RichTextSurface {
    pub fn new<I, S>(blocks: I, bounding_box: Rect, style: MirrorStyle) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let blocks = blocks
            .into_iter()
            .map(|t| {
                let text = t.into();
                Block {
                    layout: MirrorLayout::new(&text, bounding_box.width, style),
                    text,
                    attached: true,
                    start: 0,
                    frame: Rect::default(),
                }
            })
            .collect();
        let mut surface = Self {
            blocks,
            text: String::new(),
            revision: 0,
            bounding_box,
            scroll: ScrollOffset::default(),
            style,
            occluders: Vec::new(),
        };
        surface.restack();
        surface
    }

    /// Recompute joined text, block offsets and stacked frames.
    fn restack(&mut self) {
        let mut text = String::new();
        let mut top = 0.0;
        for (i, block) in self.blocks.iter_mut().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            block.start = text.len();
            text.push_str(&block.text);
            let height = block.layout.content_height();
            block.frame = Rect::new(0.0, top, self.bounding_box.width, height);
            top += height;
        }
        self.text = text;
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Index of the block containing byte `index` of the joined text.
    /// Separators belong to the block they terminate.
    fn block_at(&self, index: usize) -> usize {
        self.blocks
            .iter()
            .rposition(|b| b.start <= index)
            .unwrap_or(0)
    }

    /// Simulate the host removing a block's rendered node while keeping the
    /// text snapshot unchanged.
    pub fn detach_block(&mut self, block: usize) {
        if let Some(b) = self.blocks.get_mut(block) {
            b.attached = false;
        }
    }

    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = scroll;
    }

    pub fn set_bounding_box(&mut self, bounding_box: Rect) {
        self.bounding_box = bounding_box;
        for block in &mut self.blocks {
            block.layout = MirrorLayout::new(&block.text, bounding_box.width, self.style);
        }
        self.restack();
    }

    pub fn add_occluder(&mut self, rect: Rect) {
        self.occluders.push(rect);
    }
}

impl TextSurface for RichTextSurface {
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
        let mut rects = Vec::new();
        if span.is_empty() {
            return Ok(rects);
        }
        let first = self.block_at(span.start);
        let last = self.block_at(span.end.saturating_sub(1));
        for idx in first..=last {
            let block = &self.blocks[idx];
            let local_start = span.start.max(block.start) - block.start;
            let local_end = span.end.min(block.start + block.text.len()) - block.start;
            if local_start >= local_end {
                continue;
            }
            if !block.attached {
                return Err(MeasureError::Detached { block: idx });
            }
            let local = Span::new(local_start, local_end);
            rects.extend(
                block
                    .layout
                    .measure(local, ScrollOffset::default())
                    .into_iter()
                    .map(|r| {
                        r.translated(
                            block.frame.left - self.scroll.x,
                            block.frame.top - self.scroll.y,
                        )
                    }),
            );
        }
        Ok(rects)
    }

    fn replace_range(&mut self, span: Span, replacement: &str) -> bool {
        if check_span(&self.text, span).is_err() || replacement.contains('\n') {
            return false;
        }
        let idx = self.block_at(span.start);
        let Some(block) = self.blocks.get(idx) else {
            return false;
        };
        let block_end = block.start + block.text.len();
        if span.end > block_end || !block.attached {
            return false;
        }
        let local = (span.start - block.start)..(span.end - block.start);
        let width = self.bounding_box.width;
        let style = self.style;
        let block = &mut self.blocks[idx];
        block.text.replace_range(local, replacement);
        block.layout = MirrorLayout::new(&block.text, width, style);
        self.revision += 1;
        self.restack();
        true
    }

    fn hit_test(&self, point: Point) -> HitTarget {
        if self.occluders.iter().any(|r| r.contains(point)) || !self.bounding_box.contains(point) {
            return HitTarget::Foreign;
        }
        let on_block = self.blocks.iter().any(|b| {
            b.attached
                && b.frame
                    .translated(
                        self.bounding_box.left - self.scroll.x,
                        self.bounding_box.top - self.scroll.y,
                    )
                    .contains(point)
        });
        if on_block {
            HitTarget::Descendant
        } else {
            HitTarget::Surface
        }
    }

    fn style_signature(&self) -> u64 {
        float_signature(&[
            self.bounding_box.width,
            self.bounding_box.height,
            self.style.metrics.cell_width,
            self.style.metrics.line_height,
            self.blocks.len() as f64,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::CellMetrics;
    use pretty_assertions::assert_eq;

    fn surface() -> RichTextSurface {
        let style = MirrorStyle {
            metrics: CellMetrics {
                cell_width: 10.0,
                line_height: 20.0,
            },
            ..MirrorStyle::default()
        };
        RichTextSurface::new(["First para.", "Second one."], Rect::new(0.0, 0.0, 500.0, 200.0), style)
    }

    #[test]
    fn joined_text_and_block_offsets() {
        let s = surface();
        assert_eq!(s.text(), "First para.\nSecond one.");
        assert_eq!(s.block_count(), 2);
    }

    #[test]
    fn measure_walks_blocks() {
        let s = surface();
        // "para.\nSecond" spans both blocks.
        let rects = s.measure_range(Span::new(6, 18)).unwrap();
        assert_eq!(
            rects,
            vec![
                Rect::new(60.0, 0.0, 50.0, 20.0),
                Rect::new(0.0, 20.0, 60.0, 20.0)
            ]
        );
    }

    #[test]
    fn replacement_must_stay_in_one_block() {
        let mut s = surface();
        assert!(!s.replace_range(Span::new(6, 18), "x"));
        assert!(s.replace_range(Span::new(12, 18), "Third"));
        assert_eq!(s.text(), "First para.\nThird one.");
        assert_eq!(s.revision(), 1);
    }

    #[test]
    fn region_without_blocks_refuses_edits() {
        let mut s = RichTextSurface::new(
            Vec::<String>::new(),
            Rect::new(0.0, 0.0, 500.0, 200.0),
            MirrorStyle::default(),
        );
        assert_eq!(s.text(), "");
        assert!(!s.replace_range(Span::new(0, 0), "x"));
        assert_eq!(s.revision(), 0);
        assert_eq!(s.measure_range(Span::new(0, 0)), Ok(Vec::new()));
        assert_eq!(s.hit_test(Point::new(5.0, 5.0)), HitTarget::Surface);
    }

    #[test]
    fn detached_block_fails_measurement() {
        let mut s = surface();
        s.detach_block(1);
        assert_eq!(
            s.measure_range(Span::new(12, 18)),
            Err(MeasureError::Detached { block: 1 })
        );
        assert!(s.measure_range(Span::new(0, 5)).is_ok());
    }

    #[test]
    fn hit_test_reports_descendants() {
        let s = surface();
        assert_eq!(s.hit_test(Point::new(5.0, 5.0)), HitTarget::Descendant);
        assert_eq!(s.hit_test(Point::new(5.0, 150.0)), HitTarget::Surface);
        assert_eq!(s.hit_test(Point::new(600.0, 5.0)), HitTarget::Foreign);
    }
}
