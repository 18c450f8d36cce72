//! Off-screen mirror layout.
//!
//! Lays text out the way the surface does (same cell metrics, padding and
//! wrapping) so byte offsets can be turned into pixel rectangles without
//! asking the host to measure. Cell widths come from `core_text::segment`,
//! so wide and emoji clusters take two cells just as they do on screen.
//!
//! Wrapping rules (`WrapMode::Word`):
//! - hard breaks always end a line; the break itself is not part of any line;
//! - whitespace never starts a wrap and may hang past the right edge;
//! - a word that does not fit moves to the next line as a whole;
//! - a word wider than the line is broken between clusters.
//!
//! Rectangles are in element space: relative to the surface border box,
//! with padding applied and the surface's internal scroll subtracted.

use crate::geometry::{Rect, ScrollOffset};
use core_text::Span;
use core_text::segment::{Segment, segment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellMetrics {
    pub cell_width: f64,
    pub line_height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            line_height: 18.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn uniform(px: f64) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    /// Single-line fields: lines only end at hard breaks.
    NoWrap,
    #[default]
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MirrorStyle {
    pub metrics: CellMetrics,
    pub padding: Padding,
    pub wrap: WrapMode,
}

#[derive(Debug, Clone, PartialEq)]
struct VisualLine {
    start: usize,
    /// Excludes the terminating hard break, if any.
    end: usize,
    /// `(byte_start, column)` per cluster on this line.
    glyphs: Vec<(usize, usize)>,
    end_col: usize,
}

impl VisualLine {
    fn empty_at(start: usize) -> Self {
        Self {
            start,
            end: start,
            glyphs: Vec::new(),
            end_col: 0,
        }
    }

    fn push(&mut self, seg: &Segment) {
        self.glyphs.push((seg.start, self.end_col));
        self.end_col += seg.cells as usize;
        self.end = seg.end;
    }

    fn column_at(&self, byte: usize) -> usize {
        if byte >= self.end {
            return self.end_col;
        }
        match self.glyphs.binary_search_by_key(&byte, |&(b, _)| b) {
            Ok(i) => self.glyphs[i].1,
            // Inside a cluster: use the cluster's column.
            Err(i) => self.glyphs[i.saturating_sub(1)].1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirrorLayout {
    style: MirrorStyle,
    columns: usize,
    lines: Vec<VisualLine>,
}

impl MirrorLayout {
    /// Lay out `text` inside a border box `box_width` pixels wide.
    pub fn new(text: &str, box_width: f64, style: MirrorStyle) -> Self {
        let content = (box_width - style.padding.left - style.padding.right).max(0.0);
        let columns = ((content / style.metrics.cell_width.max(1.0)).floor() as usize).max(1);
        let segs = segment(text);
        let lines = match style.wrap {
            WrapMode::NoWrap => layout_lines(&segs, usize::MAX),
            WrapMode::Word => layout_lines(&segs, columns),
        };
        Self {
            style,
            columns,
            lines,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Height of the laid-out content including vertical padding.
    pub fn content_height(&self) -> f64 {
        self.lines.len() as f64 * self.style.metrics.line_height
            + self.style.padding.top
            + self.style.padding.bottom
    }

    /// One rectangle per visual line the span covers. Parts of the span
    /// covering only hard breaks produce nothing.
    pub fn measure(&self, span: Span, scroll: ScrollOffset) -> Vec<Rect> {
        let CellMetrics {
            cell_width,
            line_height,
        } = self.style.metrics;
        let mut rects = Vec::new();
        for (row, line) in self.lines.iter().enumerate() {
            if line.start >= span.end {
                break;
            }
            let a = span.start.max(line.start);
            let b = span.end.min(line.end);
            if a >= b {
                continue;
            }
            let (ca, cb) = (line.column_at(a), line.column_at(b));
            if cb <= ca {
                continue;
            }
            rects.push(Rect::new(
                self.style.padding.left + ca as f64 * cell_width - scroll.x,
                self.style.padding.top + row as f64 * line_height - scroll.y,
                (cb - ca) as f64 * cell_width,
                line_height,
            ));
        }
        rects
    }
}

fn layout_lines(segs: &[Segment], columns: usize) -> Vec<VisualLine> {
    let mut lines = Vec::new();
    let mut line = VisualLine::empty_at(0);
    let mut i = 0;
    while i < segs.len() {
        let seg = &segs[i];
        if seg.is_hard_break {
            let next = VisualLine::empty_at(seg.end);
            lines.push(std::mem::replace(&mut line, next));
            i += 1;
            continue;
        }
        if seg.is_whitespace {
            line.push(seg);
            i += 1;
            continue;
        }
        // Word: maximal run of non-whitespace clusters.
        let word_end = segs[i..]
            .iter()
            .position(|s| s.is_whitespace || s.is_hard_break)
            .map_or(segs.len(), |p| i + p);
        let word_cells: usize = segs[i..word_end].iter().map(|s| s.cells as usize).sum();
        if line.end_col > 0 && line.end_col.saturating_add(word_cells) > columns {
            let next = VisualLine::empty_at(seg.start);
            lines.push(std::mem::replace(&mut line, next));
        }
        for s in &segs[i..word_end] {
            if line.end_col > 0 && line.end_col.saturating_add(s.cells as usize) > columns {
                let next = VisualLine::empty_at(s.start);
                lines.push(std::mem::replace(&mut line, next));
            }
            line.push(s);
        }
        i = word_end;
    }
    lines.push(line);
    lines
}
