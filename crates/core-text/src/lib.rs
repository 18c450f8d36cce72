//! Text primitives shared by every layer of the highlight engine.
//!
//! Everything here operates on immutable `&str` snapshots with **byte**
//! offsets that always fall on `char` boundaries. Higher crates (diff,
//! resolver, layout) never index text without going through these helpers
//! when a boundary might be ambiguous.
//!
//! Exposed components:
//! - `Span`: half-open byte range used for issue positions and sentence ranges.
//! - `occurrence`: non-overlapping substring search (the Occurrence Index).
//! - `sentence`: sentence segmentation into contiguous, exhaustive ranges.
//! - `grapheme`: cluster boundary helpers (caret widening, column math).
//! - `segment` / `width`: per-cluster cell widths consumed by mirror layout.

use serde::{Deserialize, Serialize};

pub mod occurrence;
pub mod segment;
pub mod sentence;
pub mod width;

pub use occurrence::find_all_occurrences;
pub use sentence::{SegmenterMode, SentenceRange, find_sentence_range_at, segment_sentences};
pub use width::cluster_cells;

/// Half-open byte range `[start, end)` into a text snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start after end");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the two spans share at least one byte. Zero-length spans
    /// overlap a non-empty span they sit strictly inside of.
    pub fn overlaps(&self, other: &Span) -> bool {
        if self.is_empty() || other.is_empty() {
            let (point, range) = if self.is_empty() {
                (self.start, other)
            } else {
                (other.start, self)
            };
            if range.is_empty() {
                return point == range.start;
            }
            return point > range.start && point < range.end;
        }
        self.start < other.end && other.start < self.end
    }

    /// True when `self` lies entirely within `outer`.
    pub fn within(&self, outer: &Span) -> bool {
        self.start >= outer.start && self.end <= outer.end
    }

    /// Slice `text` by this span, returning `None` when out of bounds or not on
    /// char boundaries.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }

    /// Shift both ends by a signed delta (saturating at 0).
    pub fn shifted(&self, delta: isize) -> Span {
        let shift = |v: usize| v.saturating_add_signed(delta);
        Span {
            start: shift(self.start),
            end: shift(self.end),
        }
    }
}

/// Grapheme and boundary utilities. Pure helpers over a single snapshot.
pub mod grapheme {
    use crate::cluster_cells;
    use unicode_segmentation::UnicodeSegmentation;

    /// Largest char boundary `<= byte` (clamped to `text.len()`).
    pub fn floor_char_boundary(text: &str, byte: usize) -> usize {
        if byte >= text.len() {
            return text.len();
        }
        let mut b = byte;
        while b > 0 && !text.is_char_boundary(b) {
            b -= 1;
        }
        b
    }

    /// Previous grapheme boundary (returns 0 if already at or below 1st boundary).
    pub fn prev_boundary(text: &str, byte: usize) -> usize {
        if byte == 0 || byte > text.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in text.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (returns text.len() if at or beyond end).
    pub fn next_boundary(text: &str, byte: usize) -> usize {
        if byte >= text.len() {
            return text.len();
        }
        for (idx, _) in text.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        text.len()
    }

    /// Cells occupied by `line[..byte]` where `line` holds no hard breaks.
    pub fn visual_cells(line: &str, byte: usize) -> usize {
        let mut col = 0;
        for (idx, g) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            col += cluster_cells(g) as usize;
        }
        col
    }
}
