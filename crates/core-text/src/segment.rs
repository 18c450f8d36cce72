//! Grapheme segmentation adapter for layout.
//!
//! Contract:
//! - Input: `&str` snapshot exactly as the surface holds it. No normalization
//!   is applied, since highlight offsets must address the surface's own bytes.
//! - Output: `Vec<Segment>` where each segment is a grapheme cluster with
//!   absolute byte offsets into the input and a cell width.
//! - Guarantees: clusters are in order, non-overlapping, and cover the entire
//!   string when concatenated.
//! - Does not log content.

use crate::cluster_cells;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: usize, // byte offset (inclusive)
    pub end: usize,   // byte offset (exclusive)
    pub cells: u16,
    pub is_whitespace: bool,
    pub is_hard_break: bool,
}

/// Segment `input` into grapheme clusters with cell widths and byte ranges.
pub fn segment(input: &str) -> Vec<Segment> {
    input
        .grapheme_indices(true)
        .map(|(start, g)| Segment {
            start,
            end: start + g.len(),
            cells: cluster_cells(g),
            is_whitespace: g.chars().all(char::is_whitespace),
            is_hard_break: g == "\n" || g == "\r\n" || g == "\r",
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_input_contiguously() {
        let s = "漢😀👨‍👩‍👧‍👦a b\nc";
        let segs = segment(s);
        let mut prev_end = 0usize;
        for seg in &segs {
            assert_eq!(seg.start, prev_end);
            assert!(seg.end > seg.start);
            prev_end = seg.end;
        }
        assert_eq!(prev_end, s.len());
    }

    #[test]
    fn flags_whitespace_and_breaks() {
        let segs = segment("a \r\nb");
        assert_eq!(segs.len(), 4);
        assert!(segs[1].is_whitespace && !segs[1].is_hard_break);
        assert!(segs[2].is_hard_break, "CRLF is one cluster");
        assert_eq!(segs[2].end - segs[2].start, 2);
    }
}
