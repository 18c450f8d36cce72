//! Sentence segmentation.
//!
//! Partitions a snapshot into `SentenceRange`s. Two strategies:
//! * `SegmenterMode::Unicode` (default): UAX #29 sentence boundaries.
//! * `SegmenterMode::Heuristic`: a regex run ending in one or more `.!?`
//!   followed by whitespace or end of text.
//!
//! Invariants (both modes):
//! * Ranges are contiguous and exhaustive: `ranges[0].start == 0`,
//!   `ranges[i].end == ranges[i + 1].start`, last `end == text.len()`.
//! * Trailing whitespace belongs to the preceding sentence; a whitespace-only
//!   piece is folded into its neighbour so no range is pure whitespace unless
//!   the whole text is.
//! * `[core_start, core_end)` is the range with surrounding whitespace trimmed.
//!   For a whitespace-only text the core is empty and sits at `start`.
//! * Empty text has no ranges.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

static TERMINATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]+(?:\s+|$)").expect("sentence terminator pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmenterMode {
    #[default]
    Unicode,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceRange {
    pub start: usize,
    pub end: usize,
    pub core_start: usize,
    pub core_end: usize,
}

impl SentenceRange {
    fn from_bounds(text: &str, start: usize, end: usize) -> Self {
        let piece = &text[start..end];
        let lead = piece.len() - piece.trim_start().len();
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            return Self {
                start,
                end,
                core_start: start,
                core_end: start,
            };
        }
        Self {
            start,
            end,
            core_start: start + lead,
            core_end: start + lead + trimmed.len(),
        }
    }

    /// Trimmed sentence text.
    pub fn core<'a>(&self, text: &'a str) -> &'a str {
        &text[self.core_start..self.core_end]
    }

    /// Full range text including surrounding whitespace.
    pub fn full<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    pub fn core_contains(&self, index: usize) -> bool {
        index >= self.core_start && index < self.core_end
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// Split `text` into contiguous sentence ranges.
pub fn segment_sentences(text: &str, mode: SegmenterMode) -> Vec<SentenceRange> {
    if text.is_empty() {
        return Vec::new();
    }
    let bounds = match mode {
        SegmenterMode::Unicode => unicode_bounds(text),
        SegmenterMode::Heuristic => heuristic_bounds(text),
    };
    let bounds = fold_blank_pieces(text, bounds);
    let ranges: Vec<SentenceRange> = bounds
        .into_iter()
        .map(|(s, e)| SentenceRange::from_bounds(text, s, e))
        .collect();
    tracing::trace!(
        target: "text.sentence",
        ?mode,
        text_len = text.len(),
        sentences = ranges.len(),
        "segment_sentences"
    );
    ranges
}

fn unicode_bounds(text: &str) -> Vec<(usize, usize)> {
    text.split_sentence_bound_indices()
        .map(|(idx, piece)| (idx, idx + piece.len()))
        .collect()
}

fn heuristic_bounds(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut prev = 0usize;
    for m in TERMINATOR.find_iter(text) {
        if m.end() > prev {
            out.push((prev, m.end()));
            prev = m.end();
        }
    }
    if prev < text.len() {
        out.push((prev, text.len()));
    }
    out
}

// Merge whitespace-only pieces into the previous piece (or the next one when
// the blank piece leads the text).
fn fold_blank_pieces(text: &str, bounds: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    let mut out: Vec<(usize, usize)> = Vec::with_capacity(bounds.len());
    let mut pending_lead: Option<usize> = None;
    for (s, e) in bounds {
        let blank = text[s..e].trim().is_empty();
        if blank {
            match out.last_mut() {
                Some(last) => last.1 = e,
                None => {
                    pending_lead.get_or_insert(s);
                }
            }
            continue;
        }
        let start = pending_lead.take().unwrap_or(s);
        out.push((start, e));
    }
    if let Some(lead) = pending_lead {
        // Whole text is whitespace.
        out.push((lead, text.len()));
    }
    out
}

/// Index of the range whose core span contains `index`, falling back to the
/// range whose full span contains it. `None` only when `index` lies outside
/// every range.
pub fn find_sentence_range_at(ranges: &[SentenceRange], index: usize) -> Option<usize> {
    ranges
        .iter()
        .position(|r| r.core_contains(index))
        .or_else(|| ranges.iter().position(|r| r.contains(index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cores(text: &str, mode: SegmenterMode) -> Vec<&str> {
        segment_sentences(text, mode)
            .iter()
            .map(|r| r.core(text))
            .collect()
    }

    #[test]
    fn unicode_mode_splits_and_trims() {
        let text = "I seen it. It was  great!  And then";
        assert_eq!(
            cores(text, SegmenterMode::Unicode),
            vec!["I seen it.", "It was  great!", "And then"]
        );
    }

    #[test]
    fn heuristic_mode_matches_unicode_on_simple_prose() {
        let text = "One. Two?! Three";
        assert_eq!(
            cores(text, SegmenterMode::Heuristic),
            vec!["One.", "Two?!", "Three"]
        );
        assert_eq!(
            cores(text, SegmenterMode::Unicode),
            cores(text, SegmenterMode::Heuristic)
        );
    }

    #[test]
    fn ranges_are_contiguous_with_trailing_whitespace() {
        let text = "  Lead in. Next one.   ";
        for mode in [SegmenterMode::Unicode, SegmenterMode::Heuristic] {
            let ranges = segment_sentences(text, mode);
            assert_eq!(ranges.first().map(|r| r.start), Some(0));
            assert_eq!(ranges.last().map(|r| r.end), Some(text.len()));
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            assert_eq!(ranges[0].core(text), "Lead in.");
            assert_eq!(ranges[0].core_start, 2);
        }
    }

    #[test]
    fn leading_blank_lines_fold_into_first_sentence() {
        let text = "\n\nHello there.\nBye.";
        let ranges = segment_sentences(text, SegmenterMode::Unicode);
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges[0].core(text), "Hello there.");
        assert_eq!(ranges.last().map(|r| r.core(text)), Some("Bye."));
    }

    #[test]
    fn whitespace_only_text_is_one_empty_core() {
        let ranges = segment_sentences("   ", SegmenterMode::Heuristic);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].core_start, ranges[0].core_end);
        assert!(segment_sentences("", SegmenterMode::Unicode).is_empty());
    }

    #[test]
    fn find_prefers_core_then_full_span() {
        let text = "Ab. Cd.";
        let ranges = segment_sentences(text, SegmenterMode::Unicode);
        assert_eq!(find_sentence_range_at(&ranges, 0), Some(0));
        // Index 3 is the space owned by the first range but outside every core.
        assert_eq!(find_sentence_range_at(&ranges, 3), Some(0));
        assert_eq!(find_sentence_range_at(&ranges, 4), Some(1));
        assert_eq!(find_sentence_range_at(&ranges, text.len()), None);
    }
}
