//! Property-based tests for occurrence search and sentence segmentation.

use core_text::{SegmenterMode, find_all_occurrences, find_sentence_range_at, segment_sentences};
use proptest::prelude::*;

proptest! {
    // Consecutive matches never overlap and each one really is the needle.
    #[test]
    fn occurrences_are_disjoint(text in "[ab ]{0,40}", needle in "[ab]{1,3}") {
        let hits = find_all_occurrences(&text, &needle);
        for pair in hits.windows(2) {
            prop_assert!(pair[1] - pair[0] >= needle.len());
        }
        for &h in &hits {
            prop_assert_eq!(&text[h..h + needle.len()], needle.as_str());
        }
    }

    // Every byte of a non-empty text belongs to exactly one sentence range.
    #[test]
    fn sentences_cover_text_exhaustively(text in "[a-z .!?\n]{1,60}", heuristic in any::<bool>()) {
        let mode = if heuristic { SegmenterMode::Heuristic } else { SegmenterMode::Unicode };
        let ranges = segment_sentences(&text, mode);
        prop_assert!(!ranges.is_empty());
        prop_assert_eq!(ranges[0].start, 0);
        prop_assert_eq!(ranges.last().unwrap().end, text.len());
        for pair in ranges.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        for r in &ranges {
            prop_assert!(r.start <= r.core_start && r.core_start <= r.core_end && r.core_end <= r.end);
        }
        for idx in 0..text.len() {
            prop_assert!(find_sentence_range_at(&ranges, idx).is_some());
        }
    }
}

#[test]
fn unicode_mode_handles_multibyte_prose() {
    let text = "Café is clösed. Wir gehen später!";
    let ranges = segment_sentences(text, SegmenterMode::Unicode);
    assert_eq!(ranges.len(), 2);
    assert_eq!(ranges[1].core(text), "Wir gehen später!");
}
