//! Merge of a sentence-scoped re-analysis into the global issue list.
//!
//! Contract:
//! - Existing issues whose resolved span lies outside the sentence's full
//!   range are kept in their original relative order, pinned to their
//!   resolved span so a later resolution cannot move them into the freed
//!   occurrences of the re-analyzed sentence.
//! - Existing issues touching the range are dropped. A zero-length issue
//!   belongs to the range containing its offset (end of text belongs to the
//!   last range).
//! - Unresolvable existing issues are kept (they have no span to test).
//! - Fresh issues are resolved against the sentence core text, shifted into
//!   document coordinates, and stored with explicit offsets. Fresh issues
//!   that cannot be located in the core are discarded.
//! - The result is ordered by start offset; ties put kept issues before
//!   fresh ones, then fall back to prior order.

use crate::issue::Issue;
use crate::resolve::resolve_positions;
use core_text::{SentenceRange, Span};

fn touches(span: &Span, range: &Span, text_len: usize) -> bool {
    if span.is_empty() {
        let p = span.start;
        return (p >= range.start && p < range.end) || (p == text_len && range.end == text_len);
    }
    span.overlaps(range)
}

pub fn merge_sentence_issues(
    text: &str,
    existing: &[Issue],
    sentence: &SentenceRange,
    fresh: &[Issue],
) -> Vec<Issue> {
    let range = Span::new(sentence.start, sentence.end);
    let mut merged: Vec<((usize, u8, usize), Issue)> = Vec::new();
    let mut dropped = 0usize;

    for pos in resolve_positions(text, existing) {
        let issue = &existing[pos.index];
        match pos.span {
            Some(span) if touches(&span, &range, text.len()) => dropped += 1,
            Some(span) => merged.push((
                (span.start, 0, pos.index),
                issue.clone().with_span(span.start, span.end),
            )),
            None => merged.push(((usize::MAX, 0, pos.index), issue.clone())),
        }
    }

    let core = sentence.core(text);
    let mut inserted = 0usize;
    for pos in resolve_positions(core, fresh) {
        let Some(local) = pos.span else {
            continue;
        };
        let span = local.shifted(sentence.core_start as isize);
        let issue = fresh[pos.index].clone().with_span(span.start, span.end);
        merged.push(((span.start, 1, pos.index), issue));
        inserted += 1;
    }

    merged.sort_by_key(|(key, _)| *key);
    tracing::debug!(
        target: "issues.merge",
        sentence_start = sentence.start,
        sentence_end = sentence.end,
        dropped,
        inserted,
        fresh = fresh.len(),
        total = merged.len(),
        "merge_sentence_issues"
    );
    merged.into_iter().map(|(_, issue)| issue).collect()
}
