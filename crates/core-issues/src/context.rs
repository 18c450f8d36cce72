//! Issue–sentence context builder.
//!
//! Joins resolved positions to the sentence containing them and expresses
//! the issue span relative to the sentence core, which is what an in-place
//! sentence rewrite (or a hover preview) needs.
//!
//! Anchoring: a context is anchored at the issue start, except a zero-length
//! issue sitting at end of text, which anchors one character back so it still
//! has a containing sentence. Unresolved positions produce no context.

use crate::issue::{Issue, IssuePosition};
use core_text::grapheme::prev_boundary;
use core_text::{SentenceRange, Span, find_sentence_range_at};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueSentenceContext {
    pub issue_index: usize,
    pub span: Span,
    pub sentence_index: usize,
    pub sentence: SentenceRange,
    /// Offsets relative to `sentence.core_start`. Negative when the issue sits
    /// in leading whitespace matched through the full-span fallback.
    pub relative_start: isize,
    pub relative_end: isize,
}

pub fn build_contexts(
    text: &str,
    ranges: &[SentenceRange],
    positions: &[IssuePosition],
) -> Vec<IssueSentenceContext> {
    positions
        .iter()
        .filter_map(|p| {
            let span = p.span?;
            let anchor = if span.is_empty() && span.start == text.len() && span.start > 0 {
                prev_boundary(text, span.start)
            } else {
                span.start
            };
            let sentence_index = find_sentence_range_at(ranges, anchor)?;
            let sentence = ranges[sentence_index];
            let core = sentence.core_start as isize;
            Some(IssueSentenceContext {
                issue_index: p.index,
                span,
                sentence_index,
                sentence,
                relative_start: span.start as isize - core,
                relative_end: span.end as isize - core,
            })
        })
        .collect()
}

/// Contexts grouped by sentence, each group ordered by position.
pub fn group_by_sentence(
    contexts: &[IssueSentenceContext],
) -> BTreeMap<usize, Vec<&IssueSentenceContext>> {
    let mut groups: BTreeMap<usize, Vec<&IssueSentenceContext>> = BTreeMap::new();
    for ctx in contexts {
        groups.entry(ctx.sentence_index).or_default().push(ctx);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|c| (c.relative_start, c.relative_end, c.issue_index));
    }
    groups
}

/// Corrected rendering of one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentencePreview {
    pub sentence_index: usize,
    pub original: String,
    pub corrected: String,
    pub applied: Vec<usize>,
    pub skipped: Vec<usize>,
}

/// Apply every issue of `group` to the sentence core in position order,
/// skipping no-ops, spans outside the core, and spans overlapping an
/// earlier applied one.
pub fn correct_sentence(
    text: &str,
    issues: &[Issue],
    sentence_index: usize,
    group: &[&IssueSentenceContext],
) -> Option<SentencePreview> {
    let first = group.first()?;
    let core = first.sentence.core(text);
    let mut applied: Vec<(Span, usize)> = Vec::new();
    let mut skipped = Vec::new();
    for ctx in group {
        let issue = &issues[ctx.issue_index];
        let in_core = ctx.relative_start >= 0 && ctx.relative_end as usize <= core.len();
        if issue.is_noop() || !in_core {
            skipped.push(ctx.issue_index);
            continue;
        }
        let rel = Span::new(ctx.relative_start as usize, ctx.relative_end as usize);
        if rel.slice(core).is_none() || applied.iter().any(|(s, _)| s.overlaps(&rel)) {
            skipped.push(ctx.issue_index);
            continue;
        }
        applied.push((rel, ctx.issue_index));
    }
    let mut corrected = core.to_string();
    for (span, idx) in applied.iter().rev() {
        corrected.replace_range(span.start..span.end, &issues[*idx].suggestion);
    }
    Some(SentencePreview {
        sentence_index,
        original: core.to_string(),
        corrected,
        applied: applied.into_iter().map(|(_, idx)| idx).collect(),
        skipped,
    })
}

/// One preview per sentence that has at least one issue.
pub fn sentence_previews(
    text: &str,
    issues: &[Issue],
    contexts: &[IssueSentenceContext],
) -> Vec<SentencePreview> {
    group_by_sentence(contexts)
        .into_iter()
        .filter_map(|(idx, group)| correct_sentence(text, issues, idx, &group))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve_positions;
    use core_text::{SegmenterMode, segment_sentences};
    use pretty_assertions::assert_eq;

    fn contexts_for(text: &str, issues: &[Issue]) -> Vec<IssueSentenceContext> {
        let ranges = segment_sentences(text, SegmenterMode::Unicode);
        let positions = resolve_positions(text, issues);
        build_contexts(text, &ranges, &positions)
    }

    #[test]
    fn relative_offsets_follow_sentence_core() {
        let text = "Fine here. I seen it.";
        let issues = vec![Issue::new("seen", "saw")];
        let ctx = contexts_for(text, &issues);
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx[0].sentence_index, 1);
        assert_eq!(ctx[0].relative_start, 2);
        assert_eq!(ctx[0].relative_end, 6);
    }

    #[test]
    fn caret_at_end_of_text_anchors_back() {
        let text = "No period";
        let issues = vec![Issue::new("", ".").with_span(9, 9)];
        let ctx = contexts_for(text, &issues);
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx[0].sentence_index, 0);
        assert_eq!(ctx[0].relative_start, 9);
    }

    #[test]
    fn unresolved_issues_have_no_context() {
        let text = "Nothing to see.";
        let issues = vec![Issue::new("missing", "x")];
        assert!(contexts_for(text, &issues).is_empty());
    }

    #[test]
    fn preview_applies_in_order_and_skips_overlaps() {
        let text = "Intro. teh cat sat on teh mat.";
        let issues = vec![
            Issue::new("teh", "the"),
            Issue::new("teh", "the"),
            Issue::new("teh cat", "a cat").with_span(7, 14),
            Issue::new("mat", "mat"),
        ];
        let ctx = contexts_for(text, &issues);
        let previews = sentence_previews(text, &issues, &ctx);
        assert_eq!(previews.len(), 1);
        let p = &previews[0];
        assert_eq!(p.original, "teh cat sat on teh mat.");
        assert_eq!(p.corrected, "the cat sat on the mat.");
        assert_eq!(p.applied, vec![0, 1]);
        assert_eq!(p.skipped.len(), 2);
    }
}
