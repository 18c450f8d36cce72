//! Issue position resolver.
//!
//! Produces one `IssuePosition` per input issue (same order as the input).
//!
//! Algorithm:
//! 1. Validate explicit offsets (`text[start..end] == original`).
//! 2. Compute each issue's earliest plausible start: its valid explicit start,
//!    else the first occurrence of `original` not claimed by a valid explicit
//!    span, else "never".
//! 3. Visit issues ordered by (earliest plausible start, input index). This
//!    ordering makes repeated substrings take occurrences left-to-right in
//!    document order rather than list order.
//! 4. Each visited issue takes its explicit span when valid, otherwise the
//!    next unused occurrence of `original`. Exhausted or empty needles yield
//!    an unresolved position.
//!
//! Two issues never share an occurrence picked by search. Two issues carrying
//! the same valid explicit span both keep it.

use crate::issue::{Issue, IssuePosition};
use core_text::{Span, find_all_occurrences};
use std::collections::{HashMap, HashSet};

pub fn resolve_positions(text: &str, issues: &[Issue]) -> Vec<IssuePosition> {
    let explicit: Vec<Option<Span>> = issues.iter().map(|i| i.validated_span(text)).collect();
    let claimed: HashSet<Span> = explicit.iter().flatten().copied().collect();

    let mut occurrences: HashMap<&str, Vec<usize>> = HashMap::new();
    for issue in issues {
        if !issue.original.is_empty() {
            occurrences
                .entry(issue.original.as_str())
                .or_insert_with(|| find_all_occurrences(text, &issue.original));
        }
    }

    let earliest = |idx: usize| -> usize {
        if let Some(span) = explicit[idx] {
            return span.start;
        }
        let original = issues[idx].original.as_str();
        occurrences
            .get(original)
            .and_then(|occ| {
                occ.iter()
                    .copied()
                    .find(|&s| !claimed.contains(&Span::new(s, s + original.len())))
            })
            .unwrap_or(usize::MAX)
    };
    let keys: Vec<usize> = (0..issues.len()).map(earliest).collect();
    let mut order: Vec<usize> = (0..issues.len()).collect();
    order.sort_by_key(|&i| (keys[i], i));

    let mut used = claimed.clone();
    let mut cursors: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<IssuePosition> = (0..issues.len()).map(IssuePosition::unresolved).collect();
    let mut unresolved = 0usize;

    for idx in order {
        let issue = &issues[idx];
        let occ = occurrences.get(issue.original.as_str());
        if let Some(span) = explicit[idx] {
            out[idx] = IssuePosition {
                index: idx,
                span: Some(span),
                occurrence_index: occ.and_then(|o| o.binary_search(&span.start).ok()),
            };
            continue;
        }
        let Some(occ) = occ else {
            unresolved += 1;
            continue;
        };
        let cursor = cursors.entry(issue.original.as_str()).or_insert(0);
        let mut assigned = None;
        while *cursor < occ.len() {
            let rank = *cursor;
            *cursor += 1;
            let span = Span::new(occ[rank], occ[rank] + issue.original.len());
            if used.insert(span) {
                assigned = Some((span, rank));
                break;
            }
        }
        match assigned {
            Some((span, rank)) => {
                out[idx] = IssuePosition {
                    index: idx,
                    span: Some(span),
                    occurrence_index: Some(rank),
                };
            }
            None => unresolved += 1,
        }
    }

    tracing::debug!(
        target: "issues.resolve",
        issues = issues.len(),
        unresolved,
        "resolve_positions"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(positions: &[IssuePosition]) -> Vec<Option<(usize, usize)>> {
        positions
            .iter()
            .map(|p| p.span.map(|s| (s.start, s.end)))
            .collect()
    }

    #[test]
    fn repeated_substrings_take_document_order() {
        let text = "teh teh cat";
        let issues = vec![Issue::new("teh", "the"), Issue::new("teh", "the")];
        let out = resolve_positions(text, &issues);
        assert_eq!(spans(&out), vec![Some((0, 3)), Some((4, 7))]);
        assert_eq!(out[1].occurrence_index, Some(1));
    }

    #[test]
    fn explicit_span_reserves_its_occurrence() {
        let text = "teh teh cat";
        // First in list has no offsets, second pins the first occurrence.
        let issues = vec![Issue::new("teh", "the"), Issue::new("teh", "the").with_span(0, 3)];
        let out = resolve_positions(text, &issues);
        assert_eq!(spans(&out), vec![Some((4, 7)), Some((0, 3))]);
        assert_eq!(out[1].occurrence_index, Some(0));
    }

    #[test]
    fn stale_explicit_offsets_fall_back_to_search() {
        let text = "xx teh";
        let issues = vec![Issue::new("teh", "the").with_span(0, 3)];
        let out = resolve_positions(text, &issues);
        assert_eq!(spans(&out), vec![Some((3, 6))]);
    }

    #[test]
    fn exhausted_occurrences_are_unresolved() {
        let text = "teh cat";
        let issues = vec![
            Issue::new("teh", "the"),
            Issue::new("teh", "the"),
            Issue::new("dog", "cat"),
            Issue::new("", "x"),
        ];
        let out = resolve_positions(text, &issues);
        assert_eq!(spans(&out), vec![Some((0, 3)), None, None, None]);
        assert!(!out[1].is_resolved());
    }

    #[test]
    fn zero_length_explicit_issue_resolves() {
        let text = "ab";
        let issues = vec![Issue::new("", ",").with_span(1, 1)];
        let out = resolve_positions(text, &issues);
        assert_eq!(spans(&out), vec![Some((1, 1))]);
    }

    #[test]
    fn ordering_uses_earliest_plausible_position() {
        // "cat" comes first in the list but later in the document; the two
        // "teh" issues must still take occurrences left-to-right.
        let text = "teh cat teh";
        let issues = vec![
            Issue::new("cat", "dog"),
            Issue::new("teh", "the"),
            Issue::new("teh", "the").with_span(8, 11),
        ];
        let out = resolve_positions(text, &issues);
        assert_eq!(spans(&out), vec![Some((4, 7)), Some((0, 3)), Some((8, 11))]);
    }
}
