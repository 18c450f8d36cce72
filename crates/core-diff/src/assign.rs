//! Offset assignment for issues reported without (valid) offsets.
//!
//! Precedence, first hit wins:
//! 1. explicit offsets, when `before[start..end] == original`;
//! 2. forward match: an occurrence of `original` in `before` whose mapped
//!    span reads exactly `suggestion` in `after`;
//! 3. reverse match: an occurrence of `suggestion` in `after` mapped back
//!    through the inverted script that reads exactly `original`;
//! 4. first occurrence of `original` in `before`;
//! 5. unresolvable (`None`).
//!
//! Every step skips `before` spans already taken by an earlier issue, so
//! structurally identical issues land on distinct occurrences. Explicit
//! offsets are claimed before any search runs.

use crate::script::EditScript;
use core_issues::Issue;
use core_text::{Span, find_all_occurrences};
use std::collections::HashSet;

#[derive(Debug, Default)]
struct StepCounts {
    explicit: usize,
    forward: usize,
    reverse: usize,
    search: usize,
    unresolved: usize,
}

fn forward_match(script: &EditScript, issue: &Issue, used: &HashSet<Span>) -> Option<Span> {
    let len = issue.original.len();
    find_all_occurrences(script.before(), &issue.original)
        .into_iter()
        .map(|s| Span::new(s, s + len))
        .filter(|span| !used.contains(span))
        .find(|span| script.map_span(*span).slice(script.after()) == Some(issue.suggestion.as_str()))
}

fn reverse_match(
    script: &EditScript,
    inverse: &EditScript,
    issue: &Issue,
    used: &HashSet<Span>,
) -> Option<Span> {
    let len = issue.suggestion.len();
    find_all_occurrences(script.after(), &issue.suggestion)
        .into_iter()
        .map(|t| inverse.map_span(Span::new(t, t + len)))
        .filter(|span| !used.contains(span))
        .find(|span| span.slice(script.before()) == Some(issue.original.as_str()))
}

fn search_match(text: &str, original: &str, used: &HashSet<Span>) -> Option<Span> {
    find_all_occurrences(text, original)
        .into_iter()
        .map(|s| Span::new(s, s + original.len()))
        .find(|span| !used.contains(span))
}

/// One span per issue (same order) in `script.before()` coordinates.
pub fn assign_offsets(script: &EditScript, issues: &[Issue]) -> Vec<Option<Span>> {
    let before = script.before();
    let mut counts = StepCounts::default();
    let mut out: Vec<Option<Span>> = issues.iter().map(|i| i.validated_span(before)).collect();
    let mut used: HashSet<Span> = out.iter().flatten().copied().collect();
    counts.explicit = used.len();

    let mut inverse: Option<EditScript> = None;
    for (idx, issue) in issues.iter().enumerate() {
        if out[idx].is_some() {
            continue;
        }
        let mut found = forward_match(script, issue, &used);
        if found.is_some() {
            counts.forward += 1;
        } else if !issue.suggestion.is_empty() {
            let inverse = inverse.get_or_insert_with(|| script.invert());
            found = reverse_match(script, inverse, issue, &used);
            if found.is_some() {
                counts.reverse += 1;
            }
        }
        if found.is_none() {
            found = search_match(before, &issue.original, &used);
            if found.is_some() {
                counts.search += 1;
            }
        }
        match found {
            Some(span) => {
                used.insert(span);
                out[idx] = Some(span);
            }
            None => counts.unresolved += 1,
        }
    }

    tracing::debug!(
        target: "diff.assign",
        issues = issues.len(),
        explicit = counts.explicit,
        forward = counts.forward,
        reverse = counts.reverse,
        search = counts.search,
        unresolved = counts.unresolved,
        "assign_offsets"
    );
    out
}

/// `issues` with assigned offsets written back as explicit offsets.
/// Unresolvable issues keep whatever offsets they carried.
pub fn with_assigned_offsets(script: &EditScript, issues: &[Issue]) -> Vec<Issue> {
    assign_offsets(script, issues)
        .into_iter()
        .zip(issues)
        .map(|(span, issue)| match span {
            Some(span) => issue.clone().with_span(span.start, span.end),
            None => issue.clone(),
        })
        .collect()
}
