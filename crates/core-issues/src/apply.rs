//! Fix application over plain text snapshots.
//!
//! `apply_fix` handles one issue; `apply_all` handles a whole list and
//! reports what was applied and what was skipped (no-op, unresolvable, or
//! overlapping an already accepted fix). Surface-level application with the
//! re-locate fallback lives with the engine, which owns the surface.

use crate::issue::Issue;
use crate::resolve::resolve_positions;
use core_text::{Span, find_all_occurrences};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("issue suggestion equals its original text")]
    NoOp,
    #[error("issue could not be located in the text")]
    Unresolvable,
    #[error("surface text changed since the issue was resolved")]
    Conflict,
    #[error("surface rejected the replacement")]
    SurfaceRejected,
}

/// Span an issue applies to: valid explicit offsets first, then the first
/// occurrence of `original`.
pub fn locate(text: &str, issue: &Issue) -> Option<Span> {
    if let Some(span) = issue.validated_span(text) {
        return Some(span);
    }
    find_all_occurrences(text, &issue.original)
        .first()
        .map(|&s| Span::new(s, s + issue.original.len()))
}

/// Occurrence of `original` nearest to `near`, used when a previously
/// resolved span went stale.
pub fn locate_near(text: &str, original: &str, near: usize) -> Option<Span> {
    find_all_occurrences(text, original)
        .into_iter()
        .min_by_key(|&s| s.abs_diff(near))
        .map(|s| Span::new(s, s + original.len()))
}

pub fn splice(text: &str, span: Span, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..span.start]);
    out.push_str(replacement);
    out.push_str(&text[span.end..]);
    out
}

pub fn apply_fix(text: &str, issue: &Issue) -> Result<String, ApplyError> {
    if issue.is_noop() {
        return Err(ApplyError::NoOp);
    }
    let span = locate(text, issue).ok_or(ApplyError::Unresolvable)?;
    Ok(splice(text, span, &issue.suggestion))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoOp,
    Unresolvable,
    /// Overlaps the span of the already accepted issue `with`.
    Overlap { with: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedIssue {
    pub index: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkApplyReport {
    pub text: String,
    /// Indices of applied issues, in document order.
    pub applied: Vec<usize>,
    pub skipped: Vec<SkippedIssue>,
}

/// Apply every applicable issue at once. Issues are accepted in document
/// order; any issue overlapping an accepted one is skipped.
pub fn apply_all(text: &str, issues: &[Issue]) -> BulkApplyReport {
    let mut skipped = Vec::new();
    let mut candidates: Vec<(Span, usize)> = Vec::new();
    for pos in resolve_positions(text, issues) {
        let issue = &issues[pos.index];
        if issue.is_noop() {
            skipped.push(SkippedIssue {
                index: pos.index,
                reason: SkipReason::NoOp,
            });
            continue;
        }
        match pos.span {
            Some(span) => candidates.push((span, pos.index)),
            None => skipped.push(SkippedIssue {
                index: pos.index,
                reason: SkipReason::Unresolvable,
            }),
        }
    }
    candidates.sort_by_key(|&(span, idx)| (span.start, span.end, idx));

    let mut accepted: Vec<(Span, usize)> = Vec::new();
    for (span, idx) in candidates {
        if let Some(&(_, with)) = accepted.iter().find(|(s, _)| s.overlaps(&span)) {
            skipped.push(SkippedIssue {
                index: idx,
                reason: SkipReason::Overlap { with },
            });
            continue;
        }
        accepted.push((span, idx));
    }

    let mut out = text.to_string();
    for (span, idx) in accepted.iter().rev() {
        out.replace_range(span.start..span.end, &issues[*idx].suggestion);
    }
    skipped.sort_by_key(|s| s.index);
    tracing::debug!(
        target: "issues.apply",
        applied = accepted.len(),
        skipped = skipped.len(),
        "apply_all"
    );
    BulkApplyReport {
        text: out,
        applied: accepted.into_iter().map(|(_, idx)| idx).collect(),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_offset_picks_second_occurrence() {
        let issue = Issue::new("foo", "baz").with_span(8, 11);
        assert_eq!(apply_fix("foo bar foo", &issue).unwrap(), "foo bar baz");
    }

    #[test]
    fn apply_fix_without_offsets_uses_first_occurrence() {
        let issue = Issue::new("foo", "baz");
        assert_eq!(apply_fix("foo bar foo", &issue).unwrap(), "baz bar foo");
    }

    #[test]
    fn apply_fix_errors() {
        assert_eq!(apply_fix("abc", &Issue::new("a", "a")), Err(ApplyError::NoOp));
        assert_eq!(
            apply_fix("abc", &Issue::new("z", "y")),
            Err(ApplyError::Unresolvable)
        );
    }

    #[test]
    fn bulk_apply_skips_overlap() {
        let issues = vec![
            Issue::new("abc", "ABC").with_span(0, 3),
            Issue::new("cde", "CDE").with_span(2, 5),
        ];
        let report = apply_all("abcde", &issues);
        assert_eq!(report.text, "ABCde");
        assert_eq!(report.applied, vec![0]);
        assert_eq!(
            report.skipped,
            vec![SkippedIssue {
                index: 1,
                reason: SkipReason::Overlap { with: 0 }
            }]
        );
    }

    #[test]
    fn bulk_apply_never_counts_noops() {
        let issues = vec![Issue::new("same", "same"), Issue::new("teh", "the")];
        let report = apply_all("same teh", &issues);
        assert_eq!(report.text, "same the");
        assert_eq!(report.applied, vec![1]);
        assert_eq!(report.skipped[0].reason, SkipReason::NoOp);
    }

    #[test]
    fn bulk_apply_handles_repeats_and_carets() {
        let issues = vec![
            Issue::new("teh", "the"),
            Issue::new("teh", "the"),
            Issue::new("", ",").with_span(3, 3),
            Issue::new("gone", "x"),
        ];
        let report = apply_all("teh teh", &issues);
        assert_eq!(report.text, "the, the");
        assert_eq!(report.applied, vec![0, 2, 1]);
        assert_eq!(report.skipped[0].reason, SkipReason::Unresolvable);
    }

    #[test]
    fn locate_near_prefers_closest() {
        assert_eq!(locate_near("ab ab ab", "ab", 5), Some(Span::new(6, 8)));
        assert_eq!(locate_near("ab ab ab", "zz", 5), None);
    }
}
