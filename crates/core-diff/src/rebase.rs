//! Span rebasing across a live edit.
//!
//! Each issue is resolved against `script.before()` and its span is mapped
//! into `script.after()` (start biased after insertions, end before them).
//! An issue whose mapped span no longer reads `original` was edited through
//! and is dropped; the caller re-analyzes that region instead. Issues that
//! could not be resolved before the edit stay in the list without offsets.

use crate::script::EditScript;
use core_issues::{Issue, resolve_positions};

#[derive(Debug, Clone, PartialEq)]
pub struct RebaseReport {
    pub issues: Vec<Issue>,
    /// Indices (into the input list) of issues the edit went through.
    pub dropped: Vec<usize>,
    /// For each kept issue, its index in the input list.
    pub origins: Vec<usize>,
}

pub fn rebase_issues(script: &EditScript, issues: &[Issue]) -> RebaseReport {
    if script.is_identity() {
        return RebaseReport {
            issues: issues.to_vec(),
            dropped: Vec::new(),
            origins: (0..issues.len()).collect(),
        };
    }
    let after = script.after();
    let mut kept = Vec::with_capacity(issues.len());
    let mut dropped = Vec::new();
    let mut origins = Vec::with_capacity(issues.len());
    for pos in resolve_positions(script.before(), issues) {
        let issue = &issues[pos.index];
        let Some(span) = pos.span else {
            let mut stale = issue.clone();
            stale.start = None;
            stale.end = None;
            kept.push(stale);
            origins.push(pos.index);
            continue;
        };
        let mapped = script.map_span(span);
        if mapped.slice(after) == Some(issue.original.as_str()) {
            kept.push(issue.clone().with_span(mapped.start, mapped.end));
            origins.push(pos.index);
        } else {
            dropped.push(pos.index);
        }
    }
    tracing::debug!(
        target: "diff.rebase",
        issues = issues.len(),
        kept = kept.len(),
        dropped = dropped.len(),
        "rebase_issues"
    );
    RebaseReport {
        issues: kept,
        dropped,
        origins,
    }
}
