//! Issue synthesis from a plain rewrite.
//!
//! Walks the edit script: a `Delete` (with its partner `Insert`, if any)
//! becomes one issue over the deleted text; a pure `Insert` becomes a
//! zero-length issue at its insertion point. Offsets come from the running
//! position in `before` and are stored as explicit offsets.

use crate::script::{EditKind, EditScript};
use core_issues::{Issue, Severity};

fn synthesized(original: &str, suggestion: &str, start: usize) -> Issue {
    Issue::new(original, suggestion)
        .with_kind("correction", "diff")
        .with_severity(Severity::Suggestion)
        .with_span(start, start + original.len())
}

pub fn synthesize_issues(script: &EditScript) -> Vec<Issue> {
    let ops = script.ops();
    let mut issues = Vec::new();
    let mut pos = 0usize;
    let mut k = 0;
    while k < ops.len() {
        let op = &ops[k];
        match op.kind {
            EditKind::Equal => pos += op.text.len(),
            EditKind::Insert => issues.push(synthesized("", &op.text, pos)),
            EditKind::Delete => {
                let suggestion = match ops.get(k + 1) {
                    Some(next) if next.kind == EditKind::Insert => {
                        k += 1;
                        next.text.as_str()
                    }
                    _ => "",
                };
                issues.push(synthesized(&op.text, suggestion, pos));
                pos += op.text.len();
            }
        }
        k += 1;
    }
    tracing::debug!(target: "diff.synth", issues = issues.len(), "synthesize_issues");
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Span;
    use pretty_assertions::assert_eq;

    #[test]
    fn substitution_becomes_one_issue() {
        let script = EditScript::compute("I seen it.", "I saw it.");
        let issues = synthesize_issues(&script);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].original, "seen");
        assert_eq!(issues[0].suggestion, "saw");
        assert_eq!(issues[0].kind, "correction");
        assert_eq!(issues[0].category, "diff");
        assert_eq!(issues[0].explicit_span(), Some(Span::new(2, 6)));
    }

    #[test]
    fn deletion_and_insertion() {
        let script = EditScript::compute("a very big dog", "a dog");
        let issues = synthesize_issues(&script);
        assert_eq!(issues[0].original, "very big ");
        assert_eq!(issues[0].suggestion, "");

        let script = EditScript::compute("a dog", "a big dog");
        let issues = synthesize_issues(&script);
        assert_eq!(issues[0].original, "");
        assert_eq!(issues[0].suggestion, "big ");
        assert_eq!(issues[0].explicit_span(), Some(Span::new(2, 2)));
    }

    #[test]
    fn identical_texts_yield_nothing() {
        let script = EditScript::compute("fine.", "fine.");
        assert!(synthesize_issues(&script).is_empty());
    }
}
