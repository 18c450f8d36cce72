use ahash::AHasher;
use core_text::Span;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    #[default]
    Suggestion,
    Info,
}

/// A correction candidate reported by the analyzer or synthesized from a diff.
///
/// `start`/`end` are byte offsets and are only trusted when
/// `text[start..end] == original` for the snapshot being resolved against.
/// Two issues with identical fields are still distinct: identity is the
/// position in the owning list, never structural equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub severity: Severity,
    pub original: String,
    pub suggestion: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl Issue {
    pub fn new(original: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            kind: String::new(),
            category: String::new(),
            severity: Severity::default(),
            original: original.into(),
            suggestion: suggestion.into(),
            explanation: String::new(),
            confidence: None,
            start: None,
            end: None,
        }
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>, category: impl Into<String>) -> Self {
        self.kind = kind.into();
        self.category = category.into();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Explicit offsets, if both ends are present and ordered.
    pub fn explicit_span(&self) -> Option<Span> {
        match (self.start, self.end) {
            (Some(s), Some(e)) if s <= e => Some(Span::new(s, e)),
            _ => None,
        }
    }

    /// Explicit offsets that still address `original` inside `text`.
    pub fn validated_span(&self, text: &str) -> Option<Span> {
        let span = self.explicit_span()?;
        (span.slice(text)? == self.original).then_some(span)
    }

    pub fn is_noop(&self) -> bool {
        self.original == self.suggestion
    }

    /// Structural signature used for identity matching across updates.
    /// Offsets, explanation and confidence are deliberately excluded.
    pub fn signature(&self) -> u64 {
        let mut hasher = AHasher::default();
        self.kind.hash(&mut hasher);
        self.category.hash(&mut hasher);
        self.original.hash(&mut hasher);
        self.suggestion.hash(&mut hasher);
        hasher.finish()
    }
}

/// Resolution of one issue (by list index) against one snapshot.
///
/// `span == None` means unresolvable: never render it, never apply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuePosition {
    pub index: usize,
    pub span: Option<Span>,
    /// Rank among the non-overlapping occurrences of `original`, when the
    /// span coincides with one.
    pub occurrence_index: Option<usize>,
}

impl IssuePosition {
    pub fn unresolved(index: usize) -> Self {
        Self {
            index,
            span: None,
            occurrence_index: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.span.is_some()
    }

    pub fn issue<'a>(&self, issues: &'a [Issue]) -> &'a Issue {
        &issues[self.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_span_requires_matching_text() {
        let issue = Issue::new("foo", "baz").with_span(8, 11);
        assert_eq!(issue.validated_span("foo bar foo"), Some(Span::new(8, 11)));
        assert_eq!(issue.validated_span("foo bar fox"), None);
        assert_eq!(issue.validated_span("short"), None);
    }

    #[test]
    fn reversed_offsets_are_ignored() {
        let issue = Issue::new("a", "b").with_span(3, 1);
        assert_eq!(issue.explicit_span(), None);
    }

    #[test]
    fn signature_ignores_offsets() {
        let a = Issue::new("teh", "the");
        let b = Issue::new("teh", "the").with_span(4, 7);
        let c = Issue::new("teh", "then");
        assert_eq!(a.signature(), b.signature());
        assert_ne!(a.signature(), c.signature());
    }
}
