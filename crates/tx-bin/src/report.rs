//! Batch output for one analysis run.

use core_issues::{BulkApplyReport, IssueId, Severity};
use core_layout::{HighlightFrame, Rect};
use core_session::HighlightEngine;
use core_text::Span;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueLine {
    pub id: IssueId,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub original: String,
    pub suggestion: String,
    /// `None` when the issue could not be located in the text.
    pub span: Option<Span>,
    pub sentence: Option<usize>,
    pub rects: Vec<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewLine {
    pub sentence: usize,
    pub original: String,
    pub corrected: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedLine {
    pub text: String,
    pub applied: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub text: String,
    pub layout_version: u64,
    pub issues: Vec<IssueLine>,
    pub previews: Vec<PreviewLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<AppliedLine>,
}

impl RunReport {
    /// Snapshot the engine's issues in list order, with the rectangles
    /// `frame` holds for each of them.
    pub fn collect(engine: &HighlightEngine, frame: &HighlightFrame) -> Self {
        let issues = engine
            .positions()
            .iter()
            .map(|pos| {
                let id = engine.ids()[pos.index];
                let issue = &engine.issues()[pos.index];
                IssueLine {
                    id,
                    kind: issue.kind.clone(),
                    severity: issue.severity,
                    original: issue.original.clone(),
                    suggestion: issue.suggestion.clone(),
                    span: pos.span,
                    sentence: engine.sentence_of(id),
                    rects: frame.get(id).map(|h| h.rects.clone()).unwrap_or_default(),
                }
            })
            .collect();
        let previews = engine
            .previews()
            .into_iter()
            .map(|p| PreviewLine {
                sentence: p.sentence_index,
                original: p.original,
                corrected: p.corrected,
            })
            .collect();
        Self {
            text: engine.text().to_string(),
            layout_version: frame.version,
            issues,
            previews,
            applied: None,
        }
    }

    pub fn with_applied(mut self, text: &str, bulk: &BulkApplyReport) -> Self {
        self.applied = Some(AppliedLine {
            text: text.to_string(),
            applied: bulk.applied.len(),
            skipped: bulk.skipped.len(),
        });
        self
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if self.issues.is_empty() {
            out.push_str("no issues\n");
        }
        for line in &self.issues {
            let at = match line.span {
                Some(span) => format!("{}..{}", span.start, span.end),
                None => "unresolved".to_string(),
            };
            let _ = write!(
                out,
                "{at:>10}  {:?} -> {:?}",
                line.original, line.suggestion
            );
            if !line.kind.is_empty() {
                let _ = write!(out, " [{}]", line.kind);
            }
            for r in &line.rects {
                let _ = write!(out, " ({:.0},{:.0} {:.0}x{:.0})", r.left, r.top, r.width, r.height);
            }
            out.push('\n');
        }
        for p in &self.previews {
            let _ = writeln!(out, "sentence {}: {}", p.sentence, p.corrected);
        }
        if let Some(applied) = &self.applied {
            let _ = writeln!(
                out,
                "applied {} / skipped {}\n{}",
                applied.applied, applied.skipped, applied.text
            );
        }
        out
    }
}
