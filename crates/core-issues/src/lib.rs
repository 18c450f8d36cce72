//! Issue model and the text-only half of the highlight pipeline.
//!
//! Everything in this crate depends on strings and byte offsets only, never
//! on a rendering host:
//! - `issue`: the `Issue` record, `Severity`, and resolved `IssuePosition`s.
//! - `resolve`: occurrence-disambiguated position resolution.
//! - `context`: joins positions to sentences; per-sentence corrected previews.
//! - `merge`: folds a sentence-scoped re-analysis into the global list.
//! - `apply`: single and bulk fix application with overlap skipping.
//! - `identity`: stable `IssueId`s across list rebuilds.
//! - `cache`: engine-owned analysis cache with age eviction.
//! - `stream`: per-stream request ids for stale-response discard.
//! - `response`: analyzer payload shapes.
//!
//! Issue lists are replaced wholesale, never mutated in place; derived data
//! (positions, contexts) is recomputed from `(text, issues)` on demand.

pub mod apply;
pub mod cache;
pub mod context;
pub mod identity;
pub mod issue;
pub mod merge;
pub mod resolve;
pub mod response;
pub mod stream;

pub use apply::{
    ApplyError, BulkApplyReport, SkipReason, SkippedIssue, apply_all, apply_fix, locate, locate_near,
    splice,
};
pub use cache::{AnalysisCache, text_signature};
pub use context::{
    IssueSentenceContext, SentencePreview, build_contexts, group_by_sentence, sentence_previews,
};
pub use identity::{IssueId, IssueRegistry};
pub use issue::{Issue, IssuePosition, Severity};
pub use merge::merge_sentence_issues;
pub use resolve::resolve_positions;
pub use response::AnalyzerResponse;
pub use stream::{RequestStreams, RequestTicket, StreamKey};
