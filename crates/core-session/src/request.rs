//! Values exchanged between the engine and the analyzer boundary.

use core_issues::{AnalyzerResponse, RequestTicket};

/// Text sent to the analyzer under a stream ticket. For sentence streams the
/// text is the sentence core, not the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub ticket: RequestTicket,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentenceRequest {
    /// Served from the analysis cache and already merged.
    Cached,
    Send(AnalysisRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    Completed {
        request: AnalysisRequest,
        response: AnalyzerResponse,
    },
    Failed {
        request: AnalysisRequest,
        error: String,
    },
}

impl AnalysisEvent {
    pub fn request(&self) -> &AnalysisRequest {
        match self {
            AnalysisEvent::Completed { request, .. } | AnalysisEvent::Failed { request, .. } => {
                request
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Issues replaced (document) or merged (sentence). `dropped` counts
    /// issues lost while rebasing across edits made since the request.
    Applied { issues: usize, dropped: usize },
    /// Superseded, cancelled, or the sentence no longer exists as sent.
    Stale,
    Failed,
}
