//! Analyzer boundary.
//!
//! The analyzer itself lives outside the engine (a remote model, a local
//! checker, a canned response). Implementations only turn text into an
//! `AnalyzerResponse`; positioning, staleness and merging stay in the engine.

use anyhow::Result;
use core_issues::AnalyzerResponse;
use std::future::Future;

pub trait Analyzer: Send + Sync + 'static {
    fn analyze(&self, text: String) -> impl Future<Output = Result<AnalyzerResponse>> + Send;
}

/// Returns the same response for every request.
#[derive(Debug, Clone)]
pub struct StaticAnalyzer {
    response: AnalyzerResponse,
}

impl StaticAnalyzer {
    pub fn new(response: AnalyzerResponse) -> Self {
        Self { response }
    }
}

impl Analyzer for StaticAnalyzer {
    async fn analyze(&self, _text: String) -> Result<AnalyzerResponse> {
        Ok(self.response.clone())
    }
}

/// Synchronous closure analyzer.
pub struct FnAnalyzer<F>(pub F);

impl<F> Analyzer for FnAnalyzer<F>
where
    F: Fn(&str) -> Result<AnalyzerResponse> + Send + Sync + 'static,
{
    async fn analyze(&self, text: String) -> Result<AnalyzerResponse> {
        (self.0)(&text)
    }
}
