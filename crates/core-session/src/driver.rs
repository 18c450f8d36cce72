//! Async analyzer driver.
//!
//! Each submitted request runs on its own tokio task and reports back over a
//! bounded channel as an `AnalysisEvent`. A new request on a stream aborts
//! the task still running for that stream; the engine's tickets make any
//! completion that slips through harmless.

use crate::analyzer::Analyzer;
use crate::request::{AnalysisEvent, AnalysisRequest};
use ahash::AHashMap;
use core_issues::StreamKey;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

pub struct AnalysisDriver<A: Analyzer> {
    analyzer: Arc<A>,
    events: mpsc::Sender<AnalysisEvent>,
    inflight: AHashMap<StreamKey, JoinHandle<()>>,
}

impl<A: Analyzer> AnalysisDriver<A> {
    pub fn new(analyzer: A, capacity: usize) -> (Self, mpsc::Receiver<AnalysisEvent>) {
        let (events, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                analyzer: Arc::new(analyzer),
                events,
                inflight: AHashMap::new(),
            },
            rx,
        )
    }

    /// Spawn the analysis for `request`. Must be called inside a tokio runtime.
    pub fn submit(&mut self, request: AnalysisRequest) {
        let stream = request.ticket.stream;
        self.abort(stream);
        let analyzer = self.analyzer.clone();
        let events = self.events.clone();
        trace!(target: "session.driver", ?stream, id = request.ticket.id, len = request.text.len(), "submit");
        let handle = tokio::spawn(async move {
            let event = match analyzer.analyze(request.text.clone()).await {
                Ok(response) => AnalysisEvent::Completed { request, response },
                Err(err) => AnalysisEvent::Failed {
                    request,
                    error: format!("{err:#}"),
                },
            };
            if events.send(event).await.is_err() {
                debug!(target: "session.driver", ?stream, "receiver dropped");
            }
        });
        self.inflight.insert(stream, handle);
    }

    pub fn abort(&mut self, stream: StreamKey) {
        if let Some(handle) = self.inflight.remove(&stream) {
            if !handle.is_finished() {
                debug!(target: "session.driver", ?stream, "abort previous request");
            }
            handle.abort();
        }
    }

    pub fn abort_all(&mut self) {
        for (_, handle) in self.inflight.drain() {
            handle.abort();
        }
    }

    /// Requests whose task has not finished yet.
    pub fn in_flight(&mut self) -> usize {
        self.inflight.retain(|_, h| !h.is_finished());
        self.inflight.len()
    }
}

impl<A: Analyzer> Drop for AnalysisDriver<A> {
    fn drop(&mut self) {
        self.abort_all();
    }
}
