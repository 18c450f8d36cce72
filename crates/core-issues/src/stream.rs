//! Request streams: cancellation by ignoring.
//!
//! One stream for whole-document analysis and one per sentence re-analysis.
//! Every request takes the next id of its stream; a completion is applied
//! only if its ticket is still the stream's latest.

use ahash::AHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKey {
    Document,
    Sentence(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    pub stream: StreamKey,
    pub id: u64,
}

#[derive(Debug, Default)]
pub struct RequestStreams {
    latest: AHashMap<StreamKey, u64>,
    /// Streams whose latest request was cancelled without a replacement.
    cancelled: AHashMap<StreamKey, u64>,
}

impl RequestStreams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, stream: StreamKey) -> RequestTicket {
        let id = self.latest.entry(stream).or_insert(0);
        *id += 1;
        self.cancelled.remove(&stream);
        RequestTicket { stream, id: *id }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        let current = self.latest.get(&ticket.stream) == Some(&ticket.id);
        let cancelled = self.cancelled.get(&ticket.stream) == Some(&ticket.id);
        let ok = current && !cancelled;
        if !ok {
            tracing::debug!(
                target: "issues.stream",
                stream = ?ticket.stream,
                id = ticket.id,
                "stale ticket"
            );
        }
        ok
    }

    /// Invalidate the outstanding request of `stream`, if any.
    pub fn cancel(&mut self, stream: StreamKey) {
        if let Some(&id) = self.latest.get(&stream) {
            self.cancelled.insert(stream, id);
        }
    }

    /// Invalidate every sentence stream. Used when the document is re-analyzed
    /// or the sentence layout changes.
    pub fn cancel_sentences(&mut self) {
        let keys: Vec<StreamKey> = self
            .latest
            .keys()
            .copied()
            .filter(|k| matches!(k, StreamKey::Sentence(_)))
            .collect();
        for key in keys {
            self.cancel(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_request_makes_older_stale() {
        let mut streams = RequestStreams::new();
        let first = streams.begin(StreamKey::Document);
        let second = streams.begin(StreamKey::Document);
        assert!(!streams.is_current(&first));
        assert!(streams.is_current(&second));
    }

    #[test]
    fn streams_are_independent() {
        let mut streams = RequestStreams::new();
        let doc = streams.begin(StreamKey::Document);
        let s0 = streams.begin(StreamKey::Sentence(0));
        let s1 = streams.begin(StreamKey::Sentence(1));
        assert_eq!((doc.id, s0.id, s1.id), (1, 1, 1));
        streams.begin(StreamKey::Sentence(0));
        assert!(streams.is_current(&doc));
        assert!(!streams.is_current(&s0));
        assert!(streams.is_current(&s1));
    }

    #[test]
    fn cancel_invalidates_until_next_begin() {
        let mut streams = RequestStreams::new();
        let doc = streams.begin(StreamKey::Document);
        let s2 = streams.begin(StreamKey::Sentence(2));
        streams.cancel_sentences();
        assert!(streams.is_current(&doc));
        assert!(!streams.is_current(&s2));
        let next = streams.begin(StreamKey::Sentence(2));
        assert!(streams.is_current(&next));
        assert_eq!(next.id, 2);
    }
}
