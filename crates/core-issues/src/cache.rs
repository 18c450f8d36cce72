//! Engine-owned analysis cache.
//!
//! Keyed by an ahash signature of a sentence's core text; stores the
//! sentence-local issues returned for that text. Entries are checked against
//! the stored text on lookup so a signature collision is a miss, never a
//! wrong answer. Eviction is by age (`evict_older_than`) and by capacity
//! (oldest entry first).

use crate::issue::Issue;
use ahash::{AHashMap, AHasher};
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

pub fn text_signature(text: &str) -> u64 {
    let mut hasher = AHasher::default();
    text.len().hash(&mut hasher);
    text.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone)]
struct CacheEntry {
    text: String,
    issues: Vec<Issue>,
    inserted: Instant,
}

#[derive(Debug)]
pub struct AnalysisCache {
    capacity: usize,
    entries: AHashMap<u64, CacheEntry>,
}

impl AnalysisCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: AHashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, text: &str) -> Option<&[Issue]> {
        self.entries
            .get(&text_signature(text))
            .filter(|e| e.text == text)
            .map(|e| e.issues.as_slice())
    }

    pub fn insert(&mut self, text: &str, issues: Vec<Issue>, now: Instant) {
        let key = text_signature(text);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            CacheEntry {
                text: text.to_string(),
                issues,
                inserted: now,
            },
        );
    }

    /// Drop entries inserted more than `max_age` before `now`. Returns the
    /// number of evicted entries.
    pub fn evict_older_than(&mut self, max_age: Duration, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.inserted) <= max_age);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!(target: "issues.cache", evicted, "evict_older_than");
        }
        evicted
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.inserted)
            .map(|(k, _)| *k);
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
