//! Measured-rectangle cache.
//!
//! Entries are valid for exactly one `RectKey`: the layout version, the text
//! signature and the issue-set signature they were measured under. A lookup
//! with any other key empties the cache first.

use crate::geometry::Rect;
use ahash::{AHashMap, AHasher};
use core_issues::IssueId;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RectKey {
    pub layout_version: u64,
    pub text_signature: u64,
    pub issue_signature: u64,
}

/// Order-sensitive signature of an issue id set.
pub fn issue_set_signature(ids: &[IssueId]) -> u64 {
    let mut hasher = AHasher::default();
    ids.len().hash(&mut hasher);
    for id in ids {
        id.hash(&mut hasher);
    }
    hasher.finish()
}

#[derive(Debug, Default)]
pub struct RectCache {
    key: Option<RectKey>,
    issues: AHashMap<IssueId, Vec<Rect>>,
    sentences: AHashMap<usize, Vec<Rect>>,
}

impl RectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `key` current. Returns false (and drops every entry) when it
    /// differs from the key the entries were stored under.
    pub fn validate(&mut self, key: RectKey) -> bool {
        if self.key == Some(key) {
            return true;
        }
        if self.key.is_some() {
            tracing::trace!(
                target: "layout.measure",
                layout_version = key.layout_version,
                dropped = self.issues.len() + self.sentences.len(),
                "rect cache invalidated"
            );
        }
        self.clear();
        self.key = Some(key);
        false
    }

    pub fn issue(&self, id: IssueId) -> Option<&[Rect]> {
        self.issues.get(&id).map(Vec::as_slice)
    }

    pub fn insert_issue(&mut self, id: IssueId, rects: Vec<Rect>) {
        self.issues.insert(id, rects);
    }

    pub fn sentence(&self, index: usize) -> Option<&[Rect]> {
        self.sentences.get(&index).map(Vec::as_slice)
    }

    pub fn insert_sentence(&mut self, index: usize, rects: Vec<Rect>) {
        self.sentences.insert(index, rects);
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.sentences.is_empty()
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.issues.clear();
        self.sentences.clear();
    }
}
