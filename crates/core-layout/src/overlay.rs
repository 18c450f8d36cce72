//! Rendering boundary: what a highlight layer draws for one layout version.

use crate::geometry::{CoordinateSpace, Rect};
use core_issues::IssueId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub id: IssueId,
    /// One rectangle per visible visual line; empty when unmeasurable or
    /// fully hidden this frame.
    pub rects: Vec<Rect>,
}

impl Highlight {
    /// Rectangle a popover anchors to (the first visible line).
    pub fn anchor(&self) -> Option<Rect> {
        self.rects.first().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightFrame {
    pub version: u64,
    pub space: CoordinateSpace,
    /// Document order of the resolved issues.
    pub highlights: Vec<Highlight>,
    /// Active sentence rectangles for the hover preview, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence: Option<Vec<Rect>>,
}

impl HighlightFrame {
    pub fn new(version: u64, space: CoordinateSpace, pairs: Vec<(IssueId, Vec<Rect>)>) -> Self {
        Self {
            version,
            space,
            highlights: pairs
                .into_iter()
                .map(|(id, rects)| Highlight { id, rects })
                .collect(),
            sentence: None,
        }
    }

    pub fn with_sentence(mut self, rects: Vec<Rect>) -> Self {
        self.sentence = Some(rects);
        self
    }

    pub fn get(&self, id: IssueId) -> Option<&Highlight> {
        self.highlights.iter().find(|h| h.id == id)
    }

    /// Total rectangles across all highlights (sentence excluded).
    pub fn rect_count(&self) -> usize {
        self.highlights.iter().map(|h| h.rects.len()).sum()
    }

    /// Ids with at least one visible rectangle.
    pub fn visible_ids(&self) -> impl Iterator<Item = IssueId> + '_ {
        self.highlights
            .iter()
            .filter(|h| !h.rects.is_empty())
            .map(|h| h.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_lookup_and_counts() {
        let frame = HighlightFrame::new(
            4,
            CoordinateSpace::Viewport,
            vec![
                (IssueId(1), vec![Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(0.0, 1.0, 1.0, 1.0)]),
                (IssueId(2), vec![]),
            ],
        );
        assert_eq!(frame.rect_count(), 2);
        assert_eq!(frame.visible_ids().collect::<Vec<_>>(), vec![IssueId(1)]);
        assert_eq!(frame.get(IssueId(1)).and_then(Highlight::anchor), Some(Rect::new(0.0, 0.0, 1.0, 1.0)));
        assert!(frame.get(IssueId(3)).is_none());
    }

    #[test]
    fn serializes_ids_transparently() {
        let frame = HighlightFrame::new(1, CoordinateSpace::Page, vec![(IssueId(9), vec![])]);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["highlights"][0]["id"], 9);
        assert_eq!(json["space"], "page");
        assert!(json.get("sentence").is_none());
    }
}
