//! Occlusion filtering of measured highlight rectangles.
//!
//! Below `ceiling` total rectangles, each rectangle's center is hit-tested
//! against the surface; a rectangle whose center is not owned by the surface
//! (or one of its descendants) is hidden. Sampling is reused between frames
//! until the surface has moved at least `min_delta_px` in total or a
//! rectangle appears that was never sampled.
//!
//! At or above the ceiling no sampling happens. A rectangle is then kept only
//! when it lies entirely inside the surface's bounding box.
//!
//! Rectangles are passed in the measurer's coordinate space together with the
//! shift that brings them into viewport space, where hit testing happens.

use crate::geometry::Rect;
use crate::metrics::LayoutMetrics;
use crate::surface::TextSurface;
use ahash::{AHashMap, AHashSet};
use core_issues::IssueId;
use smallvec::SmallVec;
use std::sync::Arc;

#[derive(Debug)]
pub struct OcclusionFilter {
    ceiling: usize,
    min_delta_px: f64,
    metrics: Arc<LayoutMetrics>,
    /// Movement accumulated since the last sampling pass.
    moved_px: f64,
    sampled: AHashSet<(IssueId, usize)>,
    hidden: AHashMap<IssueId, SmallVec<[usize; 4]>>,
}

impl OcclusionFilter {
    pub fn new(ceiling: usize, min_delta_px: f64, metrics: Arc<LayoutMetrics>) -> Self {
        Self {
            ceiling: ceiling.max(1),
            min_delta_px,
            metrics,
            moved_px: 0.0,
            sampled: AHashSet::new(),
            hidden: AHashMap::new(),
        }
    }

    /// Record surface or scroll movement reported by a layout recompute.
    pub fn note_movement(&mut self, moved_px: f64) {
        self.moved_px += moved_px.abs();
    }

    /// Forget previous samples; the next `filter` call samples everything.
    pub fn invalidate(&mut self) {
        self.sampled.clear();
        self.hidden.clear();
        self.moved_px = 0.0;
    }

    fn is_hidden(&self, id: IssueId, idx: usize) -> bool {
        self.hidden.get(&id).is_some_and(|v| v.contains(&idx))
    }

    pub fn filter(
        &mut self,
        surface: &dyn TextSurface,
        to_viewport: (f64, f64),
        highlights: Vec<(IssueId, Vec<Rect>)>,
    ) -> Vec<(IssueId, Vec<Rect>)> {
        let total: usize = highlights.iter().map(|(_, r)| r.len()).sum();
        let (dx, dy) = to_viewport;
        if total >= self.ceiling {
            self.invalidate();
            self.metrics.incr_clip_only();
            let bounds = surface.bounding_box();
            tracing::debug!(target: "layout.occlusion", total, ceiling = self.ceiling, "clip only");
            return highlights
                .into_iter()
                .map(|(id, rects)| {
                    let kept = rects
                        .into_iter()
                        .filter(|r| bounds.contains_rect(&r.translated(dx, dy)))
                        .collect();
                    (id, kept)
                })
                .collect();
        }

        let unseen = highlights
            .iter()
            .any(|(id, rects)| (0..rects.len()).any(|i| !self.sampled.contains(&(*id, i))));
        if unseen || self.moved_px >= self.min_delta_px {
            self.sample(surface, to_viewport, &highlights);
        }

        highlights
            .into_iter()
            .map(|(id, rects)| {
                let kept = rects
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| !self.is_hidden(id, *i))
                    .map(|(_, r)| r)
                    .collect();
                (id, kept)
            })
            .collect()
    }

    fn sample(
        &mut self,
        surface: &dyn TextSurface,
        (dx, dy): (f64, f64),
        highlights: &[(IssueId, Vec<Rect>)],
    ) {
        self.sampled.clear();
        self.hidden.clear();
        self.moved_px = 0.0;
        let mut sampled = 0u64;
        let mut hidden = 0u64;
        for (id, rects) in highlights {
            for (i, rect) in rects.iter().enumerate() {
                sampled += 1;
                self.sampled.insert((*id, i));
                let center = rect.translated(dx, dy).center();
                if !surface.hit_test(center).is_own() {
                    hidden += 1;
                    self.hidden.entry(*id).or_default().push(i);
                }
            }
        }
        self.metrics.add_occlusion(sampled, hidden);
        tracing::debug!(target: "layout.occlusion", sampled, hidden, "sampled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plain::PlainTextSurface;
    use pretty_assertions::assert_eq;

    fn filter(ceiling: usize) -> OcclusionFilter {
        OcclusionFilter::new(ceiling, 4.0, Arc::new(LayoutMetrics::default()))
    }

    fn surface() -> PlainTextSurface {
        PlainTextSurface::multi_line("abc", Rect::new(0.0, 0.0, 100.0, 40.0))
    }

    #[test]
    fn occluded_rects_are_hidden() {
        let mut s = surface();
        s.add_occluder(Rect::new(0.0, 0.0, 50.0, 20.0));
        let mut f = filter(10);
        let out = f.filter(
            &s,
            (0.0, 0.0),
            vec![(IssueId(1), vec![Rect::new(0.0, 0.0, 10.0, 18.0), Rect::new(60.0, 0.0, 10.0, 18.0)])],
        );
        assert_eq!(out, vec![(IssueId(1), vec![Rect::new(60.0, 0.0, 10.0, 18.0)])]);
        let snap = f.metrics.snapshot();
        assert_eq!((snap.occlusion_samples, snap.occlusion_hidden), (2, 1));
    }

    #[test]
    fn scrolled_out_rects_are_hidden() {
        let s = surface();
        let mut f = filter(10);
        let out = f.filter(&s, (0.0, 0.0), vec![(IssueId(1), vec![Rect::new(0.0, -30.0, 10.0, 18.0)])]);
        assert_eq!(out, vec![(IssueId(1), vec![])]);
    }

    #[test]
    fn samples_are_reused_below_min_delta() {
        let mut s = surface();
        let mut f = filter(10);
        let rects = || vec![(IssueId(1), vec![Rect::new(0.0, 0.0, 10.0, 18.0)])];
        f.filter(&s, (0.0, 0.0), rects());
        s.add_occluder(Rect::new(0.0, 0.0, 50.0, 20.0));
        f.note_movement(2.0);
        assert_eq!(f.filter(&s, (0.0, 0.0), rects())[0].1.len(), 1, "stale sample reused");
        f.note_movement(2.5);
        assert!(f.filter(&s, (0.0, 0.0), rects())[0].1.is_empty(), "resampled");
        assert_eq!(f.metrics.snapshot().occlusion_samples, 2);
    }

    #[test]
    fn new_rects_force_sampling() {
        let s = surface();
        let mut f = filter(10);
        f.filter(&s, (0.0, 0.0), vec![(IssueId(1), vec![Rect::new(0.0, 0.0, 10.0, 18.0)])]);
        f.filter(
            &s,
            (0.0, 0.0),
            vec![(IssueId(1), vec![Rect::new(0.0, 0.0, 10.0, 18.0)]), (IssueId(2), vec![Rect::new(20.0, 0.0, 10.0, 18.0)])],
        );
        assert_eq!(f.metrics.snapshot().occlusion_samples, 3);
    }

    #[test]
    fn ceiling_switches_to_clip_only() {
        let mut s = surface();
        s.add_occluder(Rect::new(0.0, 0.0, 100.0, 40.0));
        let mut f = filter(2);
        let out = f.filter(
            &s,
            (0.0, 0.0),
            vec![(IssueId(1), vec![Rect::new(0.0, 0.0, 10.0, 18.0), Rect::new(95.0, 0.0, 10.0, 18.0)])],
        );
        // The occluder is ignored; only bounds clipping applies.
        assert_eq!(out, vec![(IssueId(1), vec![Rect::new(0.0, 0.0, 10.0, 18.0)])]);
        let snap = f.metrics.snapshot();
        assert_eq!((snap.clip_only_frames, snap.occlusion_samples), (1, 0));
    }

    #[test]
    fn shift_applies_before_hit_testing() {
        let s = PlainTextSurface::multi_line("abc", Rect::new(100.0, 100.0, 100.0, 40.0));
        let mut f = filter(10);
        let out = f.filter(&s, (100.0, 100.0), vec![(IssueId(1), vec![Rect::new(0.0, 0.0, 10.0, 18.0)])]);
        assert_eq!(out[0].1.len(), 1);
    }
}
