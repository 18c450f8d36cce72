//! Range measurement and chunked measure passes.
//!
//! `RectMeasurer` wraps a surface's `measure_range` with three rules:
//! - a zero-length range is widened to the following grapheme cluster, or
//!   the preceding one at the end of the text or of a line, so carets stay
//!   visible;
//! - element-space rectangles are converted into the configured
//!   `CoordinateSpace`;
//! - a measurement error yields an empty list for this frame (logged and
//!   counted, never propagated).
//!
//! `MeasurePass` spreads a queue of ranges over several frames. Each `step`
//! measures until the frame budget is spent, always making progress by at
//! least one range, then requests another frame if work remains.

use crate::frame::FrameScheduler;
use crate::geometry::{CoordinateSpace, Rect, ScrollOffset};
use crate::metrics::LayoutMetrics;
use crate::surface::TextSurface;
use core_issues::IssueId;
use core_text::Span;
use core_text::grapheme::{next_boundary, prev_boundary};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Widen a caret to one grapheme cluster. Empty text stays empty.
pub fn widen_caret(text: &str, span: Span) -> Span {
    if !span.is_empty() || text.is_empty() {
        return span;
    }
    let at = span.start.min(text.len());
    let next = (at < text.len()).then(|| next_boundary(text, at));
    match next {
        Some(end) if at == 0 || !matches!(&text[at..end], "\n" | "\r" | "\r\n") => {
            Span::new(at, end)
        }
        // A line break has no box; take the cluster ending the line instead.
        _ => Span::new(prev_boundary(text, at), at),
    }
}

/// Convert element-space rectangles into `space`.
pub fn to_space(
    rects: Vec<Rect>,
    space: CoordinateSpace,
    bounding_box: Rect,
    page_scroll: ScrollOffset,
) -> Vec<Rect> {
    let (dx, dy) = match space {
        CoordinateSpace::Element => return rects,
        CoordinateSpace::Viewport => (bounding_box.left, bounding_box.top),
        CoordinateSpace::Page => (
            bounding_box.left + page_scroll.x,
            bounding_box.top + page_scroll.y,
        ),
    };
    rects.into_iter().map(|r| r.translated(dx, dy)).collect()
}

#[derive(Debug, Clone)]
pub struct RectMeasurer {
    metrics: Arc<LayoutMetrics>,
    space: CoordinateSpace,
    page_scroll: ScrollOffset,
}

impl RectMeasurer {
    pub fn new(metrics: Arc<LayoutMetrics>, space: CoordinateSpace) -> Self {
        Self {
            metrics,
            space,
            page_scroll: ScrollOffset::default(),
        }
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    /// Document scroll, used only for `CoordinateSpace::Page`.
    pub fn set_page_scroll(&mut self, scroll: ScrollOffset) {
        self.page_scroll = scroll;
    }

    /// Offset that brings rectangles from this measurer's space into viewport
    /// space (where hit testing happens).
    pub fn viewport_shift(&self, surface: &dyn TextSurface) -> (f64, f64) {
        match self.space {
            CoordinateSpace::Element => {
                let b = surface.bounding_box();
                (b.left, b.top)
            }
            CoordinateSpace::Viewport => (0.0, 0.0),
            CoordinateSpace::Page => (-self.page_scroll.x, -self.page_scroll.y),
        }
    }

    pub fn measure(&self, surface: &dyn TextSurface, span: Span) -> Vec<Rect> {
        let span = widen_caret(surface.text(), span);
        match surface.measure_range(span) {
            Ok(rects) => {
                self.metrics.add_measured(1, 0);
                to_space(rects, self.space, surface.bounding_box(), self.page_scroll)
            }
            Err(err) => {
                self.metrics.add_measured(0, 1);
                tracing::debug!(
                    target: "layout.measure",
                    start = span.start,
                    end = span.end,
                    error = %err,
                    "measure failed"
                );
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassProgress {
    Done,
    /// Budget exhausted; another frame has been requested.
    Pending,
}

/// Measurement of a batch of ranges, resumable across frames. Results are
/// tagged with the layout version the pass was started for; a caller that
/// sees a newer version discards the pass and starts again.
#[derive(Debug)]
pub struct MeasurePass {
    version: u64,
    budget: Duration,
    queue: VecDeque<(IssueId, Span)>,
    results: Vec<(IssueId, Vec<Rect>)>,
}

impl MeasurePass {
    pub fn new(version: u64, items: impl IntoIterator<Item = (IssueId, Span)>, budget: Duration) -> Self {
        let queue: VecDeque<_> = items.into_iter().collect();
        Self {
            version,
            budget,
            results: Vec::with_capacity(queue.len()),
            queue,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn results(&self) -> &[(IssueId, Vec<Rect>)] {
        &self.results
    }

    pub fn into_results(self) -> Vec<(IssueId, Vec<Rect>)> {
        self.results
    }

    pub fn step(
        &mut self,
        surface: &dyn TextSurface,
        measurer: &RectMeasurer,
        scheduler: &dyn FrameScheduler,
    ) -> PassProgress {
        let deadline = scheduler.now() + self.budget;
        let mut measured = 0usize;
        while let Some((id, span)) = self.queue.pop_front() {
            self.results.push((id, measurer.measure(surface, span)));
            measured += 1;
            if !self.queue.is_empty() && scheduler.now() >= deadline {
                break;
            }
        }
        if self.queue.is_empty() {
            return PassProgress::Done;
        }
        measurer.metrics.incr_budget_yield();
        tracing::debug!(
            target: "layout.measure",
            version = self.version,
            measured,
            remaining = self.queue.len(),
            "frame budget spent"
        );
        scheduler.request_frame();
        PassProgress::Pending
    }
}
