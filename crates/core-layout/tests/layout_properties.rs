//! Mirror layout properties and an end-to-end frame on a plain surface.

use core_issues::IssueId;
use core_layout::{
    CellMetrics, CoordinateSpace, LayoutMetrics, LayoutSynchronizer, LayoutTrigger,
    ManualFrameScheduler, MeasurePass, MirrorLayout, MirrorStyle, OcclusionFilter, Padding,
    PassProgress, PlainTextSurface, Rect, RectCache, RectKey, RectMeasurer, ScrollOffset,
    TextSurface, WrapMode, issue_set_signature,
};
use core_text::Span;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn style(wrap: WrapMode) -> MirrorStyle {
    MirrorStyle {
        metrics: CellMetrics {
            cell_width: 10.0,
            line_height: 20.0,
        },
        padding: Padding::default(),
        wrap,
    }
}

proptest! {
    // Every non-break cluster in the span is covered by exactly one cell.
    #[test]
    fn rect_widths_cover_span_cells(
        text in "[ab \n]{0,40}",
        a in 0usize..40,
        b in 0usize..40,
        width in 30.0f64..200.0,
        wrap in prop_oneof![Just(WrapMode::Word), Just(WrapMode::NoWrap)],
    ) {
        let (a, b) = (a.min(text.len()), b.min(text.len()));
        let span = Span::new(a.min(b), a.max(b));
        let layout = MirrorLayout::new(&text, width, style(wrap));
        let rects = layout.measure(span, ScrollOffset::default());
        let covered: f64 = rects.iter().map(|r| r.width).sum();
        let cells = text[span.start..span.end].chars().filter(|c| *c != '\n').count();
        prop_assert_eq!(covered, cells as f64 * 10.0);
        for pair in rects.windows(2) {
            prop_assert!(pair[0].top < pair[1].top);
        }
    }

    #[test]
    fn rects_stay_inside_content_height(text in "[ab \n]{0,40}", width in 30.0f64..200.0) {
        let layout = MirrorLayout::new(&text, width, style(WrapMode::Word));
        for r in layout.measure(Span::new(0, text.len()), ScrollOffset::default()) {
            prop_assert!(r.bottom() <= layout.content_height());
        }
    }
}

#[test]
fn frame_flow_on_plain_surface() {
    let clock = ManualFrameScheduler::new();
    let metrics = Arc::new(LayoutMetrics::default());
    let mut sync = LayoutSynchronizer::new(
        Arc::new(clock.clone()),
        metrics.clone(),
        Duration::from_millis(50),
        Duration::from_millis(500),
    );
    let mut surface = PlainTextSurface::multi_line(
        "I seen it. Then I seen more.",
        Rect::new(10.0, 10.0, 120.0, 60.0),
    );
    let measurer = RectMeasurer::new(metrics.clone(), CoordinateSpace::Viewport);
    let mut occlusion = OcclusionFilter::new(200, 4.0, metrics.clone());
    let mut cache = RectCache::new();
    let ids = [IssueId(1), IssueId(2)];
    let spans = [Span::new(2, 6), Span::new(18, 22)];

    sync.notify(LayoutTrigger::RESIZE);
    let update = sync.on_frame(&surface).unwrap();
    let key = RectKey {
        layout_version: update.version,
        text_signature: core_issues::text_signature(surface.text()),
        issue_signature: issue_set_signature(&ids),
    };
    assert!(!cache.validate(key));

    let mut pass = MeasurePass::new(update.version, ids.into_iter().zip(spans), Duration::from_millis(8));
    assert_eq!(pass.step(&surface, &measurer, &clock), PassProgress::Done);
    let shift = measurer.viewport_shift(&surface);
    let visible = occlusion.filter(&surface, shift, pass.into_results());
    assert!(visible.iter().all(|(_, rects)| !rects.is_empty()));
    for (id, rects) in visible {
        cache.insert_issue(id, rects);
    }
    assert!(cache.validate(key));

    // Scrolling the field by one line hides the first line only.
    surface.set_scroll(ScrollOffset::new(0.0, 20.0));
    clock.advance(Duration::from_millis(60));
    sync.notify(LayoutTrigger::SCROLL);
    let update = sync.on_frame(&surface).unwrap();
    assert_eq!(update.version, 2);
    assert!(!cache.validate(RectKey {
        layout_version: update.version,
        ..key
    }));
    occlusion.note_movement(update.moved_px);
    let results: Vec<_> = ids
        .into_iter()
        .zip(spans)
        .map(|(id, span)| (id, measurer.measure(&surface, span)))
        .collect();
    let visible = occlusion.filter(&surface, measurer.viewport_shift(&surface), results);
    assert!(visible[0].1.is_empty(), "first line scrolled out");
    assert_eq!(visible[1].1.len(), 1);
    assert_eq!(metrics.snapshot().recomputes, 2);
}
