//! Layout/scroll synchronizer.
//!
//! Producers report layout-affecting events (`notify`) as `LayoutTrigger`
//! flags. Triggers accumulate until the next frame callback (`on_frame`),
//! which performs at most one recompute: read the surface box and scroll
//! offset and bump the layout version.
//!
//! Contract:
//! - At most one recompute per `throttle` interval. A frame that arrives
//!   inside the window re-arms itself with `request_after(remaining)`.
//! - At most one outstanding frame request; further `notify` calls while a
//!   request is pending only widen the trigger set.
//! - Every recompute bumps `version` by exactly one. Consumers compare only
//!   versions, never boxes or scroll offsets.
//! - `poll(signature)` is the periodic fallback: a changed style signature
//!   raises `POLL`. The first observed signature only primes the comparison.

use crate::frame::FrameScheduler;
use crate::geometry::{Rect, ScrollOffset};
use crate::metrics::LayoutMetrics;
use crate::surface::TextSurface;
use bitflags::bitflags;
use std::sync::Arc;
use std::time::{Duration, Instant};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayoutTrigger: u8 {
        /// The surface itself was resized.
        const RESIZE = 1 << 0;
        /// Attribute or style change on the surface or an ancestor.
        const ATTRIBUTES = 1 << 1;
        /// Subtree mutation anywhere in the document.
        const SUBTREE = 1 << 2;
        /// Viewport resize.
        const VIEWPORT = 1 << 3;
        /// Font load completion.
        const FONTS = 1 << 4;
        /// Surface or page scroll.
        const SCROLL = 1 << 5;
        /// Periodic style-signature poll detected a change.
        const POLL = 1 << 6;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncUpdate {
    pub version: u64,
    pub triggers: LayoutTrigger,
    pub bounding_box: Rect,
    pub scroll: ScrollOffset,
    /// Largest pixel movement of the box or scroll offset since the
    /// previous recompute.
    pub moved_px: f64,
}

pub struct LayoutSynchronizer {
    scheduler: Arc<dyn FrameScheduler>,
    metrics: Arc<LayoutMetrics>,
    throttle: Duration,
    poll_interval: Duration,
    pending: LayoutTrigger,
    frame_requested: bool,
    last_recompute: Option<Instant>,
    last_signature: Option<u64>,
    version: u64,
    bounding_box: Rect,
    scroll: ScrollOffset,
}

impl LayoutSynchronizer {
    pub fn new(
        scheduler: Arc<dyn FrameScheduler>,
        metrics: Arc<LayoutMetrics>,
        throttle: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            scheduler,
            metrics,
            throttle,
            poll_interval,
            pending: LayoutTrigger::empty(),
            frame_requested: false,
            last_recompute: None,
            last_signature: None,
            version: 0,
            bounding_box: Rect::default(),
            scroll: ScrollOffset::default(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }

    pub fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    pub fn pending(&self) -> LayoutTrigger {
        self.pending
    }

    pub fn metrics(&self) -> &Arc<LayoutMetrics> {
        &self.metrics
    }

    pub fn notify(&mut self, triggers: LayoutTrigger) {
        if triggers.is_empty() {
            return;
        }
        tracing::trace!(target: "layout.sync", ?triggers, "notify");
        self.metrics.incr_triggers(triggers);
        self.pending |= triggers;
        self.schedule();
    }

    /// Compare a cheap layout-affecting style signature with the previous
    /// poll. Returns true when it changed (and `POLL` was raised).
    pub fn poll(&mut self, signature: u64) -> bool {
        let changed = self.last_signature.is_some_and(|prev| prev != signature);
        self.last_signature = Some(signature);
        if changed {
            self.notify(LayoutTrigger::POLL);
        }
        changed
    }

    /// Re-arm the periodic poll.
    pub fn schedule_poll(&self) {
        self.scheduler.request_after(self.poll_interval);
    }

    fn schedule(&mut self) {
        if self.frame_requested {
            return;
        }
        self.frame_requested = true;
        match self.throttle_remaining(self.scheduler.now()) {
            Some(remaining) => self.scheduler.request_after(remaining),
            None => self.scheduler.request_frame(),
        }
    }

    fn throttle_remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.last_recompute?;
        let ready = last + self.throttle;
        (now < ready).then(|| ready - now)
    }

    /// Frame callback. Recomputes when triggers are pending and the throttle
    /// window has passed.
    pub fn on_frame(&mut self, surface: &dyn TextSurface) -> Option<SyncUpdate> {
        self.frame_requested = false;
        if self.pending.is_empty() {
            return None;
        }
        let now = self.scheduler.now();
        if self.throttle_remaining(now).is_some() {
            self.metrics.incr_throttled();
            self.schedule();
            return None;
        }
        let bounding_box = surface.bounding_box();
        let scroll = surface.scroll_offset();
        let moved_px = self
            .bounding_box
            .distance(&bounding_box)
            .max(self.scroll.distance(&scroll));
        let triggers = std::mem::take(&mut self.pending);
        self.version += 1;
        self.bounding_box = bounding_box;
        self.scroll = scroll;
        self.last_recompute = Some(now);
        self.metrics.incr_recompute();
        tracing::debug!(
            target: "layout.sync",
            version = self.version,
            ?triggers,
            moved_px,
            "recompute"
        );
        Some(SyncUpdate {
            version: self.version,
            triggers,
            bounding_box,
            scroll,
            moved_px,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ManualFrameScheduler;
    use crate::plain::PlainTextSurface;

    fn sync(throttle_ms: u64) -> (ManualFrameScheduler, LayoutSynchronizer) {
        let clock = ManualFrameScheduler::new();
        let sync = LayoutSynchronizer::new(
            Arc::new(clock.clone()),
            Arc::new(LayoutMetrics::default()),
            Duration::from_millis(throttle_ms),
            Duration::from_millis(500),
        );
        (clock, sync)
    }

    #[test]
    fn triggers_coalesce_into_one_recompute() {
        let (clock, mut sync) = sync(50);
        let surface = PlainTextSurface::single_line("abc", Rect::new(0.0, 0.0, 100.0, 20.0));
        sync.notify(LayoutTrigger::RESIZE);
        sync.notify(LayoutTrigger::FONTS | LayoutTrigger::SCROLL);
        assert_eq!(clock.frames_requested(), 1);
        let update = sync.on_frame(&surface).unwrap();
        assert_eq!(update.version, 1);
        assert!(update.triggers.contains(LayoutTrigger::RESIZE | LayoutTrigger::FONTS));
        assert!(sync.on_frame(&surface).is_none(), "nothing pending");
        assert_eq!(sync.metrics().snapshot().recomputes, 1);
    }

    #[test]
    fn throttle_defers_second_recompute() {
        let (clock, mut sync) = sync(50);
        let surface = PlainTextSurface::single_line("abc", Rect::new(0.0, 0.0, 100.0, 20.0));
        sync.notify(LayoutTrigger::RESIZE);
        sync.on_frame(&surface).unwrap();

        clock.advance(Duration::from_millis(10));
        sync.notify(LayoutTrigger::SUBTREE);
        assert_eq!(clock.take_delays(), vec![Duration::from_millis(40)]);
        clock.advance(Duration::from_millis(40));
        let update = sync.on_frame(&surface).unwrap();
        assert_eq!(update.version, 2);
    }

    #[test]
    fn early_frame_rearms() {
        let (clock, mut sync) = sync(50);
        let surface = PlainTextSurface::single_line("abc", Rect::new(0.0, 0.0, 100.0, 20.0));
        sync.notify(LayoutTrigger::RESIZE);
        sync.on_frame(&surface).unwrap();
        sync.notify(LayoutTrigger::VIEWPORT);
        clock.take_delays();
        clock.advance(Duration::from_millis(20));
        assert!(sync.on_frame(&surface).is_none());
        assert_eq!(clock.take_delays(), vec![Duration::from_millis(30)]);
        assert_eq!(sync.metrics().snapshot().throttled, 1);
        assert_eq!(sync.version(), 1);
    }

    #[test]
    fn poll_raises_only_on_change() {
        let (_clock, mut sync) = sync(0);
        assert!(!sync.poll(7), "first signature primes");
        assert!(!sync.poll(7));
        assert!(sync.poll(8));
        assert_eq!(sync.pending(), LayoutTrigger::POLL);
    }

    #[test]
    fn moved_px_tracks_box_and_scroll() {
        let (clock, mut sync) = sync(0);
        let mut surface = PlainTextSurface::multi_line("abc", Rect::new(0.0, 0.0, 100.0, 40.0));
        sync.notify(LayoutTrigger::RESIZE);
        sync.on_frame(&surface).unwrap();
        surface.set_scroll(ScrollOffset::new(0.0, 12.0));
        clock.advance(Duration::from_millis(1));
        sync.notify(LayoutTrigger::SCROLL);
        let update = sync.on_frame(&surface).unwrap();
        assert_eq!(update.moved_px, 12.0);
    }
}
