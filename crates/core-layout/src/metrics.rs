//! Layout-path counters.
//!
//! Relaxed atomics, read through `snapshot()`. Counters are cumulative for
//! the lifetime of the owning synchronizer / measurer; nothing resets them
//! implicitly.

use crate::sync::LayoutTrigger;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

#[derive(Debug, Default)]
pub struct LayoutMetrics {
    resize: AtomicU64,
    attributes: AtomicU64,
    subtree: AtomicU64,
    viewport: AtomicU64,
    fonts: AtomicU64,
    scroll: AtomicU64,
    poll: AtomicU64,
    /// Recomputes executed (each bumps the layout version).
    recomputes: AtomicU64,
    /// Frames that found pending triggers but were inside the throttle window.
    throttled: AtomicU64,
    /// Ranges measured and ranges that failed to measure.
    measured: AtomicU64,
    measure_failures: AtomicU64,
    /// Measure passes that ran out of frame budget.
    budget_yields: AtomicU64,
    /// Occlusion filtering.
    occlusion_samples: AtomicU64,
    occlusion_hidden: AtomicU64,
    clip_only_frames: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutMetricsSnapshot {
    pub resize: u64,
    pub attributes: u64,
    pub subtree: u64,
    pub viewport: u64,
    pub fonts: u64,
    pub scroll: u64,
    pub poll: u64,
    pub recomputes: u64,
    pub throttled: u64,
    pub measured: u64,
    pub measure_failures: u64,
    pub budget_yields: u64,
    pub occlusion_samples: u64,
    pub occlusion_hidden: u64,
    pub clip_only_frames: u64,
}

impl LayoutMetrics {
    pub fn snapshot(&self) -> LayoutMetricsSnapshot {
        LayoutMetricsSnapshot {
            resize: self.resize.load(Relaxed),
            attributes: self.attributes.load(Relaxed),
            subtree: self.subtree.load(Relaxed),
            viewport: self.viewport.load(Relaxed),
            fonts: self.fonts.load(Relaxed),
            scroll: self.scroll.load(Relaxed),
            poll: self.poll.load(Relaxed),
            recomputes: self.recomputes.load(Relaxed),
            throttled: self.throttled.load(Relaxed),
            measured: self.measured.load(Relaxed),
            measure_failures: self.measure_failures.load(Relaxed),
            budget_yields: self.budget_yields.load(Relaxed),
            occlusion_samples: self.occlusion_samples.load(Relaxed),
            occlusion_hidden: self.occlusion_hidden.load(Relaxed),
            clip_only_frames: self.clip_only_frames.load(Relaxed),
        }
    }

    pub(crate) fn incr_triggers(&self, triggers: LayoutTrigger) {
        let counters = [
            (LayoutTrigger::RESIZE, &self.resize),
            (LayoutTrigger::ATTRIBUTES, &self.attributes),
            (LayoutTrigger::SUBTREE, &self.subtree),
            (LayoutTrigger::VIEWPORT, &self.viewport),
            (LayoutTrigger::FONTS, &self.fonts),
            (LayoutTrigger::SCROLL, &self.scroll),
            (LayoutTrigger::POLL, &self.poll),
        ];
        for (flag, counter) in counters {
            if triggers.contains(flag) {
                counter.fetch_add(1, Relaxed);
            }
        }
    }

    pub(crate) fn incr_recompute(&self) {
        self.recomputes.fetch_add(1, Relaxed);
    }

    pub(crate) fn incr_throttled(&self) {
        self.throttled.fetch_add(1, Relaxed);
    }

    pub(crate) fn add_measured(&self, ok: u64, failed: u64) {
        self.measured.fetch_add(ok, Relaxed);
        self.measure_failures.fetch_add(failed, Relaxed);
    }

    pub(crate) fn incr_budget_yield(&self) {
        self.budget_yields.fetch_add(1, Relaxed);
    }

    pub(crate) fn add_occlusion(&self, sampled: u64, hidden: u64) {
        self.occlusion_samples.fetch_add(sampled, Relaxed);
        self.occlusion_hidden.fetch_add(hidden, Relaxed);
    }

    pub(crate) fn incr_clip_only(&self) {
        self.clip_only_frames.fetch_add(1, Relaxed);
    }
}
