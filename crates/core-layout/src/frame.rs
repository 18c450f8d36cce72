//! Frame scheduling abstraction.
//!
//! Layout recomputation and chunked measurement never touch real timers;
//! they go through a `FrameScheduler` offering a clock plus two primitives:
//! "run on the next paint opportunity" and "run after N ms". The host (or a
//! test) owns the actual loop and calls back into the synchronizer / measure
//! pass when a requested frame fires.
//!
//! `ManualFrameScheduler` is the deterministic implementation: an explicit
//! clock that only moves when told to (or by a fixed step per `now()` read,
//! which lets tests exhaust a frame budget without sleeping) and a log of
//! requests.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub trait FrameScheduler: Send + Sync {
    fn now(&self) -> Instant;
    /// Ask for a callback on the next paint opportunity.
    fn request_frame(&self);
    /// Ask for a callback once `delay` has elapsed.
    fn request_after(&self, delay: Duration);
}

#[derive(Debug)]
struct ManualState {
    now: Instant,
    step: Duration,
    frames_requested: u64,
    delays: Vec<Duration>,
}

/// Deterministic scheduler. Clones share one clock and one request log.
#[derive(Debug, Clone)]
pub struct ManualFrameScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl Default for ManualFrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                now,
                step: Duration::ZERO,
                frames_requested: 0,
                delays: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        // A poisoned clock is still a valid clock.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn advance(&self, by: Duration) {
        let mut s = self.lock();
        s.now += by;
    }

    /// Advance the clock by `step` on every `now()` read.
    pub fn set_step(&self, step: Duration) {
        self.lock().step = step;
    }

    pub fn frames_requested(&self) -> u64 {
        self.lock().frames_requested
    }

    /// Delays requested so far, drained.
    pub fn take_delays(&self) -> Vec<Duration> {
        std::mem::take(&mut self.lock().delays)
    }

    /// Clear the frame request counter; returns its previous value.
    pub fn take_frames(&self) -> u64 {
        std::mem::take(&mut self.lock().frames_requested)
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn now(&self) -> Instant {
        let mut s = self.lock();
        let now = s.now;
        let step = s.step;
        s.now += step;
        now
    }

    fn request_frame(&self) {
        self.lock().frames_requested += 1;
    }

    fn request_after(&self, delay: Duration) {
        self.lock().delays.push(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_moves_only_when_told() {
        let s = ManualFrameScheduler::new();
        let t0 = s.now();
        assert_eq!(s.now(), t0);
        s.advance(Duration::from_millis(5));
        assert_eq!(s.now() - t0, Duration::from_millis(5));
    }

    #[test]
    fn step_advances_per_read() {
        let s = ManualFrameScheduler::new();
        s.set_step(Duration::from_millis(2));
        let t0 = s.now();
        let t1 = s.now();
        assert_eq!(t1 - t0, Duration::from_millis(2));
    }

    #[test]
    fn clones_share_the_request_log() {
        let s = ManualFrameScheduler::new();
        let shared: Arc<dyn FrameScheduler> = Arc::new(s.clone());
        shared.request_frame();
        shared.request_after(Duration::from_millis(7));
        assert_eq!(s.frames_requested(), 1);
        assert_eq!(s.take_delays(), vec![Duration::from_millis(7)]);
        assert!(s.take_delays().is_empty());
    }
}
