//! Screen-side half of the highlight pipeline.
//!
//! Turns resolved byte spans into rectangles on a text surface and keeps
//! them in sync with layout changes:
//! - `surface`: the `TextSurface` capability trait; `plain` and `rich` are
//!   the provided implementations, `mirror` is the off-screen layout behind
//!   both.
//! - `sync`: coalesced, throttled layout recomputes with a version counter.
//! - `frame`: injected clock and frame-request primitives.
//! - `measure`: caret widening, coordinate spaces, budgeted measure passes.
//! - `occlusion`: hit-test sampling and the clip-only fallback.
//! - `cache`: rectangles keyed by layout version, text and issue set.
//! - `overlay`: the `HighlightFrame` handed to renderers.
//!
//! Consumers compare layout versions only. A version change means every
//! cached rectangle is stale.

pub mod cache;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod measure;
pub mod metrics;
pub mod mirror;
pub mod occlusion;
pub mod overlay;
pub mod plain;
pub mod rich;
pub mod surface;
pub mod sync;

pub use cache::{RectCache, RectKey, issue_set_signature};
pub use error::MeasureError;
pub use frame::{FrameScheduler, ManualFrameScheduler};
pub use geometry::{CoordinateSpace, Point, Rect, ScrollOffset};
pub use measure::{MeasurePass, PassProgress, RectMeasurer, to_space, widen_caret};
pub use metrics::{LayoutMetrics, LayoutMetricsSnapshot};
pub use mirror::{CellMetrics, MirrorLayout, MirrorStyle, Padding, WrapMode};
pub use occlusion::OcclusionFilter;
pub use overlay::{Highlight, HighlightFrame};
pub use plain::PlainTextSurface;
pub use rich::RichTextSurface;
pub use surface::{HitTarget, TextSurface};
pub use sync::{LayoutSynchronizer, LayoutTrigger, SyncUpdate};
