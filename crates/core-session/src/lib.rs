//! Session layer: ties text, issues and layout together for one surface.
//!
//! - `engine`: `HighlightEngine`, the synchronous owner of all state.
//! - `request`: tickets, analyzer events and completion outcomes.
//! - `analyzer`: the `Analyzer` trait plus canned implementations.
//! - `driver`: tokio task per request with per-stream abort.
//!
//! Typical loop: submit `engine.request_document()` to the driver, feed each
//! received `AnalysisEvent` to `engine.handle_event`, and call
//! `engine.on_frame(surface)` whenever the host fires a requested frame.

pub mod analyzer;
pub mod driver;
pub mod engine;
pub mod request;

pub use analyzer::{Analyzer, FnAnalyzer, StaticAnalyzer};
pub use driver::AnalysisDriver;
pub use engine::{HighlightEngine, positioned_issues};
pub use request::{AnalysisEvent, AnalysisRequest, Completion, SentenceRequest};
