use thiserror::Error;

/// Why a range could not be measured. Callers treat any of these as "no
/// rectangles this frame" and retry on the next layout version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    #[error("range {start}..{end} is outside text of length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("range {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },
    #[error("text block {block} is no longer attached")]
    Detached { block: usize },
}
