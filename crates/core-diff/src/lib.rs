//! Diff engine: token-level edit scripts between two text snapshots.
//!
//! Components:
//! - `token`: splits text into maximal whitespace / non-whitespace runs.
//! - `script`: Myers token diff plus semantic cleanup into an `EditScript`,
//!   and index mapping (`map_index` with a `Bias`) through that script.
//! - `assign`: offset assignment for issues that arrive without offsets.
//! - `rebase`: carries issue offsets across a live edit.
//! - `synth`: derives issues from a before/after pair when the analyzer only
//!   returned a corrected text.
//!
//! Offsets are byte offsets on `char` boundaries of the respective snapshot.

pub mod assign;
pub mod rebase;
pub mod script;
pub mod synth;
pub mod token;

pub use assign::{assign_offsets, with_assigned_offsets};
pub use rebase::{RebaseReport, rebase_issues};
pub use script::{Bias, EditKind, EditOp, EditScript};
pub use synth::synthesize_issues;
pub use token::tokenize;
