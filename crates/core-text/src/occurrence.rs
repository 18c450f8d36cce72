//! Occurrence index: non-overlapping substring search.
//!
//! Stepping advances by the needle length after each match, so `"aaa"`
//! searched for `"aa"` yields only `[0]`. This keeps "the Nth occurrence" a
//! unique span, which the position resolver relies on.

/// All non-overlapping occurrences of `needle` in `text`, as ascending byte
/// offsets. An empty needle yields no matches.
pub fn find_all_occurrences(text: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() || needle.len() > text.len() {
        return Vec::new();
    }
    // `match_indices` is already non-overlapping and resumes after each match.
    text.match_indices(needle).map(|(idx, _)| idx).collect()
}
