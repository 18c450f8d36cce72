//! Edit scripts and index mapping.
//!
//! Construction:
//! 1. Tokenize both snapshots (`token::tokenize`) and diff the token slices
//!    with Myers (`similar`).
//! 2. Normalize: merge adjacent ops of the same kind and order each run of
//!    edits as `Delete` then `Insert`.
//! 3. Semantic cleanup: an `Equal` sandwiched between two edit runs is folded
//!    into both sides when it is no longer than the larger edit on each side,
//!    so "runned fast" -> "ran quickly" becomes one substitution instead of two
//!    edits around a lone space. Steps 2-3 repeat until stable.
//!
//! Invariants:
//! - Concatenating `Equal`+`Delete` texts yields `before`; `Equal`+`Insert`
//!   texts yields `after`.
//! - No two adjacent ops share a kind; an `Insert` directly following a
//!   `Delete` is that delete's substitution partner.
//! - No op has empty text.
//!
//! Mapping (`map_index`): walks the ops accumulating before/after lengths.
//! Inside an `Equal` the index is interpolated. Inside a `Delete` it is
//! interpolated into the partner `Insert`, clamped to the insert length and
//! floored to a char boundary; a pure deletion snaps to its start. At the
//! boundary of a pure `Insert`, `Bias::Before` snaps to the insert start and
//! `Bias::After` steps over it. Past the end, the after length is returned.

use crate::token::tokenize;
use core_text::Span;
use core_text::grapheme::floor_char_boundary;
use similar::{Algorithm, DiffTag, TextDiff};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Equal,
    Delete,
    Insert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOp {
    pub kind: EditKind,
    pub text: String,
}

impl EditOp {
    fn new(kind: EditKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Which side of an insertion point an index maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Snap to the start of an insertion (span ends).
    Before,
    /// Step over an insertion (span starts).
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditScript {
    before: String,
    after: String,
    ops: Vec<EditOp>,
}

/// Run of edits between two equal stretches.
#[derive(Debug, Default)]
struct Change {
    del: String,
    ins: String,
}

enum Piece {
    Equal(String),
    Change(Change),
}

impl EditScript {
    pub fn compute(before: &str, after: &str) -> Self {
        let old = tokenize(before);
        let new = tokenize(after);
        let diff = TextDiff::configure()
            .algorithm(Algorithm::Myers)
            .diff_slices(&old, &new);

        let mut raw = Vec::new();
        for op in diff.ops() {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            let old_text: String = old[old_range].concat();
            let new_text: String = new[new_range].concat();
            match tag {
                DiffTag::Equal => raw.push(EditOp::new(EditKind::Equal, old_text)),
                DiffTag::Delete => raw.push(EditOp::new(EditKind::Delete, old_text)),
                DiffTag::Insert => raw.push(EditOp::new(EditKind::Insert, new_text)),
                DiffTag::Replace => {
                    raw.push(EditOp::new(EditKind::Delete, old_text));
                    raw.push(EditOp::new(EditKind::Insert, new_text));
                }
            }
        }
        let ops = cleanup(raw);
        tracing::trace!(
            target: "diff.script",
            before_len = before.len(),
            after_len = after.len(),
            ops = ops.len(),
            "compute"
        );
        Self {
            before: before.to_string(),
            after: after.to_string(),
            ops,
        }
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn before(&self) -> &str {
        &self.before
    }

    pub fn after(&self) -> &str {
        &self.after
    }

    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| op.kind == EditKind::Equal)
    }

    /// Script mapping `after` back to `before`.
    pub fn invert(&self) -> EditScript {
        let pieces = to_pieces(self.ops.iter().map(|op| {
            let kind = match op.kind {
                EditKind::Equal => EditKind::Equal,
                EditKind::Delete => EditKind::Insert,
                EditKind::Insert => EditKind::Delete,
            };
            EditOp::new(kind, op.text.clone())
        }));
        EditScript {
            before: self.after.clone(),
            after: self.before.clone(),
            ops: from_pieces(pieces),
        }
    }

    /// Map a byte index of `before` into `after`.
    pub fn map_index(&self, index: usize, bias: Bias) -> usize {
        let (mut b, mut a) = (0usize, 0usize);
        let mut k = 0;
        while k < self.ops.len() {
            let op = &self.ops[k];
            let len = op.text.len();
            match op.kind {
                EditKind::Equal => {
                    if index < b + len {
                        return a + (index - b);
                    }
                    b += len;
                    a += len;
                }
                EditKind::Insert => {
                    if index == b && bias == Bias::Before {
                        return a;
                    }
                    a += len;
                }
                EditKind::Delete => {
                    let partner = self
                        .ops
                        .get(k + 1)
                        .filter(|next| next.kind == EditKind::Insert)
                        .map(|next| next.text.as_str())
                        .unwrap_or("");
                    if index < b + len {
                        let offset = (index - b).min(partner.len());
                        return a + floor_char_boundary(partner, offset);
                    }
                    if index == b + len && bias == Bias::Before {
                        return a + partner.len();
                    }
                    b += len;
                    a += partner.len();
                    if !partner.is_empty() {
                        k += 1;
                    }
                }
            }
            k += 1;
        }
        a
    }

    /// Map a `before` span into `after`. Starts bias after insertions, ends
    /// before them; the result is never inverted.
    pub fn map_span(&self, span: Span) -> Span {
        let start = self.map_index(span.start, Bias::After);
        let end = self.map_index(span.end, Bias::Before).max(start);
        Span::new(start, end)
    }
}

fn to_pieces(ops: impl IntoIterator<Item = EditOp>) -> Vec<Piece> {
    let mut pieces: Vec<Piece> = Vec::new();
    for op in ops {
        if op.text.is_empty() {
            continue;
        }
        match (op.kind, pieces.last_mut()) {
            (EditKind::Equal, Some(Piece::Equal(text))) => text.push_str(&op.text),
            (EditKind::Equal, _) => pieces.push(Piece::Equal(op.text)),
            (kind, Some(Piece::Change(change))) => match kind {
                EditKind::Delete => change.del.push_str(&op.text),
                _ => change.ins.push_str(&op.text),
            },
            (kind, _) => {
                let mut change = Change::default();
                match kind {
                    EditKind::Delete => change.del = op.text,
                    _ => change.ins = op.text,
                }
                pieces.push(Piece::Change(change));
            }
        }
    }
    pieces
}

fn from_pieces(pieces: Vec<Piece>) -> Vec<EditOp> {
    let mut ops = Vec::with_capacity(pieces.len() * 2);
    for piece in pieces {
        match piece {
            Piece::Equal(text) => ops.push(EditOp::new(EditKind::Equal, text)),
            Piece::Change(change) => {
                if !change.del.is_empty() {
                    ops.push(EditOp::new(EditKind::Delete, change.del));
                }
                if !change.ins.is_empty() {
                    ops.push(EditOp::new(EditKind::Insert, change.ins));
                }
            }
        }
    }
    ops
}

fn edit_weight(change: &Change) -> usize {
    change.del.chars().count().max(change.ins.chars().count())
}

fn cleanup(raw: Vec<EditOp>) -> Vec<EditOp> {
    let mut pieces = to_pieces(raw);
    loop {
        let mut merged = false;
        let mut k = 1;
        while k + 1 < pieces.len() {
            let replacement = match (&pieces[k - 1], &pieces[k], &pieces[k + 1]) {
                (Piece::Change(left), Piece::Equal(eq), Piece::Change(right)) => {
                    let len = eq.chars().count();
                    (len <= edit_weight(left) && len <= edit_weight(right)).then(|| Change {
                        del: format!("{}{}{}", left.del, eq, right.del),
                        ins: format!("{}{}{}", left.ins, eq, right.ins),
                    })
                }
                _ => None,
            };
            let Some(change) = replacement else {
                k += 1;
                continue;
            };
            pieces.splice(k - 1..=k + 1, [Piece::Change(change)]);
            merged = true;
        }
        if !merged {
            break;
        }
    }
    from_pieces(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(script: &EditScript) -> Vec<(EditKind, &str)> {
        script
            .ops()
            .iter()
            .map(|op| (op.kind, op.text.as_str()))
            .collect()
    }

    #[test]
    fn single_word_substitution() {
        let script = EditScript::compute("I seen it.", "I saw it.");
        assert_eq!(
            kinds(&script),
            vec![
                (EditKind::Equal, "I "),
                (EditKind::Delete, "seen"),
                (EditKind::Insert, "saw"),
                (EditKind::Equal, " it."),
            ]
        );
    }

    #[test]
    fn short_equal_between_edits_is_absorbed() {
        let script = EditScript::compute("he runned fastly home", "he ran quickly home");
        assert_eq!(
            kinds(&script),
            vec![
                (EditKind::Equal, "he "),
                (EditKind::Delete, "runned fastly"),
                (EditKind::Insert, "ran quickly"),
                (EditKind::Equal, " home"),
            ]
        );
    }

    #[test]
    fn identical_texts_are_identity() {
        let script = EditScript::compute("same text", "same text");
        assert!(script.is_identity());
        assert_eq!(script.map_index(4, Bias::After), 4);
    }

    #[test]
    fn map_index_through_substitution() {
        let script = EditScript::compute("I seen it.", "I saw it.");
        assert_eq!(script.map_index(2, Bias::After), 2);
        assert_eq!(script.map_index(6, Bias::Before), 5);
        assert_eq!(script.map_index(6, Bias::After), 5);
        // Inside the deleted word, clamped to the inserted length.
        assert_eq!(script.map_index(5, Bias::After), 5);
        assert_eq!(script.map_index(3, Bias::After), 3);
        assert_eq!(script.map_index(8, Bias::After), 7);
        assert_eq!(script.map_index(100, Bias::After), 9);
    }

    #[test]
    fn insertion_bias() {
        let script = EditScript::compute("a c", "a b c");
        // "a " equal, "b " inserted, "c" equal.
        assert_eq!(script.map_index(2, Bias::Before), 2);
        assert_eq!(script.map_index(2, Bias::After), 4);
        assert_eq!(script.map_span(Span::new(2, 3)), Span::new(4, 5));
    }

    #[test]
    fn pure_deletion_snaps_to_start() {
        let script = EditScript::compute("a very big dog", "a dog");
        assert_eq!(script.map_index(5, Bias::After), 2);
        assert_eq!(script.map_span(Span::new(2, 6)), Span::new(2, 2));
    }

    #[test]
    fn inverted_script_maps_back() {
        let script = EditScript::compute("I seen it.", "I saw it.");
        let back = script.invert();
        assert_eq!(back.before(), "I saw it.");
        assert_eq!(back.after(), "I seen it.");
        assert_eq!(back.map_span(Span::new(2, 5)), Span::new(2, 6));
    }

    #[test]
    fn multibyte_interpolation_floors_to_boundary() {
        let script = EditScript::compute("x abcd y", "x éé y");
        // Index 3 sits one byte into "abcd"; "é" is two bytes, so floor to 2.
        assert_eq!(script.map_index(3, Bias::After), 2);
        assert_eq!(script.map_index(4, Bias::After), 4);
    }
}
