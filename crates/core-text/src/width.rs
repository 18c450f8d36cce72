//! Grapheme cluster cell-width engine.
//!
//! `cluster_cells` is the single authority for how many layout cells a
//! grapheme cluster advances in a mirror layout. Plain text surfaces are
//! measured by multiplying cells by the surface's cell width, so every width
//! decision must flow through here or highlight rectangles drift from the
//! rendered glyphs.
//!
//! Precedence:
//! 1. Classifier (semantic kind -> cells).
//! 2. Conservative widen fallback (pictographic signal but classified narrow).
//!
//! Invariants:
//! - Empty input is 0 cells; every non-empty cluster is 1 or 2 cells.
//! - The classifier over-estimates emoji composites rather than under-estimating
//!   them (a slightly wide highlight is harmless, a short one is not).

/// Semantic classification of a single grapheme cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClusterKind {
    Narrow,
    Wide,
    Emoji,
    /// Base + combining mark(s); bool indicates wide/emoji base.
    Combining(bool),
}

const ZWJ: char = '\u{200D}';
const KEYCAP_COMBINING: char = '\u{20E3}';

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_skin_tone_modifier(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

// Rough Extended Pictographic heuristic (emoji blocks + misc symbols/dingbats).
fn is_extended_pictographic(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c)
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
        || ('\u{1AB0}'..='\u{1AFF}').contains(&c)
        || ('\u{1DC0}'..='\u{1DFF}').contains(&c)
        || ('\u{20D0}'..='\u{20FF}').contains(&c)
        || ('\u{FE20}'..='\u{FE2F}').contains(&c)
}

fn char_is_wide(c: char) -> bool {
    unicode_width::UnicodeWidthChar::width(c).unwrap_or(1) == 2
}

fn classify(cluster: &str) -> ClusterKind {
    let mut chars = cluster.chars();
    let Some(first) = chars.next() else {
        return ClusterKind::Narrow;
    };
    if chars.as_str().is_empty() {
        if first.is_ascii() {
            return ClusterKind::Narrow;
        }
        if is_extended_pictographic(first) {
            return ClusterKind::Emoji;
        }
        return if char_is_wide(first) {
            ClusterKind::Wide
        } else {
            ClusterKind::Narrow
        };
    }

    let mut pictographic = 0usize;
    let mut regional = 0usize;
    let mut has_zwj = false;
    let mut has_skin = false;
    let mut has_combining = false;
    let mut any_wide = false;
    let mut keycap_base = false;
    let mut base_wide = None;

    for c in cluster.chars() {
        pictographic += usize::from(is_extended_pictographic(c));
        regional += usize::from(is_regional_indicator(c));
        has_zwj |= c == ZWJ;
        has_skin |= is_skin_tone_modifier(c);
        has_combining |= is_combining_mark(c);
        any_wide |= char_is_wide(c);
        keycap_base |= c.is_ascii_digit() || c == '#' || c == '*';
        if base_wide.is_none() && !is_combining_mark(c) {
            base_wide = Some(is_extended_pictographic(c) || char_is_wide(c));
        }
    }

    if keycap_base && cluster.ends_with(KEYCAP_COMBINING) {
        return ClusterKind::Emoji;
    }
    if regional == 2 && cluster.chars().count() == 2 {
        return ClusterKind::Emoji;
    }
    if (has_zwj && pictographic >= 2) || (pictographic >= 1 && has_skin) {
        return ClusterKind::Emoji;
    }
    if pictographic == 1 && !has_zwj {
        return ClusterKind::Emoji;
    }
    if has_combining {
        return ClusterKind::Combining(base_wide.unwrap_or(false));
    }
    if any_wide {
        return ClusterKind::Wide;
    }
    if pictographic > 0 {
        return ClusterKind::Emoji;
    }
    ClusterKind::Narrow
}

/// Layout cells advanced by a single grapheme cluster.
///
/// Precondition: `cluster` is one extended grapheme cluster (callers segment
/// first; we do not re-validate).
#[inline]
pub fn cluster_cells(cluster: &str) -> u16 {
    if cluster.is_empty() {
        return 0;
    }
    let cells = match classify(cluster) {
        ClusterKind::Narrow => 1,
        ClusterKind::Wide | ClusterKind::Emoji => 2,
        ClusterKind::Combining(wide) => {
            if wide {
                2
            } else {
                1
            }
        }
    };
    if cells == 1
        && cluster
            .chars()
            .any(|c| is_extended_pictographic(c) || is_regional_indicator(c))
    {
        return 2;
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_cjk() {
        assert_eq!(cluster_cells("a"), 1);
        assert_eq!(cluster_cells("界"), 2);
        assert_eq!(cluster_cells(""), 0);
    }

    #[test]
    fn emoji_composites_are_wide() {
        assert_eq!(cluster_cells("😀"), 2);
        assert_eq!(cluster_cells("🇺🇸"), 2);
        assert_eq!(cluster_cells("1️⃣"), 2);
        assert_eq!(cluster_cells("👨‍👩‍👧‍👦"), 2);
        assert_eq!(cluster_cells("👍🏻"), 2);
    }

    #[test]
    fn combining_follows_base() {
        assert_eq!(cluster_cells("e\u{0301}"), 1);
        assert_eq!(cluster_cells("界\u{0301}"), 2);
    }

    #[test]
    fn lone_regional_indicator_widened() {
        assert_eq!(cluster_cells("🇺"), 2);
    }
}
