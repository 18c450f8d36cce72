//! Stable issue identities across list replacements.
//!
//! Issue lists are replaced wholesale, so list indices are not stable. The
//! registry hands out an `IssueId` per issue and, when a new list arrives,
//! carries ids over in two ways:
//! - explicitly, when the caller knows which previous issue a new one came
//!   from (a rebase across an edit);
//! - otherwise by signature, aligning each same-signature group of previous
//!   and new issues in document order. The alignment never crosses, so a shift
//!   larger than the gap between two identical issues keeps their order.
//!
//! Everything else gets a fresh id. Ids are never reused.

use crate::issue::{Issue, IssuePosition};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub u64);

#[derive(Debug, Clone, Copy)]
struct Known {
    id: IssueId,
    start: Option<usize>,
}

#[derive(Debug, Default)]
pub struct IssueRegistry {
    next: u64,
    known: AHashMap<u64, Vec<Known>>,
}

// Pairing an unresolved issue with a resolved one is allowed but costs more
// than any real distance.
const UNPLACED_COST: u64 = u32::MAX as u64;

fn pair_cost(a: Option<usize>, b: Option<usize>) -> u64 {
    match (a, b) {
        (Some(a), Some(b)) => a.abs_diff(b) as u64,
        (None, None) => 0,
        _ => UNPLACED_COST,
    }
}

/// Non-crossing alignment of `prev` and `next` (both in document order) that
/// pairs as many entries as possible at the least total distance. Returns
/// `(prev_pos, next_pos)` pairs.
fn align(prev: &[Option<usize>], next: &[Option<usize>]) -> Vec<(usize, usize)> {
    let (n, m) = (prev.len(), next.len());
    // best[i][j]: (pairs, cost) for prev[i..] and next[j..].
    let mut best = vec![vec![(0usize, 0u64); m + 1]; n + 1];
    let better = |a: (usize, u64), b: (usize, u64)| a.0 > b.0 || (a.0 == b.0 && a.1 < b.1);
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            let (p, c) = best[i + 1][j + 1];
            let mut pick = (p + 1, c.saturating_add(pair_cost(prev[i], next[j])));
            for alt in [best[i + 1][j], best[i][j + 1]] {
                if better(alt, pick) {
                    pick = alt;
                }
            }
            best[i][j] = pick;
        }
    }
    let mut pairs = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        let (p, c) = best[i + 1][j + 1];
        let take = (p + 1, c.saturating_add(pair_cost(prev[i], next[j])));
        if take == best[i][j] {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if best[i + 1][j] == best[i][j] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

impl IssueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&mut self) -> IssueId {
        let id = IssueId(self.next);
        self.next += 1;
        id
    }

    /// Assign ids to `issues` (one per issue, same order). `positions` are the
    /// resolved positions of the same list; unresolved issues match only by
    /// signature.
    pub fn assign(&mut self, issues: &[Issue], positions: &[IssuePosition]) -> Vec<IssueId> {
        self.assign_carried(issues, positions, &[])
    }

    /// Like `assign`, but `carried[i]` names the id issue `i` inherits when
    /// known. A carried id is honoured only if the previous list held it
    /// under the same signature and no earlier issue took it.
    pub fn assign_carried(
        &mut self,
        issues: &[Issue],
        positions: &[IssuePosition],
        carried: &[Option<IssueId>],
    ) -> Vec<IssueId> {
        let mut previous = std::mem::take(&mut self.known);
        let mut starts: Vec<Option<usize>> = vec![None; issues.len()];
        for pos in positions {
            if let Some(slot) = starts.get_mut(pos.index) {
                *slot = pos.span.map(|s| s.start);
            }
        }
        let sigs: Vec<u64> = issues.iter().map(Issue::signature).collect();
        let mut ids: Vec<Option<IssueId>> = vec![None; issues.len()];

        let mut explicit = 0usize;
        for (idx, want) in carried.iter().enumerate().take(issues.len()) {
            let Some(want) = *want else { continue };
            let Some(list) = previous.get_mut(&sigs[idx]) else {
                continue;
            };
            if let Some(at) = list.iter().position(|k| k.id == want) {
                list.remove(at);
                ids[idx] = Some(want);
                explicit += 1;
            }
        }

        let mut groups: AHashMap<u64, Vec<usize>> = AHashMap::new();
        for idx in (0..issues.len()).filter(|&i| ids[i].is_none()) {
            groups.entry(sigs[idx]).or_default().push(idx);
        }
        let mut matched = 0usize;
        for (sig, mut members) in groups {
            let Some(mut prev) = previous.remove(&sig) else {
                continue;
            };
            members.sort_by_key(|&i| (starts[i].unwrap_or(usize::MAX), i));
            prev.sort_by_key(|k| (k.start.unwrap_or(usize::MAX), k.id));
            let prev_starts: Vec<Option<usize>> = prev.iter().map(|k| k.start).collect();
            let next_starts: Vec<Option<usize>> = members.iter().map(|&i| starts[i]).collect();
            for (p, n) in align(&prev_starts, &next_starts) {
                ids[members[n]] = Some(prev[p].id);
                matched += 1;
            }
        }

        let ids: Vec<IssueId> = ids
            .into_iter()
            .map(|id| id.unwrap_or_else(|| self.fresh()))
            .collect();
        for (idx, &id) in ids.iter().enumerate() {
            self.known.entry(sigs[idx]).or_default().push(Known {
                id,
                start: starts[idx],
            });
        }

        tracing::trace!(
            target: "issues.identity",
            issues = issues.len(),
            explicit,
            matched,
            "assign"
        );
        ids
    }

    pub fn clear(&mut self) {
        self.known.clear();
    }
}
