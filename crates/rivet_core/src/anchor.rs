//! Component E (anchor half): anchor enumeration, spec.md §4.E.
//!
//! Grounded on `examples/original_source/dcel/lcm.cpp/.h` ("LCM" is the
//! original's name for what spec.md calls an anchor) and on the dual-line
//! convention from spec.md §4.F / §9 (exact-rational slope/intercept).
//!
//! Simplification (recorded in DESIGN.md): rather than the original's
//! single left-to-right frontier sweep, anchors are derived from all
//! pairwise joins of incomparable support entries, deduplicated by bigrade,
//! at `O(n^2)` instead of `O(n log n)`. The frontier's weak/non-strict case
//! (spec.md §4.E: "weak (only one of the two generators exists)", the
//! self-LCM construction in `examples/original_source/dcel/lcm.h`) is
//! recovered as a second pass: any support entry never used as a real join's
//! `down`/`left` becomes its own weak anchor.

use std::collections::{BTreeMap, BTreeSet};

use crate::support::SupportMatrix;
use crate::matrix::Bigrade;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// The join is neither of the two joined supports.
    Strict,
    /// The join itself carries ξ-mass.
    Supported,
    /// Only one generator exists — a support entry with no incomparable
    /// partner anywhere in the matrix, anchored against itself.
    NonStrict,
}

/// An anchor: a bigrade derived as the join of two incomparable ξ-supports,
/// together with the indices of the two joined support entries (`down` is
/// the one with the smaller x, `left` the one with the smaller y) and the
/// crossing-cost weight the path planner's dry run (§4.H.6) fills in.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub bigrade: Bigrade,
    pub down: usize,
    pub left: usize,
    pub kind: AnchorKind,
    pub weight: usize,
}

impl Anchor {
    /// The dual line `y' = x*m - y` for this anchor, per spec.md §3/§4.F.
    pub fn dual_line(&self) -> (usize, usize) {
        (self.bigrade.x, self.bigrade.y)
    }
}

/// Enumerates the anchor set from a built support matrix, in increasing
/// bigrade (reverse-lex) order.
pub fn enumerate_anchors(support: &SupportMatrix) -> Vec<Anchor> {
    let entries = support.entries();
    let mut by_join: BTreeMap<(usize, usize), Anchor> = BTreeMap::new();

    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let a = entries[i].bigrade;
            let b = entries[j].bigrade;
            if !a.incomparable(&b) {
                continue;
            }
            let join = a.join(&b);
            let kind = if support.index_of(join).is_some() {
                AnchorKind::Supported
            } else {
                AnchorKind::Strict
            };
            let (down, left) = if a.x <= b.x { (i, j) } else { (j, i) };
            by_join
                .entry((join.x, join.y))
                .or_insert(Anchor {
                    bigrade: join,
                    down,
                    left,
                    kind,
                    weight: 0,
                });
        }
    }

    let referenced: BTreeSet<usize> = by_join.values().flat_map(|a| [a.down, a.left]).collect();
    for (i, entry) in entries.iter().enumerate() {
        if referenced.contains(&i) {
            continue;
        }
        let bg = entry.bigrade;
        by_join.entry((bg.x, bg.y)).or_insert(Anchor {
            bigrade: bg,
            down: i,
            left: i,
            kind: AnchorKind::NonStrict,
            weight: 0,
        });
    }

    by_join.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_incomparable_supports_give_one_strict_anchor() {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
        ]);
        let anchors = enumerate_anchors(&support);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].bigrade, Bigrade::new(1, 1));
        assert_eq!(anchors[0].kind, AnchorKind::Strict);
    }

    #[test]
    fn isolated_support_entry_gets_a_weak_self_anchor() {
        let support = SupportMatrix::build(vec![(Bigrade::new(1, 1), (1, 0, 0))]);
        let anchors = enumerate_anchors(&support);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].down, 0);
        assert_eq!(anchors[0].left, 0);
        assert_eq!(anchors[0].kind, AnchorKind::NonStrict);
    }

    #[test]
    fn supported_join_is_classified_supported() {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
            (Bigrade::new(1, 1), (0, 1, 0)),
        ]);
        let anchors = enumerate_anchors(&support);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].kind, AnchorKind::Supported);
    }
}
