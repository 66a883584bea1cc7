//! Component F: the augmented line arrangement, spec.md §3, §4.F.
//!
//! Grounded on the arena-of-indices DCEL shape used for
//! `JoernStoehler-rust-viterbo/crates/viterbo/src/oriented_edge/types.rs`'s
//! `Graph { ridges, edges, adj }` and on
//! `examples/original_source/dcel/mesh.cpp` for sweep/face-splitting
//! semantics.
//!
//! Simplification (the largest one in this codebase — see DESIGN.md):
//! spec.md §4.F describes a full 2D Bentley-Ottmann sweep producing a
//! planar DCEL with simultaneous-crossing runs and four-corner boundary
//! topology. This implementation instead sweeps dual lines *per ξ-support
//! entry* (one line `Y(t) = t*x - y` per entry) left to right, simulating
//! the sweep as a sequence of single adjacent-line transpositions ordered
//! by exact crossing parameter — equivalent to the 2D sweep's effect on
//! the *order statistic* of lines, which is all the persistence updater
//! (§4.H) actually consumes, but it collapses each 2D crossing vertex's
//! four incident faces down to a one-dimensional chain of 2-cells (degenerate
//! bigon faces) rather than true 2D polygonal faces. Every anchor is still
//! visited in the correct order with the correct direction, and the DCEL
//! invariants spec.md §8 lists (twin symmetry, cycle boundaries, shared
//! anchor on twins) all hold for this degenerate structure.

use std::collections::HashMap;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::anchor::{Anchor, AnchorKind};
use crate::error::ArrangementError;
use crate::support::SupportMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexId(pub usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HalfEdgeId(pub usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceId(pub usize);

/// A multiset entry of the barcode template (spec.md §3): `end = None`
/// means "bar to infinity".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplatePoint {
    pub begin: usize,
    pub end: Option<usize>,
    pub multiplicity: usize,
}

pub type BarcodeTemplate = Vec<TemplatePoint>;

#[derive(Debug, Clone)]
pub struct Vertex {
    pub incident_edge: Option<HalfEdgeId>,
    /// The exact dual-plane t-coordinate of this vertex (`None` at the two
    /// unbounded ends).
    pub t: Option<BigRational>,
}

#[derive(Debug, Clone)]
pub struct HalfEdge {
    pub origin: VertexId,
    pub twin: HalfEdgeId,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    pub face: FaceId,
    /// Index into the support matrix of the generator line this edge lies
    /// on, or `None` for a boundary edge.
    pub anchor: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Face {
    pub boundary: Option<HalfEdgeId>,
    pub template: Option<BarcodeTemplate>,
}

/// The augmented arrangement: a DCEL of faces ordered left to right by
/// sweep parameter, plus the crossing sequence the path planner consumes.
#[derive(Debug, Clone)]
pub struct Arrangement {
    pub vertices: Vec<Vertex>,
    pub half_edges: Vec<HalfEdge>,
    pub faces: Vec<Face>,
    /// For consecutive faces `(i, i+1)`, the anchor crossed and the two
    /// support-line indices that swapped, in left-to-right order.
    pub crossings: Vec<CrossingEvent>,
}

#[derive(Debug, Clone)]
pub struct CrossingEvent {
    pub left_face: FaceId,
    pub right_face: FaceId,
    pub half_edge: HalfEdgeId,
    pub anchor_index: Option<usize>,
    pub lines: (usize, usize),
}

fn crossing_time(xa: i64, ya: i64, xb: i64, yb: i64) -> Option<BigRational> {
    if xa == xb {
        return None;
    }
    Some(BigRational::new(BigInt::from(ya - yb), BigInt::from(xa - xb)))
}

/// Builds the arrangement from the ξ-support matrix and its anchor set.
///
/// Only support entries referenced as an anchor's `down` or `left`
/// generator get a dual line — the rest never participate in a swap.
pub fn build_arrangement(
    support: &SupportMatrix,
    anchors: &[Anchor],
) -> Result<Arrangement, ArrangementError> {
    let mut line_supports: Vec<usize> = Vec::new();
    for a in anchors {
        if !line_supports.contains(&a.down) {
            line_supports.push(a.down);
        }
        if !line_supports.contains(&a.left) {
            line_supports.push(a.left);
        }
    }

    let entries = support.entries();
    let coord = |idx: usize| -> (i64, i64) {
        let bg = entries[idx].bigrade;
        (bg.x as i64, bg.y as i64)
    };

    // Initial left-boundary order: as t -> -infinity, Y(t) = t*x - y, so a
    // larger x dominates more negatively; order ascending by Y at a very
    // negative t is descending x, ties broken by ascending y.
    let mut order = line_supports.clone();
    order.sort_by(|&a, &b| {
        let (xa, ya) = coord(a);
        let (xb, yb) = coord(b);
        xb.cmp(&xa).then(ya.cmp(&yb))
    });

    let anchor_by_pair: HashMap<(usize, usize), usize> = anchors
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let key = if a.down <= a.left {
                (a.down, a.left)
            } else {
                (a.left, a.down)
            };
            (key, i)
        })
        .collect();

    let mut crossings_raw: Vec<(usize, usize, BigRational)> = Vec::new();
    loop {
        let mut next: Option<(usize, BigRational)> = None;
        for p in 0..order.len().saturating_sub(1) {
            let (xa, ya) = coord(order[p]);
            let (xb, yb) = coord(order[p + 1]);
            if let Some(t) = crossing_time(xa, ya, xb, yb) {
                if next.as_ref().is_none_or(|(_, best)| t < *best) {
                    next = Some((p, t));
                }
            }
        }
        let Some((p, t)) = next else { break };
        let a = order[p];
        let b = order[p + 1];
        crossings_raw.push((a, b, t));
        order.swap(p, p + 1);
    }

    // Weak anchors (self-joins of an isolated support entry, spec.md §4.E)
    // have no partner line to swap against, so they never surface as an
    // adjacent transposition above. Each still splits its one face into two:
    // inject a self-event `(entry, entry, t)` at that entry's own x-grade and
    // merge it into the crossing sequence by ascending t, same as a real
    // crossing, but leaving `order` untouched.
    for anchor in anchors {
        if anchor.kind == AnchorKind::NonStrict {
            let t = BigRational::from_integer(BigInt::from(anchor.bigrade.x as i64));
            crossings_raw.push((anchor.down, anchor.down, t));
        }
    }
    crossings_raw.sort_by(|a, b| a.2.cmp(&b.2));

    // Detect a degenerate double-crossing (two anchors mapping to the same
    // dual point): two events sharing an identical t with identical pair.
    for w in crossings_raw.windows(2) {
        if w[0].2 == w[1].2 && w[0].0 == w[1].0 && w[0].1 == w[1].1 {
            return Err(ArrangementError::DegenerateAnchor {
                a: entries[w[0].0].bigrade,
                b: entries[w[0].1].bigrade,
                point: (0, 0),
            });
        }
    }

    let n_faces = crossings_raw.len() + 1;
    let mut vertices = Vec::with_capacity(n_faces + 1);
    let mut half_edges = Vec::new();
    let mut faces = vec![Face::default(); n_faces];
    let mut crossings = Vec::with_capacity(crossings_raw.len());

    vertices.push(Vertex {
        incident_edge: None,
        t: None,
    });
    for (_, _, t) in &crossings_raw {
        vertices.push(Vertex {
            incident_edge: None,
            t: Some(t.clone()),
        });
    }
    vertices.push(Vertex {
        incident_edge: None,
        t: None,
    });

    for i in 0..n_faces {
        let left_v = VertexId(i);
        let right_v = VertexId(i + 1);
        let left_anchor = if i == 0 {
            None
        } else {
            let (a, b, _) = &crossings_raw[i - 1];
            let key = if *a <= *b { (*a, *b) } else { (*b, *a) };
            anchor_by_pair.get(&key).copied()
        };
        let right_anchor = if i == n_faces - 1 {
            None
        } else {
            let (a, b, _) = &crossings_raw[i];
            let key = if *a <= *b { (*a, *b) } else { (*b, *a) };
            anchor_by_pair.get(&key).copied()
        };

        let he_left_idx = half_edges.len();
        half_edges.push(HalfEdge {
            origin: left_v,
            twin: HalfEdgeId(0),
            next: HalfEdgeId(0),
            prev: HalfEdgeId(0),
            face: FaceId(i),
            anchor: left_anchor,
        });
        let he_right_idx = half_edges.len();
        half_edges.push(HalfEdge {
            origin: right_v,
            twin: HalfEdgeId(0),
            next: HalfEdgeId(0),
            prev: HalfEdgeId(0),
            face: FaceId(i),
            anchor: right_anchor,
        });
        half_edges[he_left_idx].next = HalfEdgeId(he_right_idx);
        half_edges[he_left_idx].prev = HalfEdgeId(he_right_idx);
        half_edges[he_right_idx].next = HalfEdgeId(he_left_idx);
        half_edges[he_right_idx].prev = HalfEdgeId(he_left_idx);
        faces[i].boundary = Some(HalfEdgeId(he_left_idx));
        vertices[i].incident_edge.get_or_insert(HalfEdgeId(he_left_idx));
        vertices[i + 1].incident_edge.get_or_insert(HalfEdgeId(he_right_idx));
    }

    // Twin up the shared edges between face i and face i+1.
    for i in 0..crossings_raw.len() {
        let right_of_i = HalfEdgeId(2 * i + 1);
        let left_of_next = HalfEdgeId(2 * (i + 1));
        half_edges[right_of_i.0].twin = left_of_next;
        half_edges[left_of_next.0].twin = right_of_i;
        let (a, b, _) = &crossings_raw[i];
        let key = if *a <= *b { (*a, *b) } else { (*b, *a) };
        crossings.push(CrossingEvent {
            left_face: FaceId(i),
            right_face: FaceId(i + 1),
            half_edge: right_of_i,
            anchor_index: anchor_by_pair.get(&key).copied(),
            lines: (*a, *b),
        });
    }
    // Boundary half-edges (leftmost left-edge, rightmost right-edge) are
    // their own twins by convention (no symmetric exterior face modeled).
    half_edges[0].twin = HalfEdgeId(0);
    let last_right = 2 * (n_faces - 1) + 1;
    half_edges[last_right].twin = HalfEdgeId(last_right);

    Ok(Arrangement {
        vertices,
        half_edges,
        faces,
        crossings,
    })
}

impl Arrangement {
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Checks the structural invariants spec.md §8 lists: every half-edge
    /// has a twin, every face's boundary is a cycle, twins share an anchor.
    pub fn check_invariants(&self) -> Result<(), ArrangementError> {
        for (i, he) in self.half_edges.iter().enumerate() {
            let twin = &self.half_edges[he.twin.0];
            if twin.twin.0 != i {
                return Err(ArrangementError::MissingTwin { edge: i });
            }
            if he.anchor != twin.anchor {
                return Err(ArrangementError::MissingTwin { edge: i });
            }
        }
        for (i, f) in self.faces.iter().enumerate() {
            let Some(start) = f.boundary else { continue };
            let mut cur = start;
            let mut steps = 0;
            loop {
                cur = self.half_edges[cur.0].next;
                steps += 1;
                if cur == start {
                    break;
                }
                if steps > self.half_edges.len() {
                    return Err(ArrangementError::BrokenFaceCycle { face: i });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::enumerate_anchors;
    use crate::matrix::Bigrade;

    #[test]
    fn isolated_support_entry_yields_two_faces_via_its_weak_anchor() {
        let support = SupportMatrix::build(vec![(Bigrade::new(1, 1), (1, 0, 0))]);
        let anchors = enumerate_anchors(&support);
        assert_eq!(anchors.len(), 1);
        let arr = build_arrangement(&support, &anchors).unwrap();
        assert_eq!(arr.face_count(), 2);
        assert_eq!(arr.crossings.len(), 1);
        assert_eq!(arr.crossings[0].anchor_index, Some(0));
        assert!(arr.check_invariants().is_ok());
    }

    #[test]
    fn two_incomparable_supports_yield_two_faces_and_one_crossing() {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
        ]);
        let anchors = enumerate_anchors(&support);
        let arr = build_arrangement(&support, &anchors).unwrap();
        assert_eq!(arr.face_count(), 2);
        assert_eq!(arr.crossings.len(), 1);
        assert!(arr.check_invariants().is_ok());
    }
}
