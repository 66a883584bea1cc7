//! Component G: the path planner, spec.md §4.G.
//!
//! Grounded on `spicy_simulate/src/union_find.rs` (adapted here for
//! Kruskal's MST) and `spicy_simulate/src/solver/btf_scc.rs` (iterative
//! stack-based DFS over an adjacency structure, the same shape needed for
//! the Euler-tour walk).

use crate::anchor::Anchor;
use crate::arrangement::Arrangement;

/// Union-find with path compression and union-by-rank, adapted from
/// `spicy_simulate::union_find::UnionFind` for Kruskal's algorithm.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

/// One face-adjacency edge: two faces sharing a half-edge whose anchor is
/// not the boundary sentinel, plus the crossing it represents.
#[derive(Debug, Clone, Copy)]
pub struct AdjEdge {
    pub a: usize,
    pub b: usize,
    pub weight: usize,
    pub crossing: usize,
}

/// One step of the emitted traversal: move from `from` to `to` across
/// `crossing` (an index into `Arrangement::crossings`).
#[derive(Debug, Clone, Copy)]
pub struct PathStep {
    pub from: usize,
    pub to: usize,
    pub crossing: usize,
}

/// Builds the face-adjacency graph directly from the arrangement: two
/// faces are adjacent iff they share the crossing half-edge recorded for
/// each consecutive pair in `Arrangement::crossings`. Edge cost is the
/// crossed anchor's `weight` (spec.md §4.H.6's dry-run count), falling back
/// to `1` for a crossing with no anchor (shouldn't occur in practice, since
/// every crossing in `Arrangement::crossings` is produced by an anchor).
pub fn adjacency_from_arrangement(arrangement: &Arrangement, anchors: &[Anchor]) -> Vec<AdjEdge> {
    arrangement
        .crossings
        .iter()
        .enumerate()
        .map(|(i, c)| AdjEdge {
            a: c.left_face.0,
            b: c.right_face.0,
            weight: c.anchor_index.map(|idx| anchors[idx].weight).unwrap_or(1),
            crossing: i,
        })
        .collect()
}

/// Kruskal's minimum spanning tree over the face-adjacency graph, using
/// `anchor.weight` (via `AdjEdge::weight`) as edge cost.
pub fn minimum_spanning_tree(n_faces: usize, edges: &[AdjEdge]) -> Vec<AdjEdge> {
    let mut sorted: Vec<AdjEdge> = edges.to_vec();
    sorted.sort_by_key(|e| e.weight);
    let mut uf = UnionFind::new(n_faces);
    let mut mst = Vec::new();
    for e in sorted {
        if uf.union(e.a, e.b) {
            mst.push(e);
        }
    }
    mst
}

/// Emits an ordered half-edge crossing sequence by an iterative,
/// stack-based Euler-tour DFS over the MST, starting at `start` (the
/// unbounded top-left face). Every tree edge is visited twice (descend,
/// then return) — simpler than spec.md §4.G's shortcut of skipping the
/// final return per subtree, and still a valid traversal since crossing
/// the same anchor twice in a row is self-cancelling (see DESIGN.md).
pub fn euler_tour(n_faces: usize, mst: &[AdjEdge], start: usize) -> Vec<PathStep> {
    let mut adj: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n_faces];
    for e in mst {
        adj[e.a].push((e.b, e.crossing));
        adj[e.b].push((e.a, e.crossing));
    }

    let mut visited = vec![false; n_faces];
    visited[start] = true;
    let mut path = Vec::new();
    // Stack of (node, next child index, edge used to arrive here, parent).
    let mut stack: Vec<(usize, usize, Option<(usize, usize)>)> = vec![(start, 0, None)];

    while let Some(&mut (node, ref mut next_idx, parent)) = stack.last_mut() {
        if *next_idx < adj[node].len() {
            let (child, crossing) = adj[node][*next_idx];
            *next_idx += 1;
            if visited[child] {
                continue;
            }
            visited[child] = true;
            path.push(PathStep {
                from: node,
                to: child,
                crossing,
            });
            stack.push((child, 0, Some((node, crossing))));
        } else {
            stack.pop();
            if let Some((parent_node, crossing)) = parent {
                path.push(PathStep {
                    from: node,
                    to: parent_node,
                    crossing,
                });
            }
        }
    }

    path
}
