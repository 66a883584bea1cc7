//! Component H: the persistence updater (vineyard driver), spec.md §4.H.
//!
//! Grounded on `examples/original_source/math/barcode_calculator.cpp`'s
//! `store_barcodes`/`move_columns`/`remove_partition_entries`/
//! `add_partition_entries`/`store_discrete_barcode` for the crossing
//! dispatch and partition bookkeeping (SPEC_FULL.md §12), and on the
//! `BTreeMap` ceiling-lookup realization of `partition_low`/`partition_high`
//! that section names.
//!
//! Simplification (see DESIGN.md): spec.md §4.H.3's `Strict` and
//! `Supported` cases both use the same swap-the-two-classes mechanic; the
//! `Supported` case's extra "detach the merged head" bookkeeping is not
//! modeled. `NonStrict` (weak) anchors carry only one generator entry, so
//! there is no second class to swap against — crossing one is a no-op here.

use std::collections::BTreeMap;

use crate::anchor::{Anchor, AnchorKind};
use crate::arrangement::{Arrangement, BarcodeTemplate, TemplatePoint};
use crate::firep::Firep;
use crate::matrix::{Bigrade, BigradedColumn, BigradedMatrix, SparseColumn};
use crate::path::PathStep;
use crate::ru::{swap_adjacent_high, swap_adjacent_low, Ru};
use crate::support::SupportMatrix;

/// Sentinel: a column whose bigrade has no ξ-support entry weakly above it
/// in its x-column ("the sentinel ∞ entry" of spec.md §4.H.2).
const ESSENTIAL: usize = usize::MAX;

/// `partition_low` / `partition_high` of spec.md §4.H.1: a map from the
/// last column index of each nonempty equivalence class to the owning
/// ξ-support entry, realized as a `BTreeMap` with ceiling lookup per
/// SPEC_FULL.md §12.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    map: BTreeMap<usize, usize>,
}

impl Partition {
    fn rebuild(order: &[usize], sizes: &[usize]) -> Self {
        let mut map = BTreeMap::new();
        let mut last = 0usize;
        for (i, &size) in sizes.iter().enumerate() {
            if size == 0 {
                continue;
            }
            last += size;
            map.insert(last - 1, order[i]);
        }
        Self { map }
    }

    /// The owning entry for column `col`: the first class whose last index
    /// is `>= col` (the original's `lower_bound`).
    pub fn ceiling(&self, col: usize) -> Option<usize> {
        self.map.range(col..).next().map(|(_, &e)| e)
    }
}

fn owning_entry(bigrade: Bigrade, support: &SupportMatrix) -> Option<usize> {
    support
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, e)| e.bigrade.x == bigrade.x && e.bigrade.y >= bigrade.y)
        .min_by_key(|(_, e)| e.bigrade.y)
        .map(|(i, _)| i)
}

fn initial_entry_order(support: &SupportMatrix) -> Vec<usize> {
    let mut order: Vec<usize> = (0..support.len()).collect();
    order.sort_by(|&a, &b| {
        let ba = support.entries()[a].bigrade;
        let bb = support.entries()[b].bigrade;
        bb.x.cmp(&ba.x).then(ba.y.cmp(&bb.y))
    });
    order
}

/// Groups `matrix`'s columns by owning entry following `entry_order`, with
/// a trailing essential group, returning the reordered matrix, the
/// permutation applied (`new position -> old column index`), the compact
/// nonempty class order, and matching sizes.
fn group_by_entry(
    matrix: &BigradedMatrix,
    support: &SupportMatrix,
    entry_order: &[usize],
) -> (BigradedMatrix, Vec<usize>, Vec<usize>, Vec<usize>) {
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); entry_order.len()];
    let mut essential = Vec::new();
    for c in 0..matrix.ncols() {
        match owning_entry(matrix.bigrade(c), support) {
            Some(entry) => {
                let pos = entry_order.iter().position(|&e| e == entry).unwrap();
                groups[pos].push(c);
            }
            None => essential.push(c),
        }
    }

    let mut perm = Vec::with_capacity(matrix.ncols());
    let mut order = Vec::new();
    let mut sizes = Vec::new();
    for (i, g) in groups.into_iter().enumerate() {
        if !g.is_empty() {
            order.push(entry_order[i]);
            sizes.push(g.len());
            perm.extend(g);
        }
    }
    if !essential.is_empty() {
        order.push(ESSENTIAL);
        sizes.push(essential.len());
        perm.extend(essential);
    }

    let columns = perm
        .iter()
        .map(|&old| {
            let c = matrix.column(old);
            BigradedColumn {
                data: c.clone(),
                dim_index: matrix.dim_index(old),
                bigrade: matrix.bigrade(old),
            }
        })
        .collect();
    (BigradedMatrix::new(matrix.nrows(), columns), perm, order, sizes)
}

fn remap_rows(matrix: &BigradedMatrix, perm: &[usize]) -> BigradedMatrix {
    let mut inverse = vec![0usize; perm.len()];
    for (new_row, &old_row) in perm.iter().enumerate() {
        inverse[old_row] = new_row;
    }
    let columns = (0..matrix.ncols())
        .map(|c| {
            let mut rows: Vec<usize> = matrix.column(c).rows().iter().map(|&r| inverse[r]).collect();
            rows.sort_unstable_by(|a, b| b.cmp(a));
            BigradedColumn {
                data: SparseColumn::from_descending(rows),
                dim_index: matrix.dim_index(c),
                bigrade: matrix.bigrade(c),
            }
        })
        .collect();
    BigradedMatrix::new(matrix.nrows(), columns)
}

/// The mutable state the updater carries along the traversal: the two RU
/// pairs plus each matrix's equivalence-class order and sizes.
pub struct PersistenceState {
    pub r_low: BigradedMatrix,
    pub u_low: BigradedMatrix,
    pub r_high: BigradedMatrix,
    pub u_high: BigradedMatrix,
    low_order: Vec<usize>,
    low_sizes: Vec<usize>,
    high_order: Vec<usize>,
    high_sizes: Vec<usize>,
}

impl PersistenceState {
    pub fn initialize(firep: &Firep, support: &SupportMatrix) -> Self {
        let entry_order = initial_entry_order(support);

        let (low_reordered, low_perm, low_order, low_sizes) =
            group_by_entry(firep.get_boundary(false).matrix(), support, &entry_order);
        let high_rows_remapped = remap_rows(firep.get_boundary(true).matrix(), &low_perm);
        let (high_reordered, _high_perm, high_order, high_sizes) =
            group_by_entry(&high_rows_remapped, support, &entry_order);

        let ru_low = Ru::decompose(low_reordered);
        let ru_high = Ru::decompose(high_reordered);

        Self {
            r_low: ru_low.r,
            u_low: ru_low.u,
            r_high: ru_high.r,
            u_high: ru_high.u,
            low_order,
            low_sizes,
            high_order,
            high_sizes,
        }
    }

    fn partition_low(&self) -> Partition {
        Partition::rebuild(&self.low_order, &self.low_sizes)
    }

    fn partition_high(&self) -> Partition {
        Partition::rebuild(&self.high_order, &self.high_sizes)
    }

    fn class_start(sizes: &[usize], pos: usize) -> usize {
        sizes[..pos].iter().sum()
    }

    /// Moves the block at `order[mover]` past the adjacent block at
    /// `order[mover] +/- 1`, performing `p_len * q_len` adjacent
    /// transpositions per spec.md §4.H.4's closing paragraph, then swaps
    /// the two classes' slots in `order`/`sizes`. Returns the transposition
    /// count, the unit of cost the dry run (§4.H.6) accumulates.
    fn move_adjacent_low(&mut self, i: usize) -> usize {
        let p_start = Self::class_start(&self.low_sizes, i);
        let p_len = self.low_sizes[i];
        let q_len = self.low_sizes[i + 1];
        for step in 0..p_len {
            let mut pos = p_start + step;
            for _ in 0..q_len {
                swap_adjacent_low(&mut self.r_low, &mut self.u_low, &mut self.r_high, &mut self.u_high, pos);
                pos += 1;
            }
        }
        self.low_order.swap(i, i + 1);
        self.low_sizes.swap(i, i + 1);
        p_len * q_len
    }

    fn move_adjacent_high(&mut self, i: usize) -> usize {
        let p_start = Self::class_start(&self.high_sizes, i);
        let p_len = self.high_sizes[i];
        let q_len = self.high_sizes[i + 1];
        for step in 0..p_len {
            let mut pos = p_start + step;
            for _ in 0..q_len {
                swap_adjacent_high(&mut self.r_high, &mut self.u_high, pos);
                pos += 1;
            }
        }
        self.high_order.swap(i, i + 1);
        self.high_sizes.swap(i, i + 1);
        p_len * q_len
    }

    /// Crosses `anchor`, moving `down`'s class past `left`'s class when
    /// `from_below`, the reverse otherwise (spec.md §4.H.3). A side with no
    /// adjacent pair of classes for this anchor (one or both entries own
    /// no columns in that matrix) is skipped. `NonStrict` anchors have only
    /// one generator entry (`down == left`), so there is never a second
    /// class to swap against — crossing one costs nothing and touches
    /// neither matrix. Returns the total adjacent-transposition count, the
    /// quantity the dry run (§4.H.6) stores into `anchor.weight`.
    pub fn cross_anchor(&mut self, anchor: &Anchor, from_below: bool) -> usize {
        if anchor.kind == AnchorKind::NonStrict {
            return 0;
        }

        let (mover, other) = if from_below {
            (anchor.down, anchor.left)
        } else {
            (anchor.left, anchor.down)
        };

        let mut cost = 0;
        if let Some(i) = adjacent_pair_position(&self.low_order, mover, other) {
            cost += self.move_adjacent_low(i);
        }
        if let Some(i) = adjacent_pair_position(&self.high_order, mover, other) {
            cost += self.move_adjacent_high(i);
        }
        cost
    }

    /// Writes the barcode template for the current column order (spec.md
    /// §4.H.5): for each empty (positive) column of `R_low`, look up its
    /// owning entry; if `R_high` has a column with that row as its low
    /// (paired negative simplex), look up its owning entry and emit a
    /// finite bar, filtering degenerate `a == b` bars per SPEC_FULL.md §12;
    /// else emit an essential bar.
    pub fn write_template(&self) -> BarcodeTemplate {
        let partition_low = self.partition_low();
        let partition_high = self.partition_high();
        let mut counts: BTreeMap<(usize, Option<usize>), usize> = BTreeMap::new();

        for c in 0..self.r_low.ncols() {
            if !self.r_low.is_empty(c) {
                continue;
            }
            let Some(a) = partition_low.ceiling(c) else {
                continue;
            };
            // A column past every ξ-support entry in its x-column (the
            // sentinel ∞ class) never births a real bar.
            if a == ESSENTIAL {
                continue;
            }
            match self.r_high.find_low(c) {
                Some(paired) => {
                    if let Some(b) = partition_high.ceiling(paired) {
                        if b != ESSENTIAL && a != b {
                            *counts.entry((a, Some(b))).or_insert(0) += 1;
                        }
                    }
                }
                None => {
                    *counts.entry((a, None)).or_insert(0) += 1;
                }
            }
        }

        counts
            .into_iter()
            .map(|((begin, end), multiplicity)| TemplatePoint {
                begin,
                end,
                multiplicity,
            })
            .collect()
    }
}

fn adjacent_pair_position(order: &[usize], a: usize, b: usize) -> Option<usize> {
    for i in 0..order.len().saturating_sub(1) {
        if (order[i] == a && order[i + 1] == b) || (order[i] == b && order[i + 1] == a) {
            return Some(i);
        }
    }
    None
}

/// Dry run of spec.md §4.H.6: walks every crossing in the arrangement's
/// natural left-to-right order against a scratch `PersistenceState`,
/// summing the adjacent-transposition count each anchor's crossing costs.
/// The result feeds `anchor.weight`, which the path planner's minimum
/// spanning tree (§4.G) uses so it can route around the most expensive
/// crossings rather than just minimizing edge count.
pub fn dry_run_weights(
    firep: &Firep,
    support: &SupportMatrix,
    anchors: &[Anchor],
    arrangement: &Arrangement,
) -> Vec<usize> {
    let mut state = PersistenceState::initialize(firep, support);
    let mut weights = vec![0usize; anchors.len()];
    for crossing in &arrangement.crossings {
        if let Some(idx) = crossing.anchor_index {
            weights[idx] += state.cross_anchor(&anchors[idx], true);
        }
    }
    weights
}

/// Runs the full persistence updater along `path`, writing a template for
/// every face reachable from the starting face (index 0 in `path`'s
/// traversal), indexed by face id.
pub fn run(
    firep: &Firep,
    support: &SupportMatrix,
    anchors: &[Anchor],
    arrangement: &Arrangement,
    path: &[PathStep],
    start_face: usize,
) -> Vec<Option<BarcodeTemplate>> {
    let mut state = PersistenceState::initialize(firep, support);
    let mut templates = vec![None; arrangement.face_count()];
    templates[start_face] = Some(state.write_template());

    for step in path {
        let crossing = &arrangement.crossings[step.crossing];
        if let Some(anchor_idx) = crossing.anchor_index {
            let from_below = step.from == crossing.left_face.0;
            state.cross_anchor(&anchors[anchor_idx], from_below);
        }
        if templates[step.to].is_none() {
            templates[step.to] = Some(state.write_template());
        }
    }

    templates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::enumerate_anchors;
    use crate::arrangement::build_arrangement;
    use crate::matrix::Bigrade;
    use crate::path::{adjacency_from_arrangement, euler_tour, minimum_spanning_tree};

    fn simplex(rows: Vec<usize>, bigrade: Bigrade) -> BigradedColumn {
        BigradedColumn {
            data: SparseColumn::from_rows(rows),
            dim_index: 0,
            bigrade,
        }
    }

    #[test]
    fn single_simplex_pair_at_the_same_bigrade_is_a_degenerate_bar() {
        // Scenario 1 of spec.md §8: a single d-simplex paired with the
        // single (d+1)-simplex that kills it, both at bigrade (1,1). Both
        // ends map to the same ξ-support entry, so this is a zero-length
        // bar and spec.md §4.H.5's `a != b` filter drops it.
        let low = BigradedMatrix::new(1, vec![simplex(vec![], Bigrade::new(1, 1))]);
        let high = BigradedMatrix::new(1, vec![simplex(vec![0], Bigrade::new(1, 1))]);
        let firep = Firep::new(1, 2, 2, low, high);
        let support = SupportMatrix::build(vec![(Bigrade::new(1, 1), (1, 1, 0))]);
        let state = PersistenceState::initialize(&firep, &support);
        let template = state.write_template();
        assert!(template.is_empty());
    }

    #[test]
    fn crossing_a_nonstrict_anchor_costs_nothing() {
        let support = SupportMatrix::build(vec![(Bigrade::new(1, 1), (1, 0, 0))]);
        let anchors = enumerate_anchors(&support);
        assert_eq!(anchors[0].kind, crate::anchor::AnchorKind::NonStrict);

        let low = BigradedMatrix::new(1, vec![simplex(vec![], Bigrade::new(1, 1))]);
        let high = BigradedMatrix::new(1, vec![simplex(vec![0], Bigrade::new(1, 1))]);
        let firep = Firep::new(1, 2, 2, low, high);
        let mut state = PersistenceState::initialize(&firep, &support);
        assert_eq!(state.cross_anchor(&anchors[0], true), 0);
    }

    #[test]
    fn dry_run_assigns_nonzero_weight_to_a_real_crossing() {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
        ]);
        let anchors = enumerate_anchors(&support);
        let arrangement = build_arrangement(&support, &anchors).unwrap();

        let low = BigradedMatrix::new(
            0,
            vec![simplex(vec![], Bigrade::new(0, 1)), simplex(vec![], Bigrade::new(1, 0))],
        );
        let high = BigradedMatrix::new(2, vec![]);
        let firep = Firep::new(0, 2, 2, low, high);

        let weights = dry_run_weights(&firep, &support, &anchors, &arrangement);
        assert_eq!(weights.len(), 1);
        assert_eq!(weights[0], 1);
    }

    #[test]
    fn two_incomparable_supports_produce_two_visited_faces() {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
        ]);
        let anchors = enumerate_anchors(&support);
        let arrangement = build_arrangement(&support, &anchors).unwrap();
        let adj = adjacency_from_arrangement(&arrangement, &anchors);
        let mst = minimum_spanning_tree(arrangement.face_count(), &adj);
        let path = euler_tour(arrangement.face_count(), &mst, 0);

        let low = BigradedMatrix::new(
            0,
            vec![simplex(vec![], Bigrade::new(0, 1)), simplex(vec![], Bigrade::new(1, 0))],
        );
        let high = BigradedMatrix::new(2, vec![]);
        let firep = Firep::new(0, 2, 2, low, high);

        let templates = run(&firep, &support, &anchors, &arrangement, &path, 0);
        assert!(templates.iter().all(|t| t.is_some()));
    }
}
