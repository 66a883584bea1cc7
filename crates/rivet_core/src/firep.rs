//! Component C: the Free Implicit Representation (Firep / bifiltration),
//! spec.md §4.C.
//!
//! Grounded on `spicy_simulate`'s boundary-matrix-plus-accessor shape
//! (`solver/csc.rs`'s `Dim`/builder split) and on
//! `examples/original_source/driver.cpp` / `interface/input_manager.cpp` for
//! the external bifiltration shape the Firep is built from.

use crate::matrix::{Bigrade, BigradedColumn, BigradedMatrix, SparseColumn};

/// A last-column-per-bigrade lookup table (spec.md §3's "index table").
/// `index[x][y]` is the last column index (inclusive) whose bigrade is
/// `<= (x,y)`, or `None` if no such column exists — resolved per
/// SPEC_FULL.md §13 by a prefix-max sweep over an `(nx, ny)` grid.
#[derive(Debug, Clone)]
pub struct IndexTable {
    nx: usize,
    ny: usize,
    table: Vec<Option<usize>>,
}

impl IndexTable {
    /// Builds the table from columns already sorted in the matrix's
    /// reverse-lex column order, so that column `i`'s bigrade is
    /// non-decreasing in that order as `i` increases.
    pub fn build(nx: usize, ny: usize, bigrades: &[Bigrade]) -> Self {
        // raw[x][y] = last column index with bigrade exactly (x,y).
        let mut raw: Vec<Vec<Option<usize>>> = vec![vec![None; ny]; nx];
        for (col, bg) in bigrades.iter().enumerate() {
            raw[bg.x][bg.y] = Some(col);
        }
        // Row-prefix-max across x within each y, then accumulate across y.
        let mut table = vec![None; nx * ny];
        let mut running: Vec<Option<usize>> = vec![None; nx];
        for y in 0..ny {
            for x in 0..nx {
                if let Some(c) = raw[x][y] {
                    running[x] = Some(match running[x] {
                        Some(prev) => prev.max(c),
                        None => c,
                    });
                }
            }
            let mut best: Option<usize> = None;
            for x in 0..nx {
                if let Some(c) = running[x] {
                    best = Some(match best {
                        Some(prev) => prev.max(c),
                        None => c,
                    });
                }
                table[x * ny + y] = best;
            }
        }
        Self { nx, ny, table }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<usize> {
        debug_assert!(x < self.nx && y < self.ny);
        self.table[x * self.ny + y]
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }
}

/// The n x 2n "merge" matrix `[I | I]` of spec.md §4.C: folds the 2n-dim
/// `B ⊕ C` space back onto the n-dim `D` space (column `i` and column
/// `n+i` both map to row `i`), used by the alpha/eta reductions.
pub fn merge_matrix(n: usize) -> BigradedMatrix {
    let columns = (0..2 * n)
        .map(|i| BigradedColumn {
            data: SparseColumn::from_descending(vec![i % n]),
            dim_index: i,
            bigrade: Bigrade::new(0, 0),
        })
        .collect();
    BigradedMatrix::new(n, columns)
}

/// The 2n x n "split" matrix of spec.md §4.C, the transpose of
/// `merge_matrix`: maps the n-dim `A` space into the 2n-dim `B ⊕ C` space,
/// column `i` hitting rows `i` and `n+i`, used by the eta (split-direction)
/// reduction.
pub fn split_matrix(n: usize) -> BigradedMatrix {
    let columns = (0..n)
        .map(|i| BigradedColumn {
            data: SparseColumn::from_descending(vec![n + i, i]),
            dim_index: i,
            bigrade: Bigrade::new(0, 0),
        })
        .collect();
    BigradedMatrix::new(2 * n, columns)
}

/// A single boundary matrix with its bigrade-indexed column lookup.
#[derive(Debug, Clone)]
pub struct BoundaryMatrix {
    matrix: BigradedMatrix,
    index: IndexTable,
}

impl BoundaryMatrix {
    pub fn new(matrix: BigradedMatrix, nx: usize, ny: usize) -> Self {
        let bigrades: Vec<Bigrade> = (0..matrix.ncols()).map(|c| matrix.bigrade(c)).collect();
        let index = IndexTable::build(nx, ny, &bigrades);
        Self { matrix, index }
    }

    pub fn matrix(&self) -> &BigradedMatrix {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut BigradedMatrix {
        &mut self.matrix
    }

    pub fn index(&self) -> &IndexTable {
        &self.index
    }
}

/// The bigraded free chain complex consumed by the Betti engine and the
/// persistence updater: two boundary matrices at dimensions `hom_dim` and
/// `hom_dim + 1` (spec.md §4.C).
#[derive(Debug, Clone)]
pub struct Firep {
    hom_dim: usize,
    nx: usize,
    ny: usize,
    low: BoundaryMatrix,
    high: BoundaryMatrix,
}

impl Firep {
    pub fn new(hom_dim: usize, nx: usize, ny: usize, low: BigradedMatrix, high: BigradedMatrix) -> Self {
        Self {
            hom_dim,
            nx,
            ny,
            low: BoundaryMatrix::new(low, nx, ny),
            high: BoundaryMatrix::new(high, nx, ny),
        }
    }

    pub fn hom_dim(&self) -> usize {
        self.hom_dim
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    /// `get_boundary(dim)`: `0` selects ∂_d (the low matrix), anything else
    /// selects ∂_{d+1} (the high matrix).
    pub fn get_boundary(&self, high: bool) -> &BoundaryMatrix {
        if high {
            &self.high
        } else {
            &self.low
        }
    }

    pub fn get_boundary_mut(&mut self, high: bool) -> &mut BoundaryMatrix {
        if high {
            &mut self.high
        } else {
            &mut self.low
        }
    }

    pub fn get_index(&self, high: bool) -> &IndexTable {
        self.get_boundary(high).index()
    }

    /// `get_merge_matrices(dim)`: block-diagonal boundary of two shifted
    /// copies of the given dimension's boundary plus the `[I;I]` merge map
    /// (spec.md §4.C). The shift-by-one in x (the "B" copy) and y (the "C"
    /// copy) is applied to each column's bigrade only; the row/column
    /// structure of the underlying boundary matrix is duplicated unchanged.
    pub fn get_merge_matrices(&self, high: bool) -> (BigradedMatrix, BigradedMatrix, IndexTable) {
        let base = self.get_boundary(high).matrix();
        let n = base.ncols();
        let nrows = base.nrows();
        let mut columns = Vec::with_capacity(2 * n);
        let mut bigrades = Vec::with_capacity(2 * n);
        for c in 0..n {
            let bg = base.bigrade(c);
            let shifted = Bigrade::new(bg.x + 1, bg.y);
            columns.push(BigradedColumn {
                data: base.column(c).clone(),
                dim_index: base.dim_index(c),
                bigrade: shifted,
            });
            bigrades.push(shifted);
        }
        for c in 0..n {
            let bg = base.bigrade(c);
            let shifted = Bigrade::new(bg.x, bg.y + 1);
            columns.push(BigradedColumn {
                data: base.column(c).clone(),
                dim_index: base.dim_index(c),
                bigrade: shifted,
            });
            bigrades.push(shifted);
        }
        let bc = BigradedMatrix::new(nrows, columns);
        let index_bc = IndexTable::build(self.nx + 1, self.ny + 1, &bigrades);
        (bc, merge_matrix(n), index_bc)
    }

    /// `get_split_matrices(dim)`: the split map `A → B ⊕ C` for the given
    /// dimension's own boundary matrix (`split_matrix`, the transpose of
    /// the merge construction), paired with the *other* dimension's
    /// `bc`/index-table pair as the dual resource `eta`'s rank term needs.
    pub fn get_split_matrices(&self, high: bool) -> (BigradedMatrix, BigradedMatrix, IndexTable) {
        let n = self.get_boundary(high).matrix().ncols();
        let (bc_dual, _merge_dual, index_bc_dual) = self.get_merge_matrices(!high);
        (bc_dual, split_matrix(n), index_bc_dual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_table_gives_last_column_at_or_below() {
        let bigrades = vec![Bigrade::new(0, 0), Bigrade::new(1, 0), Bigrade::new(0, 1)];
        let t = IndexTable::build(2, 2, &bigrades);
        assert_eq!(t.get(0, 0), Some(0));
        assert_eq!(t.get(1, 0), Some(1));
        assert_eq!(t.get(0, 1), Some(2));
        assert_eq!(t.get(1, 1), Some(2));
    }

    #[test]
    fn merge_matrix_folds_both_copies_onto_d() {
        let m = merge_matrix(2);
        assert_eq!(m.nrows(), 2);
        assert_eq!(m.ncols(), 4);
        assert!(m.entry(0, 0) && m.entry(0, 2));
        assert!(m.entry(1, 1) && m.entry(1, 3));
    }

    #[test]
    fn split_matrix_is_the_transpose_of_merge_matrix() {
        let s = split_matrix(2);
        assert_eq!(s.nrows(), 4);
        assert_eq!(s.ncols(), 2);
        assert!(s.entry(0, 0) && s.entry(2, 0));
        assert!(s.entry(1, 1) && s.entry(3, 1));
    }
}
