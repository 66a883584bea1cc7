//! The bigraded sparse GF(2) matrix (component A of spec §4.A), reused as
//! both R and U in the RU decomposition (§9 "dynamic dispatch over matrix
//! flavors": one generic type, not a class hierarchy).
//!
//! Grounded on `spicy_simulate/src/solver/matrix/csc.rs` for the
//! builder/accessor shape and `examples/original_source/map_matrix.hpp` for
//! the descending-column GF(2) semantics.

use std::collections::HashMap;

use super::column::SparseColumn;
use super::error::MatrixError;

/// A bigrade (x, y): a pair of indices into externally supplied grade
/// vectors. Compared with the product order; `Ord` here additionally gives
/// the reverse-lexicographic column order spec.md §3 requires: (y1,x1) <
/// (y2,x2) iff y1<y2, or y1==y2 and x1<x2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bigrade {
    pub x: usize,
    pub y: usize,
}

impl Bigrade {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn le(&self, other: &Bigrade) -> bool {
        self.x <= other.x && self.y <= other.y
    }

    pub fn incomparable(&self, other: &Bigrade) -> bool {
        !self.le(other) && !other.le(self)
    }

    pub fn join(&self, other: &Bigrade) -> Bigrade {
        Bigrade::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Reverse-lex key used to order columns: (y, x).
    pub fn sort_key(&self) -> (usize, usize) {
        (self.y, self.x)
    }
}

/// One column of a bigraded matrix: its GF(2) data plus the metadata
/// spec.md §3 attaches to every column.
#[derive(Clone, Debug)]
pub struct BigradedColumn {
    pub data: SparseColumn,
    pub dim_index: usize,
    pub bigrade: Bigrade,
}

/// Sparse GF(2) column-major matrix with a row permutation and "lowest 1"
/// tracking. Serves as both the plain Bigraded Matrix (component A) and the
/// R/U matrices of an RU decomposition (component B); the `low_to_col`
/// lookup is only refreshed on request (`update_lows`), matching the
/// contract spec.md §4.A states for `swap_columns`/`swap_rows`.
#[derive(Clone, Debug)]
pub struct BigradedMatrix {
    nrows: usize,
    columns: Vec<BigradedColumn>,
    low_to_col: HashMap<usize, usize>,
}

impl BigradedMatrix {
    pub fn new(nrows: usize, columns: Vec<BigradedColumn>) -> Self {
        let mut m = Self {
            nrows,
            columns,
            low_to_col: HashMap::new(),
        };
        m.rebuild_low_lookup();
        m
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, c: usize) -> &SparseColumn {
        &self.columns[c].data
    }

    pub fn dim_index(&self, c: usize) -> usize {
        self.columns[c].dim_index
    }

    pub fn bigrade(&self, c: usize) -> Bigrade {
        self.columns[c].bigrade
    }

    pub fn is_empty(&self, c: usize) -> bool {
        self.columns[c].data.is_empty()
    }

    pub fn low(&self, c: usize) -> Option<usize> {
        self.columns[c].data.low()
    }

    pub fn entry(&self, r: usize, c: usize) -> bool {
        self.columns[c].data.contains(r)
    }

    pub fn set(&mut self, r: usize, c: usize) {
        self.columns[c].data.insert(r);
    }

    pub fn clear(&mut self, r: usize, c: usize) {
        self.columns[c].data.remove(r);
    }

    /// Rebuilds the low-to-column lookup from scratch. Call after a batch
    /// of operations performed with `update_lows = false`.
    pub fn rebuild_low_lookup(&mut self) {
        self.low_to_col.clear();
        for (idx, col) in self.columns.iter().enumerate() {
            if let Some(low) = col.data.low() {
                self.low_to_col.insert(low, idx);
            }
        }
    }

    /// Returns the unique column with `low() == Some(row)`, using the
    /// maintained lookup (stale if `update_lows` was skipped on a prior op).
    pub fn find_low(&self, row: usize) -> Option<usize> {
        self.low_to_col.get(&row).copied()
    }

    /// dst ⊕= src (GF(2) column addition). `low_to_col` is not touched;
    /// callers that rely on `find_low` afterward must `rebuild_low_lookup`
    /// or otherwise account for the pivot change directly.
    pub fn add_column(&mut self, src: usize, dst: usize) {
        let src_col = self.columns[src].data.clone();
        self.columns[dst].data.add_assign(&src_col);
    }

    /// dst_row ⊕= src_row across every column (the U-side mirror of
    /// `add_column` under the vineyard case analysis).
    pub fn add_row(&mut self, src_row: usize, dst_row: usize) {
        for col in &mut self.columns {
            if col.data.contains(src_row) {
                col.data.toggle(dst_row);
            }
        }
    }

    /// Swaps columns `i` and `i+1`. If `update_lows`, the lookup entries for
    /// the two (possibly absent) pivots are patched in place rather than
    /// requiring a full rebuild.
    pub fn swap_columns(&mut self, i: usize, update_lows: bool) {
        let low_i = self.columns[i].data.low();
        let low_i1 = self.columns[i + 1].data.low();
        self.columns.swap(i, i + 1);
        if update_lows {
            if let Some(l) = low_i {
                self.low_to_col.insert(l, i + 1);
            }
            if let Some(l) = low_i1 {
                self.low_to_col.insert(l, i);
            }
        }
    }

    /// Swaps rows `r` and `r+1` in every column.
    pub fn swap_rows(&mut self, r: usize, update_lows: bool) {
        for col in &mut self.columns {
            col.data.swap_adjacent_rows(r);
        }
        if update_lows {
            self.rebuild_low_lookup();
        }
    }

    /// Ensures `entry(a,b) == false` by adding row `b` into row `a` if
    /// necessary (the `U.clear(a,b)` primitive used throughout the vineyard
    /// case analysis, per spec.md §4.H.4).
    pub fn ensure_zero_via_row_add(&mut self, a: usize, b: usize) {
        if self.entry(a, b) {
            self.add_row(b, a);
        }
    }

    /// Validates the structural invariants spec.md §12 asks every sparse
    /// matrix to check: strictly descending row order per column (enforced
    /// by construction) and, when `expect_reduced`, pairwise-distinct
    /// nonzero lows.
    pub fn check_invariants(&self, expect_reduced: bool) -> Result<(), MatrixError> {
        if expect_reduced {
            let mut seen: HashMap<usize, usize> = HashMap::new();
            for (idx, col) in self.columns.iter().enumerate() {
                if let Some(low) = col.data.low() {
                    if let Some(&other) = seen.get(&low) {
                        return Err(MatrixError::DuplicateLow {
                            col: idx,
                            other,
                            low,
                        });
                    }
                    seen.insert(low, idx);
                }
            }
        }
        for col in &self.columns {
            for &r in col.data.rows() {
                if r >= self.nrows {
                    return Err(MatrixError::RowOutOfBounds {
                        row: r,
                        nrows: self.nrows,
                    });
                }
            }
        }
        Ok(())
    }

    /// The identity matrix over `n` rows/columns (used as the initial U).
    pub fn identity(n: usize) -> Self {
        let columns = (0..n)
            .map(|i| BigradedColumn {
                data: SparseColumn::from_descending(vec![i]),
                dim_index: i,
                bigrade: Bigrade::new(0, 0),
            })
            .collect();
        Self::new(n, columns)
    }

    /// Dense GF(2) product `self * rhs`, for invariant checking in tests
    /// (spec.md §8: "R*U equals the current boundary matrix, test by
    /// explicit multiplication").
    pub fn dense_product(&self, rhs: &BigradedMatrix) -> Vec<Vec<bool>> {
        assert_eq!(self.ncols(), rhs.nrows());
        let mut out = vec![vec![false; rhs.ncols()]; self.nrows()];
        for c in 0..rhs.ncols() {
            for &k in rhs.column(c).rows() {
                for &r in self.column(k).rows() {
                    out[r][c] = !out[r][c];
                }
            }
        }
        out
    }

    pub fn dense(&self) -> Vec<Vec<bool>> {
        let mut out = vec![vec![false; self.ncols()]; self.nrows()];
        for (c, col) in self.columns.iter().enumerate() {
            for &r in col.data.rows() {
                out[r][c] = true;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(rows: Vec<usize>, dim_index: usize) -> BigradedColumn {
        BigradedColumn {
            data: SparseColumn::from_rows(rows),
            dim_index,
            bigrade: Bigrade::new(0, 0),
        }
    }

    #[test]
    fn add_column_is_symmetric_difference() {
        let mut m = BigradedMatrix::new(4, vec![col(vec![3, 1], 0), col(vec![3, 0], 1)]);
        m.add_column(0, 1);
        assert_eq!(m.column(1).rows(), &[1, 0]);
    }

    #[test]
    fn find_low_after_rebuild() {
        let m = BigradedMatrix::new(4, vec![col(vec![3, 1], 0), col(vec![2], 1)]);
        assert_eq!(m.find_low(3), Some(0));
        assert_eq!(m.find_low(2), Some(1));
        assert_eq!(m.find_low(0), None);
    }

    #[test]
    fn swap_columns_patches_lookup() {
        let mut m = BigradedMatrix::new(4, vec![col(vec![3], 0), col(vec![2], 1)]);
        m.swap_columns(0, true);
        assert_eq!(m.find_low(3), Some(1));
        assert_eq!(m.find_low(2), Some(0));
    }

    #[test]
    fn check_invariants_detects_duplicate_low() {
        let m = BigradedMatrix::new(4, vec![col(vec![2], 0), col(vec![2], 1)]);
        assert!(m.check_invariants(true).is_err());
        assert!(m.check_invariants(false).is_ok());
    }

    #[test]
    fn identity_dense_product_is_identity_on_rhs() {
        let id = BigradedMatrix::identity(3);
        let b = BigradedMatrix::new(3, vec![col(vec![2, 0], 0), col(vec![1], 1)]);
        let prod = b.dense_product(&id);
        assert_eq!(prod, b.dense());
    }
}
