//! Component B: RU decomposition and the vineyard adjacent-swap case
//! analysis (spec.md §4.B, §4.H.4).
//!
//! Grounded on `examples/original_source/math/barcode_calculator.cpp`'s
//! `move_low_columns`/`move_high_columns` for the exact case structure, and
//! on `map_matrix.hpp`'s `col_reduce` for the initial reduction loop.

use crate::matrix::BigradedMatrix;

/// An R/U pair satisfying `R*U == boundary`, R reduced, U upper-unitriangular.
#[derive(Debug, Clone)]
pub struct Ru {
    pub r: BigradedMatrix,
    pub u: BigradedMatrix,
}

impl Ru {
    /// Reduces `boundary` to R and records the column operations performed
    /// as U, so that `R*U == boundary` (spec.md §4.B, §4.H.2).
    ///
    /// Each step adds column `k` (already reduced, `k < j`) into column `j`
    /// of R. The mirrored U update is a *row* operation: `U[k,:] ^= U[j,:]`
    /// (`u.add_row(src = j, dst = k)`) rather than a column mirror — adding
    /// an earlier column into a later one in R corresponds to adding the
    /// later row into the earlier row of U, which keeps `R*U` invariant
    /// over GF(2) elementary column-addition matrices.
    pub fn decompose(boundary: BigradedMatrix) -> Self {
        let ncols = boundary.ncols();
        let mut r = boundary;
        let u = BigradedMatrix::identity(ncols);
        let mut u = u;
        for j in 0..ncols {
            loop {
                let Some(low_j) = r.low(j) else { break };
                let pivot_col = (0..j).find(|&k| r.low(k) == Some(low_j));
                match pivot_col {
                    Some(k) => {
                        r.add_column(k, j);
                        u.add_row(j, k);
                    }
                    None => break,
                }
            }
        }
        r.rebuild_low_lookup();
        Self { r, u }
    }
}

/// Transposes columns `(a, a+1)` of the low-dimensional RU pair, mirroring
/// the change into the high-dimensional pair where the classification of
/// column `a` in `R_high` is involved. Implements spec.md §4.H.4 cases
/// 1/1.1, 2/2.1/2.1.1/2.1.2/2.2, 3/3.1/3.2, 4.
pub fn swap_adjacent_low(
    r_low: &mut BigradedMatrix,
    u_low: &mut BigradedMatrix,
    r_high: &mut BigradedMatrix,
    u_high: &mut BigradedMatrix,
    a: usize,
) {
    let b = a + 1;
    let a_pos = r_low.low(a).is_none();
    let b_pos = r_low.low(b).is_none();

    if a_pos {
        if b_pos {
            // Case 1.
            let k = r_high.find_low(a);
            let l = r_high.find_low(b);
            let rhal = l.is_some_and(|l| r_high.entry(a, l));
            u_low.ensure_zero_via_row_add(a, b);
            u_low.swap_columns(a, false);
            u_low.swap_rows(a, false);
            if let (Some(k), true) = (k, rhal) {
                let l = l.expect("rhal implies l is Some");
                // Case 1.1.
                if k < l {
                    r_high.swap_rows(a, true);
                    r_high.add_column(k, l);
                    u_high.add_row(l, k);
                } else {
                    r_high.swap_rows(a, false);
                    r_high.add_column(l, k);
                    u_high.add_row(k, l);
                }
            } else {
                r_high.swap_rows(a, !rhal);
            }
        } else {
            // Case 4.
            u_low.ensure_zero_via_row_add(a, b);
            r_low.swap_columns(a, true);
            r_high.swap_rows(a, true);
            u_low.swap_columns(a, false);
            u_low.swap_rows(a, false);
        }
        return;
    }

    if b_pos {
        // Case 3.
        let l = r_high.find_low(b);
        let rhal = l.is_some_and(|l| r_high.entry(a, l));
        r_high.swap_rows(a, !rhal);
        if u_low.entry(a, b) {
            // Case 3.1: U update only, R unchanged.
            u_low.add_row(b, a);
            u_low.swap_rows(a, false);
            u_low.add_row(b, a);
        } else {
            // Case 3.2.
            r_low.swap_columns(a, true);
            u_low.swap_rows(a, false);
        }
    } else {
        // Case 2.
        r_high.swap_rows(a, false);
        if u_low.entry(a, b) {
            // Case 2.1.
            u_low.add_row(b, a);
            u_low.swap_rows(a, false);
            let low_a = r_low.low(a).expect("b_pos is false: a is negative");
            let low_b = r_low.low(b).expect("b_pos is false: b is negative");
            if low_a < low_b {
                // Case 2.1.1.
                r_low.add_column(a, b);
                r_low.swap_columns(a, true);
            } else {
                // Case 2.1.2.
                r_low.add_column(a, b);
                r_low.swap_columns(a, false);
                r_low.add_column(a, b);
                u_low.add_row(b, a);
            }
        } else {
            // Case 2.2.
            r_low.swap_columns(a, true);
            u_low.swap_rows(a, false);
        }
    }
    u_low.swap_columns(a, false);
}

/// Symmetric case analysis for the high-dimensional pair alone (no
/// cross-matrix interaction, since there is no matrix "above" R_high).
pub fn swap_adjacent_high(r_high: &mut BigradedMatrix, u_high: &mut BigradedMatrix, a: usize) {
    let b = a + 1;
    let a_pos = r_high.low(a).is_none();
    let b_pos = r_high.low(b).is_none();

    if a_pos {
        if !b_pos {
            r_high.swap_columns(a, true);
        }
        u_high.ensure_zero_via_row_add(a, b);
        u_high.swap_columns(a, false);
        u_high.swap_rows(a, false);
        return;
    }

    if b_pos {
        // Case 3.
        if u_high.entry(a, b) {
            u_high.add_row(b, a);
            u_high.swap_rows(a, false);
            u_high.add_row(b, a);
        } else {
            r_high.swap_columns(a, true);
            u_high.swap_rows(a, false);
        }
    } else {
        // Case 2.
        if u_high.entry(a, b) {
            u_high.add_row(b, a);
            u_high.swap_rows(a, false);
            let low_a = r_high.low(a).expect("b_pos is false: a is negative");
            let low_b = r_high.low(b).expect("b_pos is false: b is negative");
            if low_a < low_b {
                r_high.add_column(a, b);
                r_high.swap_columns(a, true);
            } else {
                r_high.add_column(a, b);
                r_high.swap_columns(a, false);
                r_high.add_column(a, b);
                u_high.add_row(b, a);
            }
        } else {
            r_high.swap_columns(a, true);
            u_high.swap_rows(a, false);
        }
    }
    u_high.swap_columns(a, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{Bigrade, BigradedColumn, SparseColumn};

    fn col(rows: Vec<usize>) -> BigradedColumn {
        BigradedColumn {
            data: SparseColumn::from_rows(rows),
            dim_index: 0,
            bigrade: Bigrade::new(0, 0),
        }
    }

    #[test]
    fn decompose_satisfies_ru_equals_boundary() {
        // boundary of a 2-simplex's edges onto its vertices (a triangle).
        let boundary = BigradedMatrix::new(3, vec![col(vec![1, 0]), col(vec![2, 1]), col(vec![2, 0])]);
        let ru = Ru::decompose(boundary.clone());
        assert!(ru.r.check_invariants(true).is_ok());
        assert_eq!(ru.r.dense_product(&ru.u), boundary.dense());
    }

    #[test]
    fn swap_adjacent_low_preserves_ru_invariant_case2() {
        // Two negative columns sharing no row structure surprises: build a
        // small boundary where both a, a+1 are negative in R_low.
        let boundary = BigradedMatrix::new(3, vec![col(vec![0]), col(vec![1]), col(vec![2])]);
        let mut ru_low = Ru::decompose(boundary.clone());
        let high_boundary = BigradedMatrix::new(3, vec![col(vec![]), col(vec![]), col(vec![])]);
        let mut ru_high = Ru::decompose(high_boundary);
        swap_adjacent_low(
            &mut ru_low.r,
            &mut ru_low.u,
            &mut ru_high.r,
            &mut ru_high.u,
            0,
        );
        assert!(ru_low.u.check_invariants(false).is_ok());
    }
}
