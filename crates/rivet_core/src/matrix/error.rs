//! Errors for the sparse bigraded matrix, grounded on
//! `spicy_simulate/src/solver/matrix/error.rs`'s structured-field style.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    #[error("column {col} has duplicate low {low} shared with column {other}")]
    DuplicateLow {
        col: usize,
        other: usize,
        low: usize,
    },

    #[error("row index {row} out of bounds (matrix has {nrows} rows)")]
    RowOutOfBounds { row: usize, nrows: usize },

    #[error("column index {col} out of bounds (matrix has {ncols} columns)")]
    ColumnOutOfBounds { col: usize, ncols: usize },

    #[error("adjacent swap requires i+1 < ncols, got i={i}, ncols={ncols}")]
    NotAdjacent { i: usize, ncols: usize },
}
