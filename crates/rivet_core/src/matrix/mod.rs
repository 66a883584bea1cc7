//! Component A: the sparse bigraded GF(2) matrix (spec.md §3, §4.A).

pub mod bigraded;
pub mod column;
pub mod error;

pub use bigraded::{Bigrade, BigradedColumn, BigradedMatrix};
pub use column::SparseColumn;
pub use error::MatrixError;
