//! `RivetError`: the umbrella error type of spec.md §7.
//!
//! Grounded on `spicy_simulate/src/error.rs` (`SimulationError` wraps
//! per-module error enums via `#[from]`) and `spicy_parser/src/error.rs`
//! (`SpicyError`'s per-kind granularity with structured context fields).

use thiserror::Error;

use crate::matrix::{Bigrade, MatrixError};

#[derive(Debug, Error)]
pub enum ArrangementError {
    #[error("anchors {a:?} and {b:?} map to the same dual point {point:?}")]
    DegenerateAnchor {
        a: Bigrade,
        b: Bigrade,
        point: (usize, usize),
    },

    #[error("face {face} boundary chain is not a cycle")]
    BrokenFaceCycle { face: usize },

    #[error("half-edge {edge} has no twin")]
    MissingTwin { edge: usize },
}

#[derive(Debug, Error)]
pub enum FirepError {
    #[error("grade vector for axis {axis} is not strictly increasing at index {index}")]
    NonMonotoneGrades { axis: &'static str, index: usize },

    #[error("bigrade {bigrade:?} references grade index out of range (nx={nx}, ny={ny})")]
    BigradeOutOfRange { bigrade: Bigrade, nx: usize, ny: usize },

    #[error("boundary dimensions are inconsistent: low has {low_rows} rows, high has {high_cols} columns")]
    DimensionMismatch { low_rows: usize, high_cols: usize },
}

#[derive(Debug, Error)]
pub enum UpdaterError {
    #[error("invariant violated after crossing anchor {anchor:?}: {detail}")]
    InvariantViolation { anchor: Bigrade, detail: String },

    #[error("partition map has no entry for column {column}")]
    MissingPartitionEntry { column: usize },
}

/// The top-level error umbrella returned by every public `rivet_core`
/// operation, per spec.md §7's five kinds.
#[derive(Debug, Error)]
pub enum RivetError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] FirepError),

    #[error("degenerate anchor: {0}")]
    DegenerateAnchor(#[source] ArrangementError),

    #[error("internal invariant violation: {0}")]
    InvariantViolation(#[source] UpdaterError),

    #[error("matrix invariant violation: {0}")]
    MatrixInvariant(#[from] MatrixError),

    #[error("arrangement error: {0}")]
    Arrangement(#[from] ArrangementError),

    #[error("computation cancelled")]
    Cancelled,

    #[error("resource limit exceeded: {resource} limit {limit} reached")]
    ResourceExceeded { resource: &'static str, limit: usize },
}

impl RivetError {
    /// The §7 error-kind label, used by the CLI's "ERROR: <kind>: <detail>"
    /// output.
    pub fn kind(&self) -> &'static str {
        match self {
            RivetError::MalformedInput(_) => "MalformedInput",
            RivetError::DegenerateAnchor(_) => "DegenerateAnchor",
            RivetError::InvariantViolation(_) => "InvariantViolation",
            RivetError::MatrixInvariant(_) => "InvariantViolation",
            RivetError::Arrangement(_) => "InvariantViolation",
            RivetError::Cancelled => "Cancelled",
            RivetError::ResourceExceeded { .. } => "ResourceExceeded",
        }
    }
}
