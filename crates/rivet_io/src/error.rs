//! `IoError`: the narrow parsing/formatting error type for `rivet_io`'s two
//! textual formats.
//!
//! Grounded on `spicy_parser::error::SpicyError` (`#[error(transparent)]`
//! wrappers per concern, each leaf variant carrying structured context
//! instead of a formatted string).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("line {line}: {detail}")]
    Malformed { line: usize, detail: String },

    #[error("grade vector for axis {axis} is not strictly increasing at line {line}")]
    NonMonotoneGrades { axis: &'static str, line: usize },

    #[error("expected header {expected:?}, found {found:?}")]
    BadHeader { expected: &'static str, found: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
