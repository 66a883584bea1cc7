//! `rivet_io`: the narrow external-interface crate of spec.md §6 —
//! bifiltration input parsing, the on-disk persistence format, and the
//! progress/cancellation collaborator trait. No computation lives here;
//! everything is handed to or read back from `rivet_core`.
//!
//! Grounded on the `spicy_parser` / `spicy_simulate` split: parsing and
//! external formats stay in their own crate, separate from the numerical
//! core, so `rivet_cli` depends on both but neither depends on the other.

pub mod bifiltration_input;
pub mod error;
pub mod format;
pub mod progress;

pub use bifiltration_input::{BifiltrationInput, RawColumn};
pub use error::IoError;
pub use progress::{NullProgressSink, ProgressSink, RecordingProgressSink};
