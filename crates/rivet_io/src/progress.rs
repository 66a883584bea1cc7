//! The progress/cancellation collaborator, spec.md §5, §6: an opaque
//! interface the core calls at stage boundaries and between path-planner
//! crossings, without owning a logging dependency of its own.
//!
//! Grounded on `spicy_simulate`'s callback-free, single-threaded driver
//! loop — there is no equivalent trait in the teacher, so this one is new,
//! shaped the way `spicy_simulate::lib::simulate` reports step counts back
//! to its caller via a plain return value rather than a callback (here a
//! trait object, since spec.md §6 calls for a push interface instead).

/// Implemented by the caller; the core never logs, it only calls this.
pub trait ProgressSink {
    /// Reports progress within `stage` (e.g. `"support"`, `"arrangement"`,
    /// `"initial_ru"`, `"path"`), `current` of `max` units complete.
    fn report(&mut self, stage: &str, current: usize, max: usize);

    /// Polled between crossings and between bigrade sweep iterations
    /// (spec.md §5); returning `true` aborts the computation with
    /// `RivetError::Cancelled`.
    fn check_cancel(&self) -> bool {
        false
    }
}

/// The default collaborator: reports nothing, never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn report(&mut self, _stage: &str, _current: usize, _max: usize) {}
}

/// A collaborator that records every report call, useful for tests and for
/// a `-V` verbose CLI mode that prints a running count.
#[derive(Debug, Default, Clone)]
pub struct RecordingProgressSink {
    pub events: Vec<(String, usize, usize)>,
    pub cancel_after: Option<usize>,
}

impl ProgressSink for RecordingProgressSink {
    fn report(&mut self, stage: &str, current: usize, max: usize) {
        self.events.push((stage.to_string(), current, max));
    }

    fn check_cancel(&self) -> bool {
        self.cancel_after.is_some_and(|limit| self.events.len() >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_cancels_after_configured_event_count() {
        let mut sink = RecordingProgressSink {
            cancel_after: Some(2),
            ..Default::default()
        };
        sink.report("support", 1, 1);
        assert!(!sink.check_cancel());
        sink.report("arrangement", 1, 1);
        assert!(sink.check_cancel());
    }
}
