//! Progress reporting for bulk operations.
//!
//! Hashing and deletion batches both push one event per processed file
//! through a [`ProgressSink`]. The sink is the only coupling point to the
//! caller: a UI shell can forward events to a channel, a CLI can redraw a
//! line, tests can collect them into a `Vec`.

use std::sync::atomic::{AtomicUsize, Ordering};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Which phase of the pipeline a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Loading candidate files into the catalog.
    Load,
    /// Hashing files during duplicate detection.
    Hash,
    /// Deleting redundant copies.
    Delete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load => write!(f, "Loading"),
            Self::Hash => write!(f, "Hashing"),
            Self::Delete => write!(f, "Deleting"),
        }
    }
}

/// One progress event: emitted after each completed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// The phase this event belongs to.
    pub phase: Phase,
    /// Files processed so far, starting at 1 for the first event.
    pub index: usize,
    /// Total files in the batch.
    pub total: usize,
    /// Name of the file just processed.
    pub current_name: CompactString,
}

impl ProgressEvent {
    /// Progress as an integer percentage (0-100).
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.index * 100) / self.total) as u8
    }
}

/// Receiver side of progress reporting.
pub trait ProgressSink: Send + Sync {
    /// Handle one progress event.
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// A sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Per-batch progress counter.
///
/// The processed count is a shared atomic so that parallel hashers can
/// report completion in any order while the emitted `index` stays
/// monotonically increasing and reaches `total` exactly once.
pub struct ProgressReporter<'a> {
    phase: Phase,
    total: usize,
    done: AtomicUsize,
    sink: &'a dyn ProgressSink,
}

impl<'a> ProgressReporter<'a> {
    /// Create a reporter for a batch of `total` files.
    pub fn new(phase: Phase, total: usize, sink: &'a dyn ProgressSink) -> Self {
        Self {
            phase,
            total,
            done: AtomicUsize::new(0),
            sink,
        }
    }

    /// The batch size this reporter was created for.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Record one completed file and emit an event for it.
    pub fn file_done(&self, name: &str) {
        let index = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        self.sink.emit(ProgressEvent {
            phase: self.phase,
            index,
            total: self.total,
            current_name: CompactString::from(name),
        });
    }
}

impl std::fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("phase", &self.phase)
            .field("total", &self.total)
            .field("done", &self.done.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_percent_formula() {
        let ev = ProgressEvent {
            phase: Phase::Hash,
            index: 1,
            total: 3,
            current_name: "a.jpg".into(),
        };
        assert_eq!(ev.percent(), 33);

        let ev = ProgressEvent {
            phase: Phase::Hash,
            index: 3,
            total: 3,
            current_name: "c.jpg".into(),
        };
        assert_eq!(ev.percent(), 100);
    }

    #[test]
    fn test_reporter_sequence() {
        let events: Mutex<Vec<ProgressEvent>> = Mutex::new(Vec::new());
        let sink = |ev: ProgressEvent| events.lock().unwrap().push(ev);
        let reporter = ProgressReporter::new(Phase::Delete, 2, &sink);

        reporter.file_done("a.jpg");
        reporter.file_done("b.jpg");

        let events = events.into_inner().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].index, 1);
        assert_eq!(events[0].total, 2);
        assert_eq!(events[1].index, 2);
        assert_eq!(events[1].percent(), 100);
    }
}
