//! Progress reporting hooks.
//!
//! Long traversals and reveal passes report through a sink trait so a
//! caller can surface them however it likes. The engine never blocks on
//! a sink.

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A traversal page finished extracting.
    Scrape {
        page: usize,
        current_rows: usize,
        new_rows: usize,
    },
    /// One reveal attempt finished.
    Reveal {
        current: usize,
        total: usize,
        info: String,
    },
}

/// Receiver for [`ProgressEvent`]s.
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn emit(&mut self, _event: ProgressEvent) {}
}

/// Sink that records events, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
}

impl ProgressSink for RecordingProgress {
    fn emit(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}
