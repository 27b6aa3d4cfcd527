//! Page driver capability trait and the snapshot-diff observer.
//!
//! The extraction engine never touches a live page directly. Everything it
//! needs (DOM snapshots, scroll state, simulated clicks, storages, the
//! framework state graph) goes through [`PageDriver`], so the pipeline
//! runs identically against a browser bridge or a scripted test double.
//!
//! All waits are expressed through [`PageDriver::wait`]; elapsed time is
//! accounted as the sum of requested intervals, which keeps every bounded
//! observation deterministic under test.

use serde_json::Value;

/// Position of an element inside the current snapshot: the `index`-th
/// match of `selector` in document order. Handles are recomputed from each
/// fresh snapshot and never survive a DOM change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub selector: String,
    pub index: usize,
}

impl ElementHandle {
    #[must_use]
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        Self {
            selector: selector.into(),
            index,
        }
    }
}

/// Scroll geometry of one container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    /// Total scrollable extent.
    pub scroll_height: u64,
    /// Visible extent.
    pub client_height: u64,
}

impl ScrollMetrics {
    /// Whether the container has overflow worth scrolling.
    #[must_use]
    pub fn is_scrollable(&self) -> bool {
        self.scroll_height > self.client_height
    }
}

/// Which key-value storage to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Short-lived, per-session storage.
    Session,
    /// Long-lived storage.
    Local,
}

impl StorageKind {
    /// Store name used when tagging hits.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Local => "local",
        }
    }
}

/// One object store dumped from a structured client-side database.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    pub database: String,
    pub store: String,
    pub entries: Vec<Value>,
}

/// Capability surface over the live listing page.
///
/// Only `html`, `scroll`, `click`, and `wait` are required; the richer
/// capabilities default to "absent" so minimal drivers stay easy to write
/// and every resolver strategy built on them degrades to a miss.
pub trait PageDriver {
    /// Serialized current DOM. Called freshly wherever staleness matters.
    fn html(&mut self) -> String;

    /// Scroll geometry for the element at `handle`, if it exists.
    fn scroll_metrics(&mut self, handle: &ElementHandle) -> Option<ScrollMetrics>;

    /// Scroll the element at `handle` to its bottom.
    fn scroll_to_bottom(&mut self, handle: &ElementHandle);

    /// Attempt to activate the element at `handle`, synthetic event
    /// dispatch included. Returns whether any activation fired.
    fn click(&mut self, handle: &ElementHandle) -> bool;

    /// Let the page run for `ms` milliseconds.
    fn wait(&mut self, ms: u64);

    /// Key-value entries of the given storage.
    fn storage_entries(&mut self, _kind: StorageKind) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Globally reachable framework state/cache graph, if exposed.
    fn state_graph(&mut self) -> Option<Value> {
        None
    }

    /// Structured client-side database dumps.
    fn record_stores(&mut self) -> Vec<RecordStore> {
        Vec::new()
    }

    /// Current values of form inputs (reveal overlays render some
    /// addresses into inputs rather than text nodes).
    fn form_values(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// Poll `check` until it yields a value or `timeout_ms` elapses.
///
/// The snapshot-diff contract: the caller captures pre-action state,
/// performs the action, then polls post-action observable state for a
/// difference. There is no open-ended wait; the hard timeout always
/// terminates the observation.
pub fn observe<T>(
    driver: &mut dyn PageDriver,
    timeout_ms: u64,
    interval_ms: u64,
    mut check: impl FnMut(&mut dyn PageDriver) -> Option<T>,
) -> Option<T> {
    if let Some(found) = check(driver) {
        return Some(found);
    }
    let interval = interval_ms.max(1);
    let mut elapsed = 0u64;
    while elapsed < timeout_ms {
        // Clamp the last wait so the total never exceeds the timeout.
        let step = interval.min(timeout_ms - elapsed);
        driver.wait(step);
        elapsed += step;
        if let Some(found) = check(driver) {
            return Some(found);
        }
    }
    None
}
