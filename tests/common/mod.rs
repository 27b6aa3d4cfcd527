//! Scripted page driver shared by the integration tests.

use std::collections::HashMap;

use lead_scrape::dom;
use lead_scrape::page::{ElementHandle, PageDriver, ScrollMetrics, StorageKind};
use serde_json::Value;

/// Deterministic driver over a fixed sequence of page snapshots.
///
/// Clicks are interpreted from the clicked element itself: pagination
/// controls advance to the next scripted page, reveal controls schedule
/// an email injection that lands on the next `wait`.
pub struct ScriptedDriver {
    pub pages: Vec<String>,
    pub current: usize,
    pub waited_ms: u64,
    pub clicks: usize,
    /// Clicks that landed on a reveal control, tallied separately
    /// because each one costs a platform credit.
    pub email_clicks: usize,
    pub storage: Vec<(String, String)>,
    pub graph: Option<Value>,
    /// Name substring in the clicked control's aria-label -> address to
    /// inject into a popover region.
    pub reveals: HashMap<String, String>,
    pending_reveal: Option<String>,
}

impl ScriptedDriver {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            current: 0,
            waited_ms: 0,
            clicks: 0,
            email_clicks: 0,
            storage: Vec::new(),
            graph: None,
            reveals: HashMap::new(),
            pending_reveal: None,
        }
    }

    pub fn single(page: impl Into<String>) -> Self {
        Self::new(vec![page.into()])
    }

    fn clicked_descriptor(&self, handle: &ElementHandle) -> Option<(String, String, String)> {
        let doc = dom::parse(&self.pages[self.current]);
        let sel = doc.select(&handle.selector);
        let node = sel.nodes().get(handle.index).copied()?;
        let el = dom::Selection::from(node);
        Some((
            dom::text(&el),
            dom::attr(&el, "aria-label"),
            dom::attr(&el, "rel"),
        ))
    }
}

impl PageDriver for ScriptedDriver {
    fn html(&mut self) -> String {
        self.pages[self.current].clone()
    }

    fn scroll_metrics(&mut self, _handle: &ElementHandle) -> Option<ScrollMetrics> {
        Some(ScrollMetrics {
            scroll_height: 1_000,
            client_height: 400,
        })
    }

    fn scroll_to_bottom(&mut self, _handle: &ElementHandle) {}

    fn click(&mut self, handle: &ElementHandle) -> bool {
        self.clicks += 1;
        let Some((text, aria, rel)) = self.clicked_descriptor(handle) else {
            return false;
        };
        let lowered = format!("{} {}", text.to_lowercase(), aria.to_lowercase());
        if rel == "next" || lowered.contains("next") {
            if self.current + 1 < self.pages.len() {
                self.current += 1;
                return true;
            }
            return false;
        }
        if lowered.contains("email") {
            self.email_clicks += 1;
            let injected = self
                .reveals
                .iter()
                .find(|(name, _)| aria.to_lowercase().contains(&name.to_lowercase()))
                .map(|(_, email)| email.clone());
            self.pending_reveal = injected;
            return true;
        }
        true
    }

    fn wait(&mut self, ms: u64) {
        self.waited_ms += ms;
        if let Some(email) = self.pending_reveal.take() {
            let page = &mut self.pages[self.current];
            let injected = format!("<div role=\"dialog\">{email}</div></body>");
            *page = page.replace("</body>", &injected);
        }
    }

    fn storage_entries(&mut self, _kind: StorageKind) -> Vec<(String, String)> {
        self.storage.clone()
    }

    fn state_graph(&mut self) -> Option<Value> {
        self.graph.clone()
    }
}
