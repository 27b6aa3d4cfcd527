//! Configuration options for scrape traversal and extraction.
//!
//! The `ScrapeOptions` struct carries every cap and delay used by the
//! pipeline. All waits are bounded so a traversal can never hang.

/// Configuration options for a scrape run.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use lead_scrape::ScrapeOptions;
///
/// let options = ScrapeOptions {
///     max_pages: 10,
///     ..ScrapeOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Maximum number of scroll/paginate iterations before the traversal
    /// is forced to terminate.
    ///
    /// Default: `80`
    pub max_pages: usize,

    /// Maximum auto-scroll attempts per page position.
    ///
    /// Default: `60`
    pub scroll_max_iterations: usize,

    /// Consecutive attempts with an unchanged scroll extent after which the
    /// container is considered fully scrolled.
    ///
    /// Default: `3`
    pub scroll_settle_rounds: usize,

    /// Delay between scroll attempts, in milliseconds.
    ///
    /// Default: `500`
    pub scroll_delay_ms: u64,

    /// Extra wait after scrolling settles, allowing lazy rows to render.
    ///
    /// Default: `300`
    pub render_delay_ms: u64,

    /// Short settle wait used by the single-pass path in lieu of scrolling.
    ///
    /// Default: `200`
    pub single_pass_delay_ms: u64,

    /// Timeout for detecting new content after a pagination click, in
    /// milliseconds.
    ///
    /// Default: `3000`
    pub page_change_timeout_ms: u64,

    /// One extra grace wait applied when no content change was detected.
    ///
    /// Default: `800`
    pub page_change_grace_ms: u64,

    /// Minimum rendered-text-length delta treated as a content change.
    ///
    /// Default: `50`
    pub page_change_min_delta: usize,

    /// Timeout for observing a revealed address after a reveal click, in
    /// milliseconds.
    ///
    /// Default: `4000`
    pub reveal_timeout_ms: u64,

    /// Polling interval while observing for a revealed address.
    ///
    /// Default: `300`
    pub reveal_poll_ms: u64,

    /// Delay between reveal attempts on consecutive rows.
    ///
    /// Default: `250`
    pub reveal_delay_ms: u64,

    /// Depth bound for framework-state and record-store graph mining.
    ///
    /// Default: `5`
    pub state_scan_depth: usize,

    /// Shallower depth bound for the global person-array scan.
    ///
    /// Default: `4`
    pub window_scan_depth: usize,

    /// Ascent cap when climbing from a profile link to its row container.
    ///
    /// Default: `6`
    pub container_ascent_cap: usize,

    /// Maximum number of tags kept per record.
    ///
    /// Default: `6`
    pub max_tags: usize,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            max_pages: 80,
            scroll_max_iterations: 60,
            scroll_settle_rounds: 3,
            scroll_delay_ms: 500,
            render_delay_ms: 300,
            single_pass_delay_ms: 200,
            page_change_timeout_ms: 3000,
            page_change_grace_ms: 800,
            page_change_min_delta: 50,
            reveal_timeout_ms: 4000,
            reveal_poll_ms: 300,
            reveal_delay_ms: 250,
            state_scan_depth: 5,
            window_scan_depth: 4,
            container_ascent_cap: 6,
            max_tags: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_caps() {
        let opts = ScrapeOptions::default();
        assert_eq!(opts.max_pages, 80);
        assert_eq!(opts.scroll_max_iterations, 60);
        assert_eq!(opts.scroll_settle_rounds, 3);
        assert_eq!(opts.reveal_timeout_ms, 4000);
    }
}
