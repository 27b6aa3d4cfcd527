//! List scrolling and pagination.
//!
//! Virtualized lists only render rows near the viewport, so every page
//! is scrolled to the bottom until its height stops growing before
//! extraction. Pagination is a separate control hunt; page transitions
//! are confirmed by watching the rendered text length move.

use tracing::debug;

use crate::dom::{self, Document, Selection};
use crate::options::ScrapeOptions;
use crate::page::{observe, ElementHandle, PageDriver};
use crate::patterns;

const CHANGE_POLL_MS: u64 = 300;

/// Find the element to scroll: a known list container first, then the
/// generic region with the largest unrendered overflow, then the
/// document root as a last resort.
#[must_use]
pub fn find_scroll_container(driver: &mut dyn PageDriver) -> ElementHandle {
    let doc = dom::parse(&driver.html());

    let known = doc.select(patterns::SCROLL_CONTAINER_SELECTOR).nodes().len();
    for index in 0..known {
        let handle = ElementHandle::new(patterns::SCROLL_CONTAINER_SELECTOR, index);
        if driver
            .scroll_metrics(&handle)
            .is_some_and(|m| m.is_scrollable())
        {
            return handle;
        }
    }

    let candidates = doc.select(patterns::SCROLL_FALLBACK_SELECTOR).nodes().len();
    let mut best: Option<(ElementHandle, u64)> = None;
    for index in 0..candidates {
        let handle = ElementHandle::new(patterns::SCROLL_FALLBACK_SELECTOR, index);
        if let Some(metrics) = driver.scroll_metrics(&handle) {
            if !metrics.is_scrollable() {
                continue;
            }
            let overflow = metrics.scroll_height - metrics.client_height;
            if best.as_ref().is_none_or(|(_, b)| overflow > *b) {
                best = Some((handle, overflow));
            }
        }
    }
    if let Some((handle, overflow)) = best {
        debug!(overflow, "using largest-overflow scroll fallback");
        return handle;
    }
    ElementHandle::new("html", 0)
}

/// Scroll the list container to the bottom until its height is stable
/// for several consecutive rounds, forcing the virtualizer to render
/// every row. Returns the number of scroll rounds performed.
pub fn auto_scroll(driver: &mut dyn PageDriver, options: &ScrapeOptions) -> usize {
    let container = find_scroll_container(driver);
    let mut last_height = driver
        .scroll_metrics(&container)
        .map_or(0, |m| m.scroll_height);
    let mut stable = 0usize;
    let mut rounds = 0usize;

    while rounds < options.scroll_max_iterations {
        driver.scroll_to_bottom(&container);
        driver.wait(options.scroll_delay_ms);
        rounds += 1;

        let height = driver
            .scroll_metrics(&container)
            .map_or(last_height, |m| m.scroll_height);
        if height == last_height {
            stable += 1;
            if stable >= options.scroll_settle_rounds {
                break;
            }
        } else {
            stable = 0;
            last_height = height;
        }
    }
    debug!(rounds, final_height = last_height, "auto-scroll settled");
    rounds
}

/// Hunt the "next page" control: explicit `rel=next`, then text or
/// accessible-name matches. Disabled controls signal the last page.
#[must_use]
pub fn find_next_control(doc: &Document) -> Option<ElementHandle> {
    let nodes = doc.select(patterns::PAGINATION_SELECTOR);
    for node in nodes.nodes() {
        let sel = Selection::from(*node);
        if is_disabled(&sel) {
            continue;
        }
        let rel = dom::attr(&sel, "rel");
        let text = dom::text(&sel);
        let aria = dom::attr(&sel, "aria-label");
        let matched = rel == "next"
            || (text.len() < 20 && patterns::NEXT_TEXT.is_match(&text))
            || patterns::NEXT_TEXT.is_match(&aria);
        if matched {
            let index = dom::index_of(doc, patterns::PAGINATION_SELECTOR, &sel)?;
            return Some(ElementHandle::new(patterns::PAGINATION_SELECTOR, index));
        }
    }
    None
}

fn is_disabled(sel: &Selection) -> bool {
    dom::all_attributes(sel)
        .iter()
        .any(|(name, _)| name == "disabled")
        || dom::attr(sel, "aria-disabled") == "true"
        || dom::attr(sel, "class").contains("disabled")
}

/// Wait for the page body to change materially after a navigation
/// click. Returns `true` on a confirmed change; on timeout a short
/// grace wait runs anyway, since some transitions swap equal-length
/// content.
pub fn wait_for_content_change(driver: &mut dyn PageDriver, options: &ScrapeOptions) -> bool {
    let baseline = dom::text_length(&dom::parse(&driver.html()));
    let changed = observe(
        driver,
        options.page_change_timeout_ms,
        CHANGE_POLL_MS,
        |d| {
            let length = dom::text_length(&dom::parse(&d.html()));
            (length.abs_diff(baseline) > options.page_change_min_delta).then_some(())
        },
    );
    if changed.is_none() {
        driver.wait(options.page_change_grace_ms);
        return false;
    }
    true
}
