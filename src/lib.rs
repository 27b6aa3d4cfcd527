//! # lead-scrape
//!
//! Resilient contact-record extraction from an adversarial, script-rendered
//! CRM listing page.
//!
//! The engine reads a people-list UI that actively resists extraction:
//! obfuscated emails, virtualized scrolling, unstable selectors, and
//! credit-gated reveal buttons. Extraction is organized as cascades of
//! independent heuristic strategies per field, fused with passive sources
//! (framework state, web storage, structured record stores, captured
//! network responses), so any single page redesign degrades one rung
//! rather than the whole pipeline.
//!
//! All page access goes through the [`page::PageDriver`] capability trait,
//! which keeps the pipeline runnable against a live browser bridge or a
//! scripted test double alike.
//!
//! ## Quick Start
//!
//! ```rust
//! use lead_scrape::{scrape, CaptureBuffer, ScrapeRequest};
//! # use lead_scrape::page::{ElementHandle, PageDriver, ScrollMetrics};
//! # struct Snapshot(String);
//! # impl PageDriver for Snapshot {
//! #     fn html(&mut self) -> String { self.0.clone() }
//! #     fn scroll_metrics(&mut self, _: &ElementHandle) -> Option<ScrollMetrics> { None }
//! #     fn scroll_to_bottom(&mut self, _: &ElementHandle) {}
//! #     fn click(&mut self, _: &ElementHandle) -> bool { false }
//! #     fn wait(&mut self, _: u64) {}
//! # }
//!
//! let mut driver = Snapshot(
//!     "<html><body><table><tbody><tr>\
//!      <td><a href=\"#/people/p1\">Jane Doe</a></td>\
//!      <td><span class=\"job-title\">VP Sales</span></td>\
//!      <td>jane@acme.org</td>\
//!      </tr></tbody></table></body></html>"
//!         .to_string(),
//! );
//! let capture = CaptureBuffer::new();
//! let outcome = scrape(&mut driver, &capture, ScrapeRequest::default())?;
//! assert_eq!(outcome.count, 1);
//! # Ok::<(), lead_scrape::Error>(())
//! ```

mod error;
mod options;
mod patterns;
mod strategy;

/// Thin adapter over the HTML document model.
pub mod dom;

/// Page driver capability trait and the snapshot-diff observer.
pub mod page;

/// Record types, identity keys, and email fusion rules.
pub mod record;

/// Row discovery and per-field strategy cascades.
pub mod locate;

/// Hidden email extraction: DOM cascade, deobfuscation, store mining,
/// click-to-reveal.
pub mod email;

/// Cross-batch record accumulation and dedup.
pub mod collect;

/// List scrolling, pagination, and content-change waits.
pub mod navigate;

/// Network capture buffering and person-object mining.
pub mod capture;

/// Capture relay connection management.
pub mod relay;

/// Progress event hooks.
pub mod progress;

/// CSV normalization and the standard eight-column export.
pub mod csv;

/// Table-native spreadsheet export.
pub mod table;

/// Pipeline orchestration: single-pass and full traversal.
pub mod scrape;

// Public API - re-exports
pub use capture::CaptureBuffer;
pub use error::{Error, Result};
pub use options::ScrapeOptions;
pub use progress::{NullProgress, ProgressEvent, ProgressSink};
pub use record::{ContactRecord, EmailSource};
pub use scrape::{ScrapeOutcome, ScrapeRequest, Scraper};
pub use strategy::{cascade, FieldStrategy, Located};

/// Scrape with default options and no progress reporting.
///
/// # Errors
///
/// Propagates [`Error::InvalidRequest`] from [`Scraper::run`].
pub fn scrape(
    driver: &mut dyn page::PageDriver,
    capture: &CaptureBuffer,
    request: ScrapeRequest,
) -> Result<ScrapeOutcome> {
    scrape_with_options(
        driver,
        capture,
        request,
        ScrapeOptions::default(),
        &mut NullProgress,
    )
}

/// Scrape with explicit options and a progress sink.
///
/// # Errors
///
/// Propagates [`Error::InvalidRequest`] from [`Scraper::run`].
pub fn scrape_with_options(
    driver: &mut dyn page::PageDriver,
    capture: &CaptureBuffer,
    request: ScrapeRequest,
    options: ScrapeOptions,
    progress: &mut dyn ProgressSink,
) -> Result<ScrapeOutcome> {
    Scraper::new(driver, capture, options).run(request, progress)
}
