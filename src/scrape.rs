//! Pipeline orchestration.
//!
//! Two modes share one extraction core. Single-pass reads the currently
//! rendered listing once, with table-native and network-capture
//! fallbacks when row discovery comes up empty. Full traversal scrolls
//! each page to exhaustion, absorbs batches into the collector, and
//! advances pagination until the next control disappears or the page
//! cap hits. Either way the result is CSV text plus a record count, and a
//! zero-record outcome is a success, not an error.

use tracing::{debug, info, warn};

use crate::capture::CaptureBuffer;
use crate::collect::Collector;
use crate::csv;
use crate::dom;
use crate::email::{self, mine, reveal};
use crate::error::{Error, Result};
use crate::locate;
use crate::navigate;
use crate::options::ScrapeOptions;
use crate::page::PageDriver;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::record::{identity_key, ContactRecord, EmailSource};
use crate::table;

/// What the caller wants from this invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeRequest {
    /// Traverse every page instead of reading the current one.
    pub collect_all: bool,
    /// Activate reveal controls for rows with no resolvable email.
    /// Costs platform credits; off by default.
    pub click_email: bool,
}

/// Finished run: serialized CSV and the number of data records in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOutcome {
    pub csv: String,
    pub count: usize,
}

/// One scrape invocation bound to a driver and a capture feed.
pub struct Scraper<'a> {
    driver: &'a mut dyn PageDriver,
    capture: &'a CaptureBuffer,
    options: ScrapeOptions,
}

impl<'a> Scraper<'a> {
    pub fn new(
        driver: &'a mut dyn PageDriver,
        capture: &'a CaptureBuffer,
        options: ScrapeOptions,
    ) -> Self {
        Self {
            driver,
            capture,
            options,
        }
    }

    /// Run the pipeline per `request`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when the options carry a zero
    /// page or scroll cap; extraction misses themselves never error.
    pub fn run(
        &mut self,
        request: ScrapeRequest,
        progress: &mut dyn ProgressSink,
    ) -> Result<ScrapeOutcome> {
        if self.options.max_pages == 0 || self.options.scroll_max_iterations == 0 {
            return Err(Error::InvalidRequest(
                "page and scroll caps must be nonzero".to_string(),
            ));
        }
        if request.collect_all {
            self.traverse(request, progress)
        } else {
            self.single_pass(request, progress)
        }
    }

    fn single_pass(
        &mut self,
        request: ScrapeRequest,
        progress: &mut dyn ProgressSink,
    ) -> Result<ScrapeOutcome> {
        self.driver.wait(self.options.single_pass_delay_ms);
        let mut records = self.extract_batch();

        if records.is_empty() {
            let doc = dom::parse(&self.driver.html());
            let table_sel = doc.select("table");
            if table_sel.exists() {
                if let Some(exported) = table::export(&table_sel) {
                    info!(count = exported.count, "table-native fallback export");
                    return Ok(ScrapeOutcome {
                        csv: exported.csv,
                        count: exported.count,
                    });
                }
            }
            let netted = self.records_from_capture();
            if !netted.is_empty() {
                info!(count = netted.len(), "network-capture fallback export");
                let csv = csv::build_csv(&netted, &self.options);
                return Ok(ScrapeOutcome {
                    csv,
                    count: netted.len(),
                });
            }
        }

        if request.click_email {
            self.reveal_pass(&mut records, progress);
        }

        let count = records.len();
        Ok(ScrapeOutcome {
            csv: csv::build_csv(&records, &self.options),
            count,
        })
    }

    fn traverse(
        &mut self,
        request: ScrapeRequest,
        progress: &mut dyn ProgressSink,
    ) -> Result<ScrapeOutcome> {
        let mut collector = Collector::new();

        for page in 1..=self.options.max_pages {
            navigate::auto_scroll(self.driver, &self.options);
            self.driver.wait(self.options.render_delay_ms);

            let mut batch = self.extract_batch();
            if request.click_email {
                // Reveal while the rows are still rendered; rows from
                // earlier pages can no longer be clicked. A re-rendered
                // row whose accumulated record already carries an email
                // is skipped so its reveal credit is spent only once.
                batch.retain(|record| {
                    !collector.contains(&record.identity)
                        || !collector.has_email(&record.identity)
                });
                self.reveal_pass(&mut batch, progress);
            }
            let new_rows = collector.absorb(batch);
            progress.emit(ProgressEvent::Scrape {
                page,
                current_rows: collector.len(),
                new_rows,
            });
            debug!(page, new_rows, total = collector.len(), "page extracted");

            let doc = dom::parse(&self.driver.html());
            let Some(next) = navigate::find_next_control(&doc) else {
                debug!(page, "no next control; traversal complete");
                break;
            };
            drop(doc);
            if !self.driver.click(&next) {
                warn!(page, "next control did not activate");
                break;
            }
            // A stalled transition is not terminal: the grace wait has
            // already been spent inside the change wait, and slow pages
            // often catch up on the next iteration. Only the page cap
            // and a dead next control end the loop.
            if !navigate::wait_for_content_change(self.driver, &self.options) {
                debug!(page, "content change not observed; continuing");
            }
        }

        collector.backfill(&self.capture.persons());
        let count = collector.len();
        Ok(ScrapeOutcome {
            csv: csv::build_csv(collector.records(), &self.options),
            count,
        })
    }

    /// Extract the rendered rows, then enrich empty emails from every
    /// passive source: framework state, storage areas, record stores,
    /// and captured network bodies.
    fn extract_batch(&mut self) -> Vec<ContactRecord> {
        let doc = dom::parse(&self.driver.html());
        let mut records = locate::extract_records(&doc, &self.options);
        drop(doc);

        let mut hits = Vec::new();
        if let Some(graph) = self.driver.state_graph() {
            hits.extend(mine::mine_state_graph(&graph, self.options.state_scan_depth));
            hits.extend(mine::mine_person_arrays(&graph, self.options.window_scan_depth));
        }
        hits.extend(mine::mine_storage(self.driver));
        hits.extend(mine::mine_record_stores(self.driver, self.options.state_scan_depth));
        hits.extend(self.capture.persons());
        let filled = email::enrich(&mut records, &hits);
        if filled > 0 {
            debug!(filled, "passive sources filled emails");
        }
        records
    }

    /// Sequentially activate reveal controls for rows still missing an
    /// email. Sequential on purpose: parallel reveals race the host
    /// page's own mutation handling.
    fn reveal_pass(&mut self, records: &mut [ContactRecord], progress: &mut dyn ProgressSink) {
        let total = records.len();
        for (index, record) in records.iter_mut().enumerate() {
            let current = index + 1;
            if !record.email.is_empty() {
                progress.emit(ProgressEvent::Reveal {
                    current,
                    total,
                    info: "already".to_string(),
                });
                continue;
            }
            if !record.needs_reveal {
                continue;
            }
            progress.emit(ProgressEvent::Reveal {
                current,
                total,
                info: "start".to_string(),
            });

            let html = self.driver.html();
            let doc = dom::parse(&html);
            let control = locate::container_for_identity(&doc, &record.identity)
                .and_then(|container| reveal::find_control(&doc, &container));
            drop(doc);

            let found = match control {
                Some(c) => reveal::attempt(self.driver, &c, &record.identity, &self.options),
                // No activatable control: the address may already sit
                // in the row unrendered, so fall back to a re-scan.
                None => reveal::rescan(self.driver, &record.identity),
            };
            let info = match found {
                Some(address) => {
                    record.fill_email(&address, EmailSource::Reveal);
                    format!("found:{address}")
                }
                None => "notfound".to_string(),
            };
            progress.emit(ProgressEvent::Reveal {
                current,
                total,
                info,
            });
            self.driver.wait(self.options.reveal_delay_ms);
        }
    }

    /// Build standalone records from captured person hits, deduplicated
    /// by derived identity.
    fn records_from_capture(&mut self) -> Vec<ContactRecord> {
        let mut collector = Collector::new();
        let batch = self
            .capture
            .persons()
            .into_iter()
            .filter(|hit| !hit.name.is_empty())
            .map(|hit| ContactRecord {
                identity: identity_key(None, &hit.name, &hit.company),
                name: hit.name,
                job_title: hit.job,
                company: hit.company,
                linkedin_url: hit.linkedin,
                email_source: if hit.email.is_empty() {
                    EmailSource::None
                } else {
                    EmailSource::Network
                },
                email: hit.email,
                ..ContactRecord::default()
            })
            .collect();
        collector.absorb(batch);
        collector.into_records()
    }
}
