//! Cross-batch record accumulation.
//!
//! Traversal extracts overlapping batches (scrolling re-renders rows,
//! pagination repeats stragglers), so records funnel through a collector
//! that dedups on identity and keeps the first version of every row.

use std::collections::HashSet;

use tracing::debug;

use crate::email;
use crate::record::{ContactRecord, PersonHit};

/// Accumulates extracted records across snapshots, keyed by identity.
#[derive(Debug, Default)]
pub struct Collector {
    seen: HashSet<String>,
    records: Vec<ContactRecord>,
}

impl Collector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one batch, returning how many records were genuinely new.
    /// Re-seen identities are dropped; the first-captured version wins.
    ///
    /// The one exception to strict no-merge accumulation: an empty
    /// email backfills from the newcomer. Reveals run per page while a
    /// row is still rendered, so an address can legitimately arrive on
    /// a later sighting of a row captured earlier, and discarding it
    /// would waste the reveal.
    pub fn absorb(&mut self, batch: Vec<ContactRecord>) -> usize {
        let mut added = 0;
        for record in batch {
            if self.seen.contains(&record.identity) {
                if !record.email.is_empty() {
                    if let Some(existing) = self
                        .records
                        .iter_mut()
                        .find(|r| r.identity == record.identity)
                    {
                        existing.fill_email(&record.email, record.email_source);
                    }
                }
                continue;
            }
            self.seen.insert(record.identity.clone());
            self.records.push(record);
            added += 1;
        }
        debug!(added, total = self.records.len(), "absorbed batch");
        added
    }

    /// Whether an identity has already been absorbed.
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.seen.contains(identity)
    }

    /// Whether the accumulated record for `identity` carries an email.
    /// False for unknown identities.
    #[must_use]
    pub fn has_email(&self, identity: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.identity == identity && !r.email.is_empty())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [ContactRecord] {
        &mut self.records
    }

    /// Final enrichment sweep: late hits (captured network bodies, store
    /// mining that ran after absorption) fill remaining empty emails.
    pub fn backfill(&mut self, hits: &[PersonHit]) -> usize {
        email::enrich(&mut self.records, hits)
    }

    /// All accumulated records, in first-seen order.
    #[must_use]
    pub fn into_records(self) -> Vec<ContactRecord> {
        self.records
    }
}
