//! Data model for extracted contact records.
//!
//! A `ContactRecord` is one output row. Records are created fresh per DOM
//! observation pass, merged into the collector's accumulation by identity
//! key, and serialized once traversal ends.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::patterns;

/// Which resolver strategy supplied a record's email address.
///
/// Used for diagnostics and test assertions; not part of the CSV output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailSource {
    /// No address resolved yet.
    #[default]
    None,
    /// Found in rendered DOM content or attributes.
    Dom,
    /// Disclosed by a simulated reveal click.
    Reveal,
    /// Mined from the host page's reactive-framework state/caches.
    FrameworkState,
    /// Found in persistent browser storage (key-value or structured).
    Storage,
    /// Matched from an intercepted network response.
    Network,
}

/// One interactive element (link/button) collected near a record.
///
/// Consumed for org-link/location/tag derivation and as a secondary text
/// corpus by the email resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxElement {
    /// Visible text.
    pub text: String,
    /// Link target, if any.
    pub href: String,
    /// ARIA label, if any.
    pub aria_label: String,
}

/// One contact row extracted from the listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Stable dedup key: platform person identifier when observable, else
    /// a normalized name+company composite. The composite can drift when
    /// the company field fluctuates between partial renders, which may
    /// produce duplicates; this is a known limitation.
    pub identity: String,

    /// Required; records without a resolvable name are discarded upstream.
    pub name: String,

    /// Job title, cleaned at CSV time.
    pub job_title: String,

    /// Company name, cleaned at CSV time.
    pub company: String,

    /// Absolute LinkedIn profile URL, when present.
    pub linkedin_url: String,

    /// Resolved email. Write once: later sources only fill an empty field.
    pub email: String,

    /// Which strategy supplied `email`.
    pub email_source: EmailSource,

    /// Organization profile link mined from auxiliary elements.
    pub org_link: String,

    /// "City, Country"-shaped label mined from auxiliary elements.
    pub location: String,

    /// Deduplicated, order-preserving free-text labels (capped).
    pub tags: Vec<String>,

    /// True when no email resolved but a reveal affordance exists nearby.
    pub needs_reveal: bool,

    /// Interactive elements collected around the record.
    #[serde(skip)]
    pub aux: Vec<AuxElement>,
}

impl ContactRecord {
    /// Fill the email field only if it is currently empty.
    ///
    /// Returns `true` when the value was taken. The first writer wins;
    /// later resolution sources never overwrite a confirmed address.
    pub fn fill_email(&mut self, email: &str, source: EmailSource) -> bool {
        let email = email.trim();
        if !self.email.is_empty() || email.is_empty() {
            return false;
        }
        self.email = email.to_string();
        self.email_source = source;
        self.needs_reveal = false;
        true
    }

    /// First whitespace-separated token of the name, lowercased.
    #[must_use]
    pub fn first_name(&self) -> String {
        self.name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// A person-shaped object mined from a secondary source (network capture,
/// framework state, storage). Used to back-fill empty email fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonHit {
    pub name: String,
    pub email: String,
    pub job: String,
    pub company: String,
    pub linkedin: String,
    /// Which source produced this hit.
    pub source: EmailSource,
    /// Store name / storage key for fuzzy matching, when applicable.
    pub key: String,
}

impl PersonHit {
    /// First whitespace-separated token of the name, lowercased.
    #[must_use]
    pub fn first_name(&self) -> String {
        self.name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// Extract a persistent person identifier from a profile link target.
///
/// Tries the path pattern first, then falls back to the last path segment
/// of a parseable URL.
#[must_use]
pub fn profile_id_from_href(href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    if let Some(caps) = patterns::PROFILE_ID.captures(href) {
        if let Some(id) = caps.get(1) {
            return Some(id.as_str().to_string());
        }
    }
    let url = Url::parse(href).ok()?;
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .map(ToString::to_string)
}

/// Derive the dedup identity for a record.
///
/// Prefers the platform identifier from the profile link; falls back to a
/// normalized `name|company` composite.
#[must_use]
pub fn identity_key(profile_id: Option<&str>, name: &str, company: &str) -> String {
    match profile_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("{}|{}", normalize_token(name), normalize_token(company)),
    }
}

/// Lowercase + whitespace-collapse, used for composite keys and tag dedup.
#[must_use]
pub fn normalize_token(s: &str) -> String {
    patterns::WHITESPACE
        .replace_all(s.trim(), " ")
        .to_lowercase()
}
