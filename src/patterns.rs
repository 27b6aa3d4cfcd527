//! Compiled regex patterns and CSS selectors for record extraction.
//!
//! All patterns are compiled once at startup using `LazyLock`. Patterns are
//! organized by their purpose in the extraction pipeline.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Email Patterns
// =============================================================================

/// Matches one email address (first occurrence).
pub static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("EMAIL regex")
});

/// Matches placeholder/noise phrases that look email-adjacent but are not
/// addresses worth keeping ("No email", reveal affordances, demo domains).
pub static EMAIL_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(no.?email|access|request|reveal|example\.com|test\.com|placeholder)")
        .expect("EMAIL_NOISE regex")
});

/// Matches decoded addresses that are really reveal-affordance text in
/// disguise. Applied to candidate addresses out of the decode ladder;
/// demo-domain rejection is a DOM-context concern, not a decode one.
pub static ADDRESS_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(no.?email|access|request)").expect("ADDRESS_NOISE regex")
});

/// Matches `mailto:` hrefs, capturing the address portion before any query.
pub static MAILTO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)mailto:([^?]+)").expect("MAILTO regex"));

/// Matches attribute names suggestive of email/contact payloads.
pub static EMAIL_ATTR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(email|contact|mailto)").expect("EMAIL_ATTR_NAME regex"));

/// Matches attribute names that carry link targets worth checking for mailto.
pub static LINK_ATTR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(href|data-href|data-url|data-link)$").expect("LINK_ATTR_NAME regex")
});

// =============================================================================
// Record Identity Patterns
// =============================================================================

/// Extracts a persistent person identifier from a profile link path.
/// Handles hash-routed URLs like `https://host/#/people/<id>?query`.
pub static PROFILE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:people|person|profiles)/(?:#?/)?([^/?#]+)").expect("PROFILE_ID regex")
});

/// Matches organization profile links used for the company fallback.
pub static ORG_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)organizations?/").expect("ORG_LINK regex"));

// =============================================================================
// Field Vocabulary Patterns
// =============================================================================

/// Matches short text that plausibly names a job title.
pub static JOB_TITLE_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(manager|director|engineer|developer|analyst|coordinator|specialist|lead|head|chief|officer|executive|consultant|designer|architect|admin|associate)\b",
    )
    .expect("JOB_TITLE_VOCAB regex")
});

/// Matches reveal-affordance text ("Access email", "Show email", ...).
pub static REVEAL_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(access|view|reveal|show).{0,10}email").expect("REVEAL_TEXT regex")
});

/// Matches `data-action` values that tag a control as a contact trigger.
pub static REVEAL_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(data-email|data-contact|data-person)").expect("REVEAL_ACTION regex")
});

/// Matches "next page" control text.
pub static NEXT_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(next|›|»|more)").expect("NEXT_TEXT regex"));

/// Matches "City, Country"-shaped text used for the location field.
pub static LOCATION_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+,\s*[A-Za-z]").expect("LOCATION_TEXT regex"));

/// Matches auxiliary-element text that must never become a tag.
pub static TAG_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Access\s+email|N/A|NA|No\s+email|Copy|View\s+in\s+\w+|Open\s+profile|Email)$")
        .expect("TAG_NOISE regex")
});

/// Matches placeholder tokens stripped from job/company fields.
pub static PLACEHOLDER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(N/A|NA|No\s+email|Access\s+email)\b").expect("PLACEHOLDER_TOKEN regex")
});

// =============================================================================
// Capture / Storage Patterns
// =============================================================================

/// Filters captured request URLs down to data-fetch endpoints worth mining.
pub static CAPTURE_URL_RELEVANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(people|contacts|graphql|search|profiles|records|person|email|organization|company|lead|prospect|api/v[0-9]|mixed_people)",
    )
    .expect("CAPTURE_URL_RELEVANT regex")
});

/// Matches structured client-side store names worth opening.
pub static DATA_STORE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(cache|store|persist|contact)").expect("DATA_STORE_NAME regex")
});

/// Matches object keys that name a person-ish field (graph mining).
pub static PERSON_NAME_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(name|first.?name|last.?name|full.?name)").expect("PERSON_NAME_KEY regex")
});

/// Matches object keys that name an identifier field (graph mining).
pub static PERSON_ID_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(id|personid|contactid)").expect("PERSON_ID_KEY regex"));

// =============================================================================
// Text Cleaning Patterns
// =============================================================================

/// Matches runs of whitespace for normalization.
pub static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE regex"));

/// Matches separator/control noise stripped from job titles.
pub static FIELD_NOISE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[|*\u{00A0}]+").expect("FIELD_NOISE_CHARS regex"));

/// Matches leading/trailing non-word runs trimmed from cleaned fields.
pub static EDGE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\w\d]+|[^\w\d]+$").expect("EDGE_PUNCT regex"));

/// Matches `+<11 digits>` phone numbers for grouped display formatting.
pub static PHONE_11: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+(\d)(\d{3})(\d{3})(\d{4})").expect("PHONE_11 regex"));

/// Matches characters removed by the table formatter's sanitization pass.
pub static TABLE_SANITIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s,.@-]").expect("TABLE_SANITIZE regex"));

// =============================================================================
// CSS Selectors
// =============================================================================

/// Selector for profile-detail hyperlinks anchoring record discovery.
pub const PROFILE_LINK_SELECTOR: &str =
    r#"a[href*="/people/"], a[href*="/person/"], a[href*="/profiles/"]"#;

/// Selector for known list-row containers (direct fallback discovery).
pub const ROW_FALLBACK_SELECTOR: &str = r#"[data-qa="people-list"] [data-qa="people-list-row"], [data-testid="people-row"], tbody tr, .people-list-item, .ProfileListItem"#;

/// Selector for name-marker elements inside a row.
pub const NAME_SELECTOR: &str = r#".name, [data-qa="name"]"#;

/// Selectors tried in order for the job-title field.
pub const JOB_SELECTORS: &[&str] = &[
    r#"[data-qa*="job"]"#,
    r#"[data-qa*="title"]"#,
    ".job-title",
    ".headline",
    ".title",
    r#"[aria-label*="title"]"#,
    r#"[class*="job"]"#,
    r#"[class*="title"]"#,
    r#"[class*="headline"]"#,
];

/// Selectors tried in order for the company field.
pub const COMPANY_SELECTORS: &[&str] = &[
    r#"[data-qa*="company"]"#,
    r#"[data-qa*="org"]"#,
    ".company",
    ".organization",
    r#"[aria-label*="company"]"#,
    r#"[aria-label*="organization"]"#,
    r#"[class*="company"]"#,
    r#"[class*="organization"]"#,
    r#"a[href*="/organizations/"]"#,
    r#"a[href*="/company/"]"#,
];

/// Selector for LinkedIn profile anchors.
pub const LINKEDIN_SELECTOR: &str = r#"a[href*="linkedin.com"], a[aria-label*="LinkedIn"]"#;

/// Selector for known scrollable list containers.
pub const SCROLL_CONTAINER_SELECTOR: &str = r#"[data-qa="people-list"], [data-testid="people-list"], .people-list, .people-list-container, tbody"#;

/// Selector for generic scroll-candidate regions (largest-overflow fallback).
pub const SCROLL_FALLBACK_SELECTOR: &str = "div, section";

/// Selector for interactive elements collected as auxiliary data.
pub const INTERACTIVE_SELECTOR: &str = "a, button";

/// Selector for pagination control candidates.
pub const PAGINATION_SELECTOR: &str = r#"a, button, div[role="button"]"#;

/// Selector for transient overlay regions scanned after a reveal click.
pub const OVERLAY_SELECTOR: &str = r#"[role="dialog"], .popover, .modal, [data-popover]"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_matches_plain_addresses() {
        assert!(EMAIL.is_match("user@example.org"));
        assert!(EMAIL.is_match("contact: jane.doe+crm@sub.host.co"));
        assert!(!EMAIL.is_match("not an address"));
    }

    #[test]
    fn email_noise_rejects_placeholders() {
        assert!(EMAIL_NOISE.is_match("No email"));
        assert!(EMAIL_NOISE.is_match("Access email"));
        assert!(EMAIL_NOISE.is_match("someone@example.com"));
        assert!(!EMAIL_NOISE.is_match("jane@acme.org"));
    }

    #[test]
    fn profile_id_handles_hash_routes() {
        let caps = PROFILE_ID
            .captures("https://app.host.io/#/people/abc123?page=2")
            .and_then(|c| c.get(1));
        assert_eq!(caps.map(|m| m.as_str()), Some("abc123"));
    }

    #[test]
    fn reveal_text_matches_affordances() {
        assert!(REVEAL_TEXT.is_match("Access email"));
        assert!(REVEAL_TEXT.is_match("Show work email"));
        assert!(!REVEAL_TEXT.is_match("Email copied"));
    }

    #[test]
    fn job_title_vocab_matches_titles() {
        assert!(JOB_TITLE_VOCAB.is_match("Senior Software Engineer"));
        assert!(JOB_TITLE_VOCAB.is_match("VP and Head of Sales"));
        assert!(!JOB_TITLE_VOCAB.is_match("Acme Corp"));
    }

    #[test]
    fn capture_url_relevant_filters_endpoints() {
        assert!(CAPTURE_URL_RELEVANT.is_match("https://host/api/v1/mixed_people/search"));
        assert!(CAPTURE_URL_RELEVANT.is_match("https://host/graphql"));
        assert!(!CAPTURE_URL_RELEVANT.is_match("https://host/assets/logo.png"));
    }
}
