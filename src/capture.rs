//! Network capture buffering and person-object mining.
//!
//! A passive listener republished the host page's data-fetch response
//! bodies as `{url, body}` events. This module buffers them per source
//! order, filters by URL relevance, and mines parsed bodies for
//! person-shaped objects used to back-fill email fields.
//!
//! The buffer is appended to by the listener concurrently with resolver
//! reads, so reads always snapshot the entries before iterating.

use std::sync::LazyLock;
use std::sync::Mutex;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::patterns;
use crate::record::{EmailSource, PersonHit};

/// One captured response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedResponse {
    pub url: String,
    pub body: String,
}

/// Append-safe buffer of captured responses.
///
/// The relay listener pushes; the resolver reads via [`snapshot`].
///
/// [`snapshot`]: CaptureBuffer::snapshot
#[derive(Debug, Default)]
pub struct CaptureBuffer {
    entries: Mutex<Vec<CapturedResponse>>,
}

impl CaptureBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one response body. Source order is preserved.
    pub fn push(&self, url: impl Into<String>, body: impl Into<String>) {
        let entry = CapturedResponse {
            url: url.into(),
            body: body.into(),
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    /// Copy of the current entries; safe against concurrent appends.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CapturedResponse> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Mine every relevant captured body for person-shaped objects.
    #[must_use]
    pub fn persons(&self) -> Vec<PersonHit> {
        let mut hits = Vec::new();
        for entry in self.snapshot() {
            if !patterns::CAPTURE_URL_RELEVANT.is_match(&entry.url) {
                continue;
            }
            if entry.body.is_empty() {
                continue;
            }
            let Some(parsed) = parse_body(&entry.body) else {
                continue;
            };
            let before = hits.len();
            collect_person_objects(&parsed, &mut hits);
            debug!(
                url = %entry.url,
                found = hits.len() - before,
                "mined captured response"
            );
        }
        hits
    }
}

/// Parse a captured body: direct JSON, then the first balanced-brace JSON
/// substring (streamed GraphQL fragments), then loose key-value recovery.
#[must_use]
pub fn parse_body(body: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Some(value);
    }
    if let Some(fragment) = balanced_json_fragment(body) {
        if let Ok(value) = serde_json::from_str::<Value>(fragment) {
            return Some(value);
        }
    }
    parse_loose(body)
}

/// Extract the first balanced-brace substring, tracking string literals
/// and escapes so braces inside quoted values do not confuse the depth
/// count. Returns `None` when no balanced object exists.
#[must_use]
pub fn balanced_json_fragment(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

#[allow(clippy::expect_used)]
static LOOSE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]*)\}").expect("LOOSE_BLOCK regex"));
#[allow(clippy::expect_used)]
static LOOSE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\w+)\s*:\s*("[^"]*"|[^,}\n]+)"#).expect("LOOSE_PAIR regex")
});

/// Tolerant recovery for malformed payloads: pull `key: value` fragments
/// out of each `{...}` block by pattern rather than failing the batch.
#[must_use]
pub fn parse_loose(raw: &str) -> Option<Value> {
    let mut objects = Vec::new();
    for block in LOOSE_BLOCK.captures_iter(raw) {
        let Some(inner) = block.get(1) else { continue };
        let mut map = Map::new();
        for pair in LOOSE_PAIR.captures_iter(inner.as_str()) {
            let (Some(key), Some(value)) = (pair.get(1), pair.get(2)) else {
                continue;
            };
            let value = value.as_str().trim().trim_matches('"').trim();
            if !value.is_empty() {
                map.insert(key.as_str().to_string(), Value::String(value.to_string()));
            }
        }
        if !map.is_empty() {
            objects.push(Value::Object(map));
        }
    }
    if objects.is_empty() {
        None
    } else {
        Some(Value::Array(objects))
    }
}

/// Recursively search a parsed value for person-like objects: any object
/// carrying a name-ish or email key alongside an identifier/email/name
/// counts, and its subtree is not descended further.
pub fn collect_person_objects(value: &Value, out: &mut Vec<PersonHit>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_person_objects(item, out);
            }
        }
        Value::Object(map) => {
            let has_name = map.keys().any(|k| patterns::PERSON_NAME_KEY.is_match(k));
            let has_email = map.keys().any(|k| k.to_lowercase().contains("email"));
            let has_id = map.keys().any(|k| patterns::PERSON_ID_KEY.is_match(k));
            if (has_name || has_email) && (has_id || has_email || has_name) {
                if let Some(hit) = person_from_object(map) {
                    out.push(hit);
                }
                return;
            }
            for child in map.values() {
                collect_person_objects(child, out);
            }
        }
        _ => {}
    }
}

fn string_field(map: &Map<String, Value>, keys: &[&str]) -> String {
    for key in keys {
        if let Some(Value::String(s)) = map.get(*key) {
            if !s.trim().is_empty() {
                return s.trim().to_string();
            }
        }
    }
    String::new()
}

/// Normalize a person-shaped object's alternative field spellings.
fn person_from_object(map: &Map<String, Value>) -> Option<PersonHit> {
    let mut name = string_field(map, &["name", "fullName", "full_name"]);
    if name.is_empty() {
        let first = string_field(map, &["firstName", "first_name"]);
        let last = string_field(map, &["lastName", "last_name"]);
        name = format!("{first} {last}").trim().to_string();
    }
    if name.is_empty() {
        name = string_field(map, &["title"]);
    }

    let mut email = string_field(map, &["email", "emailAddress", "email_address"]);
    if email.is_empty() {
        if let Some(Value::Array(emails)) = map.get("emails") {
            if let Some(Value::String(first)) = emails.first() {
                email = first.trim().to_string();
            }
        }
    }
    if !email.is_empty()
        && (!patterns::EMAIL.is_match(&email) || patterns::EMAIL_NOISE.is_match(&email))
    {
        email = String::new();
    }

    if name.is_empty() && email.is_empty() {
        return None;
    }

    Some(PersonHit {
        name,
        email,
        job: string_field(map, &["title", "role", "job"]),
        company: string_field(map, &["company", "org", "organization"]),
        linkedin: string_field(map, &["linkedin", "linkedinUrl", "linkedin_url"]),
        source: EmailSource::Network,
        key: String::new(),
    })
}
