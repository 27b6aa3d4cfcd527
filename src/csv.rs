//! CSV assembly for extracted records.
//!
//! The standard export is a fixed eight-column layout. Field text from a
//! hostile DOM needs cleaning on the way out: placeholder phrases,
//! separator junk, and shouting-case names from the page all normalize
//! here, never during extraction.

use crate::options::ScrapeOptions;
use crate::patterns;
use crate::record::ContactRecord;

pub const HEADER: [&str; 8] = [
    "name",
    "job_title",
    "company",
    "linkedin",
    "email",
    "org_link",
    "location",
    "tags",
];

const TAG_ELLIPSIS_LIMIT: usize = 60;

/// Quote a field per RFC 4180 when it contains a delimiter, quote, or
/// line break; embedded quotes double.
#[must_use]
pub fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Re-case a flattened name, leaving intentional casing alone: tokens
/// carrying a digit, and tokens already in full caps (acronyms,
/// initialisms, connective symbols), pass through untouched.
#[must_use]
pub fn smart_title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            if word.is_empty() {
                return String::new();
            }
            let preserved = word.chars().any(|c| c.is_ascii_digit())
                || word
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || matches!(c, '0'..='9' | '&' | '/' | '-'));
            if preserved {
                return word.to_string();
            }
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize one extracted field: collapse whitespace, strip placeholder
/// phrases and separator noise, trim punctuation off the edges.
#[must_use]
pub fn clean_field(raw: &str) -> String {
    let collapsed = patterns::WHITESPACE.replace_all(raw.trim(), " ");
    let no_placeholder = patterns::PLACEHOLDER_TOKEN.replace_all(&collapsed, "");
    let no_noise = patterns::FIELD_NOISE_CHARS.replace_all(&no_placeholder, " ");
    let recollapsed = patterns::WHITESPACE.replace_all(no_noise.trim(), " ");
    patterns::EDGE_PUNCT.replace_all(&recollapsed, "").to_string()
}

fn tags_field(tags: &[String], options: &ScrapeOptions) -> String {
    let joined = tags
        .iter()
        .take(options.max_tags)
        .map(|t| clean_field(t))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("|");
    if joined.chars().count() > TAG_ELLIPSIS_LIMIT {
        let truncated: String = joined.chars().take(TAG_ELLIPSIS_LIMIT).collect();
        format!("{truncated}...")
    } else {
        joined
    }
}

/// Serialize records into the standard eight-column CSV, header first,
/// newline-joined. An empty batch still yields the header line.
#[must_use]
pub fn build_csv(records: &[ContactRecord], options: &ScrapeOptions) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADER.join(","));
    for record in records {
        let row = [
            smart_title_case(&clean_field(&record.name)),
            clean_field(&record.job_title),
            clean_field(&record.company),
            record.linkedin_url.trim().to_string(),
            record.email.trim().to_lowercase(),
            record.org_link.trim().to_string(),
            clean_field(&record.location),
            tags_field(&record.tags, options),
        ];
        lines.push(
            row.iter()
                .map(|f| csv_escape(f))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}
