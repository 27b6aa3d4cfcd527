//! Hidden email extraction.
//!
//! The hardest field on the page: addresses hide behind reveal buttons,
//! obfuscated attributes, framework state, web storage, and captured
//! network responses. This module owns the DOM-side cascade; the
//! submodules handle decoding, store mining, and reveal interaction.

pub mod deobfuscate;
pub mod mine;
pub mod reveal;

use crate::dom::{self, Selection};
use crate::patterns;
use crate::record::{ContactRecord, PersonHit};

pub use deobfuscate::deobfuscate;

/// Pull an address out of DOM-sourced text, applying the broad noise
/// filter (demo domains included) to the matched address itself.
fn dom_candidate(text: &str) -> Option<String> {
    let matched = deobfuscate::validate(text)?;
    if patterns::EMAIL_NOISE.is_match(&matched) {
        return None;
    }
    Some(matched)
}

/// Run the DOM cascade over one row container. Rungs are ordered from
/// most to least reliable; the first plausible address wins.
#[must_use]
pub fn extract_hidden(container: &Selection) -> Option<String> {
    // Table cells before whole-container text: serialized text joins
    // adjacent cells without separators, which can glue a neighboring
    // cell's tail onto an address's local part.
    from_mailto(container)
        .or_else(|| from_table_cells(container))
        .or_else(|| from_text(container))
        .or_else(|| from_attributes(container))
}

/// `mailto:` anchors are the cheapest and most trustworthy carrier.
fn from_mailto(container: &Selection) -> Option<String> {
    for node in container.select("a[href^='mailto:']").nodes() {
        let sel = Selection::from(*node);
        let href = dom::attr(&sel, "href");
        if let Some(caps) = patterns::MAILTO.captures(&href) {
            let raw = caps.get(1)?.as_str();
            let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |d| d.into_owned());
            if let Some(email) = dom_candidate(&decoded) {
                return Some(email);
            }
        }
    }
    None
}

/// Rendered text already containing an address.
fn from_text(container: &Selection) -> Option<String> {
    dom_candidate(&dom::text(container))
}

/// Attribute sweep over the container and every descendant element:
/// email-named attributes, link attributes hiding `mailto:`, hidden
/// inputs, class/id tokens, then the raw serialized markup as a last
/// resort. Obfuscated payloads go through the full decode ladder.
fn from_attributes(container: &Selection) -> Option<String> {
    let mut scope = vec![container.clone()];
    for node in container.select("*").nodes() {
        scope.push(Selection::from(*node));
    }

    for sel in &scope {
        for (name, value) in dom::all_attributes(sel) {
            if patterns::LINK_ATTR_NAME.is_match(&name) {
                if let Some(caps) = patterns::MAILTO.captures(&value) {
                    let raw = caps.get(1).map_or("", |m| m.as_str());
                    let decoded =
                        urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |d| d.into_owned());
                    if let Some(email) = dom_candidate(&decoded) {
                        return Some(email);
                    }
                }
            }
            if patterns::EMAIL_ATTR_NAME.is_match(&name)
                || name == "aria-label"
                || name == "title"
                || name == "onclick"
                || name == "class"
                || name == "id"
            {
                if let Some(email) =
                    deobfuscate(&value).filter(|e| !patterns::EMAIL_NOISE.is_match(e))
                {
                    return Some(email);
                }
            }
        }
    }

    // Hidden form fields sometimes stage the value for a copy button.
    for node in container.select("input[type='hidden']").nodes() {
        let sel = Selection::from(*node);
        if let Some(email) =
            deobfuscate(&dom::attr(&sel, "value")).filter(|e| !patterns::EMAIL_NOISE.is_match(e))
        {
            return Some(email);
        }
    }

    let html = dom::outer_html(container);
    dom_candidate(&html)
}

/// Table layouts keep the address in a sibling cell rather than the
/// anchor's own subtree; rescan each cell of the enclosing row.
fn from_table_cells(container: &Selection) -> Option<String> {
    if dom::tag_name(container).as_deref() != Some("tr") {
        return None;
    }
    for node in container.select("td").nodes() {
        let sel = Selection::from(*node);
        if let Some(email) = dom_candidate(&dom::text(&sel)) {
            return Some(email);
        }
    }
    None
}

/// Merge mined hits into a batch of records. A hit attaches to the
/// record whose identity it matches, strongest match first: LinkedIn
/// URL, then company plus first name, then first name alone when it is
/// unambiguous within the batch. Filled emails are never overwritten.
pub fn enrich(records: &mut [ContactRecord], hits: &[PersonHit]) -> usize {
    let mut filled = 0;
    for hit in hits {
        if hit.email.is_empty() {
            continue;
        }
        if let Some(idx) = match_record(records, hit) {
            if records[idx].fill_email(&hit.email, hit.source) {
                filled += 1;
            }
        }
    }
    filled
}

fn match_record(records: &[ContactRecord], hit: &PersonHit) -> Option<usize> {
    if !hit.linkedin.is_empty() {
        if let Some(idx) = records
            .iter()
            .position(|r| !r.linkedin_url.is_empty() && r.linkedin_url == hit.linkedin)
        {
            return Some(idx);
        }
    }

    let hit_first = hit.first_name().to_lowercase();
    if hit_first.is_empty() {
        // Nameless hits (storage scans) match through what they carry:
        // a storage key containing the row's full name, or the row's
        // first name inside the address local part. Either way only a
        // unique match counts.
        let key = hit.key.to_lowercase();
        if !key.is_empty() {
            let mut matches = records.iter().enumerate().filter(|(_, r)| {
                let name = r.name.to_lowercase();
                !name.is_empty() && key.contains(&name)
            });
            let first = matches.next();
            if first.is_some() && matches.next().is_none() {
                return first.map(|(idx, _)| idx);
            }
        }
        let local = hit.email.split('@').next().unwrap_or_default().to_lowercase();
        let mut matches = records.iter().enumerate().filter(|(_, r)| {
            let first = r.first_name().to_lowercase();
            !first.is_empty() && local.contains(&first)
        });
        let first = matches.next();
        if matches.next().is_some() {
            return None;
        }
        return first.map(|(idx, _)| idx);
    }

    if !hit.company.is_empty() {
        if let Some(idx) = records.iter().position(|r| {
            r.first_name().to_lowercase() == hit_first
                && r.company.to_lowercase() == hit.company.to_lowercase()
        }) {
            return Some(idx);
        }
    }

    // First name alone only when exactly one row carries it.
    let mut matches = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.first_name().to_lowercase() == hit_first);
    let first = matches.next();
    if matches.next().is_some() {
        return None;
    }
    first.map(|(idx, _)| idx)
}
