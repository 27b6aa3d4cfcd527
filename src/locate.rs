//! Row discovery and per-field extraction.
//!
//! Discovery anchors on profile-detail links: every list row links each
//! person to their detail view, and that href carries a persistent
//! identifier. Rows are the ancestor containers of those links; when a
//! page renders no profile links at all, known row selectors take over.
//!
//! Individual fields are resolved by named strategy cascades so a page
//! redesign degrades one rung, not the whole record.

use std::collections::HashMap;

use tracing::trace;

use crate::dom::{self, Document, Selection};
use crate::email;
use crate::options::ScrapeOptions;
use crate::record::{identity_key, normalize_token, profile_id_from_href, AuxElement, ContactRecord, EmailSource};
use crate::patterns;
use crate::strategy::{cascade, FieldStrategy};

/// Everything a field strategy may consult for one row.
pub struct RowContext<'a> {
    pub container: Selection<'a>,
    pub link: Option<Selection<'a>>,
}

struct Row<'a> {
    context: RowContext<'a>,
    profile_id: Option<String>,
}

/// Extract every contact record visible in the snapshot, in document
/// order. Duplicate profile ids collapse to one row, preferring the
/// link that carries visible text.
#[must_use]
pub fn extract_records(doc: &Document, options: &ScrapeOptions) -> Vec<ContactRecord> {
    let rows = discover_rows(doc, options);
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        if let Some(record) = build_record(row, options) {
            records.push(record);
        }
    }
    trace!(rows = rows.len(), records = records.len(), "extracted snapshot");
    records
}

/// Re-locate one row container in a fresh snapshot by record identity.
#[must_use]
pub fn container_for_identity<'a>(doc: &'a Document, identity: &str) -> Option<Selection<'a>> {
    for node in doc.select(patterns::PROFILE_LINK_SELECTOR).nodes() {
        let link = Selection::from(*node);
        let id = profile_id_from_href(&dom::attr(&link, "href"));
        if id.as_deref() == Some(identity) {
            return Some(ascend_to_container(&link, 6));
        }
    }
    for node in doc.select(patterns::ROW_FALLBACK_SELECTOR).nodes() {
        let container = Selection::from(*node);
        let context = RowContext { container: container.clone(), link: None };
        let name = cascade(&context, &name_strategies()).map(|l| l.value).unwrap_or_default();
        let company = cascade(&context, &company_strategies())
            .map(|l| l.value)
            .unwrap_or_default();
        if !name.is_empty() && identity_key(None, &name, &company) == identity {
            return Some(container);
        }
    }
    None
}

fn discover_rows<'a>(doc: &'a Document, options: &ScrapeOptions) -> Vec<Row<'a>> {
    let mut rows: Vec<Row<'a>> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for node in doc.select(patterns::PROFILE_LINK_SELECTOR).nodes() {
        let link = Selection::from(*node);
        let href = dom::attr(&link, "href");
        let Some(id) = profile_id_from_href(&href) else {
            continue;
        };
        let has_text = !dom::text(&link).is_empty();
        if let Some(&existing) = by_id.get(&id) {
            // Icon-only duplicates of the same person yield to the named link.
            let existing_has_text = rows[existing]
                .context
                .link
                .as_ref()
                .is_some_and(|l| !dom::text(l).is_empty());
            if has_text && !existing_has_text {
                let container = ascend_to_container(&link, options.container_ascent_cap);
                rows[existing] = Row {
                    context: RowContext { container, link: Some(link) },
                    profile_id: Some(id),
                };
            }
            continue;
        }
        let container = ascend_to_container(&link, options.container_ascent_cap);
        by_id.insert(id.clone(), rows.len());
        rows.push(Row {
            context: RowContext { container, link: Some(link) },
            profile_id: Some(id),
        });
    }

    if rows.is_empty() {
        for node in doc.select(patterns::ROW_FALLBACK_SELECTOR).nodes() {
            let container = Selection::from(*node);
            // Fallback selectors can match both an outer row and an
            // element nested inside it; keep the outermost only.
            if rows
                .iter()
                .any(|r| dom::contains(&r.context.container, &container))
            {
                continue;
            }
            rows.push(Row {
                context: RowContext { container, link: None },
                profile_id: None,
            });
        }
    }
    rows
}

/// Walk up from a profile link until a row-shaped ancestor appears:
/// a table row, list item, or an element tagged with test/QA hooks.
/// The ascent is capped; past the cap the link itself has to serve.
fn ascend_to_container<'a>(link: &Selection<'a>, cap: usize) -> Selection<'a> {
    let mut current = link.clone();
    for _ in 0..cap {
        let parent = dom::parent(&current);
        let Some(tag) = dom::tag_name(&parent) else {
            break;
        };
        if tag == "body" || tag == "html" {
            break;
        }
        if is_row_container(&parent, &tag) {
            return parent;
        }
        current = parent;
    }
    if dom::tag_name(&current).is_some() && !dom::text(&current).is_empty() {
        current
    } else {
        link.clone()
    }
}

fn is_row_container(sel: &Selection, tag: &str) -> bool {
    if tag == "tr" || tag == "li" {
        return true;
    }
    if dom::attr(sel, "role") == "row" {
        return true;
    }
    !dom::attr(sel, "data-qa").is_empty() || !dom::attr(sel, "data-testid").is_empty()
}

fn build_record(row: &Row<'_>, options: &ScrapeOptions) -> Option<ContactRecord> {
    let ctx = &row.context;
    let name = cascade(ctx, &name_strategies())?;
    let mut record = ContactRecord {
        name: name.value,
        ..ContactRecord::default()
    };
    trace!(strategy = name.strategy, name = %record.name, "resolved name");

    if let Some(job) = cascade(ctx, &job_strategies()) {
        record.job_title = job.value;
    }
    if let Some(company) = cascade(ctx, &company_strategies()) {
        record.company = company.value;
    }
    if let Some(linkedin) = cascade(ctx, &linkedin_strategies()) {
        record.linkedin_url = linkedin.value;
    }

    if let Some(address) = email::extract_hidden(&ctx.container) {
        record.fill_email(&address, EmailSource::Dom);
    }

    record.aux = collect_aux(&ctx.container);
    derive_secondary_fields(&mut record, options);
    record.needs_reveal = record.email.is_empty() && has_reveal_affordance(&record.aux);
    record.identity = identity_key(row.profile_id.as_deref(), &record.name, &record.company);
    Some(record)
}

// --- field strategy tables ------------------------------------------------

fn name_strategies<'a>() -> [FieldStrategy<RowContext<'a>>; 3] {
    [
        FieldStrategy { name: "profile-link-text", run: name_from_link },
        FieldStrategy { name: "name-marker", run: name_from_marker },
        FieldStrategy { name: "first-anchor", run: name_from_first_anchor },
    ]
}

fn job_strategies<'a>() -> [FieldStrategy<RowContext<'a>>; 2] {
    [
        FieldStrategy { name: "job-selector", run: job_from_selectors },
        FieldStrategy { name: "job-vocabulary", run: job_from_vocabulary },
    ]
}

fn company_strategies<'a>() -> [FieldStrategy<RowContext<'a>>; 2] {
    [
        FieldStrategy { name: "company-selector", run: company_from_selectors },
        FieldStrategy { name: "org-anchor", run: company_from_org_anchor },
    ]
}

fn linkedin_strategies<'a>() -> [FieldStrategy<RowContext<'a>>; 1] {
    [FieldStrategy { name: "linkedin-anchor", run: linkedin_from_anchor }]
}

fn name_from_link(ctx: &RowContext<'_>) -> Option<String> {
    let link = ctx.link.as_ref()?;
    let text = dom::text(link);
    if text.is_empty() { None } else { Some(text) }
}

fn name_from_marker(ctx: &RowContext<'_>) -> Option<String> {
    let sel = ctx.container.select(patterns::NAME_SELECTOR);
    let text = dom::text(&sel);
    if text.is_empty() { None } else { Some(text) }
}

fn name_from_first_anchor(ctx: &RowContext<'_>) -> Option<String> {
    for node in ctx.container.select("a").nodes() {
        let text = dom::text(&Selection::from(*node));
        // Two capitalized words, the cheapest name shape there is.
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() >= 2
            && words.len() <= 4
            && words
                .iter()
                .all(|w| w.chars().next().is_some_and(char::is_uppercase))
        {
            return Some(text);
        }
    }
    None
}

fn job_from_selectors(ctx: &RowContext<'_>) -> Option<String> {
    first_match(&ctx.container, patterns::JOB_SELECTORS)
}

fn job_from_vocabulary(ctx: &RowContext<'_>) -> Option<String> {
    for node in ctx.container.select("span, div, td").nodes() {
        let sel = Selection::from(*node);
        if sel.select("span, div, td").exists() {
            continue; // leaf elements only
        }
        let text = dom::text(&sel);
        if text.len() < 80 && patterns::JOB_TITLE_VOCAB.is_match(&text) {
            return Some(text);
        }
    }
    None
}

fn company_from_selectors(ctx: &RowContext<'_>) -> Option<String> {
    first_match(&ctx.container, patterns::COMPANY_SELECTORS)
}

fn company_from_org_anchor(ctx: &RowContext<'_>) -> Option<String> {
    for node in ctx.container.select("a").nodes() {
        let sel = Selection::from(*node);
        if patterns::ORG_LINK.is_match(&dom::attr(&sel, "href")) {
            let text = dom::text(&sel);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn linkedin_from_anchor(ctx: &RowContext<'_>) -> Option<String> {
    let sel = ctx.container.select(patterns::LINKEDIN_SELECTOR);
    let href = dom::attr(&sel, "href");
    if href.is_empty() { None } else { Some(href) }
}

fn first_match(container: &Selection, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        let sel = container.select(selector);
        let text = dom::text(&sel);
        if !text.is_empty() {
            return Some(text);
        }
    }
    None
}

// --- auxiliary elements and derived fields --------------------------------

fn collect_aux(container: &Selection) -> Vec<AuxElement> {
    let mut aux = Vec::new();
    for node in container.select(patterns::INTERACTIVE_SELECTOR).nodes() {
        let sel = Selection::from(*node);
        aux.push(AuxElement {
            text: dom::text(&sel),
            href: dom::attr(&sel, "href"),
            aria_label: dom::attr(&sel, "aria-label"),
        });
    }
    aux
}

/// Org link, location, and tags all derive from the auxiliary elements
/// rather than their own selectors; they share a noise filter and the
/// location never doubles as a tag.
fn derive_secondary_fields(record: &mut ContactRecord, options: &ScrapeOptions) {
    for el in &record.aux {
        if record.org_link.is_empty() && patterns::ORG_LINK.is_match(&el.href) {
            record.org_link.clone_from(&el.href);
        }
        if record.location.is_empty()
            && patterns::LOCATION_TEXT.is_match(&el.text)
            && !patterns::TAG_NOISE.is_match(&el.text)
            && el.text != record.name
        {
            record.location.clone_from(&el.text);
        }
    }

    let mut seen = Vec::new();
    for el in &record.aux {
        if record.tags.len() >= options.max_tags {
            break;
        }
        let text = el.text.trim();
        if text.is_empty()
            || patterns::TAG_NOISE.is_match(text)
            || text == record.name
            || text == record.location
            || patterns::EMAIL.is_match(text)
        {
            continue;
        }
        let key = normalize_token(text);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        record.tags.push(text.to_string());
    }
}

fn has_reveal_affordance(aux: &[AuxElement]) -> bool {
    aux.iter().any(|el| {
        patterns::REVEAL_TEXT.is_match(&el.text)
            || patterns::REVEAL_TEXT.is_match(&el.aria_label)
            || el.aria_label.to_lowercase().contains("email")
    })
}
