//! DOM adapter over `dom_query`.
//!
//! Small helpers that keep selector code terse: attribute/text accessors
//! with empty-string defaults, bounded ancestor ascent, and document-order
//! indexing used to hand element positions to a page driver.

// Re-export core types for external use
pub use dom_query::{Document, Selection};

// Re-export StrTendril for callers that want zero-copy text
pub use tendril::StrTendril;

/// Parse HTML into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Get any attribute value (empty string if missing).
#[inline]
#[must_use]
pub fn attr(sel: &Selection, name: &str) -> String {
    sel.attr(name).map(|s| s.to_string()).unwrap_or_default()
}

/// Get trimmed text content of node and descendants.
#[inline]
#[must_use]
pub fn text(sel: &Selection) -> String {
    sel.text().trim().to_string()
}

/// Get tag name (lowercase).
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_string().to_lowercase())
}

/// Get parent element selection.
#[inline]
#[must_use]
pub fn parent<'a>(sel: &Selection<'a>) -> Selection<'a> {
    sel.parent()
}

/// Get all attributes of the first node as key-value pairs.
#[must_use]
pub fn all_attributes(sel: &Selection) -> Vec<(String, String)> {
    sel.nodes()
        .first()
        .map(|node| {
            node.attrs()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Serialized outer HTML of the selection.
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> String {
    sel.html().to_string()
}

/// Document-order index of `target`'s first node among `selector` matches
/// on the whole document. This is how elements are referenced across the
/// snapshot boundary (see [`crate::page::ElementHandle`]).
#[must_use]
pub fn index_of(doc: &Document, selector: &str, target: &Selection) -> Option<usize> {
    let target_id = target.nodes().first()?.id;
    doc.select(selector)
        .nodes()
        .iter()
        .position(|n| n.id == target_id)
}

/// True when `ancestor`'s first node contains (or is) `sel`'s first node.
#[must_use]
pub fn contains(ancestor: &Selection, sel: &Selection) -> bool {
    let Some(ancestor_id) = ancestor.nodes().first().map(|n| n.id) else {
        return false;
    };
    let Some(mut current) = sel.nodes().first().copied() else {
        return false;
    };
    loop {
        if current.id == ancestor_id {
            return true;
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// Total rendered text length of the document body (whole document when no
/// body is present). Used as the content-change metric.
#[must_use]
pub fn text_length(doc: &Document) -> usize {
    let body = doc.select("body");
    if body.exists() {
        body.text().chars().count()
    } else {
        doc.select("html").text().chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_defaults_to_empty() {
        let doc = parse(r#"<div id="a"><p>x</p></div>"#);
        let div = doc.select("div");
        assert_eq!(attr(&div, "id"), "a");
        assert_eq!(attr(&div, "missing"), "");
    }

    #[test]
    fn index_of_counts_in_document_order() {
        let doc = parse("<div><a>1</a><span><a>2</a></span><a>3</a></div>");
        let second = doc.select("span a");
        assert_eq!(index_of(&doc, "a", &second), Some(1));
    }

    #[test]
    fn contains_walks_ancestry() {
        let doc = parse(r#"<table><tr id="row"><td><a id="x">n</a></td></tr></table>"#);
        let row = doc.select("#row");
        let link = doc.select("#x");
        let other = doc.select("td");
        assert!(contains(&row, &link));
        assert!(contains(&other, &link));
        assert!(!contains(&link, &row));
    }

    #[test]
    fn text_length_uses_body() {
        let doc = parse("<html><head><title>t</title></head><body>abcde</body></html>");
        assert_eq!(text_length(&doc), 5);
    }
}
