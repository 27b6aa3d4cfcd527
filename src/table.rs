//! Spreadsheet-ready export straight from a rendered table.
//!
//! When the listing is a plain `<table>`, exporting its cells verbatim
//! beats re-deriving fields: the page has already laid the data out in
//! columns. The table is re-parsed as its own document so icon and
//! control elements can be stripped destructively, then cells are
//! sanitized, phones reformatted, and the Name column split three ways.

use crate::dom::{self, Selection};
use crate::patterns;

/// A finished table export: BOM-prefixed, CRLF-joined CSV plus the
/// number of data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableExport {
    pub csv: String,
    pub count: usize,
}

const NAME_HEADER: &str = "Name";
const DROPPED_HEADER: &str = "Quick Actions";
const PLACEHOLDER_CELLS: [&str; 3] = ["No email", "Request Mobile Number", "NA"];

/// Export one rendered table. Returns `None` when the table has no rows.
#[must_use]
pub fn export(table: &Selection) -> Option<TableExport> {
    // Work on a private copy so stripping controls cannot touch the page.
    let doc = dom::parse(&dom::outer_html(table));
    doc.select("svg, img, button, input[type='checkbox']").remove();

    let rows = doc.select("tr");
    let row_nodes = rows.nodes();
    if row_nodes.is_empty() {
        return None;
    }

    let mut name_index: Option<usize> = None;
    let mut dropped_index: Option<usize> = None;
    let mut lines = vec!["\u{feff}".to_string()];

    for (row_number, row_node) in row_nodes.iter().enumerate() {
        let row = Selection::from(*row_node);
        let cells: Vec<Selection> = row
            .select("th, td")
            .nodes()
            .iter()
            .map(|n| Selection::from(*n))
            .collect();
        if cells.is_empty() {
            continue;
        }

        let header = row_number == 0;
        let mut fields = Vec::with_capacity(cells.len() + 2);
        for (i, cell) in cells.iter().enumerate() {
            let text = dom::text(cell);
            if header {
                if text == DROPPED_HEADER {
                    dropped_index = Some(i);
                    continue;
                }
                if text == NAME_HEADER {
                    name_index = Some(i);
                    fields.push(quoted("First Name"));
                    fields.push(quoted("Last Name"));
                    fields.push(quoted("Full Name"));
                    continue;
                }
            }
            if dropped_index == Some(i) {
                continue;
            }
            if name_index == Some(i) {
                push_name_parts(&text, &mut fields);
                continue;
            }
            fields.push(quoted(&sanitize_cell(&text)));
        }

        if fields.is_empty() {
            continue;
        }
        // Repeated in-body header rows add nothing.
        if !header && fields.len() == 1 && fields[0].contains(NAME_HEADER) {
            continue;
        }
        lines.push(fields.join(","));
    }

    if lines.len() < 2 {
        return None;
    }
    let count = lines.len().saturating_sub(2);
    Some(TableExport {
        csv: lines.join("\r\n"),
        count,
    })
}

fn push_name_parts(text: &str, fields: &mut Vec<String>) {
    let full = text.trim();
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or_default();
    let last = parts.collect::<Vec<_>>().join(" ");
    fields.push(quoted(first));
    fields.push(quoted(&last));
    fields.push(quoted(full));
}

/// Placeholder phrases blank out; phones regroup for readability; then
/// everything outside a conservative printable set is dropped.
fn sanitize_cell(raw: &str) -> String {
    if PLACEHOLDER_CELLS.contains(&raw.trim()) {
        return " ".to_string();
    }
    let phone = patterns::PHONE_11.replace_all(raw, "+$1 ($2) $3-$4");
    let sanitized = patterns::TABLE_SANITIZE.replace_all(&phone, "");
    sanitized.replace('\u{00c2}', "").replace('#', "").trim().to_string()
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"<html><body><table>
      <tr><th><input type="checkbox"></th><th>Name</th><th>Title</th><th>Contact</th><th>Quick Actions</th></tr>
      <tr><td><input type="checkbox"></td><td>Jane Doe</td><td>VP # Engineering</td><td>+15125551234</td><td><button>Save</button></td></tr>
      <tr><td></td><td>Bo</td><td>Founder</td><td>No email</td><td><button>Save</button></td></tr>
    </table></body></html>"#;

    fn export_fixture() -> TableExport {
        let doc = dom::parse(TABLE);
        let table = doc.select("table");
        export(&table).unwrap()
    }

    #[test]
    fn header_splits_name_and_drops_quick_actions() {
        let exported = export_fixture();
        let lines: Vec<&str> = exported.csv.split("\r\n").collect();
        assert_eq!(lines[0], "\u{feff}");
        assert_eq!(
            lines[1],
            "\"\",\"First Name\",\"Last Name\",\"Full Name\",\"Title\",\"Contact\""
        );
        assert_eq!(exported.count, 2);
    }

    #[test]
    fn data_rows_split_names_and_sanitize_cells() {
        let exported = export_fixture();
        let lines: Vec<&str> = exported.csv.split("\r\n").collect();
        assert_eq!(
            lines[2],
            "\"\",\"Jane\",\"Doe\",\"Jane Doe\",\"VP  Engineering\",\"1 512 555-1234\""
        );
        assert_eq!(lines[3], "\"\",\"Bo\",\"\",\"Bo\",\"Founder\",\" \"");
    }

    #[test]
    fn empty_tables_export_nothing() {
        let doc = dom::parse("<html><body><table></table></body></html>");
        let table = doc.select("table");
        assert!(export(&table).is_none());
    }
}
