//! Click-to-reveal email interaction.
//!
//! Rows gate their address behind a control that injects it somewhere
//! after a click: the row itself, a popover, or a copy field. The only
//! reliable read is differential: snapshot every address on the page,
//! click, then poll for an address that was not there before.

use std::collections::HashSet;

use tracing::debug;

use crate::dom::{self, Document, Selection};
use crate::locate;
use crate::options::ScrapeOptions;
use crate::page::{observe, ElementHandle, PageDriver};
use crate::patterns;

use super::deobfuscate;

/// Find the reveal control inside a row container, addressed by its
/// document-order position so it survives a re-snapshot.
#[must_use]
pub fn find_control(doc: &Document, container: &Selection) -> Option<ElementHandle> {
    for node in container.select(patterns::INTERACTIVE_SELECTOR).nodes() {
        let sel = Selection::from(*node);
        let text = dom::text(&sel);
        let aria = dom::attr(&sel, "aria-label");
        let action = dom::attr(&sel, "data-action");
        let matched = patterns::REVEAL_TEXT.is_match(&text)
            || patterns::REVEAL_TEXT.is_match(&aria)
            || patterns::REVEAL_ACTION.is_match(&action)
            || aria.to_lowercase().contains("email");
        if matched {
            let index = dom::index_of(doc, patterns::INTERACTIVE_SELECTOR, &sel)?;
            return Some(ElementHandle::new(patterns::INTERACTIVE_SELECTOR, index));
        }
    }
    None
}

/// Every address currently visible anywhere on the page, lowercased.
/// Includes form values, where copy widgets stage their payload.
#[must_use]
pub fn email_snapshot(driver: &mut dyn PageDriver) -> HashSet<String> {
    let mut seen = HashSet::new();
    let html = driver.html();
    for found in patterns::EMAIL.find_iter(&html) {
        seen.insert(found.as_str().to_lowercase());
    }
    for value in driver.form_values() {
        for found in patterns::EMAIL.find_iter(&value) {
            seen.insert(found.as_str().to_lowercase());
        }
    }
    seen
}

/// Click the control and poll until a new address appears or the
/// timeout lapses. `identity` re-locates the row in each fresh
/// snapshot; injected addresses are also searched in popover regions,
/// form values, and finally the whole document text.
pub fn attempt(
    driver: &mut dyn PageDriver,
    control: &ElementHandle,
    identity: &str,
    options: &ScrapeOptions,
) -> Option<String> {
    let before = email_snapshot(driver);
    if !driver.click(control) {
        debug!(identity, "reveal control click failed");
        return rescan(driver, identity);
    }
    observe(
        driver,
        options.reveal_timeout_ms,
        options.reveal_poll_ms,
        |d| {
            let forms = d.form_values();
            let doc = dom::parse(&d.html());
            harvest(&doc, identity, &before).or_else(|| {
                forms
                    .iter()
                    .flat_map(|v| patterns::EMAIL.find_iter(v))
                    .map(|m| m.as_str().to_lowercase())
                    .find(|e| !before.contains(e) && !patterns::EMAIL_NOISE.is_match(e))
            })
        },
    )
}

/// Last-resort read when no control can be activated: re-run the full
/// hidden-email cascade over the row container as currently rendered.
pub fn rescan(driver: &mut dyn PageDriver, identity: &str) -> Option<String> {
    let html = driver.html();
    let doc = dom::parse(&html);
    let container = locate::container_for_identity(&doc, identity)?;
    super::extract_hidden(&container)
}

/// Search one snapshot for an address absent from `before`: the row's
/// own container first, then overlay regions, then input values, then
/// the page text wholesale.
fn harvest(doc: &Document, identity: &str, before: &HashSet<String>) -> Option<String> {
    if let Some(container) = locate::container_for_identity(doc, identity) {
        // Scan leaf elements one by one before the serialized markup:
        // concatenated text joins adjacent cells without separators,
        // which can glue a neighboring label onto the address.
        for node in container.select("td, th, li, a, button, span, div").nodes() {
            let sel = Selection::from(*node);
            if let Some(email) = fresh(&dom::text(&sel), before) {
                return Some(email);
            }
        }
        if let Some(email) = fresh(&dom::outer_html(&container), before) {
            return Some(email);
        }
    }
    for node in doc.select(patterns::OVERLAY_SELECTOR).nodes() {
        let sel = Selection::from(*node);
        if let Some(email) = fresh(&dom::text(&sel), before) {
            return Some(email);
        }
    }
    for node in doc.select("input").nodes() {
        let sel = Selection::from(*node);
        if let Some(email) = fresh(&dom::attr(&sel, "value"), before) {
            return Some(email);
        }
    }
    // Serialized markup keeps adjacent text nodes apart, unlike the
    // concatenated text of the whole body.
    fresh(&dom::outer_html(&doc.select("body")), before)
}

fn fresh(text: &str, before: &HashSet<String>) -> Option<String> {
    patterns::EMAIL
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .find(|e| !before.contains(e) && !patterns::EMAIL_NOISE.is_match(e))
        .and_then(|e| deobfuscate::validate(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ScrollMetrics, StorageKind};

    const ROW: &str = "<tr data-profile='people/p1'>\
        <td><a href='#/people/p1'>Jane Doe</a></td>\
        <td><button aria-label='Access email'>Access email</button></td>\
        <td class='cell'></td></tr>";

    fn page(row: &str) -> String {
        format!("<html><body><table><tbody>{row}</tbody></table></body></html>")
    }

    struct RevealDriver {
        html: String,
        revealed: Option<String>,
        clicks: usize,
        polls_until_reveal: usize,
        elapsed: u64,
    }

    impl PageDriver for RevealDriver {
        fn html(&mut self) -> String {
            self.html.clone()
        }
        fn scroll_metrics(&mut self, _: &ElementHandle) -> Option<ScrollMetrics> {
            None
        }
        fn scroll_to_bottom(&mut self, _: &ElementHandle) {}
        fn click(&mut self, _: &ElementHandle) -> bool {
            self.clicks += 1;
            true
        }
        fn wait(&mut self, ms: u64) {
            self.elapsed += ms;
            if self.polls_until_reveal > 0 {
                self.polls_until_reveal -= 1;
                if self.polls_until_reveal == 0 {
                    if let Some(email) = self.revealed.take() {
                        self.html = page(&ROW.replace(
                            "<td class='cell'></td>",
                            &format!("<td class='cell'>{email}</td>"),
                        ));
                    }
                }
            }
        }
        fn storage_entries(&mut self, _: StorageKind) -> Vec<(String, String)> {
            Vec::new()
        }
    }

    #[test]
    fn control_is_found_by_aria_label() {
        let doc = dom::parse(&page(ROW));
        let container = doc.select("tr");
        let handle = find_control(&doc, &container).unwrap();
        assert_eq!(handle.selector, patterns::INTERACTIVE_SELECTOR);
    }

    #[test]
    fn attempt_returns_only_new_addresses() {
        let mut driver = RevealDriver {
            html: page(ROW),
            revealed: Some("jane@acme.org".to_string()),
            clicks: 0,
            polls_until_reveal: 2,
            elapsed: 0,
        };
        let doc = dom::parse(&page(ROW));
        let container = doc.select("tr");
        let control = find_control(&doc, &container).unwrap();
        let options = ScrapeOptions::default();
        let found = attempt(&mut driver, &control, "p1", &options);
        assert_eq!(found.as_deref(), Some("jane@acme.org"));
        assert_eq!(driver.clicks, 1);
    }

    #[test]
    fn failed_click_falls_back_to_container_rescan() {
        struct DeadClickDriver {
            html: String,
        }
        impl PageDriver for DeadClickDriver {
            fn html(&mut self) -> String {
                self.html.clone()
            }
            fn scroll_metrics(&mut self, _: &ElementHandle) -> Option<ScrollMetrics> {
                None
            }
            fn scroll_to_bottom(&mut self, _: &ElementHandle) {}
            fn click(&mut self, _: &ElementHandle) -> bool {
                false
            }
            fn wait(&mut self, _: u64) {}
        }

        let row = ROW.replace(
            "<td class='cell'></td>",
            "<td class='cell' data-email='jane [at] acme [dot] org'></td>",
        );
        let mut driver = DeadClickDriver { html: page(&row) };
        let doc = dom::parse(&page(&row));
        let container = doc.select("tr");
        let control = find_control(&doc, &container).unwrap();
        let options = ScrapeOptions::default();
        let found = attempt(&mut driver, &control, "p1", &options);
        assert_eq!(found.as_deref(), Some("jane@acme.org"));
    }

    #[test]
    fn attempt_times_out_when_nothing_appears() {
        let mut driver = RevealDriver {
            html: page(ROW),
            revealed: None,
            clicks: 0,
            polls_until_reveal: 0,
            elapsed: 0,
        };
        let doc = dom::parse(&page(ROW));
        let container = doc.select("tr");
        let control = find_control(&doc, &container).unwrap();
        let options = ScrapeOptions::default();
        assert_eq!(attempt(&mut driver, &control, "p1", &options), None);
        assert!(driver.elapsed <= options.reveal_timeout_ms);
    }
}
