//! Mining client-side data stores for addresses.
//!
//! Framework state graphs, web storage, and structured record stores all
//! carry person objects the page never renders. Each walker is bounded in
//! depth so a pathological graph cannot stall a batch.

use serde_json::Value;
use tracing::debug;

use crate::page::{PageDriver, StorageKind};
use crate::patterns;
use crate::record::{EmailSource, PersonHit};

/// Walk the framework state graph, collecting `{name, email}` pairs from
/// objects that carry both. Traversal stops at `max_depth`.
#[must_use]
pub fn mine_state_graph(graph: &Value, max_depth: usize) -> Vec<PersonHit> {
    let mut hits = Vec::new();
    walk_for_pairs(graph, 0, max_depth, EmailSource::FrameworkState, &mut hits);
    hits
}

/// Scan both web storage areas for addresses embedded in entry values.
/// Each hit is tagged with the storage area and key it came from.
#[must_use]
pub fn mine_storage(driver: &mut dyn PageDriver) -> Vec<PersonHit> {
    let mut hits = Vec::new();
    for kind in [StorageKind::Local, StorageKind::Session] {
        for (key, value) in driver.storage_entries(kind) {
            for found in patterns::EMAIL.find_iter(&value) {
                let email = found.as_str().to_string();
                if patterns::EMAIL_NOISE.is_match(&email) {
                    continue;
                }
                hits.push(PersonHit {
                    name: String::new(),
                    email,
                    job: String::new(),
                    company: String::new(),
                    linkedin: String::new(),
                    source: EmailSource::Storage,
                    key: format!("{}:{key}", kind.label()),
                });
            }
        }
    }
    debug!(count = hits.len(), "storage scan complete");
    hits
}

/// Open every structured record store whose name looks data-bearing and
/// mine its entries like state-graph subtrees.
#[must_use]
pub fn mine_record_stores(driver: &mut dyn PageDriver, max_depth: usize) -> Vec<PersonHit> {
    let mut hits = Vec::new();
    for store in driver.record_stores() {
        if !patterns::DATA_STORE_NAME.is_match(&store.store)
            && !patterns::DATA_STORE_NAME.is_match(&store.database)
        {
            continue;
        }
        for entry in &store.entries {
            let before = hits.len();
            walk_for_pairs(entry, 0, max_depth, EmailSource::Storage, &mut hits);
            for hit in &mut hits[before..] {
                hit.key = format!("{}/{}", store.database, store.store);
            }
        }
    }
    hits
}

/// The host application also exposes person arrays on its global object.
/// Those arrive through the same state-graph channel; this filters the
/// graph down to array-of-person shapes at a tighter depth cap.
#[must_use]
pub fn mine_person_arrays(graph: &Value, max_depth: usize) -> Vec<PersonHit> {
    let mut hits = Vec::new();
    walk_arrays(graph, 0, max_depth, &mut hits);
    hits
}

fn walk_for_pairs(
    value: &Value,
    depth: usize,
    max_depth: usize,
    source: EmailSource,
    out: &mut Vec<PersonHit>,
) {
    if depth > max_depth {
        return;
    }
    match value {
        Value::Array(items) => {
            for item in items {
                walk_for_pairs(item, depth + 1, max_depth, source, out);
            }
        }
        Value::Object(map) => {
            let email = map
                .iter()
                .filter(|(k, _)| {
                    let k = k.to_lowercase();
                    k == "email" || k == "emailaddress" || k == "email_address"
                })
                .find_map(|(_, v)| v.as_str())
                .unwrap_or_default();
            if !email.is_empty()
                && patterns::EMAIL.is_match(email)
                && !patterns::EMAIL_NOISE.is_match(email)
            {
                let name = map
                    .iter()
                    .filter(|(k, _)| patterns::PERSON_NAME_KEY.is_match(k))
                    .find_map(|(_, v)| v.as_str())
                    .unwrap_or_default();
                out.push(PersonHit {
                    name: name.trim().to_string(),
                    email: email.trim().to_string(),
                    job: String::new(),
                    company: String::new(),
                    linkedin: String::new(),
                    source,
                    key: String::new(),
                });
            }
            for (key, child) in map {
                // Framework-internal subtrees only echo rendered nodes.
                if key.starts_with("__") || key.starts_with("_internal") {
                    continue;
                }
                walk_for_pairs(child, depth + 1, max_depth, source, out);
            }
        }
        _ => {}
    }
}

fn walk_arrays(value: &Value, depth: usize, max_depth: usize, out: &mut Vec<PersonHit>) {
    if depth > max_depth {
        return;
    }
    match value {
        Value::Array(items) => {
            let person_like = items.iter().take(3).all(|item| {
                item.as_object().is_some_and(|map| {
                    map.keys().any(|k| patterns::PERSON_NAME_KEY.is_match(k))
                        || map.keys().any(|k| k.to_lowercase().contains("email"))
                })
            });
            if person_like && !items.is_empty() {
                for item in items {
                    walk_for_pairs(item, 0, 1, EmailSource::FrameworkState, out);
                }
            } else {
                for item in items {
                    walk_arrays(item, depth + 1, max_depth, out);
                }
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                if key.starts_with("__") {
                    continue;
                }
                walk_arrays(child, depth + 1, max_depth, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::RecordStore;
    use serde_json::json;

    struct StoreDriver {
        storage: Vec<(String, String)>,
        stores: Vec<RecordStore>,
    }

    impl PageDriver for StoreDriver {
        fn html(&mut self) -> String {
            String::new()
        }
        fn scroll_metrics(&mut self, _: &crate::page::ElementHandle) -> Option<crate::page::ScrollMetrics> {
            None
        }
        fn scroll_to_bottom(&mut self, _: &crate::page::ElementHandle) {}
        fn click(&mut self, _: &crate::page::ElementHandle) -> bool {
            false
        }
        fn wait(&mut self, _: u64) {}
        fn storage_entries(&mut self, _: StorageKind) -> Vec<(String, String)> {
            self.storage.clone()
        }
        fn record_stores(&mut self) -> Vec<RecordStore> {
            self.stores.clone()
        }
    }

    #[test]
    fn state_graph_pairs_are_collected() {
        let graph = json!({
            "entities": {
                "people": [
                    {"id": 1, "name": "Jane Doe", "email": "jane@acme.org"},
                    {"id": 2, "name": "No Mail", "email": "request access"}
                ]
            }
        });
        let hits = mine_state_graph(&graph, 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Jane Doe");
        assert_eq!(hits[0].source, EmailSource::FrameworkState);
    }

    #[test]
    fn state_graph_depth_is_bounded() {
        let graph = json!({"a": {"b": {"c": {"d": {"e": {"f":
            {"name": "Deep", "email": "deep@acme.org"}}}}}}});
        assert!(mine_state_graph(&graph, 5).is_empty());
        assert_eq!(mine_state_graph(&graph, 10).len(), 1);
    }

    #[test]
    fn framework_internal_keys_are_skipped() {
        let graph = json!({
            "__reactFiber$x": {"name": "Echo", "email": "echo@acme.org"}
        });
        assert!(mine_state_graph(&graph, 5).is_empty());
    }

    #[test]
    fn storage_hits_are_tagged_with_origin() {
        let mut driver = StoreDriver {
            storage: vec![
                ("session.cache".to_string(), r#"{"email":"ann@orb.io"}"#.to_string()),
                ("theme".to_string(), "dark".to_string()),
            ],
            stores: Vec::new(),
        };
        let hits = mine_storage(&mut driver);
        assert_eq!(hits.len(), 2); // once per storage area
        assert_eq!(hits[0].email, "ann@orb.io");
        assert_eq!(hits[0].key, "local:session.cache");
        assert_eq!(hits[1].key, "session:session.cache");
    }

    #[test]
    fn record_stores_filter_by_name() {
        let mut driver = StoreDriver {
            storage: Vec::new(),
            stores: vec![
                RecordStore {
                    database: "app".to_string(),
                    store: "contact-cache".to_string(),
                    entries: vec![json!({"name": "Bo Li", "email": "bo@orb.io"})],
                },
                RecordStore {
                    database: "app".to_string(),
                    store: "settings".to_string(),
                    entries: vec![json!({"name": "X", "email": "x@orb.io"})],
                },
            ],
        };
        let hits = mine_record_stores(&mut driver, 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "app/contact-cache");
    }

    #[test]
    fn person_arrays_are_detected() {
        let graph = json!({
            "list": [
                {"fullName": "Cy Ode", "email": "cy@orb.io"},
                {"fullName": "Di Pax", "email": "di@orb.io"}
            ],
            "numbers": [1, 2, 3]
        });
        let hits = mine_person_arrays(&graph, 4);
        assert_eq!(hits.len(), 2);
    }
}
