//! Overpass QL generation for category lookups.

use std::time::Duration;

use quinze_core::{BoundingBox, CategoryDescriptor};

/// Build a query returning every node, way and relation matching any of the
/// category's tag predicates inside `bbox`.
///
/// Ways and relations are returned with their centre point (`out center`).
pub(super) fn category_query(
    descriptor: &CategoryDescriptor,
    bbox: &BoundingBox,
    timeout: Duration,
) -> String {
    let area = format!(
        "({},{},{},{})",
        bbox.min_lat(),
        bbox.min_lng(),
        bbox.max_lat(),
        bbox.max_lng()
    );
    let mut query = format!("[out:json][timeout:{}];\n(\n", timeout.as_secs().max(1));
    for predicate in descriptor.predicates() {
        let key = escape(predicate.key());
        for value in predicate.values() {
            let clause = format!("  nwr[\"{key}\"=\"{}\"]{area};\n", escape(value));
            query.push_str(&clause);
        }
    }
    query.push_str(");\nout center;");
    query
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
