//! Flattening of document trees into dotted keys.
//!
//! Maps contribute `.`-joined segments, lists contribute `[index]` segments,
//! scalars become leaves rendered with `Value`'s `Display`. Empty maps and
//! lists produce no entries.

use std::collections::BTreeMap;

use crate::key::join_path;
use crate::value::{Value, ValueMap};

/// Flatten a mapping into `dotted.key[index] -> string` pairs.
pub fn flatten(map: &ValueMap) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (key, value) in map {
        flatten_into(value, key, &mut out);
    }
    out
}

/// Flatten a single value under `prefix` into `out`.
pub fn flatten_into(value: &Value, prefix: &str, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Map(map) => {
            for (key, child) in map {
                flatten_into(child, &join_path(prefix, key), out);
            }
        }
        Value::List(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, &format!("{prefix}[{index}]"), out);
            }
        }
        scalar => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string(), scalar.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;

    #[test]
    fn flattens_maps_and_lists() {
        let doc = parse_document(
            "app:\n  db:\n    user: u\n    list: [a, b]\n",
            "inline",
        )
        .unwrap();

        let flat = flatten(&doc);
        assert_eq!(flat.get("app.db.user").map(String::as_str), Some("u"));
        assert_eq!(flat.get("app.db.list[0]").map(String::as_str), Some("a"));
        assert_eq!(flat.get("app.db.list[1]").map(String::as_str), Some("b"));
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn flattens_maps_inside_lists() {
        let doc = parse_document(
            "second:\n  - data: 456\n  - data: 789\n    flag: true\n",
            "inline",
        )
        .unwrap();

        let flat = flatten(&doc);
        assert_eq!(flat["second[0].data"], "456");
        assert_eq!(flat["second[1].data"], "789");
        assert_eq!(flat["second[1].flag"], "true");
    }

    #[test]
    fn profile_sections_flatten_with_marker() {
        let doc = parse_document("\"+dev\":\n  app:\n    user: d\n", "inline").unwrap();
        assert_eq!(flatten(&doc)["+dev.app.user"], "d");
    }

    #[test]
    fn empty_containers_produce_nothing() {
        let doc = parse_document("a: {}\nb: []\n", "inline").unwrap();
        assert!(flatten(&doc).is_empty());
    }
}
