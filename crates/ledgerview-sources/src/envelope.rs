//! Response envelope unwrapping
//!
//! The CRM REST API and hand-made exports wrap record lists differently.
//! Accepted shapes, for a collection named `projects`:
//!
//! ```text
//! [ {...}, ... ]
//! { "items": [ ... ] }
//! { "data": { "projects": [ ... ] } }
//! { "data": { "projects": { "edges": [ { "node": {...} }, ... ] } } }
//! ```

use ledgerview_core::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Wrapper fields searched, in order, after the collection name itself
const WRAPPER_FIELDS: [&str; 3] = ["data", "items", "records"];

/// Find the record list inside a decoded payload
pub fn unwrap_records(payload: Value, collection: &str) -> Result<Vec<Value>, String> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            if let Some(edges) = map.remove("edges") {
                return edges_to_nodes(edges);
            }
            if let Some(inner) = map.remove(collection) {
                return unwrap_records(inner, collection);
            }
            for field in WRAPPER_FIELDS {
                if let Some(inner) = map.remove(field) {
                    return unwrap_records(inner, collection);
                }
            }
            Err(format!("no '{}' record list in object", collection))
        }
        other => Err(format!("expected a record list, found {}", kind(&other))),
    }
}

fn edges_to_nodes(edges: Value) -> Result<Vec<Value>, String> {
    let Value::Array(edges) = edges else {
        return Err("'edges' is not an array".to_string());
    };

    Ok(edges
        .into_iter()
        .map(|edge| match edge {
            Value::Object(mut map) => map.remove("node").unwrap_or(Value::Object(map)),
            other => other,
        })
        .collect())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decode a payload into typed records of the named source
pub fn decode_records<T: DeserializeOwned>(
    source_name: &str,
    collection: &str,
    payload: Value,
) -> AppResult<Vec<T>> {
    let items =
        unwrap_records(payload, collection).map_err(|msg| AppError::format(source_name, msg))?;

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| AppError::format(source_name, format!("record {}: {}", index, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerview_core::models::RawProject;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let items = unwrap_records(json!([{ "id": "a" }, { "id": "b" }]), "projects").unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_items_envelope() {
        let items = unwrap_records(json!({ "items": [{ "id": "a" }] }), "projects").unwrap();
        assert_eq!(items[0]["id"], "a");
    }

    #[test]
    fn test_data_envelope() {
        let payload = json!({ "data": { "projects": [{ "id": "a" }], "totalCount": 1 } });
        let items = unwrap_records(payload, "projects").unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_edges_envelope() {
        let payload = json!({
            "data": {
                "supportTickets": {
                    "edges": [ { "node": { "id": "t1" } }, { "node": { "id": "t2" } } ],
                    "pageInfo": { "hasNextPage": false }
                }
            }
        });
        let items = unwrap_records(payload, "supportTickets").unwrap();
        assert_eq!(items[1]["id"], "t2");
    }

    #[test]
    fn test_unrecognized_shapes() {
        assert!(unwrap_records(json!({ "count": 3 }), "projects").is_err());
        assert!(unwrap_records(json!("projects"), "projects").is_err());
        assert!(unwrap_records(json!({ "edges": 4 }), "projects").is_err());
    }

    #[test]
    fn test_decode_reports_bad_record() {
        let payload = json!([{ "id": "p1" }, { "id": "p2", "revenueAmount": 5 }]);
        let err = decode_records::<RawProject>("projects", "projects", payload).unwrap_err();

        assert!(matches!(err, AppError::SourceFormat { .. }));
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_decode_accepts_numeric_ids() {
        let payload = json!([{ "id": "p1" }, { "id": 7 }]);
        let projects = decode_records::<RawProject>("projects", "projects", payload).unwrap();

        let ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "7"]);
    }
}
