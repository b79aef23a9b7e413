use serde::de::DeserializeOwned;
use serde_json::Value;

lazy_static::lazy_static! {
    static ref FENCED_JSON: regex::Regex =
        regex::Regex::new(r"```json[ \t]*\r?\n([\s\S]*?)\r?\n[ \t]*```").unwrap();
}

/// Pull the body of the first fenced block labelled `json` out of free text.
pub fn extract_fenced_json(text: &str) -> Option<&str> {
    FENCED_JSON
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Turn a raw response payload into a list of records.
///
/// Tried in order:
/// 1. `raw` already is a JSON array.
/// 2. `raw` is a string holding a fenced `json` block; the block is parsed and
///    is either the array itself or an object whose `field` is the array.
/// 3. Otherwise there is no data and the result is empty.
///
/// Elements that do not fit `T` are skipped.
pub fn unwrap_records<T: DeserializeOwned>(raw: &Value, field: &str) -> Vec<T> {
    match raw {
        Value::Array(items) => collect_records(items, field),
        Value::String(text) => {
            let Some(block) = extract_fenced_json(text) else {
                log::warn!("{} payload is text without a json block", field);
                return Vec::new();
            };

            match serde_json::from_str::<Value>(block) {
                Ok(Value::Array(items)) => collect_records(&items, field),
                Ok(Value::Object(mut obj)) => match obj.remove(field) {
                    Some(Value::Array(items)) => collect_records(&items, field),
                    _ => {
                        log::warn!("{} json block has no '{}' array", field, field);
                        Vec::new()
                    }
                },
                Ok(_) => {
                    log::warn!("{} json block has an unexpected shape", field);
                    Vec::new()
                }
                Err(e) => {
                    log::warn!("{} json block does not parse: {}", field, e);
                    Vec::new()
                }
            }
        }
        other => {
            log::warn!("unexpected {} payload: {}", field, other);
            Vec::new()
        }
    }
}

fn collect_records<T: DeserializeOwned>(items: &[Value], field: &str) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("skipping malformed {} entry: {}", field, e);
                None
            }
        })
        .collect()
}
