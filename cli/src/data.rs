//! Field data loaded from JSON files.
//!
//! Mapping:
//! - string → text
//! - number → number
//! - `{"date": "YYYY-MM-DD"}` → date
//! - `{"image": "logo.png"}` → image read from a path relative to the data file
//! - other objects → nested record
//! - array of objects → repeating section

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use docfill::{Error, FieldRecord, FieldValue, Result};
use serde_json::{Map, Value};

/// Load field data from a JSON file.
pub fn load(path: &Path) -> Result<FieldRecord> {
    let text = fs::read_to_string(path)?;
    let json: Value = serde_json::from_str(&text)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    from_json(&json, base)
}

/// Convert a parsed JSON document to field data.
///
/// Image paths are resolved against `base`.
pub fn from_json(json: &Value, base: &Path) -> Result<FieldRecord> {
    match json {
        Value::Object(map) => record(map, base, ""),
        other => Err(Error::InvalidData(format!(
            "top level must be an object, found {}",
            json_kind(other)
        ))),
    }
}

fn record(map: &Map<String, Value>, base: &Path, parent: &str) -> Result<FieldRecord> {
    let mut fields = FieldRecord::new();
    for (key, value) in map {
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", parent, key)
        };
        fields.insert(key.as_str(), field(value, base, &path)?);
    }
    Ok(fields)
}

fn field(value: &Value, base: &Path, path: &str) -> Result<FieldValue> {
    match value {
        Value::String(text) => Ok(FieldValue::Text(text.clone())),
        Value::Number(number) => number
            .as_f64()
            .map(FieldValue::Number)
            .ok_or_else(|| invalid(path, format!("number {} out of range", number))),
        Value::Object(map) => {
            if let Some(date) = single(map, "date") {
                return NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map(FieldValue::Date)
                    .map_err(|e| invalid(path, format!("invalid date '{}': {}", date, e)));
            }
            if let Some(image) = single(map, "image") {
                let file = base.join(image);
                return fs::read(&file)
                    .map(FieldValue::Image)
                    .map_err(|e| invalid(path, format!("cannot read image {}: {}", file.display(), e)));
            }
            Ok(FieldValue::Record(record(map, base, path)?))
        }
        Value::Array(items) => {
            let mut rows = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let row_path = format!("{}[{}]", path, i);
                match item {
                    Value::Object(map) => rows.push(record(map, base, &row_path)?),
                    other => {
                        return Err(invalid(
                            &row_path,
                            format!("list rows must be objects, found {}", json_kind(other)),
                        ))
                    }
                }
            }
            Ok(FieldValue::List(rows))
        }
        Value::Bool(_) | Value::Null => Err(invalid(
            path,
            format!("{} values are not supported", json_kind(value)),
        )),
    }
}

/// The string value of a one-key object `{"<key>": "..."}`.
fn single<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    if map.len() != 1 {
        return None;
    }
    map.get(key).and_then(Value::as_str)
}

fn invalid(path: &str, message: String) -> Error {
    Error::InvalidData(format!("field '{}': {}", path, message))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
