//! Structured serialization of command reports.
//!
//! Handles JSON, YAML and CSV. Text output goes through
//! [`Report::text`](crate::output::Report::text) instead.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::output::OutputMode;

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(String),

    #[error("not a structured output mode")]
    NotStructured,
}

/// Serializes data to the specified structured format.
///
/// Returns an error for [`OutputMode::Text`].
pub fn serialize_structured<T: Serialize + ?Sized>(
    data: &T,
    mode: OutputMode,
) -> Result<String, SerializeError> {
    match mode {
        OutputMode::Json => to_json(data),
        OutputMode::Yaml => to_yaml(data),
        OutputMode::Csv => serialize_csv(data),
        OutputMode::Text => Err(SerializeError::NotStructured),
    }
}

pub fn to_json<T: Serialize + ?Sized>(data: &T) -> Result<String, SerializeError> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn to_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, SerializeError> {
    Ok(serde_yaml::to_string(data)?)
}

/// Serializes data to CSV.
///
/// The data is first converted to JSON, then flattened: an array of objects
/// becomes one row per object, with the union of their keys as header.
pub fn serialize_csv<T: Serialize + ?Sized>(data: &T) -> Result<String, SerializeError> {
    let json_value = serde_json::to_value(data)?;
    flatten_json_to_csv(&json_value)
}

fn flatten_json_to_csv(value: &Value) -> Result<String, SerializeError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    match value {
        Value::Array(arr) if arr.iter().all(Value::is_object) && !arr.is_empty() => {
            // Records differ in which fields they carry.
            let mut headers: Vec<&str> = Vec::new();
            for obj in arr.iter().filter_map(Value::as_object) {
                for key in obj.keys() {
                    if !headers.contains(&key.as_str()) {
                        headers.push(key);
                    }
                }
            }
            headers.sort_unstable();
            write_row(&mut wtr, &headers)?;

            for obj in arr.iter().filter_map(Value::as_object) {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| obj.get(*h).map(value_to_string).unwrap_or_default())
                    .collect();
                write_row(&mut wtr, &row)?;
            }
        }
        Value::Array(arr) => {
            write_row(&mut wtr, ["value"])?;
            for item in arr {
                write_row(&mut wtr, [value_to_string(item)])?;
            }
        }
        Value::Object(obj) => {
            write_row(&mut wtr, ["key", "value"])?;
            for (k, v) in obj {
                write_row(&mut wtr, [k.as_str(), &value_to_string(v)])?;
            }
        }
        scalar => {
            write_row(&mut wtr, ["value"])?;
            write_row(&mut wtr, [value_to_string(scalar)])?;
        }
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| SerializeError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SerializeError::Csv(e.to_string()))
}

fn write_row<I, T>(wtr: &mut csv::Writer<Vec<u8>>, row: I) -> Result<(), SerializeError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    wtr.write_record(row)
        .map_err(|e| SerializeError::Csv(e.to_string()))
}

/// Converts a JSON value to a CSV cell.
fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
