//! Loading records from JSON, JSON lines and YAML input.
//!
//! Every input record must be a map. Nested maps are flattened into
//! dot-separated field names, scalars are stringified and `null` reads as
//! the empty string, so `{"status": {"phase": "Running"}}` becomes the
//! record `status.phase=Running`. Arrays are kept as compact JSON text.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_fields::Set;

use crate::error::{CliError, Result};

/// Encoding of a record stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Detect from the first non-blank character
    #[default]
    Auto,
    /// A JSON array of objects
    Json,
    /// One JSON object per line
    Jsonl,
    /// A YAML sequence of maps
    Yaml,
}

impl InputFormat {
    pub const ALL: [InputFormat; 4] = [
        InputFormat::Auto,
        InputFormat::Json,
        InputFormat::Jsonl,
        InputFormat::Yaml,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Auto => "auto",
            InputFormat::Json => "json",
            InputFormat::Jsonl => "jsonl",
            InputFormat::Yaml => "yaml",
        }
    }

    /// Resolves `Auto` by looking at the input.
    ///
    /// `[` means a JSON array, `{` JSON lines, anything else YAML.
    fn encoding(self, input: &str) -> Encoding {
        match self {
            InputFormat::Json => Encoding::Json,
            InputFormat::Jsonl => Encoding::JsonLines,
            InputFormat::Yaml => Encoding::Yaml,
            InputFormat::Auto => match input.trim_start().chars().next() {
                Some('[') => Encoding::Json,
                Some('{') => Encoding::JsonLines,
                _ => Encoding::Yaml,
            },
        }
    }
}

/// A concrete encoding, once `Auto` has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Json,
    JsonLines,
    Yaml,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Json => "json",
            Encoding::JsonLines => "jsonl",
            Encoding::Yaml => "yaml",
        })
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        InputFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                CliError::config(format!(
                    "unknown input format '{s}', expected one of: auto, json, jsonl, yaml"
                ))
            })
    }
}

/// Parses `input` into flat records.
///
/// Blank input yields no records.
pub fn load_records(input: &str, format: InputFormat) -> Result<Vec<Set>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    let encoding = format.encoding(input);
    log::debug!("reading records as {encoding}");

    let values: Vec<Value> = match encoding {
        Encoding::Json => serde_json::from_str(input).map_err(CliError::records)?,
        Encoding::JsonLines => serde_json::Deserializer::from_str(input)
            .into_iter::<Value>()
            .collect::<std::result::Result<_, _>>()
            .map_err(CliError::records)?,
        Encoding::Yaml => {
            let doc: Option<Vec<Value>> =
                serde_yaml::from_str(input).map_err(CliError::records)?;
            doc.unwrap_or_default()
        }
    };

    values
        .iter()
        .enumerate()
        .map(|(i, value)| flatten_record(value).map_err(|e| annotate(i, e)))
        .collect()
}

fn annotate(index: usize, err: CliError) -> CliError {
    match err {
        CliError::Records(msg) => CliError::Records(format!("record {index}: {msg}")),
        other => other,
    }
}

/// Flattens one JSON object into a record.
///
/// Fails when a literal dotted key and a nested path name the same field.
pub fn flatten_record(value: &Value) -> Result<Set> {
    let Value::Object(map) = value else {
        return Err(CliError::records(format!(
            "expected a map, got {}",
            kind_of(value)
        )));
    };
    let mut set = Set::new();
    for (key, value) in map {
        flatten_into(&mut set, key, value)?;
    }
    Ok(set)
}

fn flatten_into(set: &mut Set, path: &str, value: &Value) -> Result<()> {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(set, &format!("{path}.{key}"), child)?;
            }
        }
        other => {
            if set.insert(path, scalar_to_string(other)).is_some() {
                return Err(CliError::records(format!("duplicate field '{path}'")));
            }
        }
    }
    Ok(())
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) if map.is_empty() => String::new(),
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}
