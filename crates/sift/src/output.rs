//! Output mode control.
//!
//! [`OutputMode`] selects how a command's [`Report`] is written: as plain
//! text, or serialized as JSON, YAML or CSV.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};
use crate::serialize::{serialize_structured, SerializeError};

/// Controls how command output is rendered.
///
/// This is the user-facing enum for the `--output` flag and the `output`
/// configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Flattened CSV rows
    Csv,
}

impl OutputMode {
    pub const ALL: [OutputMode; 4] = [
        OutputMode::Text,
        OutputMode::Json,
        OutputMode::Yaml,
        OutputMode::Csv,
    ];

    /// Returns true for modes that serialize report data directly.
    pub fn is_structured(&self) -> bool {
        !matches!(self, OutputMode::Text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Text => "text",
            OutputMode::Json => "json",
            OutputMode::Yaml => "yaml",
            OutputMode::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        OutputMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                CliError::config(format!(
                    "unknown output mode '{s}', expected one of: text, json, yaml, csv"
                ))
            })
    }
}

/// The result of a command, renderable in every [`OutputMode`].
pub trait Report: Serialize {
    /// Plain-text form.
    fn text(&self) -> String;

    /// Data written in CSV mode. Defaults to the whole report.
    fn table(&self) -> std::result::Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Renders a report in the given mode.
pub fn render<R: Report>(report: &R, mode: OutputMode) -> Result<String> {
    let rendered = match mode {
        OutputMode::Text => report.text(),
        OutputMode::Csv => {
            let table = report.table().map_err(SerializeError::from)?;
            serialize_structured(&table, mode)?
        }
        _ => serialize_structured(report, mode)?,
    };
    Ok(rendered)
}
