//! Logger setup.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use log::{LevelFilter, Record};
use serde_json::json;

use crate::error::CliError;

/// Shape of each log line on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `[LEVEL] message`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [LogFormat::Text, LogFormat::Json]
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                CliError::config(format!("invalid log_format '{s}', expected text or json"))
            })
    }
}

/// Installs the global logger at `level`.
///
/// `RUST_LOG`, when set, refines the level per module. Calling this more
/// than once keeps the first logger.
pub fn init(level: LevelFilter, format: LogFormat) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    match format {
        LogFormat::Text => {
            builder.format_timestamp(None).format_target(false);
        }
        LogFormat::Json => {
            builder.format(|buf, record| writeln!(buf, "{}", json_line(record)));
        }
    }
    if builder.try_init().is_ok() {
        log::debug!("logging at {level} as {format}");
    }
}

fn json_line(record: &Record<'_>) -> serde_json::Value {
    json!({
        "level": record.level().as_str(),
        "target": record.target(),
        "message": record.args().to_string(),
    })
}
