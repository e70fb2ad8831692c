//! The `sift` command line: parse field selectors and filter records.
//!
//! ```text
//! sift parse 'tier!=free,status=active'
//! sift filter 'status.phase=Running' --input pods.json --output csv
//! sift exact 'name=web,tier!=free' name
//! sift escape 'a,b'
//! ```
//!
//! Records are read as a JSON array, JSON lines or YAML; see
//! [`records`]. Configuration layering is described in [`config`].

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod records;
pub mod serialize;

pub use commands::{execute, Cli, Command};
pub use config::{Config, ConfigLoader, Source};
pub use logging::LogFormat;
pub use error::{CliError, Result};
pub use output::{OutputMode, Report};
pub use records::{load_records, InputFormat};
