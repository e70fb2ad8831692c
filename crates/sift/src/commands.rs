//! Command-line definition and command handlers.
//!
//! Handlers build a [`Report`] and return its rendering; writing to the
//! terminal is left to the binary.

use std::io::Read;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;
use sift_fields::{escape_value, parse_selector, Requirement, Set};
use sift_meta::ListOptions;

use crate::config::{Config, ConfigLoader};
use crate::error::Result;
use crate::output::{render, OutputMode, Report};
use crate::records::load_records;

/// Parse field selectors and filter records with them.
#[derive(Debug, Parser)]
#[command(name = "sift", version, about)]
pub struct Cli {
    /// Config file (defaults to $SIFT_CONFIG or the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputMode>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Override a config key (repeatable)
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    pub sets: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the canonical form and requirements of a selector
    Parse {
        selector: String,
    },

    /// Print the records matching a selector
    Filter {
        /// Selector; falls back to the configured default
        selector: Option<String>,

        /// Read records from a file instead of stdin
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,

        /// Skip this many matches
        #[arg(long, allow_negative_numbers = true)]
        offset: Option<i64>,

        /// Print at most this many matches
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// Show the value a selector requires for a field, if any
    Exact {
        selector: String,
        field: String,
    },

    /// Escape a value for use in a selector
    Escape {
        value: String,
    },
}

impl Cli {
    /// Resolves configuration from the file, environment and flags.
    pub fn load_config(&self) -> Result<Config> {
        self.config_loader()?.load()
    }

    /// A loader carrying this invocation's flags and `--set` overrides.
    pub fn config_loader(&self) -> Result<ConfigLoader> {
        let mut loader = ConfigLoader::new().verbosity(self.verbose);
        if let Some(path) = &self.config {
            loader = loader.path(path);
        }
        if let Some(mode) = self.output {
            loader = loader.output(mode);
        }
        for assignment in &self.sets {
            loader = loader.set(assignment)?;
        }
        Ok(loader)
    }
}

/// Runs the selected command, reading records from `stdin` when needed.
pub fn execute<R: Read>(cli: &Cli, config: &Config, stdin: R) -> Result<String> {
    match &cli.command {
        Command::Parse { selector } => render(&parse(selector)?, config.output),
        Command::Filter {
            selector,
            input,
            offset,
            limit,
        } => {
            let selector = selector
                .as_deref()
                .or(config.selector.as_deref())
                .unwrap_or_default();
            let text = match input {
                Some(path) => std::fs::read_to_string(path)?,
                None => read_all(stdin)?,
            };
            let opts = ListOptions {
                field_selector: selector.to_string(),
                offset: *offset,
                limit: *limit,
                ..ListOptions::default()
            };
            render(&filter(&text, config, &opts)?, config.output)
        }
        Command::Exact { selector, field } => render(&exact(selector, field)?, config.output),
        Command::Escape { value } => render(&escape(value), config.output),
    }
}

fn read_all<R: Read>(mut reader: R) -> Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}

/// Canonical form of a selector.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    pub selector: String,
    pub empty: bool,
    pub requirements: Vec<Requirement>,
}

impl Report for ParseReport {
    fn text(&self) -> String {
        if self.empty {
            return "(everything)".to_string();
        }
        let mut out = self.selector.clone();
        for req in &self.requirements {
            out.push_str(&format!("\n  {} {} {}", req.field, req.operator, req.value));
        }
        out
    }

    fn table(&self) -> std::result::Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.requirements)
    }
}

pub fn parse(selector: &str) -> Result<ParseReport> {
    let sel = parse_selector(selector)?;
    debug!("parsed {} requirement(s)", sel.requirements().len());
    Ok(ParseReport {
        selector: sel.to_string(),
        empty: sel.is_empty(),
        requirements: sel.requirements(),
    })
}

/// Records matching a selector.
#[derive(Debug, Serialize)]
pub struct FilterReport {
    /// Matches before offset and limit.
    pub total_count: i64,
    pub items: Vec<Set>,
}

impl Report for FilterReport {
    fn text(&self) -> String {
        self.items
            .iter()
            .map(Set::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn table(&self) -> std::result::Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.items)
    }
}

pub fn filter(input: &str, config: &Config, opts: &ListOptions) -> Result<FilterReport> {
    let records = load_records(input, config.input_format)?;
    info!("read {} record(s)", records.len());

    let page = opts.select(&records)?;
    info!(
        "{} of {} record(s) match '{}'",
        page.list_meta.total_count,
        records.len(),
        opts.field_selector
    );

    Ok(FilterReport {
        total_count: page.list_meta.total_count,
        items: page.items.into_iter().cloned().collect(),
    })
}

/// The value a selector pins a field to.
#[derive(Debug, Serialize)]
pub struct ExactReport {
    pub field: String,
    pub value: Option<String>,
}

impl Report for ExactReport {
    fn text(&self) -> String {
        match &self.value {
            Some(value) => value.clone(),
            None => format!("no exact match for field '{}'", self.field),
        }
    }
}

pub fn exact(selector: &str, field: &str) -> Result<ExactReport> {
    let sel = parse_selector(selector)?;
    Ok(ExactReport {
        field: field.to_string(),
        value: sel.requires_exact_match(field).map(str::to_string),
    })
}

/// A value and its escaped form.
#[derive(Debug, Serialize)]
pub struct EscapeReport {
    pub value: String,
    pub escaped: String,
}

impl Report for EscapeReport {
    fn text(&self) -> String {
        self.escaped.clone()
    }
}

pub fn escape(value: &str) -> EscapeReport {
    EscapeReport {
        value: value.to_string(),
        escaped: escape_value(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_fields::{Fields, Operator};

    const RECORDS: &str = r#"[
        {"name": "web", "tier": "pro", "status": {"phase": "Running"}},
        {"name": "db", "tier": "free", "status": {"phase": "Running"}},
        {"name": "job", "tier": "pro", "status": {"phase": "Failed"}}
    ]"#;

    fn opts(selector: &str) -> ListOptions {
        ListOptions::default().with_field_selector(selector)
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_report() {
        let report = parse("tier!=free,status=active").unwrap();
        assert_eq!(report.selector, "status=active,tier!=free");
        assert!(!report.empty);
        assert_eq!(report.requirements[1].operator, Operator::NotEquals);
        assert_eq!(
            report.text(),
            "status=active,tier!=free\n  status = active\n  tier != free"
        );
    }

    #[test]
    fn parse_report_for_empty_selector() {
        let report = parse("").unwrap();
        assert!(report.empty);
        assert_eq!(report.text(), "(everything)");
    }

    #[test]
    fn filter_matches_nested_fields() {
        let config = Config::default();
        let report = filter(RECORDS, &config, &opts("status.phase=Running,tier=pro")).unwrap();
        assert_eq!(report.total_count, 1);
        assert_eq!(report.items[0].get("name"), "web");
    }

    #[test]
    fn filter_text_lists_records() {
        let config = Config::default();
        let report = filter(RECORDS, &config, &opts("name=db")).unwrap();
        assert_eq!(report.text(), "name=db,status.phase=Running,tier=free");
    }

    #[test]
    fn filter_paginates() {
        let config = Config::default();
        let report = filter(RECORDS, &config, &opts("").with_offset(1).with_limit(1)).unwrap();
        assert_eq!(report.total_count, 3);
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].get("name"), "db");
    }

    #[test]
    fn exact_report() {
        let found = exact("a=1,b!=2", "a").unwrap();
        assert_eq!(found.value.as_deref(), Some("1"));
        assert_eq!(found.text(), "1");

        let missing = exact("a=1,b!=2", "b").unwrap();
        assert_eq!(missing.value, None);
        assert_eq!(missing.text(), "no exact match for field 'b'");
    }

    #[test]
    fn escape_report() {
        let report = escape("a,b=c");
        assert_eq!(report.text(), r"a\,b\=c");
    }

    #[test]
    fn execute_reads_stdin() {
        let cli = Cli::parse_from(["sift", "filter", "tier!=pro"]);
        let out = execute(&cli, &Config::default(), RECORDS.as_bytes()).unwrap();
        assert_eq!(out, "name=db,status.phase=Running,tier=free");
    }

    #[test]
    fn execute_falls_back_to_configured_selector() {
        let cli = Cli::parse_from(["sift", "filter"]);
        let config = Config {
            selector: Some("name=job".to_string()),
            ..Config::default()
        };
        let out = execute(&cli, &config, RECORDS.as_bytes()).unwrap();
        assert!(out.starts_with("name=job,"));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["sift", "parse", "a=1", "-o", "json", "-vv", "--set", "x=y"]);
        assert_eq!(cli.output, Some(OutputMode::Json));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.sets, vec!["x=y"]);
        assert!(cli.load_config().is_err());
    }
}
