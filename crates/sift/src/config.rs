//! Layered configuration for the sift command line.
//!
//! Layers are applied lowest first, each overriding the keys it sets:
//!
//! 1. Built-in defaults
//! 2. YAML config file
//! 3. `SIFT_*` environment variables
//! 4. Command-line flags (`--output`, `-v`)
//! 5. Explicit `--set key=value` overrides
//!
//! The config file is the `--config` path if given, else `$SIFT_CONFIG`,
//! else `config.yaml` in the platform config directory. Only the default
//! location may be missing.
//!
//! Loading happens before the logger exists, so [`ConfigLoader::load_with_sources`]
//! returns the layers that contributed for the caller to log afterwards.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use log::LevelFilter;
use serde::Deserialize;

use crate::error::{CliError, Result};
use crate::logging::LogFormat;
use crate::output::OutputMode;
use crate::records::InputFormat;

/// Keys accepted by every configuration layer.
pub const KEYS: [&str; 5] = ["output", "selector", "log_level", "log_format", "input_format"];

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SIFT_CONFIG";

const ENV_PREFIX: &str = "SIFT_";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Output mode for command reports.
    pub output: OutputMode,

    /// Selector used by `filter` when none is given.
    pub selector: Option<String>,

    pub log_level: LevelFilter,

    pub log_format: LogFormat,

    pub input_format: InputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output: OutputMode::Text,
            selector: None,
            log_level: LevelFilter::Warn,
            log_format: LogFormat::Text,
            input_format: InputFormat::Auto,
        }
    }
}

impl Config {
    /// Sets one key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output" => self.output = value.parse()?,
            "selector" => self.selector = Some(value.to_string()),
            "log_level" => {
                self.log_level = LevelFilter::from_str(value).map_err(|_| {
                    CliError::config(format!(
                        "invalid log_level '{value}', expected off, error, warn, info, debug or trace"
                    ))
                })?
            }
            "log_format" => self.log_format = value.parse()?,
            "input_format" => self.input_format = value.parse()?,
            other => {
                return Err(CliError::config(format!(
                    "unknown key '{other}', expected one of: {}",
                    KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

/// On-disk form of the config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    output: Option<String>,
    selector: Option<String>,
    log_level: Option<String>,
    log_format: Option<String>,
    input_format: Option<String>,
}

impl ConfigFile {
    fn entries(self) -> impl Iterator<Item = (&'static str, String)> {
        [
            ("output", self.output),
            ("selector", self.selector),
            ("log_level", self.log_level),
            ("log_format", self.log_format),
            ("input_format", self.input_format),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }
}

/// A layer that supplied configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Env { key: &'static str, var: String },
    Set { key: String },
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "loading config file {}", path.display()),
            Source::Env { key, var } => write!(f, "config {key} from {var}"),
            Source::Set { key } => write!(f, "config {key} from --set"),
        }
    }
}

/// Builds a [`Config`] from its layers.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    output: Option<OutputMode>,
    verbosity: u8,
    sets: Vec<(String, String)>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        ConfigLoader::default()
    }

    /// Uses an explicit config file, which must exist.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Output mode from the `--output` flag.
    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = Some(mode);
        self
    }

    /// Number of `-v` flags. Each one raises the log level a step above
    /// `warn`, never lowering what lower layers chose.
    pub fn verbosity(mut self, count: u8) -> Self {
        self.verbosity = count;
        self
    }

    /// Adds a `key=value` override.
    pub fn set(mut self, assignment: &str) -> Result<Self> {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            CliError::config(format!("invalid --set '{assignment}', expected key=value"))
        })?;
        self.sets.push((key.trim().to_string(), value.to_string()));
        Ok(self)
    }

    pub fn load(&self) -> Result<Config> {
        self.load_with_sources().map(|(config, _)| config)
    }

    /// Like [`load`](Self::load), also returning the layers that supplied
    /// values, lowest first.
    pub fn load_with_sources(&self) -> Result<(Config, Vec<Source>)> {
        let mut config = Config::default();
        let mut sources = Vec::new();

        if let Some(path) = self.config_path()? {
            for (key, value) in read_config_file(&path)?.entries() {
                config.set(key, &value)?;
            }
            sources.push(Source::File(path));
        }

        for key in KEYS {
            let var = format!("{ENV_PREFIX}{}", key.to_uppercase());
            if let Ok(value) = std::env::var(&var) {
                config.set(key, &value)?;
                sources.push(Source::Env { key, var });
            }
        }

        if let Some(mode) = self.output {
            config.output = mode;
        }
        if self.verbosity > 0 {
            config.log_level = config.log_level.max(verbosity_level(self.verbosity));
        }

        for (key, value) in &self.sets {
            config.set(key, value)?;
            sources.push(Source::Set { key: key.clone() });
        }

        Ok((config, sources))
    }

    /// Picks the config file to read, if any.
    fn config_path(&self) -> Result<Option<PathBuf>> {
        let explicit = self
            .path
            .clone()
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(CliError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path));
        }

        Ok(default_config_path().filter(|path| path.is_file()))
    }
}

/// `config.yaml` in the platform config directory for sift.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sift").map(|dirs| dirs.config_dir().join("config.yaml"))
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(&contents)
        .map_err(|e| CliError::config(format!("failed to parse {}: {e}", path.display())))
}

fn verbosity_level(count: u8) -> LevelFilter {
    match count {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(format!("SIFT_{}", key.to_uppercase()));
        }
        std::env::remove_var(CONFIG_ENV);
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.output, OutputMode::Text);
        assert_eq!(config.selector, None);
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.input_format, InputFormat::Auto);
    }

    #[test]
    fn set_validates_keys_and_values() {
        let mut config = Config::default();
        config.set("output", "yaml").unwrap();
        config.set("log_level", "debug").unwrap();
        config.set("selector", "a=1").unwrap();
        assert_eq!(config.output, OutputMode::Yaml);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.selector.as_deref(), Some("a=1"));

        assert!(matches!(config.set("colour", "red"), Err(CliError::Config(_))));
        assert!(matches!(config.set("log_level", "loud"), Err(CliError::Config(_))));
        assert!(matches!(config.set("input_format", "xml"), Err(CliError::Config(_))));
    }

    #[test]
    #[serial]
    fn log_format_from_each_layer() {
        clear_env();
        let file = config_file("log_format: json\n");
        let from_file = ConfigLoader::new().path(file.path()).load().unwrap();
        assert_eq!(from_file.log_format, LogFormat::Json);

        std::env::set_var("SIFT_LOG_FORMAT", "text");
        let from_env = ConfigLoader::new().path(file.path()).load();
        let from_set = ConfigLoader::new()
            .path(file.path())
            .set("log_format=json")
            .unwrap()
            .load();
        clear_env();
        assert_eq!(from_env.unwrap().log_format, LogFormat::Text);
        assert_eq!(from_set.unwrap().log_format, LogFormat::Json);

        let err = Config::default().set("log_format", "xml").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    #[serial]
    fn sources_follow_layer_order() {
        clear_env();
        let file = config_file("output: json\n");
        std::env::set_var("SIFT_SELECTOR", "a=1");
        let result = ConfigLoader::new()
            .path(file.path())
            .set("output=yaml")
            .unwrap()
            .load_with_sources();
        clear_env();
        let (config, sources) = result.unwrap();
        assert_eq!(config.output, OutputMode::Yaml);
        assert_eq!(
            sources,
            vec![
                Source::File(file.path().to_path_buf()),
                Source::Env {
                    key: "selector",
                    var: "SIFT_SELECTOR".to_string()
                },
                Source::Set {
                    key: "output".to_string()
                },
            ]
        );
        assert_eq!(sources[1].to_string(), "config selector from SIFT_SELECTOR");
        assert_eq!(
            sources[0].to_string(),
            format!("loading config file {}", file.path().display())
        );
    }

    #[test]
    fn set_requires_assignment() {
        assert!(ConfigLoader::new().set("output").is_err());
        let loader = ConfigLoader::new().set("selector=a=1").unwrap();
        assert_eq!(loader.sets, vec![("selector".to_string(), "a=1".to_string())]);
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(verbosity_level(1), LevelFilter::Info);
        assert_eq!(verbosity_level(2), LevelFilter::Debug);
        assert_eq!(verbosity_level(9), LevelFilter::Trace);
    }

    #[test]
    #[serial]
    fn file_layer() {
        clear_env();
        let file = config_file("output: json\nselector: tier!=free\n");
        let config = ConfigLoader::new().path(file.path()).load().unwrap();
        assert_eq!(config.output, OutputMode::Json);
        assert_eq!(config.selector.as_deref(), Some("tier!=free"));
        assert_eq!(config.log_level, LevelFilter::Warn);
    }

    #[test]
    #[serial]
    fn empty_file_is_defaults() {
        clear_env();
        let file = config_file("");
        let config = ConfigLoader::new().path(file.path()).load().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn unknown_file_key_is_rejected() {
        clear_env();
        let file = config_file("colour: red\n");
        let err = ConfigLoader::new().path(file.path()).load().unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    #[serial]
    fn missing_explicit_file_is_error() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::new()
            .path(dir.path().join("absent.yaml"))
            .load()
            .unwrap_err();
        assert!(err.to_string().starts_with("configuration error: config file not found"));
    }

    #[test]
    #[serial]
    fn config_env_names_file() {
        clear_env();
        let file = config_file("input_format: yaml\n");
        std::env::set_var(CONFIG_ENV, file.path());
        let config = ConfigLoader::new().load();
        clear_env();
        assert_eq!(config.unwrap().input_format, InputFormat::Yaml);
    }

    #[test]
    #[serial]
    fn precedence_file_env_flag_set() {
        clear_env();
        let file = config_file("output: json\nselector: a=1\nlog_level: error\n");

        std::env::set_var("SIFT_OUTPUT", "yaml");
        std::env::set_var("SIFT_SELECTOR", "a=2");
        let env_only = ConfigLoader::new().path(file.path()).load().unwrap();
        assert_eq!(env_only.output, OutputMode::Yaml);
        assert_eq!(env_only.selector.as_deref(), Some("a=2"));
        assert_eq!(env_only.log_level, LevelFilter::Error);

        let flagged = ConfigLoader::new()
            .path(file.path())
            .output(OutputMode::Csv)
            .verbosity(2)
            .load()
            .unwrap();
        assert_eq!(flagged.output, OutputMode::Csv);
        assert_eq!(flagged.log_level, LevelFilter::Debug);

        let explicit = ConfigLoader::new()
            .path(file.path())
            .output(OutputMode::Csv)
            .set("output=text")
            .unwrap()
            .set("selector=a=3")
            .unwrap()
            .load()
            .unwrap();
        clear_env();
        assert_eq!(explicit.output, OutputMode::Text);
        assert_eq!(explicit.selector.as_deref(), Some("a=3"));
    }

    #[test]
    #[serial]
    fn verbosity_never_lowers_level() {
        clear_env();
        let file = config_file("");
        std::env::set_var("SIFT_LOG_LEVEL", "trace");
        let config = ConfigLoader::new().path(file.path()).verbosity(1).load();
        clear_env();
        assert_eq!(config.unwrap().log_level, LevelFilter::Trace);
    }

    #[test]
    #[serial]
    fn invalid_env_value_is_error() {
        clear_env();
        let file = config_file("");
        std::env::set_var("SIFT_OUTPUT", "xml");
        let result = ConfigLoader::new().path(file.path()).load();
        clear_env();
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
