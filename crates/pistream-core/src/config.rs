//! Configuration loading and typed config structures for pistream.
//!
//! The optional configuration file is `pistream-config.yaml` in the working
//! directory. Every section and field has a default, so an empty file (or no
//! file at all) yields the reference behavior: start at 100 000 significant
//! digits, add 10 000 digits every 1000 terms, show a 100-character window
//! that widens by one character per term, and pause 10 ms after every fifth
//! message.

use std::path::Path;

use serde::Deserialize;

/// Default configuration file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "pistream-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level pistream configuration.
///
/// Mirrors the structure of `pistream-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamConfig {
    /// Listening address.
    #[serde(default)]
    pub server: ServerSection,

    /// Arithmetic precision and its growth schedule.
    #[serde(default)]
    pub series: SeriesConfig,

    /// Outbound snapshot shape.
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Pacing between outbound messages.
    #[serde(default)]
    pub cadence: CadenceConfig,

    /// Progress log frequency.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StreamConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override the listening address:
    /// - `PISTREAM_HOST` overrides `server.host`
    /// - `PISTREAM_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.server.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `pistream-config.yaml` from the working directory, or defaults
    /// (plus environment overrides) when the file does not exist.
    ///
    /// # Errors
    ///
    /// See [`StreamConfig::from_file`].
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::from_file(path)
        } else {
            Self::parse("")
        }
    }

    /// Reject values the evaluator or snapshot policy cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.series.initial_precision == 0 {
            return Err(invalid("series.initial_precision must be at least 1"));
        }
        if self.series.growth_interval == 0 {
            return Err(invalid("series.growth_interval must be at least 1"));
        }
        if self
            .series
            .max_precision
            .is_some_and(|max| max < self.series.initial_precision)
        {
            return Err(invalid(
                "series.max_precision must not be below series.initial_precision",
            ));
        }
        if self.snapshot.initial_width == 0 {
            return Err(invalid("snapshot.initial_width must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// Listening address for the HTTP/WebSocket server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSection {
    /// Override the listening address with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `PISTREAM_PORT` is not a port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("PISTREAM_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("PISTREAM_PORT") {
            self.port = val.parse().map_err(|e| ConfigError::Invalid {
                reason: format!("invalid PISTREAM_PORT {val:?}: {e}"),
            })?;
        }
        Ok(())
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Precision schedule for the series evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SeriesConfig {
    /// Significant digits retained when a session starts.
    #[serde(default = "default_initial_precision")]
    pub initial_precision: u64,

    /// Digits added at each growth point.
    #[serde(default = "default_precision_increment")]
    pub precision_increment: u64,

    /// Precision grows after every term whose index is a positive multiple
    /// of this value.
    #[serde(default = "default_growth_interval")]
    pub growth_interval: u64,

    /// Optional ceiling on precision. `None` grows without bound.
    #[serde(default)]
    pub max_precision: Option<u64>,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            initial_precision: default_initial_precision(),
            precision_increment: default_precision_increment(),
            growth_interval: default_growth_interval(),
            max_precision: None,
        }
    }
}

/// Shape of each outbound snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnapshotConfig {
    /// Characters shown for the first term; the window widens by one per term.
    #[serde(default = "default_initial_width")]
    pub initial_width: u64,

    /// Label sent in the `method` field.
    #[serde(default = "default_method")]
    pub method: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            initial_width: default_initial_width(),
            method: default_method(),
        }
    }
}

/// Pacing between outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CadenceConfig {
    /// Pause after every n-th message. Zero disables pausing.
    #[serde(default = "default_pause_every")]
    pub pause_every: u64,

    /// Length of each pause in milliseconds.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            pause_every: default_pause_every(),
            pause_ms: default_pause_ms(),
        }
    }
}

/// Progress logging frequency, in terms. Zero disables that log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Emit an `info` progress line every n terms.
    #[serde(default = "default_progress_log_interval")]
    pub progress_log_interval: u64,

    /// Emit a `debug` line with the four sub-terms every n terms.
    #[serde(default = "default_detail_log_interval")]
    pub detail_log_interval: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            progress_log_interval: default_progress_log_interval(),
            detail_log_interval: default_detail_log_interval(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

const fn default_port() -> u16 {
    5000
}

const fn default_initial_precision() -> u64 {
    100_000
}

const fn default_precision_increment() -> u64 {
    10_000
}

const fn default_growth_interval() -> u64 {
    1000
}

const fn default_initial_width() -> u64 {
    100
}

fn default_method() -> String {
    "BBP Formula".to_owned()
}

const fn default_pause_every() -> u64 {
    5
}

const fn default_pause_ms() -> u64 {
    10
}

const fn default_progress_log_interval() -> u64 {
    10
}

const fn default_detail_log_interval() -> u64 {
    50
}
