//! Configuration file loading with precedence handling.

use crate::model::{EventKind, LinkKey};
use crate::stream::{FilterState, StreamPolicy};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "BTP_MONITOR_CONFIG";

/// Environment variable overriding the backend URL.
pub const URL_ENV: &str = "BTP_MONITOR_URL";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (permission issues, not a file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/btp-monitor/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Monitor backend base URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Delay after a productive fetch, in milliseconds.
    #[serde(default)]
    pub fast_interval_ms: Option<u64>,

    /// Delay when caught up or after a failure, in milliseconds.
    #[serde(default)]
    pub slow_interval_ms: Option<u64>,

    /// Page size of backward fetches (1-100).
    #[serde(default)]
    pub backlog_page_limit: Option<u32>,

    /// Records requested per "load previous".
    #[serde(default)]
    pub load_previous_step: Option<u64>,

    /// Link status refresh period, in milliseconds.
    #[serde(default)]
    pub status_interval_ms: Option<u64>,

    /// Per-request HTTP timeout, in milliseconds.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Event classes shown at startup (empty = server default).
    #[serde(default)]
    pub events: Option<Vec<EventKind>>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Monitor backend base URL.
    pub url: String,
    /// Fast poll interval in milliseconds.
    pub fast_interval_ms: u64,
    /// Slow poll interval in milliseconds.
    pub slow_interval_ms: u64,
    /// Backward page size.
    pub backlog_page_limit: u32,
    /// "Load previous" step.
    pub load_previous_step: u64,
    /// Link status refresh period in milliseconds.
    pub status_interval_ms: u64,
    /// HTTP request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Initial event-class filter.
    pub events: Vec<EventKind>,
    /// Initial link filter (CLI only).
    pub link: Option<LinkKey>,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let policy = StreamPolicy::default();
        Self {
            url: "http://localhost:8000".to_string(),
            fast_interval_ms: policy.fast_interval.as_millis() as u64,
            slow_interval_ms: policy.slow_interval.as_millis() as u64,
            backlog_page_limit: policy.backlog_page_limit,
            load_previous_step: policy.load_previous_step,
            status_interval_ms: 10_000,
            request_timeout_ms: 5_000,
            events: Vec::new(),
            link: None,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Stream engine policy derived from the interval and paging settings.
    pub fn stream_policy(&self) -> StreamPolicy {
        StreamPolicy {
            fast_interval: Duration::from_millis(self.fast_interval_ms),
            slow_interval: Duration::from_millis(self.slow_interval_ms),
            backlog_page_limit: self.backlog_page_limit,
            load_previous_step: self.load_previous_step,
        }
    }

    /// Filter the stream starts with.
    pub fn initial_filter(&self) -> FilterState {
        FilterState::new(self.events.iter().cloned(), self.link.clone())
    }

    /// HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Link status refresh period.
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--url`
    pub url: Option<String>,
    /// `--events`
    pub events: Option<Vec<EventKind>>,
    /// `--link`
    pub link: Option<LinkKey>,
    /// `--poll-ms`
    pub poll_ms: Option<u64>,
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/btp-monitor/btp-monitor.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("btp-monitor").join("btp-monitor.log")
    } else {
        PathBuf::from("btp-monitor.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/btp-monitor/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("btp-monitor").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `BTP_MONITOR_CONFIG` environment variable
/// 3. Default path `~/.config/btp-monitor/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed,
/// or if `BTP_MONITOR_CONFIG` is not valid unicode.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(CONFIG_ENV) {
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `BTP_MONITOR_URL`: Override backend URL
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(url) = std::env::var(URL_ENV) {
        if !url.trim().is_empty() {
            config.url = url;
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        url: config.url.unwrap_or(defaults.url),
        fast_interval_ms: config.fast_interval_ms.unwrap_or(defaults.fast_interval_ms),
        slow_interval_ms: config.slow_interval_ms.unwrap_or(defaults.slow_interval_ms),
        backlog_page_limit: config
            .backlog_page_limit
            .unwrap_or(defaults.backlog_page_limit),
        load_previous_step: config
            .load_previous_step
            .unwrap_or(defaults.load_previous_step),
        status_interval_ms: config
            .status_interval_ms
            .unwrap_or(defaults.status_interval_ms),
        request_timeout_ms: config
            .request_timeout_ms
            .unwrap_or(defaults.request_timeout_ms),
        events: config.events.unwrap_or(defaults.events),
        link: defaults.link,
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(url) = cli.url {
        config.url = url;
    }

    if let Some(events) = cli.events {
        config.events = events;
    }

    if let Some(link) = cli.link {
        config.link = Some(link);
    }

    if let Some(poll_ms) = cli.poll_ms {
        config.slow_interval_ms = poll_ms;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
