//! Configuration loading and resolution for the CLI.
//!
//! Precedence for every setting: command-line flag, then config file, then
//! the library default.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use pgn_downloader_core::download::{CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS};
use pgn_downloader_core::{
    ARCHIVE_MARKER, ClientSettings, DEFAULT_HOST, DEFAULT_LISTING_PATH, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_OUTPUT_DIR, FailurePolicy, LinkJoin, RunnerConfig,
};
use serde::Deserialize;

use crate::cli::Args;

/// TOML-backed file configuration. Keys mirror the long CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub listing_path: Option<String>,
    pub marker: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub max_connections: Option<u8>,
    pub continue_on_error: Option<bool>,
    pub normalize_links: Option<bool>,
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against the CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(value) = self.max_connections
            && !(1..=32).contains(&value)
        {
            bail!("Invalid config value for `max_connections`: {value}. Expected range: 1..=32");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("timeout_secs", self.timeout_secs)?;
        if self.marker.as_deref().is_some_and(str::is_empty) {
            bail!("Invalid config value for `marker`: must not be empty");
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/pgn-downloader/config.toml`
/// 2. `$HOME/.config/pgn-downloader/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("pgn-downloader")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("pgn-downloader")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist. The default path is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return load_file_config(path).map(Some);
    }

    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(raw)?;
    config.validate()?;
    Ok(config)
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub listing_path: String,
    pub marker: String,
    pub output_dir: PathBuf,
    pub max_connections: usize,
    pub failure_policy: FailurePolicy,
    pub link_join: LinkJoin,
    pub client: ClientSettings,
}

impl Settings {
    /// Merges CLI arguments over the optional file config.
    pub fn resolve(args: &Args, file: Option<&FileConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let marker = args
            .marker
            .clone()
            .or(file.marker)
            .unwrap_or_else(|| ARCHIVE_MARKER.to_string());
        if marker.is_empty() {
            bail!("The archive marker must not be empty");
        }

        let max_connections = args
            .max_connections
            .or(file.max_connections)
            .map_or(DEFAULT_MAX_CONNECTIONS, usize::from);

        let continue_on_error = cli_switch(args.continue_on_error, args.fail_fast)
            .or(file.continue_on_error)
            .unwrap_or(false);
        let normalize_links = cli_switch(args.normalize_links, args.verbatim_links)
            .or(file.normalize_links)
            .unwrap_or(false);

        let connect_secs = args
            .connect_timeout
            .or(file.connect_timeout_secs)
            .unwrap_or(CONNECT_TIMEOUT_SECS);
        let request_secs = args
            .timeout
            .or(file.timeout_secs)
            .unwrap_or(REQUEST_TIMEOUT_SECS);

        Ok(Self {
            host: args
                .host
                .clone()
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            listing_path: args
                .listing_path
                .clone()
                .or(file.listing_path)
                .unwrap_or_else(|| DEFAULT_LISTING_PATH.to_string()),
            marker,
            output_dir: args
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            max_connections,
            failure_policy: if continue_on_error {
                FailurePolicy::ContinueOnError
            } else {
                FailurePolicy::FailFast
            },
            link_join: if normalize_links {
                LinkJoin::Normalized
            } else {
                LinkJoin::Verbatim
            },
            client: ClientSettings {
                connect_timeout: Duration::from_secs(connect_secs),
                request_timeout: Duration::from_secs(request_secs),
                max_connections,
            },
        })
    }

    /// Runner configuration derived from these settings.
    #[must_use]
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            max_connections: self.max_connections,
            failure_policy: self.failure_policy,
            host: self.host.clone(),
        }
    }
}

/// Reads an on/off flag pair; `None` when neither was given.
fn cli_switch(on: bool, off: bool) -> Option<bool> {
    if on {
        Some(true)
    } else if off {
        Some(false)
    } else {
        None
    }
}
