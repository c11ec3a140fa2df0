//! Configuration management for logalert
//!
//! This module defines the main `Config` struct, responsible for holding all
//! application settings including the notifier rules. It uses the `figment`
//! crate to load configuration from a `logalert.toml` file and merge it with
//! environment variables and command-line arguments.

use crate::cli::Cli;
use crate::store::NotifierMap;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Log every inbound record.
    pub verbose: bool,
    /// Which presentation backend shows alerts.
    pub presenter: PresenterKind,
    /// Reload notifier rules when the configuration file changes.
    pub watch_config: bool,
    /// Read records from this file instead of stdin.
    pub input: Option<PathBuf>,
    /// How long to let in-flight alerts finish after input ends.
    pub shutdown_grace_ms: u64,
    /// Notifier rules keyed by event name.
    #[serde(default)]
    pub notifiers: NotifierMap,
}

/// The presentation backend to use.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PresenterKind {
    /// Native notifications and dialogs.
    #[default]
    Desktop,
    /// Print alerts to stdout.
    Console,
}

impl fmt::Display for PresenterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenterKind::Desktop => write!(f, "desktop"),
            PresenterKind::Console => write!(f, "console"),
        }
    }
}

impl Config {
    /// The layered configuration sources, without command-line overrides.
    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // Allow overriding with environment variables, e.g. LOGALERT_LOG_LEVEL=debug
            .merge(Env::prefixed("LOGALERT_").split("__"))
    }

    /// Loads the application configuration by layering defaults, the
    /// configuration file, environment variables and CLI arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config: Config = Self::figment(&cli.config_path())
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }

    /// Loads configuration from `config_path` without CLI overrides. Used when
    /// reloading notifier rules.
    pub fn load_file(config_path: &Path) -> Result<Self> {
        let config: Config = Self::figment(config_path).extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            verbose: false,
            presenter: PresenterKind::Desktop,
            watch_config: true,
            input: None,
            shutdown_grace_ms: 500,
            notifiers: NotifierMap::new(),
        }
    }
}
