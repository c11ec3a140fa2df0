//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. These arguments are parsed at startup and then merged with
//! the configuration from the `logalert.toml` file and environment variables.

use crate::config::PresenterKind;
use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// The configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "logalert.toml";

/// Turns monitoring agent result logs into desktop alerts.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Read log records from this file instead of stdin.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Log every inbound record.
    #[arg(short, long)]
    pub verbose: bool,

    /// Log level filter, e.g. "info" or "logalert=debug".
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Where alerts are shown.
    #[arg(long, value_enum, value_name = "KIND")]
    pub presenter: Option<PresenterKind>,

    /// Do not reload notifier rules when the configuration file changes.
    #[arg(long)]
    pub no_watch: bool,
}

impl Cli {
    /// The configuration file to load.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(input) = &self.input {
            dict.insert(
                "input".into(),
                Value::from(input.to_string_lossy().into_owned()),
            );
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(kind) = self.presenter {
            dict.insert("presenter".into(), Value::from(kind.to_string()));
        }

        // Flags only ever switch behaviour on/off relative to the file; an
        // absent flag leaves the file's value alone.
        if self.verbose {
            dict.insert("verbose".into(), Value::from(true));
        }
        if self.no_watch {
            dict.insert("watch_config".into(), Value::from(false));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
