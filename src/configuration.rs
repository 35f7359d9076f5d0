// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recipe API configuration module.
//!
//! # Description
//!
//! This module includes all the definitions for the app's settings and the
//! objects that automate reading the configuration from files or environment
//! variables and parsing them to Rust's native types.
//!
//! All the environment variables that are meant to be used within this module
//! shall use the prefix `RECIPEAPI`.
//!
//! # Settings
//!
//! The settings of the application may be set via 2 methods:
//! - Using the configuration files located in the `config` folder.
//! - Using environment variables.
//!
//! ## Environment Variables
//!
//! - `RUN_MODE`: `devel`, `prod`. This variable shall take a value that refers to a
//!    configuration file in the `config` folder. The settings found there will
//!    override the settings found in `base.toml`. When not set, `devel` is considered
//!    as run mode.
//!
//! Variables defined within configuration files can be overridden using the `RECIPEAPI`
//! prefix. Variables need to be scoped in the same way as they are found in the configuration
//! files. For example, to override [LogSettings::tracing_level]:
//!
//! ```bash
//! $ RECIPEAPI__APPLICATION__LOG_SETTINGS__TRACING_LEVEL=trace ./recipe_api
//! ```
//!
//! **Note that the scope separator is a double `_`.**
//!
//! When multiple configuration variables are needed to be overridden, it is advised to
//! create a `local.toml` file within the `config` folder.
//!
//! ## Configuration Files
//!
//! - [ApplicationSettings] for settings that apply to the main application.
//! - [DataBaseSettings] for settings that apply to the DB connection.
//! - [TokenSettings] for settings that apply to the API access tokens.

use chrono::TimeDelta;
use config::{Config, ConfigError, Environment, File};
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_derive::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use std::env;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

/// Name of the directory in which configuration files will be stored.
const CONF_DIR: &str = "config";

/// Top level `struct` for the configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    /// DB Settings.
    pub database: DataBaseSettings,
    /// API token settings.
    pub token: TokenSettings,
}

/// Application's settings.
#[derive(Clone, Debug, Deserialize)]
pub struct ApplicationSettings {
    /// Listening port for the application.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    /// Host address for the application.
    pub host: String,
    /// Path prefix under which every endpoint is mounted, i.e. `/api`.
    pub base_url: String,
    /// Log settings.
    pub log_settings: LogSettings,
}

/// Data Base connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DataBaseSettings {
    /// Path to the SQLite database file.
    pub filename: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    /// Maximum number of connections for the connections pool.
    pub max_connections: u16,
    /// Idle timeout for open connections.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub idle_timeout_sec: u16,
    /// Create the database file when it doesn't exist.
    pub create_if_missing: bool,
}

/// Settings for the API access tokens.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenSettings {
    /// Days a freshly issued token stays valid.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub expiry_days: u16,
}

/// Log related settings.
///
/// # Description
///
/// Log messages are sent to one of these outputs:
/// - journald, when [LogSettings::journald] is set. Meant for systemd services.
/// - A pretty multi-line format to _stdout_, when [LogSettings::pretty_log] is set.
/// - A compact single-line format to _stdout_ otherwise.
#[derive(Clone, Debug, Deserialize)]
pub struct LogSettings {
    /// See [tracing::Level](https://docs.rs/tracing/0.1.40/tracing/struct.Level.html).
    /// Accepted values are specified at [LogSettings::get_verbosity_level].
    pub tracing_level: String,
    /// Send log messages to journald.
    pub journald: Option<bool>,
    /// Use the pretty formatter for the console output.
    pub pretty_log: Option<bool>,
}

impl Settings {
    /// Parse the application settings.
    pub fn new() -> Result<Self, ConfigError> {
        // Build the full path of the configuration directory.
        let base_path = std::env::current_dir()
            .map_err(|e| ConfigError::Message(format!("Failed to read the current dir: {e}")))?;
        let cfg_dir = base_path.join(CONF_DIR);

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "devel".into());

        let settings = Config::builder()
            // Start off by merging in the "default" configuration file.
            .add_source(File::from(cfg_dir.join("base")).required(true))
            .add_source(File::from(cfg_dir.join(run_mode)).required(false))
            .add_source(File::from(cfg_dir.join("local")).required(false))
            .add_source(Environment::with_prefix("recipeapi").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

impl DataBaseSettings {
    /// Translate a timeout in seconds from an integer to a type `time::Duration`.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_sec as u64)
    }

    /// Build the connection options for the SQLite database.
    ///
    /// # Description
    ///
    /// Foreign keys are always enforced and the journal runs in WAL mode so readers don't block
    /// the writer.
    pub fn build_db_conn(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.filename)
            .create_if_missing(self.create_if_missing)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
    }
}

impl TokenSettings {
    pub fn expiry(&self) -> TimeDelta {
        TimeDelta::days(self.expiry_days as i64)
    }
}

impl LogSettings {
    /// Get the chosen verbosity level as a [LevelFilter] object.
    ///
    /// # Description
    ///
    /// Accepted values:
    /// - `debug` or `dbg` to set the verbosity to `DEBUG`.
    /// - `info` to set the verbosity to `INFO`.
    /// - `error` or `err` to set the verbosity to `ERROR`.
    /// - `trace` to set the verbosity to `TRACE`.
    /// - `none` or `off` to mute the output.
    /// - `warn` or any other string to set the verbosity to `WARN`.
    pub fn get_verbosity_level(&self) -> LevelFilter {
        LogSettings::verbosity(&self.tracing_level)
    }

    /// Translate a string into a [LevelFilter] or return a [LevelFilter::WARN] by default.
    fn verbosity(level: &str) -> LevelFilter {
        match level {
            "debug" | "dbg" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "error" | "err" => LevelFilter::ERROR,
            "trace" => LevelFilter::TRACE,
            "none" | "off" => LevelFilter::OFF,
            _ => LevelFilter::WARN,
        }
    }
}
