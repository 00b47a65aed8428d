//! Admin CLI configuration

use anyhow::{Context, Result};
use league_service::LeagueServiceConfig;
use persistence::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file, looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "league-admin.toml";

/// Main CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Where the league is stored
    pub store: StoreConfig,

    /// League rules the service enforces
    pub league: LeagueServiceConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: "compact".to_string() }
    }
}

/// Load configuration from an optional TOML file and environment variables
pub fn load_config(file: Option<&Path>) -> Result<AdminConfig> {
    dotenv::dotenv().ok();

    let source = match file {
        Some(path) => ::config::File::from(path).required(true),
        None => ::config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let mut config: AdminConfig = ::config::Config::builder()
        .add_source(source)
        .build()
        .context("Failed to read configuration file")?
        .try_deserialize()
        .context("Failed to parse configuration")?;

    // Override with environment variables
    load_from_env(&mut config)?;

    // Validate configuration
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration overrides from environment variables
fn load_from_env(config: &mut AdminConfig) -> Result<()> {
    if let Ok(level) = std::env::var("LEAGUE_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Ok(format) = std::env::var("LEAGUE_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Ok(data_dir) = std::env::var("LEAGUE_DATA_DIR") {
        config.store.data_dir = PathBuf::from(data_dir);
    }

    config.league.apply_env()?;

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &AdminConfig) -> Result<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        anyhow::bail!(
            "Invalid log level: {}. Must be one of: {:?}",
            config.logging.level,
            valid_levels
        );
    }

    let valid_formats = ["json", "pretty", "compact"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        anyhow::bail!(
            "Invalid log format: {}. Must be one of: {:?}",
            config.logging.format,
            valid_formats
        );
    }

    config
        .store
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid store configuration: {e}"))?;

    Ok(())
}
