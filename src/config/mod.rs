use std::env;
use anyhow::{Result, Context};
use tracing::{info, warn};

use crate::services::ExtractorOptions;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    pub parse_on_blocking_pool: bool,
    pub max_archive_entry_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            max_file_size_mb: 25,
            parse_on_blocking_pool: true,
            max_archive_entry_mb: 50,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let defaults = Config::default();
        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: {}", defaults.server_host);
                defaults.server_host.clone()
            }),
            server_port: Self::parse_env_var("SERVER_PORT", defaults.server_port)
                .context("Failed to parse SERVER_PORT")?,
            max_file_size_mb: Self::parse_env_var("MAX_FILE_SIZE_MB", defaults.max_file_size_mb)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            parse_on_blocking_pool: Self::parse_env_var(
                "PARSE_ON_BLOCKING_POOL",
                defaults.parse_on_blocking_pool,
            )
            .context("Failed to parse PARSE_ON_BLOCKING_POOL")?,
            max_archive_entry_mb: Self::parse_env_var(
                "MAX_ARCHIVE_ENTRY_MB",
                defaults.max_archive_entry_mb,
            )
            .context("Failed to parse MAX_ARCHIVE_ENTRY_MB")?,
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.trim().parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.max_archive_entry_mb == 0 {
            return Err(anyhow::anyhow!("MAX_ARCHIVE_ENTRY_MB must be greater than 0"));
        }
        Ok(())
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Options handed to the extractor at construction time.
    pub fn extractor_options(&self) -> ExtractorOptions {
        ExtractorOptions {
            parse_on_blocking_pool: self.parse_on_blocking_pool,
            max_archive_entry_bytes: self.max_archive_entry_mb * 1024 * 1024,
        }
    }
}
