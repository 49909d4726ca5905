//! Configuration Manager

use super::Config;
use crate::Result;
use anyhow::{bail, Context};
use std::net::SocketAddr;
use std::path::Path;

/// Manages configuration loading and validation
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            config
                .validate()
                .with_context(|| "Configuration validation failed")?;

            tracing::info!("Configuration loaded and validated successfully");
            Ok(config)
        } else {
            tracing::warn!(
                "Configuration file not found at {}, using defaults",
                path.display()
            );
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Config> {
        let mut config = Config::default();

        if let Ok(bind_addr) = std::env::var("CHATRELAY_BIND_ADDR") {
            config.server.bind_addr = bind_addr
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid CHATRELAY_BIND_ADDR: {}", bind_addr))?;
        }

        if let Ok(timeout) = std::env::var("CHATRELAY_SHUTDOWN_TIMEOUT") {
            config.server.shutdown_timeout = humantime::parse_duration(&timeout)
                .with_context(|| format!("Invalid CHATRELAY_SHUTDOWN_TIMEOUT: {}", timeout))?;
        }

        if let Ok(static_dir) = std::env::var("CHATRELAY_STATIC_DIR") {
            config.http.static_dir = static_dir.into();
        }

        if let Ok(uploads_dir) = std::env::var("CHATRELAY_UPLOADS_DIR") {
            config.http.uploads_dir = uploads_dir.into();
        }

        if let Ok(max_upload) = std::env::var("CHATRELAY_MAX_UPLOAD_BYTES") {
            config.http.max_upload_bytes = max_upload
                .parse::<usize>()
                .with_context(|| format!("Invalid CHATRELAY_MAX_UPLOAD_BYTES: {}", max_upload))?;
        }

        if let Ok(log_level) = std::env::var("CHATRELAY_LOG_LEVEL") {
            config.logging.level = log_level;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.validate_server_config()
            .with_context(|| "Server configuration validation failed")?;

        self.validate_http_config()
            .with_context(|| "HTTP configuration validation failed")?;

        self.validate_logging_config()
            .with_context(|| "Logging configuration validation failed")?;

        Ok(())
    }

    fn validate_server_config(&self) -> Result<()> {
        if self.server.shutdown_timeout.as_secs() == 0 {
            bail!("shutdown_timeout must be greater than 0");
        }

        if self.server.shutdown_timeout.as_secs() > 600 {
            bail!("shutdown_timeout cannot exceed 10 minutes");
        }

        Ok(())
    }

    fn validate_http_config(&self) -> Result<()> {
        if self.http.static_dir.as_os_str().is_empty() {
            bail!("static_dir must not be empty");
        }

        if self.http.uploads_dir.as_os_str().is_empty() {
            bail!("uploads_dir must not be empty");
        }

        if self.http.max_upload_bytes < 1024 {
            bail!("max_upload_bytes must be at least 1024 bytes");
        }

        if self.http.max_upload_bytes > 100 * 1024 * 1024 {
            bail!("max_upload_bytes cannot exceed 100 MB");
        }

        Ok(())
    }

    fn validate_logging_config(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "logging.level must be one of: {}",
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }

    /// Merge with CLI arguments
    pub fn merge_with_cli_args(
        &mut self,
        bind: Option<&str>,
        port: Option<u16>,
        static_dir: Option<&str>,
        uploads_dir: Option<&str>,
    ) {
        if let Some(bind_str) = bind {
            if let Ok(addr) = bind_str.parse::<SocketAddr>() {
                self.server.bind_addr = addr;
                tracing::info!("CLI override: bind address set to {}", addr);
            } else {
                tracing::warn!("Invalid bind address provided: {}", bind_str);
            }
        }

        if let Some(port) = port {
            self.server.bind_addr.set_port(port);
            tracing::info!("CLI override: port set to {}", port);
        }

        if let Some(dir) = static_dir {
            self.http.static_dir = dir.into();
            tracing::info!("CLI override: static dir set to {}", dir);
        }

        if let Some(dir) = uploads_dir {
            self.http.uploads_dir = dir.into();
            tracing::info!("CLI override: uploads dir set to {}", dir);
        }
    }
}
