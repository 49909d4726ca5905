//! Configuration Types

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

/// HTTP surface configuration: static assets and avatar uploads
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Directory served at the site root (index.html, bundled images).
    pub static_dir: PathBuf,
    /// Directory uploaded avatars are written to; also served at the root
    /// so returned upload URLs resolve directly.
    pub uploads_dir: PathBuf,
    /// Upper bound on a single uploaded file.
    pub max_upload_bytes: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:3000".parse().unwrap(),
                shutdown_timeout: Duration::from_secs(30),
            },
            http: HttpConfig {
                static_dir: PathBuf::from("img"),
                uploads_dir: PathBuf::from("uploads"),
                max_upload_bytes: 5 * 1024 * 1024,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
