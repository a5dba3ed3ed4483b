//! Configuration module for linkdrop.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::blob::DEFAULT_MAX_UPLOAD_SIZE;
use crate::{LinkdropError, Result};

/// Bytes in one megabyte.
const MB: u64 = 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL used when building share links (e.g. "https://drop.example.com").
    ///
    /// When unset, links are built from the request's Host header.
    #[serde(default)]
    pub public_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory on a persistent volume.
    ///
    /// When unset, storage falls back to an ephemeral directory under the
    /// system temp dir.
    #[serde(default)]
    pub root: Option<String>,
    /// Directory (relative to the root) holding one JSON record per file.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Directory (relative to the root) holding uploaded blobs.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    DEFAULT_MAX_UPLOAD_SIZE / MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: None,
            data_dir: default_data_dir(),
            uploads_dir: default_uploads_dir(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Resolved storage directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoots {
    /// Directory for record files.
    pub data: PathBuf,
    /// Directory for uploaded blobs.
    pub uploads: PathBuf,
}

impl StorageConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(MB)
    }

    /// Resolve the data and uploads directories.
    ///
    /// A configured root (persistent volume) wins; otherwise both
    /// directories live under `<temp>/linkdrop`.
    pub fn resolve_roots(&self) -> StorageRoots {
        let base = match &self.root {
            Some(root) if !root.trim().is_empty() => PathBuf::from(root),
            _ => std::env::temp_dir().join("linkdrop"),
        };

        StorageRoots {
            data: base.join(&self.data_dir),
            uploads: base.join(&self.uploads_dir),
        }
    }
}

/// Web front-end configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Whether to serve static assets.
    #[serde(default = "default_serve_static")]
    pub serve_static: bool,
    /// Path to static assets directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

fn default_serve_static() -> bool {
    true
}

fn default_static_path() -> String {
    "public".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            serve_static: default_serve_static(),
            static_path: default_static_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional path to a log file. Console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Web front-end configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(LinkdropError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| LinkdropError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PORT`: listening port
    /// - `LINKDROP_PUBLIC_URL`: public base URL for share links
    /// - `LINKDROP_STORAGE_ROOT`: persistent storage root
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }

        if let Some(url) = lookup("LINKDROP_PUBLIC_URL").filter(|v| !v.is_empty()) {
            self.server.public_url = Some(url);
        }

        if let Some(root) = lookup("LINKDROP_STORAGE_ROOT").filter(|v| !v.is_empty()) {
            self.storage.root = Some(root);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.max_upload_size_mb == 0 {
            return Err(LinkdropError::Config(
                "storage.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }

        if self.storage.data_dir.trim().is_empty() || self.storage.uploads_dir.trim().is_empty() {
            return Err(LinkdropError::Config(
                "storage.data_dir and storage.uploads_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
