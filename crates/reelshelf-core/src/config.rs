//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend base URL, the public share URL, the token
//! storage backend and the last used username.
//!
//! Configuration is stored at `~/.config/reelshelf/config.json`. Values can be
//! overridden from the environment (`REELSHELF_API_URL`, `REELSHELF_SHARE_URL`,
//! `REELSHELF_TOKEN_BACKEND`), which is how deployments point the client at a
//! different backend.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/cache/data directory paths
pub const APP_NAME: &str = "reelshelf";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when nothing is configured (local development server)
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Origin that serves the shared-list pages
const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:3000";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_API_URL: &str = "REELSHELF_API_URL";
const ENV_SHARE_URL: &str = "REELSHELF_SHARE_URL";
const ENV_TOKEN_BACKEND: &str = "REELSHELF_TOKEN_BACKEND";

/// Where the access/refresh tokens are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    /// JSON file in the per-origin data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

impl TokenBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "file" => Some(TokenBackend::File),
            "keyring" | "keychain" => Some(TokenBackend::Keyring),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub share_base_url: String,
    pub request_timeout_secs: u64,
    pub token_backend: TokenBackend,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_backend: TokenBackend::File,
            last_username: None,
        }
    }
}

impl Config {
    /// Load the config file (or defaults) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from a variable lookup. Split out from `load` so the
    /// precedence rules can be tested without touching the process env.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(url) = lookup(ENV_SHARE_URL).filter(|v| !v.trim().is_empty()) {
            self.share_base_url = url.trim().to_string();
        }
        if let Some(value) = lookup(ENV_TOKEN_BACKEND) {
            match TokenBackend::parse(&value) {
                Some(backend) => self.token_backend = backend,
                None => warn!(value = %value, "Unknown token backend, keeping configured one"),
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Base URL without a trailing slash
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Filesystem-safe key identifying the backend origin (scheme, host, port).
    ///
    /// Token state is scoped by this key the same way browser storage is
    /// scoped by origin, so switching backends never leaks a credential.
    pub fn origin(&self) -> String {
        let url = self.api_base();
        let (scheme, rest) = url.split_once("://").unwrap_or(("http", url));
        let authority = rest.split('/').next().unwrap_or_default();
        let raw = format!("{}_{}", scheme, authority);
        raw.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect::<String>()
            .to_lowercase()
    }

    /// Directory for durable per-origin state (tokens)
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join(self.origin()))
    }

    /// Directory for disposable files (logs)
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Public URL of a shared list
    pub fn share_url(&self, share_hash: &str) -> String {
        format!("{}/shared/{}", self.share_base_url.trim_end_matches('/'), share_hash)
    }
}
