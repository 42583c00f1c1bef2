//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`SHOPCTL_API_URL`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./shopctl.toml in the current directory
//! 4. $XDG_CONFIG_HOME/shopctl/shopctl.toml (or ~/.config/shopctl/shopctl.toml)
//! 5. Built-in defaults

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 10;

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api: ApiConfig,
    pub network: NetworkConfig,
}

/// API connection settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the retail API, e.g. `https://api.example.com/api`.
    /// There is no sensible default; an empty value is rejected at startup.
    pub base_url: String,
}

/// Network behavior settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout for ordinary API calls.
    pub timeout_secs: u64,
    /// Timeout for the token-renewal call. A hung renewal would otherwise
    /// park every queued request indefinitely.
    pub refresh_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            refresh_timeout_secs: DEFAULT_REFRESH_TIMEOUT_SECS,
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }
}

/// On-disk TOML shape; every section optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api: ApiConfig,
    network: NetworkConfig,
}

/// Returns the user config root (`$XDG_CONFIG_HOME` or `~/.config`).
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}

/// Default global config path (`~/.config/shopctl/shopctl.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    config_root_dir().map(|dir| dir.join("shopctl").join("shopctl.toml"))
}

/// Load configuration, applying the documented precedence order.
pub fn load_config(explicit_path: Option<&str>) -> Result<Config, ConfigError> {
    load_config_with(explicit_path, |key| std::env::var(key).ok())
}

/// Load configuration with an injectable environment lookup (for tests).
pub fn load_config_with(
    explicit_path: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let mut config = match resolve_config_file(explicit_path)? {
        Some(path) => parse_config_file(&path)?,
        None => Config::default(),
    };

    if let Some(url) = env("SHOPCTL_API_URL") {
        let trimmed = url.trim();
        if !trimmed.is_empty() {
            config.api.base_url = trimmed.to_string();
        }
    }

    Ok(config)
}

/// Pick the config file to read, if any. An explicit path must exist;
/// fallback locations are optional.
fn resolve_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit_path {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(ConfigError::Invalid(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    let local = PathBuf::from("shopctl.toml");
    if local.exists() {
        return Ok(Some(local));
    }

    if let Some(global) = default_config_path() {
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

fn parse_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    let file: FileConfig = toml::from_str(&text)?;
    Ok(Config {
        api: file.api,
        network: file.network,
    })
}
