use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_BASE_URL;
use crate::error::DexError;
use crate::store::default_data_dir;

pub const DEFAULT_CONFIG_FILE: &str = "pokedex.json";
pub const DEFAULT_PAGE_LIMIT: u32 = 151;
pub const MAX_PAGE_LIMIT: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub page_limit: Option<u32>,
    #[serde(default)]
    pub page_offset: Option<u32>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub base_url: String,
    pub page_limit: u32,
    pub page_offset: u32,
    pub timeout: Duration,
    pub data_dir: Utf8PathBuf,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `pokedex.json` in the working directory when no path
    /// is given. A missing default file falls back to built-in defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, DexError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| DexError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| DexError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, DexError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let base_url = config
            .base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(DexError::InvalidConfig(format!("base_url: {base_url}")));
        }

        let page_limit = config.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if page_limit == 0 || page_limit > MAX_PAGE_LIMIT {
            return Err(DexError::InvalidConfig(format!(
                "page_limit must be between 1 and {MAX_PAGE_LIMIT}, got {page_limit}"
            )));
        }

        let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(DexError::InvalidConfig(
                "timeout_secs must be positive".to_string(),
            ));
        }

        let data_dir = match config.data_dir {
            Some(dir) => Utf8PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(ResolvedConfig {
            schema_version,
            base_url,
            page_limit,
            page_offset: config.page_offset.unwrap_or(0),
            timeout: Duration::from_secs(timeout_secs),
            data_dir,
        })
    }
}
