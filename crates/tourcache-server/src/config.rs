//! Server configuration.
//!
//! Settings are read from an optional JSON file, then overridden by
//! environment variables. The file path comes from `TOURCACHE_CONFIG`
//! and defaults to `tourcache.json` in the working directory.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tourcache_core::api::client::{DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL, DEFAULT_OVERLAY_BASE_URL};
use tourcache_core::{CacheSettings, ClientCredentials, Endpoints, TourConfig};

/// Config file used when `TOURCACHE_CONFIG` is not set
const DEFAULT_CONFIG_FILE: &str = "tourcache.json";

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub addr: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub api_base_url: String,
    /// Host serving the translated overlay files
    pub overlay_base_url: String,
    pub source_ttl_hours: i64,
    pub overlay_ttl_hours: i64,
    pub home_ttl_hours: i64,
    pub search_ttl_hours: i64,
    pub event_search_ttl_minutes: i64,
    pub serve_stale_on_error: bool,
    pub selection_seed: Option<u64>,
    /// Daily-rolling log files are written here when set
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            overlay_base_url: DEFAULT_OVERLAY_BASE_URL.to_string(),
            source_ttl_hours: 24,
            overlay_ttl_hours: 24,
            home_ttl_hours: 24,
            search_ttl_hours: 24,
            event_search_ttl_minutes: 120,
            serve_stale_on_error: false,
            selection_seed: None,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var("TOURCACHE_CONFIG").ok();
        let path = PathBuf::from(explicit.as_deref().unwrap_or(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else if explicit.is_some() {
            return Err(anyhow!("Config file {} does not exist", path.display()));
        } else {
            Self::default()
        };

        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Override fields from variables returned by `lookup`. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("TDX_CLIENT_ID") {
            self.client_id = v;
        }
        if let Some(v) = var("TDX_CLIENT_SECRET") {
            self.client_secret = v;
        }
        if let Some(v) = var("TDX_AUTH_URL") {
            self.auth_url = v;
        }
        if let Some(v) = var("TDX_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = var("APP_BASE_URL") {
            self.overlay_base_url = v;
        }
        if let Some(v) = var("TOURCACHE_ADDR") {
            self.addr = v;
        }
        if let Some(v) = var("TOURCACHE_SERVE_STALE") {
            self.serve_stale_on_error = parse_flag(&v)
                .ok_or_else(|| anyhow!("Invalid TOURCACHE_SERVE_STALE value: {}", v))?;
        }
        if let Some(v) = var("TOURCACHE_SELECTION_SEED") {
            let seed = v
                .trim()
                .parse()
                .with_context(|| format!("Invalid TOURCACHE_SELECTION_SEED value: {}", v))?;
            self.selection_seed = Some(seed);
        }
        if let Some(v) = var("TOURCACHE_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(v));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        SocketAddr::from_str(&self.addr).map_err(|e| anyhow!("Invalid listen address {}: {}", self.addr, e))
    }

    pub fn credentials(&self) -> ClientCredentials {
        ClientCredentials::new(self.client_id.clone(), self.client_secret.clone())
    }

    pub fn tour_config(&self) -> TourConfig {
        TourConfig {
            endpoints: Endpoints {
                auth_url: self.auth_url.trim_end_matches('/').to_string(),
                api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
                overlay_base_url: self.overlay_base_url.trim_end_matches('/').to_string(),
            },
            credentials: self.credentials(),
            cache: CacheSettings {
                source_ttl: Duration::hours(self.source_ttl_hours),
                overlay_ttl: Duration::hours(self.overlay_ttl_hours),
                home_ttl: Duration::hours(self.home_ttl_hours),
                search_ttl: Duration::hours(self.search_ttl_hours),
                event_search_ttl: Duration::minutes(self.event_search_ttl_minutes),
                serve_stale_on_error: self.serve_stale_on_error,
            },
            selection_seed: self.selection_seed,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
