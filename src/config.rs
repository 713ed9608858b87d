//! Configuration surface: TOML file (optional) with per-field environment
//! overrides. Lookup order: `$FLASH_FEED_CONFIG` path, then
//! `config/flash_feed.toml`, then built-in defaults; env vars win last.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::client::RequestConfig;

const ENV_PATH: &str = "FLASH_FEED_CONFIG";
const DEFAULT_PATH: &str = "config/flash_feed.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeedConfig {
    pub api_base_url: String,
    pub feed_path: String,
    pub request_timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_base_ms: u64,
    pub page_size: usize,
    pub refresh_interval_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            feed_path: "/flashes/latest/".to_string(),
            request_timeout_ms: 10_000,
            max_retries: 2,
            retry_delay_base_ms: 500,
            page_size: 20,
            refresh_interval_ms: 60_000,
        }
    }
}

impl FeedConfig {
    pub fn request_config(&self) -> RequestConfig {
        RequestConfig {
            timeout: Duration::from_millis(self.request_timeout_ms),
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_base_ms),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

pub fn load_from(path: &Path) -> Result<FeedConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let cfg: FeedConfig =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}

/// Load with fallbacks and apply env overrides.
pub fn load_default() -> Result<FeedConfig> {
    let mut cfg = if let Ok(p) = std::env::var(ENV_PATH) {
        load_from(Path::new(&p))?
    } else if Path::new(DEFAULT_PATH).exists() {
        load_from(Path::new(DEFAULT_PATH))?
    } else {
        FeedConfig::default()
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut FeedConfig) {
    if let Ok(v) = std::env::var("FLASH_FEED_API_BASE_URL") {
        cfg.api_base_url = v;
    }
    if let Ok(v) = std::env::var("FLASH_FEED_PATH") {
        cfg.feed_path = v;
    }
    override_parsed(&mut cfg.request_timeout_ms, "FLASH_FEED_TIMEOUT_MS");
    override_parsed(&mut cfg.max_retries, "FLASH_FEED_MAX_RETRIES");
    override_parsed(&mut cfg.retry_delay_base_ms, "FLASH_FEED_RETRY_DELAY_MS");
    override_parsed(&mut cfg.page_size, "FLASH_FEED_PAGE_SIZE");
    override_parsed(&mut cfg.refresh_interval_ms, "FLASH_FEED_REFRESH_MS");
}

fn override_parsed<T: std::str::FromStr>(slot: &mut T, var: &str) {
    if let Some(v) = std::env::var(var).ok().and_then(|s| s.parse().ok()) {
        *slot = v;
    }
}
