use anyhow::{Context, Result};
use replay_crawler::{ExtractConfig, DEFAULT_BASE_URL, DEFAULT_KEYWORDS, DEFAULT_SOURCE_URL, REPLAY_LABEL};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DEFAULT_CRAWL_INTERVAL_SECS: u64 = 5;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_HTTP_BIND: &str = "0.0.0.0:3000";
const DEFAULT_LOG_DIR: &str = "logs";

/// Runtime settings, read from the environment (`.env` is loaded first).
#[derive(Debug, Clone)]
pub struct Config {
    pub source_url:     String,
    pub base_url:       String,
    pub keywords:       Vec<String>,
    pub crawl_interval: Duration,
    pub fetch_timeout:  Duration,
    pub http_bind:      SocketAddr,
    pub log_dir:        PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let source_url = get("REPLAY_SOURCE_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        Url::parse(&source_url).context("Invalid REPLAY_SOURCE_URL")?;

        let base_url = get("REPLAY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url).context("Invalid REPLAY_BASE_URL")?;

        let keywords: Vec<String> = get("REPLAY_KEYWORDS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .filter(|k: &Vec<String>| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect());

        let secs = |key: &str, default: u64| {
            get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        let bind = get("REPLAY_HTTP_BIND").unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string());
        let http_bind: SocketAddr = bind.parse().context("Invalid REPLAY_HTTP_BIND")?;

        Ok(Self {
            source_url,
            base_url,
            keywords,
            crawl_interval: Duration::from_secs(secs("REPLAY_CRAWL_INTERVAL_SECS", DEFAULT_CRAWL_INTERVAL_SECS)),
            fetch_timeout: Duration::from_secs(secs("REPLAY_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)),
            http_bind,
            log_dir: get("REPLAY_LOG_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        })
    }

    pub fn extract_config(&self) -> ExtractConfig {
        ExtractConfig {
            keywords: self.keywords.clone(),
            base_url: self.base_url.clone(),
            replay_label: REPLAY_LABEL.to_string(),
        }
    }
}
