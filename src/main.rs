/// barca-replays - Replay server
///
/// What it does:
///   1. Crawls the zhibo8 football replay listing at startup and then every
///      REPLAY_CRAWL_INTERVAL_SECS (default 5s)
///   2. Keeps only FC Barcelona entries, merged into an in-memory store keyed by URL
///   3. Serves them over HTTP: /health, /replays?days=N, POST /replays/refresh, /
///
/// Nothing is persisted; a restart starts empty until the first crawl lands.
///
/// Run:
///   cargo run --bin replay-server

mod config;
mod refresh;
mod server;

use anyhow::{Context, Result};
use config::Config;
use dotenv::dotenv;
use logger::{now_iso, EventLogger, ServerStartedEvent};
use replay_crawler::{Extractor, ReplayCrawler, ReplayFetcher};
use replay_store::ReplayStore;
use std::env;
use std::fs::File;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct AppState {
    pub store:   Arc<ReplayStore>,
    pub crawler: Arc<ReplayCrawler>,
    pub logger:  Arc<EventLogger>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cfg = Config::from_env()?;

    // Single instance lock
    let lock_file_path = env::temp_dir().join("barca_replays.lock");
    let lock_file = match File::create(&lock_file_path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to create lock file at {:?}: {}", lock_file_path, e);
            return Ok(());
        }
    };

    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => {
            info!("Acquired single-instance lock.");
            guard
        }
        Err(_) => {
            warn!("Another instance of replay-server is already running! Exiting.");
            return Ok(());
        }
    };

    let extractor = Extractor::new(cfg.extract_config()).context("Invalid REPLAY_BASE_URL")?;
    let fetcher = ReplayFetcher::new(cfg.source_url.clone(), cfg.fetch_timeout);

    let state = AppState {
        store:   Arc::new(ReplayStore::new()),
        crawler: Arc::new(ReplayCrawler::new(fetcher, extractor)),
        logger:  Arc::new(EventLogger::new(&cfg.log_dir)),
    };

    let listener = TcpListener::bind(cfg.http_bind).await.context("http bind")?;

    info!("Source: {}", cfg.source_url);
    info!("Keywords: {:?}", cfg.keywords);
    info!("Crawl interval: {}s", cfg.crawl_interval.as_secs());
    info!("Logs: {}", state.logger.log_dir().display());

    let _ = state.logger.log(&ServerStartedEvent {
        ts:                  now_iso(),
        event:               "SERVER_STARTED",
        bind:                cfg.http_bind.to_string(),
        source_url:          cfg.source_url.clone(),
        crawl_interval_secs: cfg.crawl_interval.as_secs(),
        keywords:            cfg.keywords.clone(),
    });

    refresh::spawn_refresh_loop(state.clone(), cfg.crawl_interval);

    server::serve(listener, state).await
}
