use crate::AppState;
use logger::{now_iso, CrawlCompletedEvent, CrawlFailedEvent};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Interval,
    Manual,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Startup => "startup",
            Trigger::Interval => "interval",
            Trigger::Manual => "manual",
        }
    }
}

/// One crawl cycle: fetch + extract, then merge into the store.
/// On failure the store keeps its last good snapshot. Returns true on success.
pub async fn run_crawl(state: &AppState, trigger: Trigger) -> bool {
    let source_url = state.crawler.source_url().to_string();

    match state.crawler.crawl().await {
        Ok(items) => {
            let extracted = items.len();
            state.store.ingest(items).await;
            let stored_total = state.store.len().await;

            info!(trigger = trigger.as_str(), extracted, stored_total, "crawl ingested");
            let _ = state.logger.log(&CrawlCompletedEvent {
                ts: now_iso(),
                event: "CRAWL_COMPLETED",
                trigger: trigger.as_str().to_string(),
                source_url,
                extracted,
                stored_total,
            });
            true
        }
        Err(e) => {
            warn!("crawl ({}): {}", trigger.as_str(), e);
            let _ = state.logger.log(&CrawlFailedEvent {
                ts: now_iso(),
                event: "CRAWL_FAILED",
                trigger: trigger.as_str().to_string(),
                source_url,
                stage: e.stage().to_string(),
                message: e.to_string(),
            });
            false
        }
    }
}

/// Crawl once right away, then every `every`.
pub fn spawn_refresh_loop(state: AppState, every: Duration) {
    tokio::spawn(async move {
        run_crawl(&state, Trigger::Startup).await;
        loop {
            sleep(every).await;
            run_crawl(&state, Trigger::Interval).await;
        }
    });
}
