/// barca-replays - Logger
/// JSONL audit stream, one file per UTC day: <log_dir>/<YYYY-MM-DD>.jsonl

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let date  = Utc::now().format("%Y-%m-%d").to_string();
        let path  = self.log_dir.join(format!("{date}.jsonl"));
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event types ───────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct ServerStartedEvent {
    pub ts:                  String,
    pub event:               &'static str,   // "SERVER_STARTED"
    pub bind:                String,
    pub source_url:          String,
    pub crawl_interval_secs: u64,
    pub keywords:            Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct CrawlCompletedEvent {
    pub ts:           String,
    pub event:        &'static str,   // "CRAWL_COMPLETED"
    pub trigger:      String,         // "startup" | "interval" | "manual"
    pub source_url:   String,
    pub extracted:    usize,
    pub stored_total: usize,
}

#[derive(Serialize, Debug)]
pub struct CrawlFailedEvent {
    pub ts:         String,
    pub event:      &'static str,   // "CRAWL_FAILED"
    pub trigger:    String,
    pub source_url: String,
    pub stage:      String,         // "fetch" | "parse"
    pub message:    String,
}
