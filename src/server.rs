//! Minimal HTTP/1.1 query service, one request per connection.
//!
//!   GET  /health           -> {"status":"ok"}
//!   GET  /replays?days=N   -> {"items":[...]}  (N in 1..=30, default 7)
//!   POST /replays/refresh  -> runs a crawl cycle now
//!   GET  /                 -> static page

use crate::refresh::{run_crawl, Trigger};
use crate::AppState;
use anyhow::{Context, Result};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

pub const DEFAULT_DAYS: i64 = 7;
pub const MIN_DAYS: i64 = 1;
pub const MAX_DAYS: i64 = 30;

const INDEX_HTML: &str = include_str!("../static/index.html");

const JSON: &str = "application/json; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";
const HTML: &str = "text/html; charset=utf-8";

#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: JSON,
            body: value.to_string(),
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: TEXT,
            body: body.to_string(),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            502 => "Bad Gateway",
            _ => "Internal Server Error",
        }
    }
}

/// `days` query parameter. Missing or empty => default.
fn parse_days(query: &str) -> Option<i64> {
    let raw = url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "days")
        .map(|(_, v)| v.into_owned());

    match raw.as_deref() {
        None | Some("") => Some(DEFAULT_DAYS),
        Some(v) => v
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|n| (MIN_DAYS..=MAX_DAYS).contains(n)),
    }
}

pub async fn route(method: &str, target: &str, state: &AppState) -> HttpResponse {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    match (method, path) {
        ("GET", "/health") => HttpResponse::json(200, json!({"status": "ok"})),

        ("GET", "/replays") => match parse_days(query) {
            Some(days) => {
                let items = state.store.query(days).await;
                HttpResponse::json(200, json!({ "items": items }))
            }
            None => HttpResponse::json(400, json!({"error": "days must be 1-30"})),
        },

        ("POST", "/replays/refresh") => {
            if run_crawl(state, Trigger::Manual).await {
                HttpResponse::json(200, json!({"ok": true, "message": "已刷新"}))
            } else {
                HttpResponse::json(502, json!({"ok": false, "message": "刷新失败"}))
            }
        }

        ("GET", "/") | ("GET", "/index.html") => HttpResponse {
            status: 200,
            content_type: HTML,
            body: INDEX_HTML.to_string(),
        },

        (_, "/health" | "/replays" | "/replays/refresh" | "/" | "/index.html") => {
            HttpResponse::text(405, "method not allowed")
        }

        _ => HttpResponse::text(404, "not found"),
    }
}

async fn handle_http_connection(mut stream: TcpStream, state: AppState) -> Result<()> {
    let mut buf = vec![0u8; 8192];
    let n = stream.read(&mut buf).await.context("http read")?;
    if n == 0 {
        return Ok(());
    }

    let req = String::from_utf8_lossy(&buf[..n]);
    let first_line = req.lines().next().unwrap_or_default();
    let mut parts = first_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("");

    let resp = route(method, target, &state).await;
    debug!("{} {} -> {}", method, target, resp.status);

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        resp.status,
        resp.reason(),
        resp.content_type,
        resp.body.len()
    );
    stream.write_all(head.as_bytes()).await.context("http write")?;
    stream.write_all(resp.body.as_bytes()).await.context("http write")?;
    Ok(())
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr().context("http local_addr")?;
    info!("listen http://{} (GET /health, /replays?days=N, POST /replays/refresh)", addr);

    loop {
        let (stream, peer) = listener.accept().await.context("http accept")?;
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_http_connection(stream, state).await {
                debug!("http handler err {}: {}", peer, e);
            }
        });
    }
}
