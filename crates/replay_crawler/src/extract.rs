//! Replay listing parser.
//!
//! Page structure (zhibo8 luxiang.htm):
//!
//! <div class="box">
//!   <div class="titlebar"><h2>2月26日 星期四</h2></div>
//!   <div class="content">
//!     <b>西甲 巴塞罗那vs皇马 <a href="/zuqiu/2026/0226-x.htm">全场录像</a></b>
//!     <span>| 欧冠 巴萨vs国米 <a href="/zuqiu/...">全场录像</a></span>
//!   </div>
//! </div>
//!
//! Entries come either wrapped in `<b>` or as a bare link whose title is the
//! text node right before it.

use crate::dates::{header_date, DateResolution};
use crate::error::ParseError;
use chrono::{Datelike, NaiveDate};
use replay_model::{Clock, ReplayRecord, SystemClock};
use scraper::{ElementRef, Html, Selector};
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.zhibo8.com";
pub const DEFAULT_KEYWORDS: [&str; 2] = ["巴塞罗那", "巴萨"];
pub const REPLAY_LABEL: &str = "全场录像";

static SECTION_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".box").unwrap());
static HEADER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".titlebar h2").unwrap());
static BOLD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".content b").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static BARE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".content a[href]").unwrap());

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Case-sensitive substrings; a title must contain at least one.
    pub keywords: Vec<String>,
    /// Origin relative links are resolved against.
    pub base_url: String,
    /// Link text of the replay link, also stripped from the end of titles.
    pub replay_label: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            base_url: DEFAULT_BASE_URL.to_string(),
            replay_label: REPLAY_LABEL.to_string(),
        }
    }
}

pub struct Extractor {
    keywords: Vec<String>,
    base: Url,
    label: String,
    clock: Arc<dyn Clock>,
}

impl Extractor {
    pub fn new(config: ExtractConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            keywords: config.keywords,
            base: Url::parse(&config.base_url)?,
            label: config.replay_label,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Raw page bytes -> team-relevant records, in document order.
    /// Invalid UTF-8 is replaced, so a stray byte only spoils the entry it sits in.
    pub fn extract(&self, markup: &[u8]) -> Result<Vec<ReplayRecord>, ParseError> {
        let html = String::from_utf8_lossy(markup);
        Ok(self.extract_html(&html))
    }

    pub fn extract_reader<R: Read>(&self, mut reader: R) -> Result<Vec<ReplayRecord>, ParseError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.extract(&buf)
    }

    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<Vec<ReplayRecord>, ParseError> {
        let file = std::fs::File::open(path)?;
        self.extract_reader(file)
    }

    pub fn extract_html(&self, html: &str) -> Vec<ReplayRecord> {
        let document = Html::parse_document(html);
        let year = self.clock.today().year();

        let mut out = Vec::new();
        for (idx, section) in document.select(&SECTION_SEL).enumerate() {
            self.extract_section(idx, section, year, &mut out);
        }

        debug!(records = out.len(), "replay listing parsed");
        out
    }

    fn extract_section(&self, idx: usize, section: ElementRef, year: i32, out: &mut Vec<ReplayRecord>) {
        let header = section
            .select(&HEADER_SEL)
            .next()
            .map(|h| h.text().collect::<String>())
            .unwrap_or_default();

        let Some(fallback) = header_date(header.trim(), year) else {
            debug!(section = idx, header = header.trim(), "section without usable date header, skipped");
            return;
        };

        // <b>title <a>全场录像</a></b>
        for bold in section.select(&BOLD_SEL) {
            let Some(href) = bold.select(&LINK_SEL).next().and_then(|a| a.value().attr("href")) else {
                continue;
            };
            let raw_title = bold.text().collect::<String>();
            self.push_candidate(&raw_title, href, fallback, out);
        }

        // title <a>全场录像</a> without <b>
        for link in section.select(&BARE_LINK_SEL) {
            if link.text().collect::<String>().trim() != self.label {
                continue;
            }
            if parent_is_bold(link) {
                continue;
            }
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let raw_title = preceding_text(link);
            self.push_candidate(&raw_title, href, fallback, out);
        }
    }

    fn push_candidate(&self, raw_title: &str, href: &str, fallback: NaiveDate, out: &mut Vec<ReplayRecord>) {
        let href = href.trim();
        if href.is_empty() {
            return;
        }

        let title = self.normalize_title(raw_title);
        if title.is_empty() || !self.is_relevant(&title) {
            return;
        }

        let date = DateResolution::resolve(href, Some(fallback)).date().unwrap_or(fallback);

        out.push(ReplayRecord::new(title, self.resolve_url(href), date));
    }

    /// "| 西甲 巴萨vs皇马 全场录像 " -> "西甲 巴萨vs皇马"
    pub fn normalize_title(&self, raw: &str) -> String {
        let t = strip_separator(raw);
        let t = t.strip_suffix(self.label.as_str()).unwrap_or(t);
        strip_separator(t).to_string()
    }

    pub fn is_relevant(&self, title: &str) -> bool {
        self.keywords.iter().any(|k| title.contains(k.as_str()))
    }

    /// Absolute links pass through; relative ones are joined onto the base.
    /// Anything the join rejects is kept raw.
    pub fn resolve_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        match self.base.join(href) {
            Ok(u) => u.to_string(),
            Err(_) => href.to_string(),
        }
    }
}

fn strip_separator(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('|').unwrap_or(s).trim()
}

fn parent_is_bold(el: ElementRef) -> bool {
    el.parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|p| p.value().name() == "b")
}

fn preceding_text(el: ElementRef) -> String {
    el.prev_sibling()
        .and_then(|n| n.value().as_text().map(|t| t.to_string()))
        .unwrap_or_default()
}
