//! Replay crawler for the zhibo8 football replay listing.
//!
//! fetch (reqwest) -> extract (scraper) -> Vec<ReplayRecord>
//!
//! Only total failures are errors: a failed request or markup that cannot be
//! read. Broken bytes, sections and entries are skipped.

pub mod dates;
pub mod error;
pub mod extract;
pub mod fetch;

pub use dates::DateResolution;
pub use error::{CrawlError, FetchError, ParseError};
pub use extract::{ExtractConfig, Extractor, DEFAULT_BASE_URL, DEFAULT_KEYWORDS, REPLAY_LABEL};
pub use fetch::{ReplayFetcher, DEFAULT_SOURCE_URL};

use replay_model::ReplayRecord;
use tracing::info;

pub struct ReplayCrawler {
    fetcher: ReplayFetcher,
    extractor: Extractor,
}

impl ReplayCrawler {
    pub fn new(fetcher: ReplayFetcher, extractor: Extractor) -> Self {
        Self { fetcher, extractor }
    }

    pub fn source_url(&self) -> &str {
        self.fetcher.source_url()
    }

    /// One fetch + parse pass. The parsed document never lives across an await.
    pub async fn crawl(&self) -> Result<Vec<ReplayRecord>, CrawlError> {
        let markup = self.fetcher.fetch().await?;
        let items = self.extractor.extract(&markup)?;
        info!("crawl: got {} replays from {}", items.len(), self.fetcher.source_url());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use replay_model::FixedClock;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).await.unwrap();
            stream.write_all(&body).await.unwrap();
        });
        format!("http://{addr}/zuqiu/luxiang.htm")
    }

    fn crawler(url: String) -> ReplayCrawler {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let extractor = Extractor::new(ExtractConfig::default())
            .unwrap()
            .with_clock(Arc::new(FixedClock(today)));
        ReplayCrawler::new(ReplayFetcher::with_client(client, url), extractor)
    }

    #[tokio::test]
    async fn crawl_fetches_and_extracts() {
        let page = r#"<html><body><div class="box">
            <div class="titlebar"><h2>3月8日 星期日</h2></div>
            <div class="content"><b>西甲 巴萨vs皇家社会 <a href="/zuqiu/2026/0308-a.htm">全场录像</a></b></div>
            </div></body></html>"#;
        let url = serve_once(page.as_bytes().to_vec()).await;

        let items = crawler(url).crawl().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "西甲 巴萨vs皇家社会");
        assert_eq!(items[0].date, NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
    }

    #[tokio::test]
    async fn page_with_invalid_bytes_still_yields_good_sections() {
        let mut page = r#"<html><body><div class="box">
            <div class="titlebar"><h2>3月8日</h2></div>
            <div class="content"><b>巴萨vs皇家社会 <a href="/zuqiu/2026/0308-a.htm">全场录像</a></b></div>
            </div><div class="box">
            <div class="titlebar"><h2>3月7日</h2></div>
            <div class="content"><b>赫塔费vs# <a href="/zuqiu/2026/0307-b.htm">全场录像</a></b></div>
            </div></body></html>"#
            .as_bytes()
            .to_vec();
        let pos = page.iter().position(|b| *b == b'#').unwrap();
        page[pos] = 0xB0;
        let url = serve_once(page).await;

        let items = crawler(url).crawl().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://www.zhibo8.com/zuqiu/2026/0308-a.htm");
    }
}
