use crate::error::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_SOURCE_URL: &str = "https://www.zhibo8.com/zuqiu/luxiang.htm";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// GETs the replay listing page. No retries; the next refresh cycle is the retry.
pub struct ReplayFetcher {
    client: reqwest::Client,
    source_url: String,
}

impl ReplayFetcher {
    pub fn new(source_url: impl Into<String>, timeout: Duration) -> Self {
        let client = match browser_client(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "http client setup failed, using defaults without timeout or browser headers");
                reqwest::Client::new()
            }
        };

        Self::with_client(client, source_url)
    }

    pub fn with_client(client: reqwest::Client, source_url: impl Into<String>) -> Self {
        Self {
            client,
            source_url: source_url.into(),
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let resp = self.client.get(&self.source_url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = resp.bytes().await?;
        debug!(url = %self.source_url, bytes = body.len(), "replay page fetched");
        Ok(body.to_vec())
    }
}

/// Browser-like headers, user agent, timeout and gzip.
pub(crate) fn browser_client(timeout: Duration) -> reqwest::ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.5"));

    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .gzip(true)
}
